use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading or validating a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level scene configuration.
///
/// Every section falls back to its defaults, so a partial YAML file only needs
/// to name the values it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub water: WaterParams,
    pub assets: AssetConfig,
}

impl SceneConfig {
    /// Parse a config from YAML text and validate it.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!("loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values that would produce a degenerate projection or window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }

        let cam = &self.camera;
        if !(cam.fov_min > 0.0 && cam.fov_min <= cam.fov_max && cam.fov_max < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "fov bounds must satisfy 0 < min <= max < 180, got [{}, {}]",
                cam.fov_min, cam.fov_max
            )));
        }
        if !(cam.pitch_limit > 0.0 && cam.pitch_limit < 90.0) {
            return Err(ConfigError::Invalid(format!(
                "pitch limit must be in (0, 90), got {}",
                cam.pitch_limit
            )));
        }
        if !(cam.near > 0.0 && cam.near < cam.far) {
            return Err(ConfigError::Invalid(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                cam.near, cam.far
            )));
        }
        if cam.world_up.length_squared() == 0.0 {
            return Err(ConfigError::Invalid("world up must be non-zero".into()));
        }
        if self.water.plane_scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "water plane scale must be positive, got {}",
                self.water.plane_scale
            )));
        }
        Ok(())
    }
}

/// Window and presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Pace presentation to the display's vertical blank.
    pub vsync: bool,
    pub clear_color: [f64; 3],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Waterscape".into(),
            width: 2560,
            height: 1080,
            vsync: true,
            clear_color: [0.2, 0.3, 0.3],
        }
    }
}

/// Initial camera pose and tuning. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Units per second.
    pub speed: f32,
    /// Degrees per pixel of mouse motion.
    pub sensitivity: f32,
    pub fov: f32,
    pub fov_min: f32,
    pub fov_max: f32,
    pub pitch_limit: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            world_up: Vec3::Y,
            yaw: -90.0,
            pitch: 0.0,
            speed: 6.0,
            sensitivity: 0.1,
            fov: 45.0,
            fov_min: 1.0,
            fov_max: 45.0,
            pitch_limit: 89.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Water surface shading parameters, uploaded every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterParams {
    /// Blend weights of the four normal-map samples.
    pub strengths: [f32; 4],
    pub tint: Vec3,
    /// Ratio of indices of refraction used for the refracted ray.
    pub refraction_ratio: f32,
    /// Scroll speed of the first normal-map layer pair, in uv units per second.
    pub scroll_speed: f32,
    /// Speed of the second layer pair relative to the first.
    pub secondary_scroll_factor: f32,
    /// Uniform scale applied to the unit water quad.
    pub plane_scale: f32,
}

impl Default for WaterParams {
    fn default() -> Self {
        Self {
            strengths: [0.05, 0.1, 0.05, 0.1],
            tint: Vec3::new(0.8, 0.8, 0.85),
            refraction_ratio: 0.7,
            scroll_speed: 0.1,
            secondary_scroll_factor: 0.5,
            plane_scale: 100.0,
        }
    }
}

/// Logical asset names, resolved against `root`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub root: PathBuf,
    pub normal_maps: [String; 2],
    /// Cubemap faces in +X, -X, +Y, -Y, +Z, -Z order.
    pub cubemap_faces: [String; 6],
    pub water_shader: String,
    pub skybox_shader: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            normal_maps: [
                "textures/water_bump1.tga".into(),
                "textures/water_bump2.tga".into(),
            ],
            cubemap_faces: [
                "textures/cubemaps/snow_right.tga".into(),
                "textures/cubemaps/snow_left.tga".into(),
                "textures/cubemaps/snow_up.tga".into(),
                "textures/cubemaps/snow_down.tga".into(),
                "textures/cubemaps/snow_front.tga".into(),
                "textures/cubemaps/snow_back.tga".into(),
            ],
            water_shader: "shaders/water.wgsl".into(),
            skybox_shader: "shaders/skybox.wgsl".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_values() {
        let config = SceneConfig::default();
        assert_eq!(config.camera.position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(config.camera.yaw, -90.0);
        assert_eq!(config.camera.speed, 6.0);
        assert_eq!(config.camera.sensitivity, 0.1);
        assert_eq!(config.camera.fov, 45.0);
        assert_eq!(config.water.strengths, [0.05, 0.1, 0.05, 0.1]);
        assert_eq!(config.water.tint, Vec3::new(0.8, 0.8, 0.85));
        assert_eq!(config.water.refraction_ratio, 0.7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "camera:\n  speed: 12.0\nwater:\n  tint: [1.0, 1.0, 1.0]\n";
        let config = SceneConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.camera.speed, 12.0);
        assert_eq!(config.camera.yaw, -90.0);
        assert_eq!(config.water.tint, Vec3::ONE);
        assert_eq!(config.water.strengths, [0.05, 0.1, 0.05, 0.1]);
        assert_eq!(config.window.width, 2560);
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = SceneConfig::from_yaml("").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn malformed_yaml_is_error() {
        let err = SceneConfig::from_yaml("camera: [this is not a mapping").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn inverted_fov_bounds_rejected() {
        let yaml = "camera:\n  fov_min: 50.0\n  fov_max: 10.0\n";
        let err = SceneConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_clip_planes_rejected() {
        let mut config = SceneConfig::default();
        config.camera.near = 10.0;
        config.camera.far = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_window_rejected() {
        let mut config = SceneConfig::default();
        config.window.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn yaml_round_trip_preserves_config() {
        let mut config = SceneConfig::default();
        config.water.refraction_ratio = 0.9;
        let text = config.to_yaml().unwrap();
        let back = SceneConfig::from_yaml(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.yaml");
        std::fs::write(&path, "window:\n  width: 800\n  height: 600\n").unwrap();
        let config = SceneConfig::load(&path).unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SceneConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
