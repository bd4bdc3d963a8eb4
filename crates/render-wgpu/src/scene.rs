use crate::shaders;
use std::path::PathBuf;
use waterscape_assets::{
    AssetPaths, CUBE_FACE_COUNT, CubemapFaces, DecodedImage, ShaderSource, load_cubemap,
    load_texture,
};
use waterscape_common::AssetConfig;

/// Decoded inputs for the renderer, loaded once at startup.
pub struct SceneAssets {
    /// The two water normal maps. `None` when a map failed to load.
    pub normal_maps: [Option<DecodedImage>; 2],
    pub environment: CubemapFaces,
    pub water_shader: ShaderSource,
    pub skybox_shader: ShaderSource,
}

impl SceneAssets {
    /// Load everything named in `config`. Individual failures are logged and
    /// leave a gap; loading itself never fails.
    pub fn load(config: &AssetConfig) -> Self {
        let paths = AssetPaths::new(&config.root);
        tracing::info!("loading assets from {}", paths.root().display());

        let normal_maps = config.normal_maps.each_ref().map(|name| {
            match load_texture(paths.resolve(name), true) {
                Ok(image) => Some(image),
                Err(e) => {
                    tracing::error!("failed to load texture: {e}");
                    None
                }
            }
        });

        let face_paths: [PathBuf; CUBE_FACE_COUNT] =
            config.cubemap_faces.each_ref().map(|name| paths.resolve(name));
        let environment = load_cubemap(&face_paths);

        let water_shader =
            ShaderSource::load_or_built_in(&paths, &config.water_shader, shaders::WATER_SHADER);
        let skybox_shader =
            ShaderSource::load_or_built_in(&paths, &config.skybox_shader, shaders::SKYBOX_SHADER);

        Self {
            normal_maps,
            environment,
            water_shader,
            skybox_shader,
        }
    }
}
