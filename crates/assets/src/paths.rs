use std::path::{Path, PathBuf};

/// Maps logical asset names to filesystem paths under an asset root.
#[derive(Debug, Clone)]
pub struct AssetPaths {
    root: PathBuf,
}

impl AssetPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a logical name such as `textures/water_bump1.tga`.
    ///
    /// Names use `/` separators regardless of platform. Absolute names are
    /// returned unchanged.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let name_path = Path::new(name);
        if name_path.is_absolute() {
            return name_path.to_path_buf();
        }
        name.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self::new("assets")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_under_root() {
        let paths = AssetPaths::new("/data/assets");
        assert_eq!(
            paths.resolve("textures/cubemaps/snow_up.tga"),
            Path::new("/data/assets")
                .join("textures")
                .join("cubemaps")
                .join("snow_up.tga")
        );
    }

    #[test]
    fn ignores_empty_segments() {
        let paths = AssetPaths::new("root");
        assert_eq!(
            paths.resolve("shaders//water.wgsl"),
            Path::new("root").join("shaders").join("water.wgsl")
        );
    }

    #[test]
    fn absolute_names_pass_through() {
        let paths = AssetPaths::new("root");
        let abs = std::env::temp_dir().join("x.png");
        let name = abs.to_string_lossy().into_owned();
        assert_eq!(paths.resolve(&name), abs);
    }
}
