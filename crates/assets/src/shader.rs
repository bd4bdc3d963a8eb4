use crate::{AssetError, AssetPaths};
use std::path::PathBuf;

/// Where a shader's text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderOrigin {
    File(PathBuf),
    BuiltIn,
}

/// Shader text plus a label for diagnostics.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub name: String,
    pub text: String,
    pub origin: ShaderOrigin,
}

impl ShaderSource {
    pub fn built_in(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            text: text.to_string(),
            origin: ShaderOrigin::BuiltIn,
        }
    }

    /// Read a shader from the asset tree. `Ok(None)` when no such file exists.
    pub fn from_assets(paths: &AssetPaths, name: &str) -> Result<Option<Self>, AssetError> {
        let path = paths.resolve(name);
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path).map_err(|source| AssetError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Some(Self {
            name: name.to_string(),
            text,
            origin: ShaderOrigin::File(path),
        }))
    }

    /// Prefer the asset file, fall back to the built-in text.
    pub fn load_or_built_in(paths: &AssetPaths, name: &str, built_in: &str) -> Self {
        match Self::from_assets(paths, name) {
            Ok(Some(source)) => {
                tracing::info!("using shader {name} from {}", paths.root().display());
                source
            }
            Ok(None) => {
                tracing::debug!("shader {name} not in asset tree, using built-in copy");
                Self::built_in(name, built_in)
            }
            Err(e) => {
                tracing::warn!("{e}; using built-in copy of {name}");
                Self::built_in(name, built_in)
            }
        }
    }
}
