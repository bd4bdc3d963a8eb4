//! Shared types for the waterscape workspace.
//!
//! Everything tunable about the scene lives in [`SceneConfig`]. Defaults match
//! the values the demo was tuned with, so an empty config file is valid.

pub mod config;

pub use config::{
    AssetConfig, CameraConfig, ConfigError, SceneConfig, WaterParams, WindowConfig,
};
