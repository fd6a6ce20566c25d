pub mod catalog;
pub mod config;
pub mod quiz;
pub mod resolve;

use std::path::{Path, PathBuf};

use habilis_core::storage::data_dir;
use habilis_core::QuizConfig;

/// Config file path: `--config` if given, else the default location.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(data_dir()?.join("quiz.toml")),
    }
}

pub fn load_config(explicit: Option<&Path>) -> Result<QuizConfig, Box<dyn std::error::Error>> {
    let path = config_path(explicit)?;
    Ok(QuizConfig::load_from(&path)?)
}
