use std::path::Path;

use clap::Subcommand;
use habilis_core::QuizConfig;

use super::{config_path, load_config};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "api.base_url", "profiles.0.product")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value (JSON for lists and tables)
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Check that profiles, tie-break order and questions are consistent
    Validate,
    /// Print the config file location
    Path,
}

pub fn run(config: Option<&Path>, action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let cfg = load_config(config)?;
            match cfg.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let path = config_path(config)?;
            let mut cfg = QuizConfig::load_from(&path)?;
            cfg.set(&key, &value)?;
            cfg.save_to(&path)?;
            println!("ok");
        }
        ConfigAction::List => {
            let cfg = load_config(config)?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        ConfigAction::Reset => {
            QuizConfig::default().save_to(&config_path(config)?)?;
            println!("config reset to defaults");
        }
        ConfigAction::Validate => {
            // Loading validates; reaching here means the file is consistent.
            let cfg = load_config(config)?;
            println!(
                "ok: {} profiles, {} questions",
                cfg.profiles.len(),
                cfg.question_bank().len()
            );
        }
        ConfigAction::Path => {
            println!("{}", config_path(config)?.display());
        }
    }
    Ok(())
}
