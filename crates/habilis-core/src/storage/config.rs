//! TOML-based quiz configuration.
//!
//! Stores:
//! - Backend API location
//! - Tie-break priority between profiles
//! - Profiles with their display text and recommended product
//! - An optional custom question bank
//!
//! Configuration is stored at `~/.config/habilis/quiz.toml` and validated on
//! every load, so an incomplete profile mapping is caught at startup rather
//! than when a quiz finishes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::catalog::{Product, StaticCatalog};
use crate::error::ConfigError;
use crate::profile::{ProductRef, ProfileLabel, ProfileMapping, ProfileResolver, TieBreakPriority};
use crate::quiz::QuestionBank;
use crate::wizard::Wizard;

/// Backend API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Cookie sent with account lookups, e.g. `JSESSIONID=...`.
    #[serde(default)]
    pub session_cookie: Option<String>,
}

/// A profile as presented on the result screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub label: ProfileLabel,
    pub display_name: String,
    pub headline: String,
    /// Catalog id of the recommended kit.
    pub product: ProductRef,
    /// Kit name and price used when running without the backend.
    pub kit_name: String,
    pub monthly_price: f64,
}

/// Quiz configuration.
///
/// Serialized to/from TOML at `~/.config/habilis/quiz.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default = "default_tie_break")]
    pub tie_break: TieBreakPriority,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default = "default_profiles")]
    pub profiles: Vec<ProfileInfo>,
    /// Custom question bank; the built-in one is used when absent.
    #[serde(default)]
    pub questions: Option<QuestionBank>,
}

fn default_base_url() -> String {
    "http://localhost:8080".into()
}

fn default_tie_break() -> TieBreakPriority {
    TieBreakPriority::new(["logical", "explorer", "artistic", "motor"])
}

fn default_profiles() -> Vec<ProfileInfo> {
    fn info(
        label: &str,
        display_name: &str,
        headline: &str,
        product: u64,
        kit: &str,
        price: f64,
    ) -> ProfileInfo {
        ProfileInfo {
            label: label.into(),
            display_name: display_name.to_string(),
            headline: headline.to_string(),
            product: ProductRef(product),
            kit_name: kit.to_string(),
            monthly_price: price,
        }
    }

    vec![
        info(
            "logical",
            "Logical-Mathematical",
            "{child} enjoys building, sorting and working out how things work.",
            4,
            "Inventor Kit: Solar Robot",
            29.90,
        ),
        info(
            "artistic",
            "Visual-Spatial",
            "{child} shows real artistic creativity and a keen eye.",
            1,
            "Explorer Kit: My First Garden",
            24.90,
        ),
        info(
            "motor",
            "Bodily-Kinesthetic",
            "{child} learns best through movement and action.",
            7,
            "Maker Kit: Robotic Arm",
            34.90,
        ),
        info(
            "explorer",
            "Naturalist",
            "{child} is a natural explorer, curious about the world outside.",
            2,
            "Explorer Kit: Paper Animals",
            24.90,
        ),
    ]
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            session_cookie: None,
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            tie_break: default_tie_break(),
            api: ApiConfig::default(),
            profiles: default_profiles(),
            questions: None,
        }
    }
}

impl QuizConfig {
    fn child<'a>(value: &'a serde_json::Value, part: &str) -> Option<&'a serde_json::Value> {
        match value {
            serde_json::Value::Array(items) => items.get(part.parse::<usize>().ok()?),
            other => other.get(part),
        }
    }

    fn child_mut<'a>(
        value: &'a mut serde_json::Value,
        part: &str,
    ) -> Option<&'a mut serde_json::Value> {
        match value {
            serde_json::Value::Array(items) => items.get_mut(part.parse::<usize>().ok()?),
            other => other.get_mut(part),
        }
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = Self::child(current, part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".to_string(),
        };
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        for part in key.split('.') {
            current = Self::child_mut(current, part).ok_or_else(unknown)?;
        }

        let new_value = match current {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => {
                if let Ok(n) = value.parse::<u64>() {
                    serde_json::Value::Number(n.into())
                } else {
                    value
                        .parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                }
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            // Unset optional tables such as `questions` take JSON; unset
            // scalars such as `api.session_cookie` take the raw string.
            serde_json::Value::Null => match serde_json::from_str(value) {
                Ok(parsed @ (serde_json::Value::Object(_) | serde_json::Value::Array(_))) => parsed,
                _ => serde_json::Value::String(value.into()),
            },
            _ => serde_json::Value::String(value.into()),
        };

        *current = new_value;
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("quiz.toml"))
    }

    /// Load from the default location, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed or fails
    /// validation, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if it does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: QuizConfig =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                tracing::debug!(path = %path.display(), "loaded quiz config");
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                tracing::info!(path = %path.display(), "wrote default quiz config");
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    ///
    /// Array elements are addressed by index, e.g. `profiles.0.product`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. The result must still validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed, or
    /// the updated configuration is inconsistent. `self` is left untouched on
    /// error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: QuizConfig =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn mapping(&self) -> Result<ProfileMapping, ConfigError> {
        let mut mapping = ProfileMapping::new();
        for profile in &self.profiles {
            if mapping.insert(profile.label.clone(), profile.product).is_some() {
                return Err(ConfigError::InvalidValue {
                    key: "profiles".to_string(),
                    message: format!("profile '{}' is defined twice", profile.label),
                });
            }
        }
        Ok(mapping)
    }

    /// Build the validated resolver from the tie-break order and profiles.
    pub fn resolver(&self) -> Result<ProfileResolver, ConfigError> {
        ProfileResolver::new(self.tie_break.clone(), self.mapping()?)
    }

    pub fn question_bank(&self) -> QuestionBank {
        self.questions.clone().unwrap_or_default()
    }

    pub fn wizard(&self) -> Result<Wizard, ConfigError> {
        Wizard::new(self.question_bank(), self.resolver()?)
    }

    /// Full consistency check: profiles, priority and question bank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.wizard().map(|_| ())
    }

    pub fn profile(&self, label: &ProfileLabel) -> Option<&ProfileInfo> {
        self.profiles.iter().find(|p| &p.label == label)
    }

    /// Catalog built from the configured kit names and prices.
    pub fn offline_catalog(&self) -> StaticCatalog {
        let mut seen = BTreeSet::new();
        let products: Vec<Product> = self
            .profiles
            .iter()
            .filter(|p| seen.insert(p.product))
            .map(|p| Product {
                id: p.product.0,
                name: p.kit_name.clone(),
                description: Some(p.headline.clone()),
                price: p.monthly_price,
            })
            .collect();
        StaticCatalog::new(products)
    }
}
