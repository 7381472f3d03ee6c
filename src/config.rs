//! Model configuration
//!
//! [`ModelConfig::load()`] reads the `model` section of
//! `config/tidemark.toml` (optional) and `TIDEMARK__MODEL__*` environment
//! variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

const CONFIG_FILE: &str = "config/tidemark.toml";
const ENV_PREFIX: &str = "TIDEMARK";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelConfig {
    /// Suffix naming a table's draft counterpart, e.g. `order` → `order_draft`
    #[serde(default = "default_draft_suffix")]
    pub draft_suffix: String,

    /// When true, DropTable also removes the indexes registered on that table
    #[serde(default)]
    pub cascade_index_drops: bool,
}

fn default_draft_suffix() -> String {
    "_draft".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            draft_suffix: default_draft_suffix(),
            cascade_index_drops: false,
        }
    }
}

impl ModelConfig {
    /// Load the model configuration from `config/tidemark.toml`, falling back to env vars.
    ///
    /// A missing `model` section yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                // An unreadable file is not fatal; retry with the environment only
                log::warn!("Failed to load {}, falling back to env: {}", CONFIG_FILE, err);
                Config::builder()
                    .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                    .build()?
            }
        };

        Self::from_settings(&settings)
    }

    /// Load the model configuration from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder().add_source(File::from(path)).build()?;
        Self::from_settings(&settings)
    }

    fn from_settings(settings: &Config) -> Result<Self, ConfigError> {
        match settings.get::<ModelConfig>("model") {
            Ok(model_config) => Ok(model_config),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "Model configuration could not be loaded: {}",
                e
            ))),
        }
    }
}
