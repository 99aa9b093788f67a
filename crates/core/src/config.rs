use serde::Deserialize;
use std::path::Path;

use crate::error::{DataLayerError, DataLayerResult};

/// Root configuration. Loaded from environment variables with the prefix
/// `EDDL__` and, optionally, a TOML/JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data_layer: DataLayerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataLayerConfig {
    /// Global name of the intercepted queue.
    #[serde(default = "default_name")]
    pub name: String,
    /// Namespace tag prepended to every tracking call name.
    #[serde(default = "default_event_prefix")]
    pub event_prefix: String,
    /// `linkName` used for `Other` entries that do not carry one.
    #[serde(default = "default_unknown_link_name")]
    pub unknown_link_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

// Default functions
fn default_name() -> String {
    "NCIDataLayer".to_string()
}
fn default_event_prefix() -> String {
    "EDDL:".to_string()
}
fn default_unknown_link_name() -> String {
    "UnknownLinkName".to_string()
}
fn default_filter() -> String {
    "eddl_data_layer=debug,eddl_replay=info".to_string()
}

impl Default for DataLayerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            event_prefix: default_event_prefix(),
            unknown_link_name: default_unknown_link_name(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl DataLayerConfig {
    pub fn validate(&self) -> DataLayerResult<()> {
        if self.name.is_empty() {
            return Err(DataLayerError::Config(
                "data_layer.name must not be empty".into(),
            ));
        }
        if self.unknown_link_name.is_empty() {
            return Err(DataLayerError::Config(
                "data_layer.unknown_link_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> DataLayerResult<Self> {
        Self::build(None)
    }

    /// Load configuration from a file, with environment variables layered on top.
    pub fn load_from(path: impl AsRef<Path>) -> DataLayerResult<Self> {
        Self::build(Some(path.as_ref()))
    }

    fn build(path: Option<&Path>) -> DataLayerResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("EDDL")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.data_layer.validate()?;
        Ok(config)
    }
}
