//! Runtime settings, read from an optional TOML file and then from
//! `POCKETPAL_*` environment variables.

use std::time::Duration;

use anyhow::Result;
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::services::extraction::ExtractionDelays;

pub const DEFAULT_CONFIG_PATH: &str = "pocketpal.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Currency label shown next to amounts.
    pub currency: String,
    pub upload_delay_ms: u64,
    pub camera_delay_ms: u64,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            currency: "SGD".to_string(),
            upload_delay_ms: 1800,
            camera_delay_ms: 2400,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("POCKETPAL").try_parsing(true));
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        if settings.camera_delay_ms < settings.upload_delay_ms {
            tracing::warn!(
                upload = settings.upload_delay_ms,
                camera = settings.camera_delay_ms,
                "Camera delay is shorter than upload delay"
            );
        }
        Ok(settings)
    }

    pub fn delays(&self) -> ExtractionDelays {
        ExtractionDelays {
            upload: Duration::from_millis(self.upload_delay_ms),
            camera: Duration::from_millis(self.camera_delay_ms),
        }
    }
}
