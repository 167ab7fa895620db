//! Application configuration.
//!
//! Configuration is read once at startup and never changes afterwards. Sources,
//! later ones overriding earlier ones:
//!
//! 1. `config.toml` (or the path given on the command line). When the file does
//!    not exist the built-in [`DEFAULT_CONFIG`] is used instead.
//! 2. Environment variables prefixed with `INFOPANEL_`, nested keys separated
//!    by `__` (e.g. `INFOPANEL_PANEL__BACKEND=headless`).
//!
//! The extracted [`Config`] is validated before it is handed to the scheduler,
//! so every later stage can rely on a non-empty widget list, a non-empty panel
//! and intervals between one nanosecond and
//! [`MAX_INTERVAL`](crate::timing::MAX_INTERVAL).

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ConfigError;
use crate::timing::{DEFAULT_SLOT_DURATION, DEFAULT_UPDATE_RATE, interval_from_secs};

/// Configuration used when no configuration file exists.
pub const DEFAULT_CONFIG: &str = r#"
[panel]
backend = "window"

[[scheduler.widgets]]
type = "hafas_timetable"
duration = 20
params = { location = "Ernst-Reuter-Platz", timezone = "Europe/Berlin", lines = ["U2", "245", "M45"] }

[[scheduler.widgets]]
type = "hafas_timetable"
duration = 20
params = { location = "Berlin Zoologischer Garten", timezone = "Europe/Berlin", lines = ["S3", "S5", "S7", "S9"] }
"#;

/// Prefix of environment variable overrides.
const ENV_PREFIX: &str = "INFOPANEL_";

// =============================================================================
// Configuration Structures
// =============================================================================

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub panel: PanelConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// How frames are presented.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// SDL window emulating the LED matrix.
    #[default]
    Window,
    /// No output; frames are only counted.
    Headless,
}

/// Panel geometry and presentation.
#[derive(Deserialize, Debug, Clone)]
pub struct PanelConfig {
    /// Height in pixels.
    #[serde(default = "default_rows")]
    pub rows: u32,

    /// Width in pixels.
    #[serde(default = "default_cols")]
    pub cols: u32,

    #[serde(default)]
    pub backend: Backend,

    /// Window pixels per panel pixel.
    #[serde(default = "default_scale")]
    pub scale: u32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            backend: Backend::default(),
            scale: default_scale(),
        }
    }
}

impl PanelConfig {
    /// Reject panels the simulator cannot open.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::InvalidPanelSize {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if self.scale == 0 {
            return Err(ConfigError::InvalidScale);
        }
        Ok(())
    }
}

const fn default_rows() -> u32 { 64 }

const fn default_cols() -> u32 { 128 }

const fn default_scale() -> u32 { 4 }

#[derive(Deserialize, Debug, Clone)]
pub struct SchedulerConfig {
    /// Seconds between scheduler ticks.
    #[serde(default = "default_update_rate")]
    pub update_rate: f64,

    /// Widgets in rotation order.
    #[serde(default)]
    pub widgets: Vec<WidgetSpec>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            update_rate: default_update_rate(),
            widgets: Vec::new(),
        }
    }
}

fn default_update_rate() -> f64 { DEFAULT_UPDATE_RATE.as_secs_f64() }

impl SchedulerConfig {
    /// Interval between scheduler ticks.
    pub fn update_rate(&self) -> Result<Duration, ConfigError> {
        interval_from_secs(self.update_rate).ok_or(ConfigError::InvalidUpdateRate(self.update_rate))
    }
}

/// One entry of the rotation.
#[derive(Deserialize, Debug, Clone)]
pub struct WidgetSpec {
    /// Registered widget type name.
    #[serde(rename = "type")]
    pub kind: String,

    /// Type-specific parameters.
    #[serde(default)]
    pub params: serde_json::Value,

    /// Seconds on screen. Defaults to ten seconds.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl WidgetSpec {
    pub fn new(
        kind: impl Into<String>,
        params: serde_json::Value,
        duration: Option<f64>,
    ) -> Self {
        Self {
            kind: kind.into(),
            params,
            duration,
        }
    }

    /// Time this widget, at position `index` of the rotation, stays on screen.
    pub fn duration(
        &self,
        index: usize,
    ) -> Result<Duration, ConfigError> {
        let Some(value) = self.duration else {
            return Ok(DEFAULT_SLOT_DURATION);
        };
        interval_from_secs(value).ok_or(ConfigError::InvalidDuration { index, value })
    }

    /// Deserialize the parameters into a widget's parameter type.
    ///
    /// Missing parameters are treated as an empty table so widgets with only
    /// optional parameters can be configured with just a `type`.
    pub fn params<T>(&self) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
    {
        let params = if self.params.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            self.params.clone()
        };
        serde_json::from_value(params).map_err(|source| ConfigError::InvalidParams {
            kind: self.kind.clone(),
            source,
        })
    }
}

// =============================================================================
// Loading and Validation
// =============================================================================

impl Config {
    /// Load configuration from `path` (or the defaults) and the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let base = if path.exists() {
            tracing::info!(path = %path.display(), "Loading configuration file");
            Figment::from(Toml::file(path))
        } else {
            tracing::info!(path = %path.display(), "Configuration file not found, using defaults");
            Figment::from(Toml::string(DEFAULT_CONFIG))
        };

        Self::from_figment(base.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract and validate configuration from an assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the scheduler relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.panel.validate()?;
        self.scheduler.update_rate()?;

        if self.scheduler.widgets.is_empty() {
            return Err(ConfigError::NoWidgets);
        }
        for (index, spec) in self.scheduler.widgets.iter().enumerate() {
            spec.duration(index)?;
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
