//! Error types, one enum per concern.
//!
//! | Error             | Raised by                        | Handling                          |
//! |-------------------|----------------------------------|-----------------------------------|
//! | [`ConfigError`]   | config loading, widget registry  | fatal before anything is drawn    |
//! | [`WidgetError`]   | widget setup, activity lifecycle | fatal at startup                  |
//! | [`FetchError`]    | data sources                     | logged inside the activity        |
//! | [`RenderError`]   | `Widget::render`                 | shuts the scheduler down, then propagates |
//! | [`SchedulerError`]| `Scheduler::run`                 | reported by `main`, exit code 1   |

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("no widgets configured")]
    NoWidgets,
    #[error("unknown widget type: {0}")]
    UnknownWidgetType(String),
    #[error("invalid parameters for widget type '{kind}': {source}")]
    InvalidParams {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("widget #{index} duration must be positive and at most one week, got {value}s")]
    InvalidDuration { index: usize, value: f64 },
    #[error("update rate must be positive and at most one week, got {0}s")]
    InvalidUpdateRate(f64),
    #[error("refresh interval must be positive and at most one week, got {0}s")]
    InvalidRefresh(f64),
    #[error("panel size must be at least 1x1, got {cols}x{rows}")]
    InvalidPanelSize { cols: u32, rows: u32 },
    #[error("window scale must be at least 1")]
    InvalidScale,
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("unknown font '{0}', use one of: regular, bold")]
    UnknownFont(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self { Self::Load(Box::new(err)) }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("service error {code}: {message}")]
    Service { code: String, message: String },
    #[error("failed to parse response JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("background activities cannot be registered while the widget is running")]
    AlreadyRunning,
    #[error("failed to spawn background activity: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("location '{0}' not found")]
    LocationNotFound(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render failed: {0}")]
    Failed(String),
}

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("setup of widget #{index} ({kind}) failed: {source}")]
    Setup {
        index: usize,
        kind: String,
        #[source]
        source: WidgetError,
    },
    #[error("widget #{index} ({kind}) failed to start: {source}")]
    Start {
        index: usize,
        kind: String,
        #[source]
        source: WidgetError,
    },
    #[error("widget #{index} ({kind}) failed to render: {source}")]
    Render {
        index: usize,
        kind: String,
        #[source]
        source: RenderError,
    },
}
