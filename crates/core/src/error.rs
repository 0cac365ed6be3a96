//! Error types for the harness

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Missing required env vars: {0}")]
    MissingEnv(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to create artifact directory {path}: {source}")]
    ArtifactDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {uri} at line {line}: {message}")]
    FeatureParse {
        uri: String,
        line: usize,
        message: String,
    },

    #[error("Invalid step pattern '{pattern}': {message}")]
    StepPattern { pattern: String, message: String },

    #[error("Step argument {index} is missing or not a {expected}")]
    StepArgument { index: usize, expected: &'static str },

    #[error("Step has no data table")]
    MissingDataTable,

    #[error("Data table row has {0} cells, expected 2")]
    DataTableShape(usize),

    #[error("Page is not initialized. Ensure the browser session was provisioned for this scenario")]
    PageNotInitialized,

    #[error("Playwright driver not available: {0}. Install with: npm install playwright && npx playwright install")]
    DriverUnavailable(String),

    #[error("Browser driver error: {0}")]
    Driver(String),

    #[error("Driver protocol error: {0}")]
    Protocol(String),

    #[error("Timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
