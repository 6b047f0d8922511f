// Error types for race-replay

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum ReplayError {
    // Errors for the replay API client
    #[snafu(display("Could not create HTTP client"))]
    HttpClientError { source: reqwest::Error },
    #[snafu(display("Request to {url} failed"))]
    RequestError { url: String, source: reqwest::Error },
    // The detail is shown to the user as-is
    #[snafu(display("{detail}"))]
    ServerResponse { status: u16, detail: String },
    #[snafu(display("Invalid response payload from {url}"))]
    InvalidPayload { url: String, source: reqwest::Error },

    // Session file errors
    #[snafu(display("Could not access session file {path}"))]
    SessionFileIo { path: String, source: io::Error },
    #[snafu(display("Invalid session file {path}"))]
    SessionFileFormat {
        path: String,
        source: serde_json::Error,
    },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // User input validation errors
    #[snafu(display("{reason}"))]
    InvalidSelection { reason: String },

    // UI errors
    #[snafu(display("Could not start the replay window: {reason}"))]
    GuiError { reason: String },
}
