use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// CI systems only need to distinguish success from failure, but clap
/// reserves 2 for argument errors, so we keep that slot stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Application error (auth, validation, not-found, retries exhausted)
    ApplicationError = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::ApplicationError => write!(f, "Application Error (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
        }
    }
}

/// Application-specific errors for the Interlynk CLI.
///
/// Uses thiserror to derive Display and Error traits automatically,
/// reducing boilerplate while maintaining user-friendly error messages.
#[derive(Debug, Error)]
pub enum LynkError {
    #[error("Security token not found\nPlease set INTERLYNK_SECURITY_TOKEN environment variable or use --token parameter")]
    TokenMissing,

    #[error("Authentication failed. Please check your INTERLYNK_SECURITY_TOKEN")]
    Authentication,

    #[error("{message}")]
    InvalidParameterCombination { message: String },

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("Invalid value for {flag}: {value}. Expected one of: true, false, 1, 0, yes, no")]
    InvalidBooleanFlag { flag: String, value: String },

    #[error("Request failed with status code {status}{}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Client { status: u16, message: Option<String> },

    #[error("Rate limited by the API (status 429)")]
    RateLimited,

    #[error("Server error (status {status})")]
    Server { status: u16 },

    #[error("GraphQL error: {message}")]
    GraphQl { message: String },

    #[error("Connection failure: {details}")]
    Transport { details: String },

    #[error("Failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<LynkError> },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read file: {path}\nDetails: {details}")]
    FileRead { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}")]
    FileWrite { path: PathBuf, details: String },

    #[error("Unexpected API response: {details}")]
    MalformedResponse { details: String },
}
