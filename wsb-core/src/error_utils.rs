use crate::error::*;
use crate::types::RunWarning;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl CoreError {
    /// Process exit status for a run that aborted with this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CoreError::RedditApi(_) | CoreError::Network(_) => 2,
            CoreError::Export(_) | CoreError::Io(_) => 3,
            CoreError::Config(_) => 4,
            CoreError::InvalidInput { .. } | CoreError::Sentiment(_) => 5,
            CoreError::Serialization(_) | CoreError::Internal { .. } => 1,
        }
    }
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        match self {
            CoreError::RedditApi(e) => {
                e.log_error();
            }
            CoreError::Export(e) => {
                e.log_error();
            }
            CoreError::Sentiment(e) => {
                e.log_error();
            }
            CoreError::Config(e) => {
                e.log_error();
            }
            _ => {
                error!("CoreError: {}", self);
            }
        }
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Export(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Sentiment(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::Io(e) => format!("File system error: {}", e),
            CoreError::InvalidInput { message } => format!("Invalid input: {}", message),
            _ => "An unexpected error occurred.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API".to_string(),
            CoreError::Export(_) => "EXPORT".to_string(),
            CoreError::Sentiment(_) => "SENTIMENT".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => {
                "Reddit authentication failed. Please check your credentials.".to_string()
            }
            RedditApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Reddit asked to wait {} seconds.",
                retry_after
            ),
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. You may not have permission to view this content.",
                resource
            ),
            RedditApiError::SubredditNotFound { subreddit } => {
                format!("Subreddit '{}' not found or is private.", subreddit)
            }
            RedditApiError::PostNotFound { .. } => {
                "The requested post could not be found.".to_string()
            }
            RedditApiError::InvalidToken => {
                "Reddit authentication token is invalid. Please check your credentials."
                    .to_string()
            }
            _ => "Reddit API error occurred.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED".to_string(),
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::SubredditNotFound { .. } => "REDDIT_SUBREDDIT_NOT_FOUND".to_string(),
            RedditApiError::PostNotFound { .. } => "REDDIT_POST_NOT_FOUND".to_string(),
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
        }
    }
}

impl ErrorExt for ExportError {
    fn log_error(&self) -> &Self {
        error!("ExportError: {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ExportError::WriteFailed { path, .. } => {
                format!("Could not write report file '{}'.", path)
            }
            ExportError::ReadFailed { path, .. } => {
                format!("Could not read report file '{}'.", path)
            }
            ExportError::DirectoryNotWritable { path } => format!(
                "Output directory '{}' is not writable. Please check permissions.",
                path
            ),
            ExportError::RenderFailed { .. } => "Could not draw the charts.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ExportError::WriteFailed { .. } => "EXPORT_WRITE_FAILED".to_string(),
            ExportError::ReadFailed { .. } => "EXPORT_READ_FAILED".to_string(),
            ExportError::DirectoryNotWritable { .. } => "EXPORT_DIR_NOT_WRITABLE".to_string(),
            ExportError::RenderFailed { .. } => "EXPORT_RENDER_FAILED".to_string(),
        }
    }
}

impl ErrorExt for SentimentError {
    fn log_error(&self) -> &Self {
        error!("SentimentError: {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            SentimentError::InvalidLexiconEntry { line, .. } => {
                format!("Sentiment lexicon is malformed at line {}.", line)
            }
            SentimentError::InvalidLabel { row, value } => format!(
                "Row {} has sentiment label '{}'; expected a number from -1 to 1.",
                row, value
            ),
        }
    }

    fn error_code(&self) -> String {
        match self {
            SentimentError::InvalidLexiconEntry { .. } => "SENTIMENT_INVALID_LEXICON".to_string(),
            SentimentError::InvalidLabel { .. } => "SENTIMENT_INVALID_LABEL".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::MissingEnvironmentVariable { var_name } => format!(
                "Environment variable '{}' is required but not set.",
                var_name
            ),
            ConfigError::Parse(_) => {
                "Configuration file format is invalid. Please check the settings.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_ENV_VAR".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("User message: {}", error.user_friendly_message());
        info!("Exit code: {}", error.exit_code());
    }

    pub fn report_warning(&self, warning: &RunWarning) {
        warn!("{}", warning);
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
