use crate::domain::model::Category;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoteError {
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Ballot submission failed: {source}")]
    SubmissionError {
        #[source]
        source: reqwest::Error,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("No room left in {category}: already holding {max} picks")]
    CapacityError { category: Category, max: usize },

    #[error("Incorrect password")]
    AuthError,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, VoteError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Validation,
    Selection,
    Authentication,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl VoteError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            VoteError::NetworkError(_) | VoteError::SubmissionError { .. } => ErrorCategory::Network,
            VoteError::ValidationError { .. } => ErrorCategory::Validation,
            VoteError::CapacityError { .. } => ErrorCategory::Selection,
            VoteError::AuthError => ErrorCategory::Authentication,
            VoteError::ConfigValidationError { .. }
            | VoteError::InvalidConfigValueError { .. }
            | VoteError::MissingConfigError { .. } => ErrorCategory::Configuration,
            VoteError::IoError(_) | VoteError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Selection => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Validation | ErrorCategory::Authentication => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 使用者可以直接重送的錯誤（沒有自動重試）
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Network)
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            VoteError::NetworkError(_) => "Could not reach the catalog service".to_string(),
            VoteError::SubmissionError { .. } => {
                "There was an error submitting your vote. Please try again.".to_string()
            }
            VoteError::ValidationError { message } => message.clone(),
            VoteError::CapacityError { category, max } => {
                format!("You already have {} {} picks", max, category)
            }
            VoteError::AuthError => "Incorrect password. Please try again.".to_string(),
            VoteError::IoError(e) => format!("File access failed: {}", e),
            VoteError::SerializationError(e) => format!("Stored data is unreadable: {}", e),
            VoteError::ConfigValidationError { field, message } => {
                format!("Configuration field '{}' is invalid: {}", field, message)
            }
            VoteError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            VoteError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            VoteError::NetworkError(_) => "Check your network connection and search again",
            VoteError::SubmissionError { .. } => {
                "Resubmit the ballot; a previous attempt may already have been recorded"
            }
            VoteError::ValidationError { .. } => {
                "Enter your name and pick at least one title before submitting"
            }
            VoteError::CapacityError { .. } => "Remove a pick before adding another one",
            VoteError::AuthError => "Ask the organiser for the shared password",
            VoteError::IoError(_) => "Check that the session file location is writable",
            VoteError::SerializationError(_) => "Log out to reset the stored session",
            VoteError::ConfigValidationError { .. }
            | VoteError::InvalidConfigValueError { .. }
            | VoteError::MissingConfigError { .. } => {
                "Fix the configuration file and make sure referenced environment variables are set"
            }
        }
    }
}
