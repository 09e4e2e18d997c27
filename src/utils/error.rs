use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeetError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Upstream service '{service}' unavailable: {message}")]
    UpstreamUnavailable { service: String, message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Event not found: {id}")]
    EventNotFound { id: String },

    #[error("Event '{id}' cannot be updated: {message}")]
    EventStateError { id: String, message: String },
}

pub type Result<T> = std::result::Result<T, MeetError>;

/// 錯誤分類，用於日誌與退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Upstream,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl MeetError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::Input,
            Self::UpstreamUnavailable { .. } | Self::ApiError(_) => ErrorCategory::Upstream,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::EventNotFound { .. }
            | Self::EventStateError { .. } => ErrorCategory::Data,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration | ErrorCategory::Data => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 上游錯誤可以重試，其他錯誤重試無意義
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Upstream)
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => {
                "Check that every participant is given as 'lat,lng' with lat in [-90, 90] and lng in [-180, 180]"
            }
            Self::UpstreamUnavailable { .. } | Self::ApiError(_) => {
                "Check the service endpoints in the config file and that the services are reachable"
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the configuration value and run again",
            Self::EventNotFound { .. } => "Create the event first or check the event id",
            Self::EventStateError { .. } => "Finalized events cannot be changed; create a new event",
            Self::CsvError(_) | Self::SerializationError(_) => {
                "Check the format of the input files"
            }
            Self::IoError(_) => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidInput { message } => format!("Invalid input: {}", message),
            Self::UpstreamUnavailable { service, .. } => {
                format!("The {} service could not be reached", service)
            }
            Self::ApiError(_) => "A network request failed".to_string(),
            Self::MissingConfigError { field } => {
                format!("Missing configuration value: {}", field)
            }
            other => other.to_string(),
        }
    }
}
