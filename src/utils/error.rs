use thiserror::Error;

#[derive(Error, Debug)]
pub enum FunctionsError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

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

    #[error("Relation '{rel}' is not advertised by {url}")]
    RelationNotFound { rel: String, url: String },

    #[error("Service responded {status} for {url}: {message}")]
    HttpStatus {
        status: u16,
        url: String,
        message: String,
    },

    #[error("Invalid schema at {url}: {message}")]
    SchemaError { url: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Service,
    Configuration,
    Protocol,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FunctionsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FunctionsError::HttpError(_) => ErrorCategory::Network,
            FunctionsError::HttpStatus { .. } => ErrorCategory::Service,
            FunctionsError::ConfigError { .. }
            | FunctionsError::ConfigValidationError { .. }
            | FunctionsError::InvalidConfigValueError { .. }
            | FunctionsError::MissingConfigError { .. } => ErrorCategory::Configuration,
            FunctionsError::RelationNotFound { .. }
            | FunctionsError::SchemaError { .. }
            | FunctionsError::SerializationError(_)
            | FunctionsError::UrlError(_) => ErrorCategory::Protocol,
            FunctionsError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FunctionsError::HttpError(_) => ErrorSeverity::Medium,
            FunctionsError::HttpStatus { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            FunctionsError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 是否值得重試（連線錯誤或 5xx）
    pub fn is_retryable(&self) -> bool {
        match self {
            FunctionsError::HttpError(e) => !e.is_builder() && !e.is_decode(),
            FunctionsError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            FunctionsError::HttpError(_) => {
                "Check that the functions service is running and reachable".to_string()
            }
            FunctionsError::HttpStatus { status, .. } if *status >= 500 => {
                "The service failed internally; retry later or inspect its logs".to_string()
            }
            FunctionsError::HttpStatus { status: 404, .. } => {
                "Verify the namespace and id of the function".to_string()
            }
            FunctionsError::HttpStatus { .. } => {
                "Check the submitted code and arguments; the service rejected them".to_string()
            }
            FunctionsError::RelationNotFound { rel, .. } => format!(
                "The resource does not advertise '{}'; check the relation names in your configuration",
                rel
            ),
            FunctionsError::SchemaError { .. } => {
                "The service returned a schema this client cannot read".to_string()
            }
            FunctionsError::ConfigError { .. }
            | FunctionsError::ConfigValidationError { .. }
            | FunctionsError::InvalidConfigValueError { .. }
            | FunctionsError::MissingConfigError { .. } => {
                "Fix the command line arguments or the scenario file".to_string()
            }
            FunctionsError::UrlError(_) => "Use an absolute http(s) URL".to_string(),
            FunctionsError::SerializationError(_) => {
                "Make sure JSON arguments and bodies are well formed".to_string()
            }
            FunctionsError::IoError(_) => "Check file paths and permissions".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FunctionsError::HttpError(_) => "Could not reach the functions service".to_string(),
            FunctionsError::HttpStatus {
                status, message, ..
            } => format!("Functions service error ({}): {}", status, message),
            FunctionsError::RelationNotFound { rel, .. } => {
                format!("Link '{}' is not available on this resource", rel)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FunctionsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_classification() {
        let server_error = FunctionsError::HttpStatus {
            status: 503,
            url: "http://localhost/functions".to_string(),
            message: "unavailable".to_string(),
        };
        assert!(server_error.is_retryable());
        assert_eq!(server_error.severity(), ErrorSeverity::Medium);
        assert_eq!(server_error.category(), ErrorCategory::Service);

        let client_error = FunctionsError::HttpStatus {
            status: 400,
            url: "http://localhost/functions".to_string(),
            message: "SyntaxError".to_string(),
        };
        assert!(!client_error.is_retryable());
        assert_eq!(client_error.severity(), ErrorSeverity::High);
        assert!(client_error.user_friendly_message().contains("SyntaxError"));
    }

    #[test]
    fn test_relation_not_found_suggestion() {
        let err = FunctionsError::RelationNotFound {
            rel: "runDefine".to_string(),
            url: "http://localhost/".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Protocol);
        assert!(!err.is_retryable());
        assert!(err.recovery_suggestion().contains("runDefine"));
    }
}
