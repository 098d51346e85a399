use thiserror::Error;

#[derive(Error, Debug)]
pub enum CpdError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

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

    #[error("Activity source error: {message}")]
    SourceError { message: String },

    #[error("Report generation error: {message}")]
    ReportError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Io,
    Config,
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CpdError {
    /// 錯誤分類，用於日誌與統計
    pub fn category(&self) -> ErrorCategory {
        match self {
            CpdError::ApiError(_) => ErrorCategory::Network,
            CpdError::CsvError(_)
            | CpdError::SerializationError(_)
            | CpdError::SourceError { .. } => ErrorCategory::Data,
            CpdError::IoError(_) => ErrorCategory::Io,
            CpdError::ConfigValidationError { .. }
            | CpdError::InvalidConfigValueError { .. }
            | CpdError::MissingConfigError { .. } => ErrorCategory::Config,
            CpdError::ZipError(_) | CpdError::ReportError { .. } => ErrorCategory::Report,
        }
    }

    /// 錯誤嚴重程度，決定 CLI 的退出碼
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤通常可以重試
            CpdError::ApiError(_) => ErrorSeverity::Medium,
            CpdError::CsvError(_)
            | CpdError::SerializationError(_)
            | CpdError::SourceError { .. } => ErrorSeverity::High,
            CpdError::IoError(_) | CpdError::ZipError(_) => ErrorSeverity::Critical,
            CpdError::ConfigValidationError { .. }
            | CpdError::InvalidConfigValueError { .. }
            | CpdError::MissingConfigError { .. } => ErrorSeverity::High,
            CpdError::ReportError { .. } => ErrorSeverity::High,
        }
    }

    /// 針對每類錯誤給出修復建議
    pub fn recovery_suggestion(&self) -> String {
        match self {
            CpdError::ApiError(_) => {
                "Check the activities endpoint URL and your network connection, then retry"
                    .to_string()
            }
            CpdError::CsvError(_) => {
                "Check that the activities CSV has the expected columns (title, category, points, year, date)"
                    .to_string()
            }
            CpdError::IoError(_) => {
                "Check that the input file exists and the output directory is writable".to_string()
            }
            CpdError::SerializationError(_) => {
                "Check that the activities JSON is a valid array of activity objects".to_string()
            }
            CpdError::ZipError(_) => "Check disk space and output directory permissions".to_string(),
            CpdError::ConfigValidationError { field, .. }
            | CpdError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting in your configuration and retry", field)
            }
            CpdError::MissingConfigError { field } => {
                format!("Provide the '{}' setting via CLI flag or config file", field)
            }
            CpdError::SourceError { .. } => {
                "Check the activity source format against the documented schema".to_string()
            }
            CpdError::ReportError { .. } => {
                "Check the report settings (output path, formats) and retry".to_string()
            }
        }
    }

    /// 給終端用戶看的錯誤訊息（不含內部細節）
    pub fn user_friendly_message(&self) -> String {
        match self {
            CpdError::ApiError(_) => {
                "Could not fetch activities from the remote endpoint".to_string()
            }
            CpdError::CsvError(_) => "The activities CSV file could not be processed".to_string(),
            CpdError::IoError(_) => "A file could not be read or written".to_string(),
            CpdError::SerializationError(_) => {
                "The activities data could not be parsed".to_string()
            }
            CpdError::ZipError(_) => "The report bundle could not be created".to_string(),
            CpdError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            CpdError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => {
                format!("'{}' is not a valid value for '{}': {}", value, field, reason)
            }
            CpdError::MissingConfigError { field } => {
                format!("Required setting '{}' was not provided", field)
            }
            CpdError::SourceError { message } => format!("Activity source problem: {}", message),
            CpdError::ReportError { message } => format!("Report problem: {}", message),
        }
    }
}

pub type Result<T> = std::result::Result<T, CpdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_map_to_config_category() {
        let err = CpdError::MissingConfigError {
            field: "source".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("source"));
    }

    #[test]
    fn test_io_error_is_critical() {
        let err = CpdError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
