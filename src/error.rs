use thiserror::Error;

/// Main error type for the pastefx library
#[derive(Error, Debug)]
pub enum PasteFxError {
    #[error("No input image available: {reason}")]
    NoInputAvailable { reason: String },

    #[error("Required resource not found: {path}")]
    MissingResource { path: String },

    #[error("Invalid argument: {details}")]
    InvalidArgument { details: String },

    #[error("Animated source contains no decodable frames")]
    EmptySequence,

    #[error("Unsupported or undecodable image format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Encoding failed: {reason}")]
    Encode { reason: String },

    #[error("Notification failed: {reason}")]
    Notify { reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using PasteFxError
pub type Result<T> = std::result::Result<T, PasteFxError>;

impl PasteFxError {
    pub fn invalid_argument<S: Into<String>>(details: S) -> Self {
        Self::InvalidArgument {
            details: details.into(),
        }
    }

    pub fn encode<S: Into<String>>(reason: S) -> Self {
        Self::Encode {
            reason: reason.into(),
        }
    }

    /// True when the failure means there was nothing to process at all.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::NoInputAvailable { .. } | Self::EmptySequence)
    }

    /// Get a short user-facing message, suitable for a desktop notification
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::NoInputAvailable { .. } => "No image found on the clipboard".to_string(),
            Self::MissingResource { path } => format!("Cannot find {}", path),
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found", path)
            }
            _ => self.to_string(),
        };
        truncate_chars(&message, 50)
    }
}

impl From<image::ImageError> for PasteFxError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Self::Io(e),
            other => Self::UnsupportedFormat {
                format: other.to_string(),
            },
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
