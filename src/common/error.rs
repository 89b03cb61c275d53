use std::path::PathBuf;

use thiserror::Error;

use crate::generator::Mode;

// Error
//------------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum QrioError {
    // Generator
    #[error("No message to encode")]
    EmptyMessage,
    #[error("Code length overflow")]
    EncodingOverflow,
    #[error("Invalid version {0}")]
    InvalidVersion(i16),
    #[error("Message contains characters not encodable in {0:?} mode")]
    InvalidCharacter(Mode),
    #[error("Unknown text encoding {0:?}")]
    UnknownCharset(String),
    #[error("Failed to render code image: {0}")]
    Render(#[source] image::ImageError),

    // Reader
    #[error("Reader is not open")]
    NotOpen,
    #[error("No detection capability")]
    NoDetectionCapability,
    #[error("Detection capability is still initializing")]
    CapabilityPending,
    #[error("Image not recognized: {0}")]
    ImageLoadFailure(#[source] image::ImageError),
    #[error("Failed to open file: {0}")]
    FileReadFailure(#[from] std::io::Error),
    #[error("Detection failed: {0}")]
    Detection(String),

    // Ambient
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Failed to read configuration {}: {source}", path.display())]
    ConfigRead { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type QrioResult<T> = Result<T, QrioError>;

#[cfg(test)]
mod error_tests {
    use super::QrioError;
    use crate::generator::Mode;

    #[test]
    fn test_display() {
        assert_eq!(QrioError::EmptyMessage.to_string(), "No message to encode");
        assert_eq!(QrioError::EncodingOverflow.to_string(), "Code length overflow");
        assert_eq!(
            QrioError::InvalidCharacter(Mode::Numeric).to_string(),
            "Message contains characters not encodable in Numeric mode"
        );
        assert_eq!(
            QrioError::UnknownCharset("klingon".to_string()).to_string(),
            "Unknown text encoding \"klingon\""
        );
    }
}
