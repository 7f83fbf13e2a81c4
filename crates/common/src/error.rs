//! Error types shared across Decal crates.

use std::path::PathBuf;

/// Top-level error type for Decal operations.
#[derive(Debug, thiserror::Error)]
pub enum DecalError {
    /// An image resource could not be read, reached, or decoded.
    #[error("Decode error ({source_name}): {message}")]
    Decode {
        source_name: String,
        message: String,
    },

    /// The display surface has no usable area (e.g. queried before layout).
    #[error("Invalid geometry: {message}")]
    InvalidGeometry { message: String },

    /// A numeric input was NaN or infinite.
    #[error("Out of range input for {field}: {value}")]
    OutOfRangeInput { field: &'static str, value: f64 },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using DecalError.
pub type DecalResult<T> = Result<T, DecalError>;

impl DecalError {
    pub fn decode(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Decode {
            source_name: source_name.into(),
            message: msg.into(),
        }
    }

    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: msg.into(),
        }
    }

    pub fn out_of_range(field: &'static str, value: f64) -> Self {
        Self::OutOfRangeInput { field, value }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error came from an unreadable image resource.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_message_names_source() {
        let err = DecalError::decode("overlay.png", "unexpected end of file");
        assert!(err.is_decode());
        assert_eq!(
            err.to_string(),
            "Decode error (overlay.png): unexpected end of file"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DecalError = io.into();
        assert!(matches!(err, DecalError::Io(_)));
        assert!(!err.is_decode());
    }
}
