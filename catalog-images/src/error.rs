use std::time::Duration;

use catalog_core::CatalogError;
use thiserror::Error;

/// Result type for image operations
pub type ImageResult<T> = Result<T, ImageError>;

/// Errors that can occur while resolving or uploading images
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Invalid image: {message}")]
    Invalid { message: String },

    #[error("Image host is misconfigured: {message}")]
    Config { message: String },

    #[error("{message}")]
    Rejected { message: String },

    #[error("Upload timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("Malformed image host response: {reason}")]
    Malformed { reason: String },

    #[error("Transport error: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },
}

impl ImageError {
    /// Create an invalid input error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a host rejection error
    pub fn rejected<S: Into<String>>(message: S) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed<S: Into<String>>(reason: S) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// True when the caller supplied bad input, as opposed to the host failing
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }
}

impl From<ImageError> for CatalogError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Invalid { message } => CatalogError::validation(message),
            other => CatalogError::upload(format!("Failed to upload image: {other}")).with_source(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::ErrorKind;

    #[test]
    fn invalid_input_maps_to_validation() {
        let err: CatalogError = ImageError::invalid("Image is required").into();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Image is required");
    }

    #[test]
    fn host_failures_map_to_upload() {
        let err: CatalogError = ImageError::rejected("Invalid API v1 key.").into();
        assert_eq!(err.kind, ErrorKind::Upload);
        assert_eq!(err.message, "Failed to upload image: Invalid API v1 key.");

        let err: CatalogError = ImageError::Timeout { after: Duration::from_secs(3) }.into();
        assert_eq!(err.kind, ErrorKind::Upload);
    }
}
