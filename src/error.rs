//! Error types for the analysis pipeline

use thiserror::Error;

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while analysing an uploaded image
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The uploaded bytes could not be decoded into a pixel grid
    #[error("Unable to process the uploaded image: {0}")]
    Decode(String),

    /// The bytes are a recognized image, but not JPEG or PNG
    #[error("Unable to process the uploaded image: unsupported format {0}")]
    UnsupportedFormat(String),

    /// The upload exceeds the configured size limit
    #[error("Uploaded file is {size} bytes, the limit is {limit} bytes")]
    UploadTooLarge { size: usize, limit: usize },

    /// Clustering parameters are out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A preview image could not be encoded
    #[error("PNG encode error: {0}")]
    Encode(String),
}

impl AnalysisError {
    /// True for every failure that means "these bytes are not a usable image".
    pub fn is_decode(&self) -> bool {
        matches!(self, AnalysisError::Decode(_) | AnalysisError::UnsupportedFormat(_))
    }
}

impl From<image::ImageError> for AnalysisError {
    fn from(err: image::ImageError) -> Self {
        AnalysisError::Decode(err.to_string())
    }
}
