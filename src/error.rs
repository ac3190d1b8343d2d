//! Error types for the beat analysis engine

use std::fmt;

/// Errors that can occur during beat analysis
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Invalid input parameters (empty buffer, zero sample rate, bad config)
    InvalidInput(String),

    /// Audio decoding error (adapter layer only)
    DecodingError(String),

    /// A stage received data it cannot work with
    ProcessingError(String),

    /// Numerical error (non-finite values, degenerate signal)
    NumericalError(String),
}

/// Coarse error category, used by callers to map failures onto their transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied something unusable
    InvalidInput,
    /// An internal stage could not produce a finite result
    Analysis,
    /// The audio container/codec could not be decoded
    Decoding,
}

impl AnalysisError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::InvalidInput(_) => ErrorKind::InvalidInput,
            AnalysisError::DecodingError(_) => ErrorKind::Decoding,
            AnalysisError::ProcessingError(_) | AnalysisError::NumericalError(_) => {
                ErrorKind::Analysis
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            AnalysisError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
            AnalysisError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}

#[cfg(feature = "decode")]
impl From<symphonia::core::errors::Error> for AnalysisError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        AnalysisError::DecodingError(err.to_string())
    }
}

impl From<rubato::ResamplerConstructionError> for AnalysisError {
    fn from(err: rubato::ResamplerConstructionError) -> Self {
        AnalysisError::InvalidInput(format!("Resampler setup failed: {}", err))
    }
}

impl From<rubato::ResampleError> for AnalysisError {
    fn from(err: rubato::ResampleError) -> Self {
        AnalysisError::ProcessingError(format!("Resampling failed: {}", err))
    }
}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::DecodingError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            AnalysisError::InvalidInput("x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            AnalysisError::NumericalError("x".into()).kind(),
            ErrorKind::Analysis
        );
        assert_eq!(
            AnalysisError::ProcessingError("x".into()).kind(),
            ErrorKind::Analysis
        );
        assert_eq!(
            AnalysisError::DecodingError("x".into()).kind(),
            ErrorKind::Decoding
        );
    }

    #[test]
    fn test_error_display() {
        let err = AnalysisError::InvalidInput("Empty audio samples".to_string());
        assert_eq!(err.to_string(), "Invalid input: Empty audio samples");
    }
}
