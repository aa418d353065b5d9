//! Camera stream error types.

use thiserror::Error;

use crate::backend::EngineError;

/// Errors that can occur while building or updating the camera stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraStreamError {
    /// The engine handed to the stream is not (or no longer) valid.
    #[error("rendering engine is not initialized")]
    EngineNotInitialized,
    /// The engine rejected a resource request.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type CameraStreamResult<T> = Result<T, CameraStreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CameraStreamError::EngineNotInitialized;
        assert_eq!(err.to_string(), "rendering engine is not initialized");

        let err: CameraStreamError =
            EngineError::TextureCreationFailed("zero size".to_string()).into();
        assert_eq!(err.to_string(), "Failed to create texture: zero size");
    }
}
