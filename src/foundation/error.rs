/// Convenience result type used across the engine.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Top-level error taxonomy used by fallible engine helpers.
///
/// Editor commands do not surface these: numeric degeneracies and invalid selections
/// degrade to no-ops, and resource failures are logged and reported as events.
#[derive(thiserror::Error, Debug)]
pub enum CanvasError {
    /// Invalid caller-provided data (dimensions, buffers, settings).
    #[error("validation error: {0}")]
    Validation(String),

    /// Raster bytes could not be decoded into a surface.
    #[error("decode error: {0}")]
    Decode(String),

    /// Original source bytes could not be retrieved.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Pixel operation failed (surface size limits, mask rasterization).
    #[error("raster error: {0}")]
    Raster(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CanvasError {
    /// Build a [`CanvasError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CanvasError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`CanvasError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`CanvasError::Raster`] value.
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
