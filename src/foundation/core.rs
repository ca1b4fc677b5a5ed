use crate::foundation::error::{CanvasError, CanvasResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Stable identifier of a layer, assigned once at creation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LayerId(pub uuid::Uuid);

impl LayerId {
    /// Generate a fresh random id.
    pub fn new_v4() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Logical document size in workspace units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DocumentSize {
    /// Width in workspace units.
    pub width: f64,
    /// Height in workspace units.
    pub height: f64,
}

impl DocumentSize {
    /// Centre point of the document.
    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Pixel size of the pointer container reported by the viewport collaborator.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewportSize {
    /// Client width in screen pixels.
    pub width: f64,
    /// Client height in screen pixels.
    pub height: f64,
}

impl ViewportSize {
    /// Build a viewport size, rejecting negative or non-finite extents.
    pub fn new(width: f64, height: f64) -> CanvasResult<Self> {
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(CanvasError::validation(
                "viewport size must be finite and >= 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// True when either side is zero, i.e. nothing can be framed into it.
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
