use crate::{
    foundation::core::{Point, Rect},
    geometry::measure::{self, SelectionDims},
    layers::model::Layer,
};

/// Axis-aligned measuring rectangle in screen coordinates.
///
/// Extents and the physical read-out stay frozen after `end`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RectSelection {
    active: bool,
    start: Point,
    end: Point,
    dims: SelectionDims,
}

impl RectSelection {
    /// Anchor a zero-size rectangle at `mouse`.
    pub fn start(&mut self, mouse: Point) {
        *self = Self {
            active: true,
            start: mouse,
            end: mouse,
            dims: SelectionDims::default(),
        };
    }

    /// Move the free corner; ignored while inactive.
    ///
    /// `view_scale` converts screen pixels to workspace pixels. A zero scale keeps the
    /// previous physical read-out.
    pub fn update(&mut self, mouse: Point, view_scale: f64, reference: Option<&Layer>) -> bool {
        if !self.active {
            return false;
        }
        self.end = mouse;
        let (w, h) = (self.width(), self.height());
        if let Some(dims) = measure::compute_selection_physical_size(w, h, view_scale, reference) {
            self.dims = dims;
        }
        true
    }

    /// Stop tracking the pointer.
    pub fn end(&mut self) {
        self.active = false;
    }

    /// True while the pointer is dragging.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Anchor corner.
    pub fn start_point(&self) -> Point {
        self.start
    }

    /// Free corner.
    pub fn end_point(&self) -> Point {
        self.end
    }

    /// Absolute horizontal extent in screen pixels.
    pub fn width(&self) -> f64 {
        (self.end.x - self.start.x).abs()
    }

    /// Absolute vertical extent in screen pixels.
    pub fn height(&self) -> f64 {
        (self.end.y - self.start.y).abs()
    }

    /// Normalized screen rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    /// Last physical read-out.
    pub fn dims(&self) -> SelectionDims {
        self.dims
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interact/rect_select.rs"]
mod tests;
