use crate::{
    foundation::core::{Point, Rect},
    geometry::{mapper, measure},
    layers::model::Layer,
    raster::clip::ClipPath,
};

/// Free-form polygon accumulated in workspace coordinates.
///
/// Points survive `end` and are only dropped by `clear` or by a new `start`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LassoSelection {
    active: bool,
    points: Vec<Point>,
    bounding_box: Rect,
    dims: measure::SelectionDims,
}

impl LassoSelection {
    /// Reset to a single-point polygon and start accumulating.
    pub fn start(&mut self, point: Point) {
        self.active = true;
        self.points.clear();
        self.points.push(point);
        self.bounding_box = Rect::from_points(point, point);
        self.dims = measure::SelectionDims::default();
    }

    /// Append a point; ignored while inactive. Refreshes the bounding box and its
    /// physical size against `reference`.
    pub fn update(&mut self, point: Point, reference: Option<&Layer>) -> bool {
        if !self.active {
            return false;
        }
        self.points.push(point);
        self.bounding_box = self.bounding_box.union_pt(point);
        self.dims = measure::workspace_extent_physical_size(
            self.bounding_box.width(),
            self.bounding_box.height(),
            reference,
        );
        true
    }

    /// Stop accumulating; points are kept for a later extraction.
    pub fn end(&mut self) {
        self.active = false;
    }

    /// Drop all points.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True while the pointer is drawing.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Accumulated workspace points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Workspace bounds of the accumulated points.
    pub fn bounding_box(&self) -> Rect {
        self.bounding_box
    }

    /// Live size read-out of the bounding box.
    pub fn dims(&self) -> measure::SelectionDims {
        self.dims
    }

    /// Polygon in `layer`'s pixel space; `None` for fewer than three points.
    pub fn clip_path_for(&self, layer: &Layer) -> Option<ClipPath> {
        if self.points.len() < crate::raster::clip::MIN_CLIP_POINTS {
            return None;
        }
        let local: Vec<Point> = self
            .points
            .iter()
            .map(|p| mapper::workspace_to_layer_local(*p, layer))
            .collect();
        ClipPath::from_layer_points(&local)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interact/lasso.rs"]
mod tests;
