//! Bounding-box manipulation: one session drives one layer's scale or rotation.

use std::str::FromStr;

use crate::{
    foundation::core::{LayerId, Point, Vec2},
    foundation::error::CanvasError,
    layers::model::{LayerPatch, Placement},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Which scale axes a resize handle drives.
pub enum ResizeAxis {
    /// Corner handle: both axes by the same factor.
    #[default]
    Uniform,
    /// Left/right edge handle.
    Horizontal,
    /// Top/bottom edge handle.
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Handle grabbed to start a session.
pub enum HandleKind {
    /// Rotation knob.
    Rotate,
    /// Resize handle.
    Resize(ResizeAxis),
}

impl FromStr for HandleKind {
    type Err = CanvasError;

    /// Parses `rotate`, `resize`, corner handles (`resize-se`) and edge handles
    /// (`resize-e`, `resize-n`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "rotate" {
            return Ok(Self::Rotate);
        }
        let unknown = || CanvasError::validation(format!("unknown handle '{s}'"));
        let Some(rest) = s.strip_prefix("resize") else {
            return Err(unknown());
        };
        let axis = match rest {
            "" => ResizeAxis::Uniform,
            r => match r.strip_prefix('-').ok_or_else(unknown)? {
                "e" | "w" => ResizeAxis::Horizontal,
                "n" | "s" => ResizeAxis::Vertical,
                "ne" | "nw" | "se" | "sw" => ResizeAxis::Uniform,
                _ => return Err(unknown()),
            },
        };
        Ok(Self::Resize(axis))
    }
}

/// Snapshot taken when a handle is grabbed.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformSession {
    layer_id: LayerId,
    handle: HandleKind,
    start_mouse: Point,
    layer_center: Point,
    initial_scale_x: f64,
    initial_scale_y: f64,
    initial_rotation: f64,
    initial_distance: f64,
    initial_angle: f64,
    initial_local: Vec2,
    min_scale: f64,
}

impl TransformSession {
    /// Start a session on `layer_id` from its current `placement`.
    ///
    /// `start_mouse` and `layer_center` share one coordinate space (workspace).
    pub fn start(
        layer_id: LayerId,
        handle: HandleKind,
        start_mouse: Point,
        layer_center: Point,
        placement: &Placement,
        min_scale: f64,
    ) -> Self {
        let offset = start_mouse - layer_center;
        Self {
            layer_id,
            handle,
            start_mouse,
            layer_center,
            initial_scale_x: placement.scale_x,
            initial_scale_y: placement.scale_y,
            initial_rotation: placement.rotation,
            initial_distance: offset.hypot(),
            initial_angle: offset.y.atan2(offset.x),
            initial_local: unrotate(offset, placement.rotation),
            min_scale,
        }
    }

    /// Target layer.
    pub fn layer_id(&self) -> LayerId {
        self.layer_id
    }

    /// Grabbed handle.
    pub fn handle(&self) -> HandleKind {
        self.handle
    }

    /// Pointer position at session start.
    pub fn start_mouse(&self) -> Point {
        self.start_mouse
    }

    /// Pivot of the session.
    pub fn layer_center(&self) -> Point {
        self.layer_center
    }

    /// Pointer distance from the pivot at session start.
    pub fn initial_distance(&self) -> f64 {
        self.initial_distance
    }

    /// Properties to commit for the pointer at `current_mouse`.
    ///
    /// `None` when the update is degenerate (zero initial distance or axis extent).
    pub fn update(&self, current_mouse: Point) -> Option<LayerPatch> {
        let offset = current_mouse - self.layer_center;
        match self.handle {
            HandleKind::Rotate => {
                let angle = offset.y.atan2(offset.x);
                Some(LayerPatch::rotation(
                    self.initial_rotation + (angle - self.initial_angle),
                ))
            }
            HandleKind::Resize(ResizeAxis::Uniform) => {
                if self.initial_distance == 0.0 {
                    return None;
                }
                let factor = offset.hypot() / self.initial_distance;
                Some(LayerPatch {
                    scale_x: Some(self.scaled(self.initial_scale_x, factor)),
                    scale_y: Some(self.scaled(self.initial_scale_y, factor)),
                    ..LayerPatch::default()
                })
            }
            HandleKind::Resize(ResizeAxis::Horizontal) => {
                if self.initial_local.x == 0.0 {
                    return None;
                }
                let local = unrotate(offset, self.initial_rotation);
                let factor = local.x.abs() / self.initial_local.x.abs();
                Some(LayerPatch {
                    scale_x: Some(self.scaled(self.initial_scale_x, factor)),
                    ..LayerPatch::default()
                })
            }
            HandleKind::Resize(ResizeAxis::Vertical) => {
                if self.initial_local.y == 0.0 {
                    return None;
                }
                let local = unrotate(offset, self.initial_rotation);
                let factor = local.y.abs() / self.initial_local.y.abs();
                Some(LayerPatch {
                    scale_y: Some(self.scaled(self.initial_scale_y, factor)),
                    ..LayerPatch::default()
                })
            }
        }
    }

    fn scaled(&self, initial: f64, factor: f64) -> f64 {
        (initial * factor).max(self.min_scale)
    }
}

/// Express a workspace offset in the layer's unrotated frame.
fn unrotate(v: Vec2, rotation: f64) -> Vec2 {
    let (sin, cos) = (-rotation).sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[cfg(test)]
#[path = "../../tests/unit/interact/transform.rs"]
mod tests;
