//! Pure conversions between screen, workspace and layer-local pixel space.
//!
//! The forward layer transform is fixed as
//! `recentre -> flip -> scale -> rotate -> translate`; everything else here is its
//! algebraic inverse or a view transform.

use crate::{
    foundation::core::{Affine, Point, Rect, Vec2},
    layers::model::Layer,
};

/// `(p - pan) / zoom`. `None` for a zero or non-finite zoom.
pub fn screen_to_workspace(p: Point, pan: Vec2, zoom: f64) -> Option<Point> {
    if zoom == 0.0 || !zoom.is_finite() {
        return None;
    }
    Some(Point::new((p.x - pan.x) / zoom, (p.y - pan.y) / zoom))
}

/// `p * zoom + pan`.
pub fn workspace_to_screen(p: Point, pan: Vec2, zoom: f64) -> Point {
    Point::new(p.x * zoom + pan.x, p.y * zoom + pan.y)
}

fn flip_signs(layer: &Layer) -> (f64, f64) {
    let fx = if layer.adjustments.flip_h { -1.0 } else { 1.0 };
    let fy = if layer.adjustments.flip_v { -1.0 } else { 1.0 };
    (fx, fy)
}

fn half_size(layer: &Layer) -> Vec2 {
    Vec2::new(
        f64::from(layer.metadata.native_width) / 2.0,
        f64::from(layer.metadata.native_height) / 2.0,
    )
}

/// Forward transform from layer-local pixels to workspace units.
pub fn layer_affine(layer: &Layer) -> Affine {
    let p = &layer.placement;
    let (fx, fy) = flip_signs(layer);
    let t_translate = Affine::translate(Vec2::new(p.x, p.y));
    let t_rotate = Affine::rotate(p.rotation);
    let t_scale = Affine::scale_non_uniform(p.scale_x, p.scale_y);
    let t_flip = Affine::scale_non_uniform(fx, fy);
    let t_recentre = Affine::translate(-half_size(layer));

    t_translate * t_rotate * t_scale * t_flip * t_recentre
}

/// Map a layer-local pixel coordinate into workspace space.
pub fn layer_local_to_workspace(q: Point, layer: &Layer) -> Point {
    layer_affine(layer) * q
}

/// Map a workspace point into layer-local pixel space (inverse of
/// [`layer_local_to_workspace`]).
pub fn workspace_to_layer_local(p: Point, layer: &Layer) -> Point {
    let pl = &layer.placement;
    let (fx, fy) = flip_signs(layer);

    let dx = p.x - pl.x;
    let dy = p.y - pl.y;

    let (sin, cos) = (-pl.rotation).sin_cos();
    let rx = dx * cos - dy * sin;
    let ry = dx * sin + dy * cos;

    let ux = rx / pl.scale_x * fx;
    let uy = ry / pl.scale_y * fy;

    let half = half_size(layer);
    Point::new(ux + half.x, uy + half.y)
}

/// Axis-aligned workspace bounds of the transformed raster.
///
/// `None` while the layer has no native size.
pub fn layer_workspace_bounds(layer: &Layer) -> Option<Rect> {
    if !layer.metadata.is_measurable() {
        return None;
    }
    let local = Rect::new(
        0.0,
        0.0,
        f64::from(layer.metadata.native_width),
        f64::from(layer.metadata.native_height),
    );
    Some(layer_affine(layer).transform_rect_bbox(local))
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/mapper.rs"]
mod tests;
