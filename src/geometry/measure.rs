//! Pixel <-> physical unit conversion against a reference layer's DPI.

use crate::{
    foundation::core::{DocumentSize, Point},
    foundation::settings::DEFAULT_DPI,
    layers::model::Layer,
};

/// Centimetres per inch.
pub const CM_PER_INCH: f64 = 2.54;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Unit shown on rulers and selection read-outs.
pub enum RulerUnit {
    /// Workspace pixels.
    Px,
    /// Centimetres.
    #[default]
    Cm,
    /// Millimetres.
    Mm,
    /// Inches.
    In,
}

impl RulerUnit {
    /// Physical units per inch; `None` for pixels.
    pub fn units_per_inch(self) -> Option<f64> {
        match self {
            Self::Px => None,
            Self::Cm => Some(CM_PER_INCH),
            Self::Mm => Some(CM_PER_INCH * 10.0),
            Self::In => Some(1.0),
        }
    }
}

/// `px / dpi * units_per_inch`; 0 for a zero or non-finite DPI.
pub fn pixels_to_physical(px: f64, dpi: f64, units_per_inch: f64) -> f64 {
    if dpi == 0.0 || !dpi.is_finite() {
        return 0.0;
    }
    px / dpi * units_per_inch
}

/// Inverse of [`pixels_to_physical`]; 0 for a zero unit factor.
pub fn physical_to_pixels(value: f64, dpi: f64, units_per_inch: f64) -> f64 {
    if units_per_inch == 0.0 || !units_per_inch.is_finite() {
        return 0.0;
    }
    value / units_per_inch * dpi
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Live size read-out of a selection.
pub struct SelectionDims {
    /// Width in workspace pixels.
    pub px_w: f64,
    /// Height in workspace pixels.
    pub px_h: f64,
    /// Width in centimetres against the reference layer.
    pub cm_w: f64,
    /// Height in centimetres against the reference layer.
    pub cm_h: f64,
}

impl SelectionDims {
    /// `(width, height)` expressed in `unit`.
    pub fn in_unit(&self, unit: RulerUnit) -> (f64, f64) {
        match unit.units_per_inch() {
            None => (self.px_w, self.px_h),
            Some(upi) => (
                self.cm_w / CM_PER_INCH * upi,
                self.cm_h / CM_PER_INCH * upi,
            ),
        }
    }
}

/// Convert a screen-space extent into workspace pixels and centimetres.
///
/// `view_scale` is the zoom in edit mode or the preview render scale in preview mode;
/// a zero factor yields `None` so callers keep their previous read-out. A missing,
/// undecoded or DPI-less reference resolves the physical size to 0.
pub fn compute_selection_physical_size(
    screen_w: f64,
    screen_h: f64,
    view_scale: f64,
    reference: Option<&Layer>,
) -> Option<SelectionDims> {
    if view_scale == 0.0 || !view_scale.is_finite() {
        return None;
    }
    Some(workspace_extent_physical_size(
        screen_w / view_scale,
        screen_h / view_scale,
        reference,
    ))
}

/// Physical size of an extent already expressed in workspace pixels.
pub fn workspace_extent_physical_size(
    px_w: f64,
    px_h: f64,
    reference: Option<&Layer>,
) -> SelectionDims {
    let mut dims = SelectionDims {
        px_w,
        px_h,
        ..SelectionDims::default()
    };
    let Some(layer) = reference else {
        return dims;
    };
    let dpi = layer.metadata.dpi;
    if !layer.metadata.is_measurable() || dpi <= 0.0 || !dpi.is_finite() {
        return dims;
    }

    let (total_px_w, total_px_h) = layer.scaled_size();
    let total_cm_w = pixels_to_physical(total_px_w, dpi, CM_PER_INCH);
    let total_cm_h = pixels_to_physical(total_px_h, dpi, CM_PER_INCH);
    if total_px_w > 0.0 {
        dims.cm_w = px_w / total_px_w * total_cm_w;
    }
    if total_px_h > 0.0 {
        dims.cm_h = px_h / total_px_h * total_cm_h;
    }
    dims
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Extent, DPI and origin the rulers are drawn against.
pub struct RulerSource {
    /// Reference width in workspace pixels.
    pub width: f64,
    /// Reference height in workspace pixels.
    pub height: f64,
    /// Reference DPI.
    pub dpi: f64,
    /// Top-left corner in workspace units (rotation ignored).
    pub origin: Point,
}

/// Ruler reference: the selected layer, else the visible mockup, else the document.
pub fn ruler_source(
    selected: Option<&Layer>,
    mockup: Option<&Layer>,
    document: DocumentSize,
) -> RulerSource {
    if let Some(layer) = selected.or(mockup)
        && layer.metadata.is_measurable()
    {
        let (width, height) = layer.scaled_size();
        return RulerSource {
            width,
            height,
            dpi: if layer.metadata.dpi > 0.0 {
                layer.metadata.dpi
            } else {
                DEFAULT_DPI
            },
            origin: Point::new(
                layer.placement.x - width / 2.0,
                layer.placement.y - height / 2.0,
            ),
        };
    }
    RulerSource {
        width: document.width,
        height: document.height,
        dpi: DEFAULT_DPI,
        origin: Point::ORIGIN,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/measure.rs"]
mod tests;
