use std::sync::Arc;

use anyhow::Context;

use crate::{
    foundation::core::{LayerId, Point},
    foundation::error::{CanvasError, CanvasResult},
    raster::surface::Surface,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Behavioural kind of a layer.
pub enum LayerKind {
    /// Base photo that anchors document size and the DPI reference.
    Mockup,
    /// Artwork placed on top of the mockup.
    #[default]
    Asset,
    /// Caller-tagged piece. Only arrives through descriptors or patches; extraction
    /// keeps the source's kind. Never anchors document size or measurement.
    Cutout,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Workspace placement of a layer's pixel centre.
pub struct Placement {
    /// Centre x in workspace units.
    pub x: f64,
    /// Centre y in workspace units.
    pub y: f64,
    /// Horizontal scale, always > 0.
    pub scale_x: f64,
    /// Vertical scale, always > 0.
    pub scale_y: f64,
    /// Rotation in radians; not normalised.
    pub rotation: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        }
    }
}

impl Placement {
    /// Placement centre as a point.
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Raster metadata known once decode has completed.
pub struct LayerMetadata {
    /// Dots per inch of the source raster.
    pub dpi: f64,
    /// Decoded pixel width.
    pub native_width: u32,
    /// Decoded pixel height.
    pub native_height: u32,
}

impl LayerMetadata {
    /// False when either native side is zero (nothing to frame or measure).
    pub fn is_measurable(&self) -> bool {
        self.native_width > 0 && self.native_height > 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Filter parameters stored per layer; pixel math belongs to the renderer.
pub struct Adjustments {
    /// Grayscale amount in percent.
    pub grayscale: f64,
    /// Sepia amount in percent.
    pub sepia: f64,
    /// Saturation in percent (100 = unchanged).
    pub saturate: f64,
    /// Contrast in percent (100 = unchanged).
    pub contrast: f64,
    /// Brightness in percent (100 = unchanged).
    pub brightness: f64,
    /// Invert amount in percent.
    pub invert: f64,
    /// Mirror around the vertical axis.
    pub flip_h: bool,
    /// Mirror around the horizontal axis.
    pub flip_v: bool,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            grayscale: 0.0,
            sepia: 0.0,
            saturate: 100.0,
            contrast: 100.0,
            brightness: 100.0,
            invert: 0.0,
            flip_h: false,
            flip_v: false,
        }
    }
}

/// Where a layer's pixels originally came from.
#[derive(Clone, Debug, PartialEq)]
pub enum RasterSource {
    /// Remote asset, fetched on demand.
    Url(String),
    /// Locally supplied file, retained for the lifetime of the layer.
    Local {
        /// Original file name.
        file_name: String,
        /// Encoded file bytes as supplied.
        bytes: Arc<Vec<u8>>,
    },
}

/// Full-resolution surface plus the proxy consulted by interactive rendering.
///
/// Both surfaces are reference counted: duplicates share them, and destructive
/// operations copy before writing when a surface is shared.
#[derive(Clone, Debug)]
pub struct RasterSet {
    /// Authoritative pixels, used for extraction, erase and export.
    pub full: Arc<Surface>,
    /// Display surface; the same allocation as `full` unless down-sampled.
    pub proxy: Arc<Surface>,
}

impl RasterSet {
    /// True when the proxy is a down-sampled copy rather than the full surface.
    pub fn is_downsampled(&self) -> bool {
        self.proxy.width != self.full.width || self.proxy.height != self.full.height
    }
}

/// A raster entity in the document.
#[derive(Clone, Debug)]
pub struct Layer {
    id: LayerId,
    /// Display name.
    pub name: String,
    /// Behavioural kind.
    pub kind: LayerKind,
    /// Whether the renderer should draw the layer.
    pub visible: bool,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Workspace placement.
    pub placement: Placement,
    /// Decoded pixels.
    pub raster: RasterSet,
    /// Original bytes reference; `None` for generated layers.
    pub source: Option<RasterSource>,
    /// DPI and native size.
    pub metadata: LayerMetadata,
    /// Stored filter parameters and flips.
    pub adjustments: Adjustments,
}

impl Layer {
    /// Build a layer around decoded rasters with a fresh id and default placement.
    pub fn new(name: impl Into<String>, kind: LayerKind, raster: RasterSet, dpi: f64) -> Self {
        let metadata = LayerMetadata {
            dpi,
            native_width: raster.full.width,
            native_height: raster.full.height,
        };
        Self {
            id: LayerId::new_v4(),
            name: name.into(),
            kind,
            visible: true,
            opacity: 1.0,
            placement: Placement::default(),
            raster,
            source: None,
            metadata,
            adjustments: Adjustments::default(),
        }
    }

    /// Immutable identity.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Value copy under a new id; raster surfaces stay shared.
    pub fn duplicate_as(&self, name: impl Into<String>) -> Self {
        Self {
            id: LayerId::new_v4(),
            name: name.into(),
            ..self.clone()
        }
    }

    /// Native size scaled by the current placement.
    pub fn scaled_size(&self) -> (f64, f64) {
        (
            f64::from(self.metadata.native_width) * self.placement.scale_x,
            f64::from(self.metadata.native_height) * self.placement.scale_y,
        )
    }

    /// True when the layer was loaded from a local file this layer owns.
    pub fn owns_local_source(&self) -> bool {
        matches!(self.source, Some(RasterSource::Local { .. }))
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Shallow-merge patch for layer properties.
pub struct LayerPatch {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<LayerKind>,
    /// New visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// New opacity, clamped to `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// New centre x.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// New centre y.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// New horizontal scale, floored at the minimum scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    /// New vertical scale, floored at the minimum scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,
    /// New rotation in radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// New DPI; non-positive values are ignored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpi: Option<f64>,
}

impl LayerPatch {
    /// Patch that sets both scale axes.
    pub fn uniform_scale(scale: f64) -> Self {
        Self {
            scale_x: Some(scale),
            scale_y: Some(scale),
            ..Self::default()
        }
    }

    /// Patch that sets the rotation.
    pub fn rotation(rotation: f64) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    /// Patch that moves the centre.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Parse a partial update such as `{"x": 10, "opacity": 0.5}`.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        serde_json::from_str(json)
            .context("parse layer patch JSON")
            .map_err(CanvasError::from)
    }

    pub(crate) fn apply(&self, layer: &mut Layer, min_scale: f64) {
        if let Some(name) = &self.name {
            layer.name = name.clone();
        }
        if let Some(kind) = self.kind {
            layer.kind = kind;
        }
        if let Some(visible) = self.visible {
            layer.visible = visible;
        }
        if let Some(opacity) = self.opacity.filter(|o| o.is_finite()) {
            layer.opacity = opacity.clamp(0.0, 1.0);
        }
        let p = &mut layer.placement;
        if let Some(x) = self.x.filter(|v| v.is_finite()) {
            p.x = x;
        }
        if let Some(y) = self.y.filter(|v| v.is_finite()) {
            p.y = y;
        }
        if let Some(sx) = self.scale_x.filter(|v| v.is_finite()) {
            p.scale_x = sx.max(min_scale);
        }
        if let Some(sy) = self.scale_y.filter(|v| v.is_finite()) {
            p.scale_y = sy.max(min_scale);
        }
        if let Some(r) = self.rotation.filter(|v| v.is_finite()) {
            p.rotation = r;
        }
        if let Some(dpi) = self.dpi.filter(|d| d.is_finite() && *d > 0.0) {
            layer.metadata.dpi = dpi;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Shallow-merge patch for [`Adjustments`].
pub struct AdjustmentsPatch {
    /// Grayscale amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grayscale: Option<f64>,
    /// Sepia amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sepia: Option<f64>,
    /// Saturation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturate: Option<f64>,
    /// Contrast.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    /// Brightness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    /// Invert amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invert: Option<f64>,
    /// Horizontal flip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip_h: Option<bool>,
    /// Vertical flip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip_v: Option<bool>,
}

impl AdjustmentsPatch {
    /// Parse a partial update such as `{"brightness": 120, "flip_h": true}`.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        serde_json::from_str(json)
            .context("parse adjustments patch JSON")
            .map_err(CanvasError::from)
    }

    pub(crate) fn apply(&self, adj: &mut Adjustments) {
        let merge = |slot: &mut f64, v: Option<f64>| {
            if let Some(v) = v.filter(|v| v.is_finite()) {
                *slot = v;
            }
        };
        merge(&mut adj.grayscale, self.grayscale);
        merge(&mut adj.sepia, self.sepia);
        merge(&mut adj.saturate, self.saturate);
        merge(&mut adj.contrast, self.contrast);
        merge(&mut adj.brightness, self.brightness);
        merge(&mut adj.invert, self.invert);
        if let Some(f) = self.flip_h {
            adj.flip_h = f;
        }
        if let Some(f) = self.flip_v {
            adj.flip_v = f;
        }
    }
}

/// Request to add a layer; the layer exists only once its raster has decoded.
#[derive(Clone, Debug)]
pub struct LayerDescriptor {
    /// Display name.
    pub name: String,
    /// Behavioural kind.
    pub kind: LayerKind,
    /// Source reference; `None` for rasters generated by the engine.
    pub source: Option<RasterSource>,
    /// DPI of the asset, if known.
    pub dpi: Option<f64>,
    /// Explicit centre placement; skips centring and auto-framing.
    pub initial_position: Option<Point>,
}

impl LayerDescriptor {
    /// Descriptor for a remote asset.
    pub fn from_url(name: impl Into<String>, kind: LayerKind, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            source: Some(RasterSource::Url(url.into())),
            dpi: None,
            initial_position: None,
        }
    }

    /// Descriptor for a local file whose bytes are retained.
    pub fn from_local(file_name: impl Into<String>, kind: LayerKind, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        Self {
            name: file_name.clone(),
            kind,
            source: Some(RasterSource::Local {
                file_name,
                bytes: Arc::new(bytes),
            }),
            dpi: None,
            initial_position: None,
        }
    }

    /// Set the asset DPI.
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = Some(dpi);
        self
    }

    /// Set an explicit placement.
    pub fn at(mut self, position: Point) -> Self {
        self.initial_position = Some(position);
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/model.rs"]
mod tests;
