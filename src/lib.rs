//! Layer-based 2D compositing and transform engine for image-mockup editors.
//!
//! A document is an ordered stack of raster layers (a base mockup photo plus placed
//! artwork) positioned in a shared workspace coordinate space. The engine owns:
//!
//! - the **coordinate mapper**: screen <-> workspace <-> layer-local pixel space,
//! - the **measurement module**: pixel extents to physical units via the mockup's DPI,
//! - the **layer store**: ordering, selection, duplication and property patches,
//! - the **transform engine**: handle-driven scale and rotation sessions,
//! - **lasso and rectangle selection**,
//! - the **raster compositor**: extraction and destructive erase under a lasso clip.
//!
//! [`Editor`] ties these together behind command methods and change notifications.
//! Drawing the workspace to a screen is left to the caller: layers expose placement,
//! adjustments and a display-sized proxy surface.
//!
//! Pixels are premultiplied RGBA8 throughout; [`Surface::to_rgba_image`] converts for
//! export.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod foundation {
    pub mod core;
    pub mod error;
    pub(crate) mod math;
    pub mod settings;
}

mod geometry {
    pub mod mapper;
    pub mod measure;
}

mod layers {
    pub mod model;
    pub mod store;
}

mod raster {
    pub mod clip;
    pub mod compositor;
    pub mod decode;
    pub mod proxy;
    pub mod surface;
}

mod interact {
    pub mod lasso;
    pub mod rect_select;
    pub mod transform;
}

mod editor;

pub use editor::{
    BlobFetcher, Editor, EditorEvent, FlipAxis, LoadTicket, SubscriptionId, Tool, ViewMode,
    Workspace,
};
pub use foundation::core::{
    Affine, BezPath, DocumentSize, LayerId, Point, Rect, Vec2, ViewportSize,
};
pub use foundation::error::{CanvasError, CanvasResult};
pub use foundation::settings::{DEFAULT_DPI, EngineSettings, MAX_RENDER_SIZE, MIN_SCALE};
pub use geometry::mapper::{
    layer_affine, layer_local_to_workspace, layer_workspace_bounds, screen_to_workspace,
    workspace_to_layer_local, workspace_to_screen,
};
pub use geometry::measure::{
    CM_PER_INCH, RulerSource, RulerUnit, SelectionDims, compute_selection_physical_size,
    physical_to_pixels, pixels_to_physical, ruler_source, workspace_extent_physical_size,
};
pub use interact::lasso::LassoSelection;
pub use interact::rect_select::RectSelection;
pub use interact::transform::{HandleKind, ResizeAxis, TransformSession};
pub use layers::model::{
    Adjustments, AdjustmentsPatch, Layer, LayerDescriptor, LayerKind, LayerMetadata,
    LayerPatch, Placement, RasterSet, RasterSource,
};
pub use layers::store::LayerStore;
pub use raster::clip::{COVERAGE_TILE, ClipPath, CoverageMask, MIN_CLIP_POINTS};
pub use raster::compositor::{erase_in_place, extract_to_surface};
pub use raster::decode::decode_raster;
pub use raster::proxy::{
    build_raster_set, proxy_dimensions, proxy_ratio, regenerate_proxy, resample,
};
pub use raster::surface::Surface;
