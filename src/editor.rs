//! Aggregate controller: owns the layer stack, the workspace view state and the pointer
//! sessions, and exposes every mutation as a command method.
//!
//! Commands never fail loudly. Degenerate input turns into a no-op (the method returns
//! `false` / `None`), resource failures are logged and reported as [`EditorEvent`]s.

use std::{io::Cursor, sync::Arc};

use anyhow::Context;

use crate::{
    foundation::core::{DocumentSize, LayerId, Point, Vec2, ViewportSize},
    foundation::error::{CanvasError, CanvasResult},
    foundation::settings::EngineSettings,
    geometry::{mapper, measure},
    interact::{
        lasso::LassoSelection,
        rect_select::RectSelection,
        transform::{HandleKind, TransformSession},
    },
    layers::{
        model::{
            AdjustmentsPatch, Layer, LayerDescriptor, LayerKind, LayerPatch, RasterSource,
        },
        store::LayerStore,
    },
    raster::{compositor, decode::decode_raster, proxy::build_raster_set, surface::Surface},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Which surface the user is looking at.
pub enum ViewMode {
    /// Pan/zoom editing canvas.
    #[default]
    Edit,
    /// Rendered product preview.
    Preview,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Active pointer tool.
pub enum Tool {
    /// Select and transform layers.
    #[default]
    Move,
    /// Free-form lasso.
    Lasso,
    /// Measuring rectangle.
    RectSelect,
    /// Hand tool.
    Pan,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Mirror axis for [`Editor::flip_layer`].
pub enum FlipAxis {
    /// Mirror left/right.
    Horizontal,
    /// Mirror top/bottom.
    Vertical,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// View state shared by the rendering and input collaborators.
pub struct Workspace {
    /// Screen offset of the workspace origin in edit mode.
    pub pan: Vec2,
    /// Edit-mode zoom.
    pub zoom: f64,
    /// Current view.
    pub view_mode: ViewMode,
    /// Logical document size.
    pub document: DocumentSize,
    /// Unit shown on rulers and read-outs.
    pub ruler_unit: measure::RulerUnit,
    /// Whether rulers are drawn.
    pub rulers_visible: bool,
    /// Whether the grid is drawn.
    pub grid_visible: bool,
    /// User zoom inside the preview.
    pub preview_zoom: f64,
    /// Scale at which the preview draws workspace pixels.
    pub preview_render_scale: f64,
    /// Whether pointer tools act on the preview.
    pub preview_interactive: bool,
    /// Last pointer-container size reported by the viewport collaborator.
    pub viewport: Option<ViewportSize>,
}

impl Workspace {
    fn new(document: DocumentSize) -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            view_mode: ViewMode::Edit,
            document,
            ruler_unit: measure::RulerUnit::default(),
            rulers_visible: true,
            grid_visible: true,
            preview_zoom: 1.0,
            preview_render_scale: 1.0,
            preview_interactive: false,
            viewport: None,
        }
    }

    /// Screen pixels per workspace pixel in the current view mode.
    pub fn view_scale(&self) -> f64 {
        match self.view_mode {
            ViewMode::Edit => self.zoom,
            ViewMode::Preview => self.preview_render_scale,
        }
    }

    /// Map a pointer position to workspace units for the current view mode.
    ///
    /// `None` while the view scale is zero.
    pub fn screen_to_workspace(&self, p: Point) -> Option<Point> {
        match self.view_mode {
            ViewMode::Edit => mapper::screen_to_workspace(p, self.pan, self.zoom),
            ViewMode::Preview => {
                mapper::screen_to_workspace(p, Vec2::ZERO, self.preview_render_scale)
            }
        }
    }
}

/// Pending raster decode. The layer only exists once the ticket is completed.
#[derive(Debug)]
pub struct LoadTicket {
    seq: u64,
    descriptor: LayerDescriptor,
}

impl LoadTicket {
    /// Monotonic request number.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The request being decoded.
    pub fn descriptor(&self) -> &LayerDescriptor {
        &self.descriptor
    }

    /// Locally retained bytes, if the request came from a file.
    pub fn local_bytes(&self) -> Option<&[u8]> {
        match &self.descriptor.source {
            Some(RasterSource::Local { bytes, .. }) => Some(bytes.as_slice()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Change notification delivered to subscribers.
pub enum EditorEvent {
    /// A layer was inserted (load completion, duplicate, extraction).
    LayerAdded(LayerId),
    /// A layer was removed.
    LayerRemoved(LayerId),
    /// Properties or adjustments of a layer changed.
    LayerChanged(LayerId),
    /// Pixels of a layer changed.
    RasterChanged(LayerId),
    /// Stack order changed.
    LayersReordered,
    /// Selected layer changed.
    SelectionChanged(Option<LayerId>),
    /// Pan, zoom, view mode, document or ruler settings changed.
    ViewChanged,
    /// A raster could not be decoded; no layer was created.
    LoadFailed {
        /// Name of the requested layer.
        name: String,
        /// Failure description.
        reason: String,
    },
}

/// Handle returned by [`Editor::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Retrieves original bytes for URL-sourced layers.
pub trait BlobFetcher {
    /// Fetch `url`; errors are logged by the caller and never propagated.
    fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}

impl<F> BlobFetcher for F
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>>,
{
    fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        self(url)
    }
}

type Listener = Box<dyn FnMut(&EditorEvent)>;

/// The editing session: layers, view state and pointer sessions.
pub struct Editor {
    settings: EngineSettings,
    store: LayerStore,
    workspace: Workspace,
    tool: Tool,
    transform: Option<TransformSession>,
    lasso: LassoSelection,
    rect: RectSelection,
    next_ticket: u64,
    next_subscription: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("layers", &self.store.len())
            .field("selected", &self.store.selected())
            .field("workspace", &self.workspace)
            .field("tool", &self.tool)
            .field("transforming", &self.transform.is_some())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl Editor {
    /// Empty editor with the document at `settings.default_document`.
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            store: LayerStore::new(settings.min_scale),
            workspace: Workspace::new(settings.default_document),
            settings,
            tool: Tool::default(),
            transform: None,
            lasso: LassoSelection::default(),
            rect: RectSelection::default(),
            next_ticket: 0,
            next_subscription: 0,
            listeners: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------------------
    // Queries

    /// Engine tunables.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// View state.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Layer stack.
    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    /// Layers bottom first.
    pub fn layers(&self) -> &[Layer] {
        self.store.layers()
    }

    /// Layer by id.
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.store.get(id)
    }

    /// Selected layer.
    pub fn selected_layer(&self) -> Option<&Layer> {
        self.store.selected_layer()
    }

    /// Active tool.
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Running transform session.
    pub fn transform_session(&self) -> Option<&TransformSession> {
        self.transform.as_ref()
    }

    /// Lasso state.
    pub fn lasso(&self) -> &LassoSelection {
        &self.lasso
    }

    /// Measuring rectangle state.
    pub fn rect_selection(&self) -> &RectSelection {
        &self.rect
    }

    /// Ruler reference for the current selection and document.
    pub fn ruler_source(&self) -> measure::RulerSource {
        measure::ruler_source(
            self.store.selected_layer(),
            self.store.mockup_layer(),
            self.workspace.document,
        )
    }

    // ---------------------------------------------------------------------------------
    // Notifications

    /// Register `listener` for every subsequent [`EditorEvent`].
    pub fn subscribe(&mut self, listener: impl FnMut(&EditorEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Drop a listener. Returns false for unknown handles.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: EditorEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    fn emit_selection(&mut self) {
        let selected = self.store.selected();
        self.emit(EditorEvent::SelectionChanged(selected));
    }

    // ---------------------------------------------------------------------------------
    // Loading

    /// Register a load request. Nothing is inserted until
    /// [`complete_add_layer`](Self::complete_add_layer) receives the decoded raster.
    pub fn begin_add_layer(&mut self, descriptor: LayerDescriptor) -> LoadTicket {
        let seq = self.next_ticket;
        self.next_ticket += 1;
        tracing::debug!(seq, name = %descriptor.name, kind = ?descriptor.kind, "layer load started");
        LoadTicket { seq, descriptor }
    }

    /// Finish a load request.
    ///
    /// On success the layer is inserted on top and selected. A mockup without explicit
    /// placement resizes the document to its native size; layers without explicit
    /// placement are centred on the document and framed in the last reported viewport.
    /// A decode failure is logged and reported as [`EditorEvent::LoadFailed`].
    pub fn complete_add_layer(
        &mut self,
        ticket: LoadTicket,
        decoded: CanvasResult<Surface>,
    ) -> Option<LayerId> {
        let LoadTicket { seq, descriptor } = ticket;
        let raster = decoded.and_then(|full| build_raster_set(full, self.settings.max_render_size));
        let raster = match raster {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(seq, name = %descriptor.name, error = %e, "layer load failed");
                self.emit(EditorEvent::LoadFailed {
                    name: descriptor.name,
                    reason: e.to_string(),
                });
                return None;
            }
        };

        let dpi = descriptor
            .dpi
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(self.settings.default_dpi);
        let mut layer = Layer::new(descriptor.name, descriptor.kind, raster, dpi);
        layer.source = descriptor.source;

        let explicit = descriptor.initial_position;
        if layer.kind == LayerKind::Mockup && explicit.is_none() {
            self.workspace.document = DocumentSize {
                width: f64::from(layer.metadata.native_width),
                height: f64::from(layer.metadata.native_height),
            };
            self.emit(EditorEvent::ViewChanged);
        }
        let center = explicit.unwrap_or_else(|| self.workspace.document.center());
        layer.placement.x = center.x;
        layer.placement.y = center.y;

        let id = self.store.push(layer);
        self.emit(EditorEvent::LayerAdded(id));
        self.emit_selection();

        if explicit.is_none()
            && let Some(viewport) = self.workspace.viewport
        {
            self.frame_layer(id, viewport);
        }
        Some(id)
    }

    /// Decode `bytes` inline and complete the request.
    pub fn add_layer_from_bytes(
        &mut self,
        descriptor: LayerDescriptor,
        bytes: &[u8],
    ) -> Option<LayerId> {
        let ticket = self.begin_add_layer(descriptor);
        let decoded = decode_raster(bytes);
        self.complete_add_layer(ticket, decoded)
    }

    /// Add a local file; its bytes are retained as the layer's original source.
    pub fn add_local_layer(
        &mut self,
        file_name: impl Into<String>,
        kind: LayerKind,
        bytes: Vec<u8>,
        dpi: Option<f64>,
    ) -> Option<LayerId> {
        let mut descriptor = LayerDescriptor::from_local(file_name, kind, bytes);
        descriptor.dpi = dpi;
        let ticket = self.begin_add_layer(descriptor);
        let decoded = match ticket.local_bytes() {
            Some(bytes) => decode_raster(bytes),
            None => Err(CanvasError::decode("local layer without bytes")),
        };
        self.complete_add_layer(ticket, decoded)
    }

    /// Original bytes of a layer.
    ///
    /// Local files return their retained bytes, URL sources go through `fetcher`, and
    /// generated layers are encoded as PNG from their full-resolution surface. Failures
    /// are logged and yield `None`.
    pub fn get_layer_blob(&self, id: LayerId, fetcher: &dyn BlobFetcher) -> Option<Arc<Vec<u8>>> {
        let layer = self.store.get(id)?;
        let result = match &layer.source {
            Some(RasterSource::Local { bytes, .. }) => return Some(Arc::clone(bytes)),
            Some(RasterSource::Url(url)) => fetcher
                .fetch(url)
                .with_context(|| format!("fetch '{url}'"))
                .map_err(|e| CanvasError::fetch(format!("{e:#}"))),
            None => encode_png(&layer.raster.full),
        };
        match result {
            Ok(bytes) => Some(Arc::new(bytes)),
            Err(e) => {
                tracing::warn!(layer = %layer.name, error = %e, "layer blob unavailable");
                None
            }
        }
    }

    // ---------------------------------------------------------------------------------
    // Stack

    /// Remove a layer; unknown ids are ignored.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        let was_selected = self.store.selected() == Some(id);
        let Some(removed) = self.store.remove(id) else {
            return false;
        };
        if removed.owns_local_source() {
            tracing::debug!(%id, "released local source bytes");
        }
        if self.transform.as_ref().is_some_and(|t| t.layer_id() == id) {
            self.transform = None;
        }
        self.emit(EditorEvent::LayerRemoved(id));
        if was_selected {
            self.emit_selection();
        }
        true
    }

    /// Move a layer one step up.
    pub fn bring_forward(&mut self, id: LayerId) -> bool {
        self.reordered(|s| s.bring_forward(id))
    }

    /// Move a layer one step down.
    pub fn send_backward(&mut self, id: LayerId) -> bool {
        self.reordered(|s| s.send_backward(id))
    }

    /// Move the layer at `from` to `to`.
    pub fn move_layer(&mut self, from: usize, to: usize) -> bool {
        self.reordered(|s| s.move_to(from, to))
    }

    fn reordered(&mut self, op: impl FnOnce(&mut LayerStore) -> bool) -> bool {
        let changed = op(&mut self.store);
        if changed {
            self.emit(EditorEvent::LayersReordered);
        }
        changed
    }

    /// Copy a layer directly above itself and select the copy.
    pub fn duplicate_layer(&mut self, id: LayerId) -> Option<LayerId> {
        let new_id = self.store.duplicate(id)?;
        self.emit(EditorEvent::LayerAdded(new_id));
        self.emit_selection();
        Some(new_id)
    }

    /// Select a layer; unknown ids are ignored.
    pub fn select_layer(&mut self, id: LayerId) -> bool {
        let changed = self.store.select(id);
        if changed {
            self.emit_selection();
        }
        changed
    }

    /// Clear the layer selection.
    pub fn deselect(&mut self) {
        if self.store.selected().is_some() {
            self.store.clear_selection();
            self.emit_selection();
        }
    }

    // ---------------------------------------------------------------------------------
    // Properties

    /// Shallow-merge `patch` onto a layer.
    pub fn update_layer_properties(&mut self, id: LayerId, patch: &LayerPatch) -> bool {
        if patch.is_empty() || !self.store.update_properties(id, patch) {
            return false;
        }
        self.emit(EditorEvent::LayerChanged(id));
        true
    }

    /// Shallow-merge `patch` onto a layer's adjustments.
    pub fn update_layer_adjustments(&mut self, id: LayerId, patch: &AdjustmentsPatch) -> bool {
        if !self.store.update_adjustments(id, patch) {
            return false;
        }
        self.emit(EditorEvent::LayerChanged(id));
        true
    }

    /// Toggle a mirror flag on the selected layer.
    pub fn flip_layer(&mut self, axis: FlipAxis) -> bool {
        let Some(layer) = self.store.selected_layer() else {
            return false;
        };
        let id = layer.id();
        let patch = match axis {
            FlipAxis::Horizontal => AdjustmentsPatch {
                flip_h: Some(!layer.adjustments.flip_h),
                ..AdjustmentsPatch::default()
            },
            FlipAxis::Vertical => AdjustmentsPatch {
                flip_v: Some(!layer.adjustments.flip_v),
                ..AdjustmentsPatch::default()
            },
        };
        self.update_layer_adjustments(id, &patch)
    }

    /// Rotate the selected layer by `degrees`.
    pub fn rotate_layer(&mut self, degrees: f64) -> bool {
        let Some(layer) = self.store.selected_layer() else {
            return false;
        };
        let (id, rotation) = (layer.id(), layer.placement.rotation + degrees.to_radians());
        self.update_layer_properties(id, &LayerPatch::rotation(rotation))
    }

    /// Scale the mockup so it spans `width` workspace pixels, and set the document
    /// to `width` x `height`.
    pub fn resize_mockup(&mut self, width: f64, height: f64) -> bool {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return false;
        }
        let Some(mockup) = self.store.mockup_layer() else {
            return false;
        };
        if mockup.metadata.native_width == 0 {
            return false;
        }
        let id = mockup.id();
        let scale = width / f64::from(mockup.metadata.native_width);
        self.update_layer_properties(id, &LayerPatch::uniform_scale(scale));
        self.workspace.document = DocumentSize { width, height };
        self.emit(EditorEvent::ViewChanged);
        true
    }

    // ---------------------------------------------------------------------------------
    // View

    /// Fit a layer into `viewport` and centre it.
    ///
    /// Zoom is the smaller of the padded per-axis fits, capped at the configured maximum.
    /// No-op before decode, for an empty viewport or a degenerate layer size.
    pub fn frame_layer(&mut self, id: LayerId, viewport: ViewportSize) -> bool {
        let Some(layer) = self.store.get(id) else {
            return false;
        };
        if viewport.is_empty() || !layer.metadata.is_measurable() {
            return false;
        }
        let (w, h) = layer.scaled_size();
        if w <= 0.0 || h <= 0.0 {
            return false;
        }
        let pad = self.settings.frame_padding;
        let zoom = (viewport.width * pad / w)
            .min(viewport.height * pad / h)
            .min(self.settings.max_frame_zoom);
        let center = layer.placement.center();
        self.workspace.zoom = zoom;
        self.workspace.pan = Vec2::new(
            viewport.width / 2.0 - center.x * zoom,
            viewport.height / 2.0 - center.y * zoom,
        );
        self.emit(EditorEvent::ViewChanged);
        true
    }

    /// Switch between edit and preview.
    ///
    /// Leaving preview resets its zoom; entering edit reframes the selected layer in the
    /// last reported viewport.
    pub fn toggle_view_mode(&mut self) {
        if self.workspace.view_mode == ViewMode::Preview {
            self.workspace.preview_zoom = 1.0;
        }
        self.workspace.view_mode = match self.workspace.view_mode {
            ViewMode::Edit => ViewMode::Preview,
            ViewMode::Preview => ViewMode::Edit,
        };
        self.emit(EditorEvent::ViewChanged);

        if self.workspace.view_mode == ViewMode::Edit
            && let (Some(id), Some(viewport)) = (self.store.selected(), self.workspace.viewport)
        {
            self.frame_layer(id, viewport);
        }
    }

    /// Set the preview zoom; non-positive values are ignored.
    pub fn set_preview_zoom(&mut self, zoom: f64) -> bool {
        if !(zoom.is_finite() && zoom > 0.0) {
            return false;
        }
        self.workspace.preview_zoom = zoom;
        self.emit(EditorEvent::ViewChanged);
        true
    }

    /// Set the scale the preview draws at; non-positive values are ignored.
    pub fn set_preview_render_scale(&mut self, scale: f64) -> bool {
        if !(scale.is_finite() && scale > 0.0) {
            return false;
        }
        self.workspace.preview_render_scale = scale;
        self.emit(EditorEvent::ViewChanged);
        true
    }

    /// Toggle pointer interaction on the preview; disabling ends a running lasso.
    pub fn toggle_preview_interactivity(&mut self) {
        self.workspace.preview_interactive = !self.workspace.preview_interactive;
        if !self.workspace.preview_interactive {
            self.lasso.end();
        }
        self.emit(EditorEvent::ViewChanged);
    }

    /// Set the ruler unit.
    pub fn set_ruler_unit(&mut self, unit: measure::RulerUnit) {
        self.workspace.ruler_unit = unit;
        self.emit(EditorEvent::ViewChanged);
    }

    /// Show or hide the rulers.
    pub fn set_rulers_visible(&mut self, visible: bool) {
        self.workspace.rulers_visible = visible;
        self.emit(EditorEvent::ViewChanged);
    }

    /// Show or hide the grid.
    pub fn set_grid_visible(&mut self, visible: bool) {
        self.workspace.grid_visible = visible;
        self.emit(EditorEvent::ViewChanged);
    }

    /// Set edit-mode pan and zoom; a non-positive or non-finite zoom is rejected.
    pub fn set_pan_zoom(&mut self, pan: Vec2, zoom: f64) -> bool {
        if !(zoom.is_finite() && zoom > 0.0 && pan.x.is_finite() && pan.y.is_finite()) {
            return false;
        }
        self.workspace.pan = pan;
        self.workspace.zoom = zoom;
        self.emit(EditorEvent::ViewChanged);
        true
    }

    /// Record the pointer-container size used for framing after loads.
    pub fn set_viewport_size(&mut self, viewport: ViewportSize) {
        self.workspace.viewport = Some(viewport);
    }

    /// Switch tools; leaving the lasso discards its points.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        if tool != Tool::Lasso {
            self.lasso.clear();
        }
    }

    fn pointer_enabled(&self) -> bool {
        self.workspace.view_mode == ViewMode::Edit || self.workspace.preview_interactive
    }

    // ---------------------------------------------------------------------------------
    // Transform sessions

    /// Grab `handle` of a layer at screen position `mouse`.
    ///
    /// A running session is ended first. Refused in preview unless interactivity is on.
    pub fn start_transform(&mut self, id: LayerId, handle: HandleKind, mouse: Point) -> bool {
        self.end_transform();
        if !self.pointer_enabled() {
            return false;
        }
        let Some(start) = self.workspace.screen_to_workspace(mouse) else {
            return false;
        };
        let Some(layer) = self.store.get(id) else {
            return false;
        };
        self.transform = Some(TransformSession::start(
            id,
            handle,
            start,
            layer.placement.center(),
            &layer.placement,
            self.settings.min_scale,
        ));
        true
    }

    /// Apply the running session for the pointer at `mouse`; commits immediately.
    pub fn update_transform(&mut self, mouse: Point) -> bool {
        let Some(session) = &self.transform else {
            return false;
        };
        let Some(current) = self.workspace.screen_to_workspace(mouse) else {
            return false;
        };
        let Some(patch) = session.update(current) else {
            return false;
        };
        let id = session.layer_id();
        self.update_layer_properties(id, &patch)
    }

    /// Finish the running session; the last applied values stay.
    pub fn end_transform(&mut self) {
        self.transform = None;
    }

    // ---------------------------------------------------------------------------------
    // Lasso

    /// Start a lasso at screen position `point`; ends a running rectangle selection.
    pub fn start_lasso(&mut self, point: Point) -> bool {
        if !self.pointer_enabled() {
            return false;
        }
        let Some(p) = self.workspace.screen_to_workspace(point) else {
            return false;
        };
        self.rect.end();
        self.lasso.start(p);
        true
    }

    /// Append a screen point to the running lasso.
    pub fn update_lasso(&mut self, point: Point) -> bool {
        let Some(p) = self.workspace.screen_to_workspace(point) else {
            return false;
        };
        self.lasso.update(p, self.store.mockup_layer())
    }

    /// Stop drawing; points are kept for extraction.
    pub fn end_lasso(&mut self) {
        self.lasso.end();
    }

    /// Discard the lasso.
    pub fn cancel_lasso(&mut self) {
        self.lasso.clear();
    }

    // ---------------------------------------------------------------------------------
    // Rectangle selection

    /// Anchor a measuring rectangle at screen position `mouse`; ends a running lasso.
    pub fn start_selection(&mut self, mouse: Point) -> bool {
        if !self.pointer_enabled() {
            return false;
        }
        self.lasso.end();
        self.rect.start(mouse);
        self.update_selection(mouse)
    }

    /// Move the free corner of the measuring rectangle.
    pub fn update_selection(&mut self, mouse: Point) -> bool {
        let scale = self.workspace.view_scale();
        self.rect.update(mouse, scale, self.store.mockup_layer())
    }

    /// Freeze the measuring rectangle.
    pub fn end_selection(&mut self) {
        self.rect.end();
    }

    // ---------------------------------------------------------------------------------
    // Selection commit

    /// Copy the lasso region of a layer into a new layer stacked on top.
    ///
    /// The new layer keeps the source's kind, DPI and placement so it overlaps its
    /// origin exactly. Needs at least three lasso points; consumes them on success.
    pub fn extract_selection(&mut self, id: LayerId) -> Option<LayerId> {
        let new_id = self.extract_inner(id)?;
        self.lasso.clear();
        Some(new_id)
    }

    /// Clear the lasso region of a layer. Irreversible; consumes the lasso on success.
    pub fn erase_selection(&mut self, id: LayerId) -> bool {
        let erased = self.erase_inner(id);
        if erased {
            self.lasso.clear();
        }
        erased
    }

    /// Extract the lasso region into a new layer, then erase it from the source.
    pub fn cut_selection(&mut self, id: LayerId) -> Option<LayerId> {
        let new_id = self.extract_inner(id)?;
        self.erase_inner(id);
        self.lasso.clear();
        Some(new_id)
    }

    fn extract_inner(&mut self, id: LayerId) -> Option<LayerId> {
        let source = self.store.get(id)?;
        let clip = self.lasso.clip_path_for(source)?;
        let surface = match compositor::extract_to_surface(&source.raster.full, &clip) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(%id, error = %e, "selection extraction failed");
                return None;
            }
        };
        let raster = match build_raster_set(surface, self.settings.max_render_size) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(%id, error = %e, "selection extraction failed");
                return None;
            }
        };

        let mut layer = Layer::new(
            format!("{} cutout", source.name),
            source.kind,
            raster,
            source.metadata.dpi,
        );
        layer.placement = source.placement;
        layer.adjustments = source.adjustments;

        let new_id = self.store.push(layer);
        self.emit(EditorEvent::LayerAdded(new_id));
        self.emit_selection();
        Some(new_id)
    }

    fn erase_inner(&mut self, id: LayerId) -> bool {
        let Some(source) = self.store.get(id) else {
            return false;
        };
        let Some(clip) = self.lasso.clip_path_for(source) else {
            return false;
        };
        let Some(layer) = self.store.get_mut(id) else {
            return false;
        };
        if let Err(e) = compositor::erase_in_place(&mut layer.raster, &clip) {
            tracing::warn!(%id, error = %e, "selection erase failed");
            return false;
        }
        self.emit(EditorEvent::RasterChanged(id));
        true
    }
}

fn encode_png(surface: &Surface) -> CanvasResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    surface
        .to_rgba_image()
        .write_to(&mut out, image::ImageFormat::Png)
        .context("encode layer raster as PNG")?;
    Ok(out.into_inner())
}

#[cfg(test)]
#[path = "../tests/unit/editor/editor.rs"]
mod tests;
