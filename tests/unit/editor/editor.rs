use std::{cell::RefCell, rc::Rc};

use super::*;
use crate::interact::transform::ResizeAxis;

fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn recorder(ed: &mut Editor) -> Rc<RefCell<Vec<EditorEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    ed.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    events
}

fn add(ed: &mut Editor, name: &str, kind: LayerKind, w: u32, h: u32) -> LayerId {
    let desc = LayerDescriptor::from_url(name, kind, format!("https://cdn.test/{name}.png"));
    ed.add_layer_from_bytes(desc, &png(w, h, [255, 0, 0, 255]))
        .unwrap()
}

fn lasso_square(ed: &mut Editor, x0: f64, y0: f64, x1: f64, y1: f64) {
    ed.set_tool(Tool::Lasso);
    assert!(ed.start_lasso(Point::new(x0, y0)));
    ed.update_lasso(Point::new(x1, y0));
    ed.update_lasso(Point::new(x1, y1));
    ed.update_lasso(Point::new(x0, y1));
    ed.end_lasso();
}

#[test]
fn begin_add_inserts_nothing_until_completion() {
    let mut ed = Editor::default();
    let ticket = ed.begin_add_layer(LayerDescriptor::from_url(
        "logo",
        LayerKind::Asset,
        "https://cdn.test/logo.png",
    ));
    assert!(ed.layers().is_empty());
    assert_eq!(ticket.descriptor().name, "logo");
    assert!(ticket.local_bytes().is_none());

    let id = ed
        .complete_add_layer(ticket, Ok(Surface::new_transparent(10, 10)))
        .unwrap();
    assert_eq!(ed.layers().len(), 1);
    assert_eq!(ed.store().selected(), Some(id));
}

#[test]
fn mockup_load_sizes_document_and_centres() {
    let mut ed = Editor::default();
    let events = recorder(&mut ed);
    let id = add(&mut ed, "shirt", LayerKind::Mockup, 200, 100);

    let doc = ed.workspace().document;
    assert_eq!((doc.width, doc.height), (200.0, 100.0));
    let layer = ed.layer(id).unwrap();
    assert_eq!(layer.placement.center(), Point::new(100.0, 50.0));
    assert_eq!(layer.metadata.dpi, crate::foundation::settings::DEFAULT_DPI);

    let events = events.borrow();
    assert!(events.contains(&EditorEvent::LayerAdded(id)));
    assert!(events.contains(&EditorEvent::SelectionChanged(Some(id))));
    assert!(events.contains(&EditorEvent::ViewChanged));
}

#[test]
fn asset_load_keeps_document_and_explicit_position_wins() {
    let mut ed = Editor::default();
    let asset = add(&mut ed, "logo", LayerKind::Asset, 20, 20);
    assert_eq!(ed.workspace().document.width, 1920.0);
    assert_eq!(
        ed.layer(asset).unwrap().placement.center(),
        Point::new(960.0, 540.0)
    );

    let desc = LayerDescriptor::from_url("pinned", LayerKind::Mockup, "https://cdn.test/p.png")
        .with_dpi(300.0)
        .at(Point::new(5.0, 7.0));
    let pinned = ed
        .add_layer_from_bytes(desc, &png(50, 50, [0, 0, 0, 255]))
        .unwrap();
    let layer = ed.layer(pinned).unwrap();
    assert_eq!(layer.placement.center(), Point::new(5.0, 7.0));
    assert_eq!(layer.metadata.dpi, 300.0);
    // Explicitly placed mockups do not resize the document.
    assert_eq!(ed.workspace().document.width, 1920.0);
}

#[test]
fn decode_failure_creates_no_layer_and_reports() {
    let mut ed = Editor::default();
    let events = recorder(&mut ed);
    let desc = LayerDescriptor::from_url("broken", LayerKind::Asset, "https://cdn.test/b.png");
    assert!(ed.add_layer_from_bytes(desc, b"not an image").is_none());
    assert!(ed.layers().is_empty());
    assert!(ed.store().selected().is_none());
    assert!(matches!(
        events.borrow().as_slice(),
        [EditorEvent::LoadFailed { name, .. }] if name == "broken"
    ));
}

#[test]
fn load_frames_into_last_reported_viewport() {
    let mut ed = Editor::default();
    ed.set_viewport_size(ViewportSize::new(1000.0, 500.0).unwrap());
    add(&mut ed, "shirt", LayerKind::Mockup, 200, 100);
    let ws = ed.workspace();
    assert_eq!(ws.zoom, 2.0);
    assert_eq!(ws.pan, Vec2::new(300.0, 150.0));
}

#[test]
fn frame_layer_fits_with_padding() {
    let mut ed = Editor::default();
    let id = add(&mut ed, "shirt", LayerKind::Mockup, 2000, 1000);
    assert_eq!(ed.workspace().zoom, 1.0);

    assert!(ed.frame_layer(id, ViewportSize::new(1000.0, 1000.0).unwrap()));
    let ws = ed.workspace();
    assert!((ws.zoom - 0.4).abs() < 1e-12);
    assert!((ws.pan.x - (500.0 - 1000.0 * 0.4)).abs() < 1e-9);
    assert!((ws.pan.y - (500.0 - 500.0 * 0.4)).abs() < 1e-9);

    assert!(!ed.frame_layer(id, ViewportSize::new(0.0, 1000.0).unwrap()));
    assert!(!ed.frame_layer(LayerId::new_v4(), ViewportSize::new(10.0, 10.0).unwrap()));
}

#[test]
fn removal_reselects_same_index_then_previous() {
    let mut ed = Editor::default();
    let a = add(&mut ed, "a", LayerKind::Asset, 4, 4);
    let b = add(&mut ed, "b", LayerKind::Asset, 4, 4);
    let c = add(&mut ed, "c", LayerKind::Asset, 4, 4);
    assert!(ed.select_layer(b));
    let events = recorder(&mut ed);

    assert!(ed.remove_layer(b));
    assert_eq!(ed.store().selected(), Some(c));
    assert_eq!(
        events.borrow().as_slice(),
        &[
            EditorEvent::LayerRemoved(b),
            EditorEvent::SelectionChanged(Some(c))
        ]
    );

    assert!(ed.remove_layer(c));
    assert_eq!(ed.store().selected(), Some(a));
    assert!(ed.remove_layer(a));
    assert_eq!(ed.store().selected(), None);
    assert!(!ed.remove_layer(a));
}

#[test]
fn duplicate_and_reorder_emit_events() {
    let mut ed = Editor::default();
    let a = add(&mut ed, "a", LayerKind::Asset, 4, 4);
    let b = add(&mut ed, "b", LayerKind::Asset, 4, 4);
    let events = recorder(&mut ed);

    let copy = ed.duplicate_layer(a).unwrap();
    assert_eq!(ed.store().index_of(copy), Some(1));
    assert_eq!(ed.layer(copy).unwrap().name, "a copy");
    assert_eq!(ed.store().selected(), Some(copy));

    assert!(!ed.bring_forward(b));
    assert!(ed.send_backward(b));
    assert!(ed.move_layer(0, 2));
    assert!(!ed.move_layer(9, 0));

    let events = events.borrow();
    assert_eq!(events[0], EditorEvent::LayerAdded(copy));
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == EditorEvent::LayersReordered)
            .count(),
        2
    );
}

#[test]
fn transform_session_commits_live() {
    let mut ed = Editor::default();
    let id = add(&mut ed, "shirt", LayerKind::Mockup, 200, 100);

    let handle = HandleKind::Resize(ResizeAxis::Uniform);
    assert!(ed.start_transform(id, handle, Point::new(150.0, 50.0)));
    assert!(ed.update_transform(Point::new(200.0, 50.0)));
    let p = ed.layer(id).unwrap().placement;
    assert!((p.scale_x - 2.0).abs() < 1e-12);
    assert!((p.scale_y - 2.0).abs() < 1e-12);
    ed.end_transform();
    assert!(ed.transform_session().is_none());
    assert!(!ed.update_transform(Point::new(300.0, 50.0)));

    assert!(ed.start_transform(id, HandleKind::Rotate, Point::new(200.0, 50.0)));
    assert!(ed.update_transform(Point::new(100.0, 150.0)));
    let r = ed.layer(id).unwrap().placement.rotation;
    assert!((r - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    ed.end_transform();
}

#[test]
fn zero_distance_transform_leaves_scale() {
    let mut ed = Editor::default();
    let id = add(&mut ed, "shirt", LayerKind::Mockup, 200, 100);
    let handle = HandleKind::Resize(ResizeAxis::Uniform);
    assert!(ed.start_transform(id, handle, Point::new(100.0, 50.0)));
    assert!(!ed.update_transform(Point::new(180.0, 90.0)));
    assert_eq!(ed.layer(id).unwrap().placement.scale_x, 1.0);
}

#[test]
fn removing_the_target_ends_the_transform() {
    let mut ed = Editor::default();
    let id = add(&mut ed, "a", LayerKind::Asset, 10, 10);
    assert!(ed.start_transform(id, HandleKind::Rotate, Point::new(0.0, 0.0)));
    ed.remove_layer(id);
    assert!(ed.transform_session().is_none());
}

#[test]
fn leaving_the_lasso_tool_discards_points() {
    let mut ed = Editor::default();
    add(&mut ed, "shirt", LayerKind::Mockup, 100, 100);
    lasso_square(&mut ed, 10.0, 10.0, 60.0, 60.0);
    assert_eq!(ed.lasso().points().len(), 4);
    ed.set_tool(Tool::Lasso);
    assert_eq!(ed.lasso().points().len(), 4);
    ed.set_tool(Tool::Move);
    assert!(ed.lasso().points().is_empty());
}

#[test]
fn extract_selection_creates_overlapping_cutout() {
    let mut ed = Editor::default();
    let src = add(&mut ed, "shirt", LayerKind::Mockup, 100, 100);
    ed.update_layer_adjustments(
        src,
        &AdjustmentsPatch {
            contrast: Some(150.0),
            ..AdjustmentsPatch::default()
        },
    );
    lasso_square(&mut ed, 10.0, 10.0, 60.0, 60.0);

    let cut = ed.extract_selection(src).unwrap();
    assert!(ed.lasso().points().is_empty());
    assert_eq!(ed.store().selected(), Some(cut));
    assert_eq!(ed.store().index_of(cut), Some(1));

    let source = ed.layer(src).unwrap();
    let piece = ed.layer(cut).unwrap();
    assert_eq!(piece.name, "shirt cutout");
    assert_eq!(piece.kind, LayerKind::Mockup);
    assert_eq!(piece.placement, source.placement);
    assert_eq!(piece.adjustments, source.adjustments);
    assert_eq!(piece.metadata.dpi, source.metadata.dpi);
    assert!(piece.source.is_none());
    assert_eq!(
        (piece.metadata.native_width, piece.metadata.native_height),
        (100, 100)
    );
    assert_eq!(piece.raster.full.pixel(30, 30), Some([255, 0, 0, 255]));
    assert_eq!(piece.raster.full.pixel(80, 80), Some([0, 0, 0, 0]));
    // Source untouched.
    assert_eq!(source.raster.full.pixel(30, 30), Some([255, 0, 0, 255]));
}

#[test]
fn erase_selection_clears_inside_only() {
    let mut ed = Editor::default();
    let src = add(&mut ed, "shirt", LayerKind::Mockup, 100, 100);
    lasso_square(&mut ed, 10.0, 10.0, 60.0, 60.0);
    let events = recorder(&mut ed);

    assert!(ed.erase_selection(src));
    let layer = ed.layer(src).unwrap();
    assert_eq!(layer.raster.full.pixel(30, 30), Some([0, 0, 0, 0]));
    assert_eq!(layer.raster.full.pixel(80, 80), Some([255, 0, 0, 255]));
    assert_eq!(layer.raster.proxy.pixel(30, 30), Some([0, 0, 0, 0]));
    assert_eq!(events.borrow().as_slice(), &[EditorEvent::RasterChanged(src)]);
    assert!(ed.lasso().points().is_empty());
    assert!(!ed.erase_selection(src));
}

#[test]
fn erase_does_not_leak_into_duplicates() {
    let mut ed = Editor::default();
    let src = add(&mut ed, "shirt", LayerKind::Mockup, 100, 100);
    let copy = ed.duplicate_layer(src).unwrap();
    assert!(Arc::ptr_eq(
        &ed.layer(src).unwrap().raster.full,
        &ed.layer(copy).unwrap().raster.full
    ));

    lasso_square(&mut ed, 10.0, 10.0, 60.0, 60.0);
    assert!(ed.erase_selection(src));
    assert_eq!(
        ed.layer(src).unwrap().raster.full.pixel(30, 30),
        Some([0, 0, 0, 0])
    );
    assert_eq!(
        ed.layer(copy).unwrap().raster.full.pixel(30, 30),
        Some([255, 0, 0, 255])
    );
}

#[test]
fn cut_selection_extracts_then_erases() {
    let mut ed = Editor::default();
    let src = add(&mut ed, "shirt", LayerKind::Mockup, 100, 100);
    lasso_square(&mut ed, 10.0, 10.0, 60.0, 60.0);
    let cut = ed.cut_selection(src).unwrap();
    assert_eq!(
        ed.layer(cut).unwrap().raster.full.pixel(30, 30),
        Some([255, 0, 0, 255])
    );
    assert_eq!(
        ed.layer(src).unwrap().raster.full.pixel(30, 30),
        Some([0, 0, 0, 0])
    );
    assert!(ed.lasso().points().is_empty());
}

#[test]
fn selection_commit_needs_three_points() {
    let mut ed = Editor::default();
    let src = add(&mut ed, "shirt", LayerKind::Mockup, 100, 100);
    ed.set_tool(Tool::Lasso);
    ed.start_lasso(Point::new(10.0, 10.0));
    ed.update_lasso(Point::new(60.0, 10.0));
    ed.end_lasso();

    assert!(ed.extract_selection(src).is_none());
    assert!(!ed.erase_selection(src));
    assert!(ed.cut_selection(src).is_none());
    assert_eq!(ed.layers().len(), 1);
    assert_eq!(ed.lasso().points().len(), 2);
    assert_eq!(
        ed.layer(src).unwrap().raster.full.pixel(30, 10),
        Some([255, 0, 0, 255])
    );
}

#[test]
fn lasso_follows_pan_and_zoom() {
    let mut ed = Editor::default();
    let src = add(&mut ed, "shirt", LayerKind::Mockup, 100, 100);
    assert!(ed.set_pan_zoom(Vec2::new(100.0, 100.0), 2.0));
    // Screen (120, 120) is workspace (10, 10).
    lasso_square(&mut ed, 120.0, 120.0, 220.0, 220.0);
    assert_eq!(ed.lasso().points()[0], Point::new(10.0, 10.0));
    assert_eq!(ed.lasso().bounding_box().width(), 50.0);

    assert!(ed.erase_selection(src));
    let layer = ed.layer(src).unwrap();
    assert_eq!(layer.raster.full.pixel(30, 30), Some([0, 0, 0, 0]));
    assert_eq!(layer.raster.full.pixel(5, 5), Some([255, 0, 0, 255]));
}

#[test]
fn rect_selection_measures_against_mockup() {
    let mut ed = Editor::default();
    let desc = LayerDescriptor::from_url("wide", LayerKind::Mockup, "https://cdn.test/w.png")
        .with_dpi(96.0);
    ed.add_layer_from_bytes(desc, &png(3780, 4, [0, 0, 0, 255]))
        .unwrap();

    ed.set_tool(Tool::RectSelect);
    assert!(ed.start_selection(Point::new(400.0, 0.0)));
    assert!(ed.update_selection(Point::new(22.0, 4.0)));
    ed.end_selection();
    assert!(!ed.update_selection(Point::new(0.0, 0.0)));

    let sel = ed.rect_selection();
    assert_eq!(sel.width(), 378.0);
    let dims = sel.dims();
    assert_eq!(dims.px_w, 378.0);
    let expected = 378.0 / 3780.0 * (3780.0 / 96.0 * 2.54);
    assert!((dims.cm_w - expected).abs() < 1e-9);
    assert!((dims.cm_w - 10.0).abs() < 0.002);

    let (mm, _) = dims.in_unit(measure::RulerUnit::Mm);
    assert!((mm - expected * 10.0).abs() < 1e-9);
}

#[test]
fn rect_and_lasso_end_each_other() {
    let mut ed = Editor::default();
    add(&mut ed, "shirt", LayerKind::Mockup, 100, 100);
    ed.set_tool(Tool::Lasso);
    ed.start_lasso(Point::new(1.0, 1.0));
    ed.start_selection(Point::new(5.0, 5.0));
    assert!(!ed.lasso().is_active());
    assert!(ed.rect_selection().is_active());
    ed.start_lasso(Point::new(2.0, 2.0));
    assert!(!ed.rect_selection().is_active());
    assert!(ed.lasso().is_active());
    ed.cancel_lasso();
    assert!(ed.lasso().points().is_empty());
}

#[test]
fn preview_mode_gates_pointer_tools() {
    let mut ed = Editor::default();
    add(&mut ed, "shirt", LayerKind::Mockup, 100, 100);
    ed.toggle_view_mode();
    assert_eq!(ed.workspace().view_mode, ViewMode::Preview);
    assert!(!ed.start_lasso(Point::new(1.0, 1.0)));

    ed.toggle_preview_interactivity();
    assert!(ed.start_lasso(Point::new(1.0, 1.0)));
    ed.update_lasso(Point::new(9.0, 1.0));
    ed.toggle_preview_interactivity();
    assert!(!ed.lasso().is_active());
    assert_eq!(ed.lasso().points().len(), 2);
}

#[test]
fn view_mode_round_trip_resets_preview_zoom_and_reframes() {
    let mut ed = Editor::default();
    ed.set_viewport_size(ViewportSize::new(1000.0, 500.0).unwrap());
    add(&mut ed, "shirt", LayerKind::Mockup, 200, 100);
    assert!(ed.set_pan_zoom(Vec2::ZERO, 1.0));

    ed.toggle_view_mode();
    assert!(ed.set_preview_zoom(3.0));
    assert!(!ed.set_preview_zoom(0.0));
    ed.toggle_view_mode();

    let ws = ed.workspace();
    assert_eq!(ws.view_mode, ViewMode::Edit);
    assert_eq!(ws.preview_zoom, 1.0);
    assert_eq!(ws.zoom, 2.0);
    assert_eq!(ws.pan, Vec2::new(300.0, 150.0));
}

#[test]
fn preview_measurement_uses_render_scale() {
    let mut ed = Editor::default();
    add(&mut ed, "shirt", LayerKind::Mockup, 100, 100);
    ed.toggle_view_mode();
    ed.toggle_preview_interactivity();
    assert!(ed.set_preview_render_scale(0.5));
    ed.start_selection(Point::new(0.0, 0.0));
    ed.update_selection(Point::new(10.0, 20.0));
    assert_eq!(ed.rect_selection().dims().px_w, 20.0);
    assert_eq!(ed.rect_selection().dims().px_h, 40.0);
}

#[test]
fn flip_rotate_and_resize_mockup() {
    let mut ed = Editor::default();
    assert!(!ed.flip_layer(FlipAxis::Horizontal));
    assert!(!ed.rotate_layer(90.0));
    assert!(!ed.resize_mockup(10.0, 10.0));

    let id = add(&mut ed, "shirt", LayerKind::Mockup, 200, 100);
    assert!(ed.flip_layer(FlipAxis::Horizontal));
    assert!(ed.layer(id).unwrap().adjustments.flip_h);
    assert!(ed.flip_layer(FlipAxis::Horizontal));
    assert!(!ed.layer(id).unwrap().adjustments.flip_h);
    assert!(ed.flip_layer(FlipAxis::Vertical));
    assert!(ed.layer(id).unwrap().adjustments.flip_v);

    assert!(ed.rotate_layer(90.0));
    assert!(ed.rotate_layer(90.0));
    let r = ed.layer(id).unwrap().placement.rotation;
    assert!((r - std::f64::consts::PI).abs() < 1e-12);

    assert!(ed.resize_mockup(400.0, 250.0));
    let l = ed.layer(id).unwrap();
    assert_eq!(l.placement.scale_x, 2.0);
    assert_eq!(l.placement.scale_y, 2.0);
    let doc = ed.workspace().document;
    assert_eq!((doc.width, doc.height), (400.0, 250.0));
}

#[test]
fn property_updates_ignore_unknown_ids_and_empty_patches() {
    let mut ed = Editor::default();
    let id = add(&mut ed, "a", LayerKind::Asset, 4, 4);
    let events = recorder(&mut ed);
    assert!(!ed.update_layer_properties(LayerId::new_v4(), &LayerPatch::position(1.0, 1.0)));
    assert!(!ed.update_layer_properties(id, &LayerPatch::default()));
    assert!(ed.update_layer_properties(id, &LayerPatch::from_json(r#"{"opacity": 0.25}"#).unwrap()));
    assert_eq!(ed.layer(id).unwrap().opacity, 0.25);
    assert_eq!(events.borrow().as_slice(), &[EditorEvent::LayerChanged(id)]);
}

#[test]
fn blob_retrieval_prefers_local_bytes() {
    let mut ed = Editor::default();
    let bytes = png(8, 8, [0, 255, 0, 255]);
    let local = ed
        .add_local_layer("logo.png", LayerKind::Asset, bytes.clone(), Some(300.0))
        .unwrap();
    assert_eq!(ed.layer(local).unwrap().metadata.dpi, 300.0);

    let never = |_: &str| -> anyhow::Result<Vec<u8>> { panic!("local layers must not fetch") };
    let blob = ed.get_layer_blob(local, &never).unwrap();
    assert_eq!(blob.as_slice(), bytes.as_slice());
}

#[test]
fn blob_retrieval_fetches_urls_and_swallows_failures() {
    let mut ed = Editor::default();
    let remote = add(&mut ed, "remote", LayerKind::Asset, 4, 4);

    let ok = |url: &str| -> anyhow::Result<Vec<u8>> { Ok(url.as_bytes().to_vec()) };
    let blob = ed.get_layer_blob(remote, &ok).unwrap();
    assert_eq!(blob.as_slice(), b"https://cdn.test/remote.png");

    let offline = |_: &str| -> anyhow::Result<Vec<u8>> { Err(anyhow::anyhow!("offline")) };
    assert!(ed.get_layer_blob(remote, &offline).is_none());
    assert!(ed.get_layer_blob(LayerId::new_v4(), &ok).is_none());
}

#[test]
fn generated_layers_export_png() {
    let mut ed = Editor::default();
    let src = add(&mut ed, "shirt", LayerKind::Mockup, 100, 100);
    lasso_square(&mut ed, 10.0, 10.0, 60.0, 60.0);
    let cut = ed.extract_selection(src).unwrap();

    let never = |_: &str| -> anyhow::Result<Vec<u8>> { panic!("generated layers must not fetch") };
    let blob = ed.get_layer_blob(cut, &never).unwrap();
    let decoded = image::load_from_memory(&blob).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (100, 100));
    assert_eq!(decoded.get_pixel(30, 30).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(80, 80).0[3], 0);
}

#[test]
fn ruler_source_tracks_selection() {
    let mut ed = Editor::default();
    let doc_only = ed.ruler_source();
    assert_eq!((doc_only.width, doc_only.height), (1920.0, 1080.0));

    let mockup = add(&mut ed, "shirt", LayerKind::Mockup, 200, 100);
    let logo = add(&mut ed, "logo", LayerKind::Asset, 20, 10);
    ed.update_layer_properties(logo, &LayerPatch::uniform_scale(2.0));
    let src = ed.ruler_source();
    assert_eq!((src.width, src.height), (40.0, 20.0));

    ed.deselect();
    let src = ed.ruler_source();
    assert_eq!((src.width, src.height), (200.0, 100.0));
    assert_eq!(src.origin, Point::new(0.0, 0.0));
    assert!(ed.select_layer(mockup));
    assert!(!ed.select_layer(mockup));
}

#[test]
fn unsubscribed_listeners_stop_receiving() {
    let mut ed = Editor::default();
    let hits = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&hits);
    let sub = ed.subscribe(move |_| *sink.borrow_mut() += 1);
    ed.set_ruler_unit(measure::RulerUnit::In);
    assert_eq!(*hits.borrow(), 1);
    assert!(ed.unsubscribe(sub));
    assert!(!ed.unsubscribe(sub));
    ed.set_grid_visible(false);
    ed.set_rulers_visible(false);
    assert_eq!(*hits.borrow(), 1);
    assert!(!ed.workspace().grid_visible);
    assert_eq!(ed.workspace().ruler_unit, measure::RulerUnit::In);
}

#[test]
fn pan_zoom_rejects_degenerate_zoom() {
    let mut ed = Editor::default();
    assert!(!ed.set_pan_zoom(Vec2::ZERO, 0.0));
    assert!(!ed.set_pan_zoom(Vec2::ZERO, f64::NAN));
    assert!(ed.set_pan_zoom(Vec2::new(3.0, 4.0), 0.5));
    assert_eq!(ed.workspace().zoom, 0.5);
}

#[test]
fn extract_selection_on_very_wide_layer() {
    let mut ed = Editor::default();
    let src = add(&mut ed, "banner", LayerKind::Asset, 70_000, 2);
    assert_eq!(ed.layer(src).unwrap().placement.center(), Point::new(960.0, 540.0));
    lasso_square(&mut ed, 955.0, 538.0, 965.0, 542.0);

    let cut = ed.extract_selection(src).unwrap();
    let piece = ed.layer(cut).unwrap();
    assert_eq!(piece.raster.full.width, 70_000);
    assert_eq!(piece.raster.full.pixel(35_000, 1), Some([255, 0, 0, 255]));
    assert_eq!(piece.raster.full.pixel(100, 1), Some([0, 0, 0, 0]));
    assert!(ed.lasso().points().is_empty());
}

#[test]
fn preview_mode_gates_transforms() {
    let mut ed = Editor::default();
    let id = add(&mut ed, "shirt", LayerKind::Mockup, 100, 100);
    ed.toggle_view_mode();
    assert!(!ed.start_transform(id, HandleKind::Rotate, Point::new(90.0, 50.0)));
    assert!(!ed.update_transform(Point::new(50.0, 90.0)));
    assert_eq!(ed.layer(id).unwrap().placement.rotation, 0.0);

    ed.toggle_preview_interactivity();
    assert!(ed.start_transform(id, HandleKind::Rotate, Point::new(90.0, 50.0)));
}

#[test]
fn cutout_kind_never_anchors_the_document() {
    let mut ed = Editor::default();
    let id = add(&mut ed, "piece", LayerKind::Cutout, 300, 200);
    assert_eq!(ed.layer(id).unwrap().kind, LayerKind::Cutout);
    assert_eq!(ed.workspace().document.width, 1920.0);
    assert!(ed.store().mockup_layer().is_none());
}
