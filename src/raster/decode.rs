use anyhow::Context;

use crate::{
    foundation::error::{CanvasError, CanvasResult},
    raster::surface::Surface,
};

/// Decode encoded image bytes into a premultiplied surface.
///
/// Pure and `Send`-friendly: collaborators may run it on a worker thread and hand the
/// result to [`crate::Editor::complete_add_layer`].
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_raster(bytes: &[u8]) -> CanvasResult<Surface> {
    if bytes.is_empty() {
        return Err(CanvasError::decode("empty raster bytes"));
    }
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(Surface::from_rgba_image(dyn_img.to_rgba8()))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/decode.rs"]
mod tests;
