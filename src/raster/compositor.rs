use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    foundation::error::{CanvasError, CanvasResult},
    foundation::math::scale_premul_px,
    layers::model::RasterSet,
    raster::{
        clip::{ClipPath, CoverageMask},
        proxy::resample,
        surface::Surface,
    },
};

/// Copy of `full` restricted to `clip`; pixels outside the polygon become transparent.
///
/// The result has the source's native size so it can be placed at the source's
/// position and overlap its origin exactly.
#[tracing::instrument(skip(full, clip), fields(w = full.width, h = full.height))]
pub fn extract_to_surface(full: &Surface, clip: &ClipPath) -> CanvasResult<Surface> {
    check_surface(full)?;
    let coverage = clip.rasterize_coverage(full.width, full.height)?;
    let mut out = Surface::new_transparent(full.width, full.height);
    if coverage.is_empty() {
        return Ok(out);
    }
    let stride = full.width as usize * 4;
    let rows = coverage.y as usize * stride..(coverage.y + coverage.height) as usize * stride;
    out.rgba8_premul[rows.clone()].copy_from_slice(&full.rgba8_premul[rows]);
    apply_coverage(&mut out, &coverage, |c| c);
    Ok(out)
}

/// Clear pixels inside `clip` (destination-out) on the full surface, then re-derive the
/// proxy at its existing size. Irreversible.
///
/// A full surface shared with another layer is copied before it is written. On error
/// the set is left untouched.
#[tracing::instrument(skip(set, clip), fields(w = set.full.width, h = set.full.height))]
pub fn erase_in_place(set: &mut RasterSet, clip: &ClipPath) -> CanvasResult<()> {
    check_surface(&set.full)?;
    let coverage = clip.rasterize_coverage(set.full.width, set.full.height)?;
    if coverage.is_empty() {
        return Ok(());
    }

    let proxy_is_full = Arc::ptr_eq(&set.full, &set.proxy);
    let proxy_size = (set.proxy.width, set.proxy.height);
    if proxy_is_full {
        // Drop our own second handle so make_mut only copies for foreign owners.
        set.proxy = Arc::new(Surface::new_transparent(0, 0));
    }

    apply_coverage(Arc::make_mut(&mut set.full), &coverage, |c| 255 - c);

    if proxy_is_full {
        set.proxy = Arc::clone(&set.full);
    } else {
        set.proxy = Arc::new(resample(&set.full, proxy_size.0, proxy_size.1)?);
    }
    Ok(())
}

fn check_surface(surface: &Surface) -> CanvasResult<()> {
    if surface.rgba8_premul.len() != surface.width as usize * surface.height as usize * 4 {
        return Err(CanvasError::raster(format!(
            "surface {}x{} holds {} bytes",
            surface.width,
            surface.height,
            surface.rgba8_premul.len()
        )));
    }
    Ok(())
}

/// Scale the window rows of `surface` by `weight(coverage)`; rows outside the window
/// are left alone. `surface` must have passed `check_surface`.
fn apply_coverage(
    surface: &mut Surface,
    coverage: &CoverageMask,
    weight: impl Fn(u8) -> u8 + Sync,
) {
    if coverage.is_empty() {
        return;
    }
    let stride = surface.width as usize * 4;
    let (x0, x1) = (coverage.x as usize * 4, (coverage.x + coverage.width) as usize * 4);
    let (y0, y1) = (coverage.y as usize, (coverage.y + coverage.height) as usize);
    let outside = weight(0);
    surface.rgba8_premul[y0 * stride..y1 * stride]
        .par_chunks_exact_mut(stride)
        .zip(coverage.data.par_chunks_exact(coverage.width as usize))
        .for_each(|(row, mask_row)| {
            let (left, rest) = row.split_at_mut(x0);
            let (inside, right) = rest.split_at_mut(x1 - x0);
            if outside != 255 {
                left.fill(0);
                right.fill(0);
            }
            for (px, &c) in inside.chunks_exact_mut(4).zip(mask_row) {
                scale_premul_px(px, weight(c));
            }
        });
}

#[cfg(test)]
#[path = "../../tests/unit/raster/compositor.rs"]
mod tests;
