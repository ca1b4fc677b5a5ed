use std::sync::Arc;

use image::imageops::FilterType;

use crate::{
    foundation::error::{CanvasError, CanvasResult},
    layers::model::RasterSet,
    raster::surface::Surface,
};

/// Uniform down-sample ratio for a raster of `width` x `height`.
///
/// `None` when both sides fit under `ceiling` (the proxy is the full surface).
pub fn proxy_ratio(width: u32, height: u32, ceiling: u32) -> Option<f64> {
    if ceiling == 0 || (width <= ceiling && height <= ceiling) {
        return None;
    }
    let longest = width.max(height);
    Some(f64::from(ceiling) / f64::from(longest))
}

/// Proxy pixel size for a given ratio; each side is at least one pixel.
pub fn proxy_dimensions(width: u32, height: u32, ratio: f64) -> (u32, u32) {
    // Absorb rounding so the longest side lands exactly on the ceiling.
    let scale = |v: u32| ((f64::from(v) * ratio + 1e-9).floor() as u32).max(1);
    (scale(width), scale(height))
}

/// Resample a premultiplied surface to `width` x `height`.
///
/// Filtering runs on premultiplied bytes so transparent pixels do not bleed colour.
#[tracing::instrument(skip(src), fields(src_w = src.width, src_h = src.height))]
pub fn resample(src: &Surface, width: u32, height: u32) -> CanvasResult<Surface> {
    if width == 0 || height == 0 {
        return Err(CanvasError::validation("resample target must be non-empty"));
    }
    if src.width == width && src.height == height {
        return Ok(src.clone());
    }
    let buf = image::RgbaImage::from_raw(src.width, src.height, src.rgba8_premul.clone())
        .ok_or_else(|| CanvasError::raster("surface byte length mismatch"))?;
    let resized = image::imageops::resize(&buf, width, height, FilterType::Triangle);
    Surface::from_premul(width, height, resized.into_raw())
}

/// Build the full/proxy pair for a freshly decoded surface.
pub fn build_raster_set(full: Surface, ceiling: u32) -> CanvasResult<RasterSet> {
    let full = Arc::new(full);
    let Some(ratio) = proxy_ratio(full.width, full.height, ceiling) else {
        return Ok(RasterSet {
            proxy: Arc::clone(&full),
            full,
        });
    };
    let (w, h) = proxy_dimensions(full.width, full.height, ratio);
    let proxy = resample(&full, w, h)?;
    tracing::debug!(
        full_w = full.width,
        full_h = full.height,
        proxy_w = w,
        proxy_h = h,
        "built down-sampled proxy"
    );
    Ok(RasterSet {
        full,
        proxy: Arc::new(proxy),
    })
}

/// Re-derive the proxy from the full surface, keeping the proxy's current size.
pub fn regenerate_proxy(set: &mut RasterSet) -> CanvasResult<()> {
    if !set.is_downsampled() {
        set.proxy = Arc::clone(&set.full);
        return Ok(());
    }
    let proxy = resample(&set.full, set.proxy.width, set.proxy.height)?;
    set.proxy = Arc::new(proxy);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/raster/proxy.rs"]
mod tests;
