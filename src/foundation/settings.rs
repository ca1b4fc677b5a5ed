use crate::foundation::core::DocumentSize;

/// Longest raster side kept at full size for interactive display.
pub const MAX_RENDER_SIZE: u32 = 4096;
/// DPI assumed when a layer carries none.
pub const DEFAULT_DPI: f64 = 96.0;
/// Lower bound for `scale_x` / `scale_y`.
pub const MIN_SCALE: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Engine-wide tunables.
pub struct EngineSettings {
    /// Proxy ceiling: rasters larger than this on either side get a down-sampled proxy.
    pub max_render_size: u32,
    /// DPI used when a layer descriptor does not specify one.
    pub default_dpi: f64,
    /// Scale floor applied by transforms and property patches.
    pub min_scale: f64,
    /// Fraction of the viewport a framed layer may occupy.
    pub frame_padding: f64,
    /// Upper bound for the zoom chosen by framing.
    pub max_frame_zoom: f64,
    /// Document size before any mockup layer is loaded.
    pub default_document: DocumentSize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_render_size: MAX_RENDER_SIZE,
            default_dpi: DEFAULT_DPI,
            min_scale: MIN_SCALE,
            frame_padding: 0.8,
            max_frame_zoom: 2.0,
            default_document: DocumentSize {
                width: 1920.0,
                height: 1080.0,
            },
        }
    }
}

impl EngineSettings {
    /// Defaults overlaid with `MOCKUP_MAX_RENDER_SIZE` / `MOCKUP_DEFAULT_DPI`.
    ///
    /// Unparseable or non-positive values are ignored.
    pub fn from_env() -> Self {
        let mut out = Self::default();
        if let Some(n) = std::env::var("MOCKUP_MAX_RENDER_SIZE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&n| n > 0)
        {
            out.max_render_size = n;
        }
        if let Some(dpi) = std::env::var("MOCKUP_DEFAULT_DPI")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
        {
            out.default_dpi = dpi;
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/settings.rs"]
mod tests;
