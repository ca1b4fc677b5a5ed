use crate::foundation::error::{CanvasError, CanvasResult};

/// Premultiplied RGBA8 pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 bytes.
    pub rgba8_premul: Vec<u8>,
}

impl Surface {
    /// Fully transparent surface.
    pub fn new_transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba8_premul: vec![0; byte_len(width, height)],
        }
    }

    /// Wrap premultiplied bytes, checking the buffer length.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> CanvasResult<Self> {
        if rgba8_premul.len() != byte_len(width, height) {
            return Err(CanvasError::validation(format!(
                "surface {width}x{height} expects {} bytes, got {}",
                byte_len(width, height),
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul,
        })
    }

    /// Convert a straight-alpha image into a premultiplied surface.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let mut rgba8_premul = img.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);
        Self {
            width,
            height,
            rgba8_premul,
        }
    }

    /// Straight-alpha copy for encoders.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut straight = self.rgba8_premul.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        // Length is checked at construction.
        image::RgbaImage::from_raw(self.width, self.height, straight)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    /// Premultiplied pixel at `(x, y)`; `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.rgba8_premul[i..i + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// True when the surface has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/surface.rs"]
mod tests;
