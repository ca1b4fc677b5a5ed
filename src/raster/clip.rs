use crate::{
    foundation::core::{Affine, BezPath, Point, Rect},
    foundation::error::{CanvasError, CanvasResult},
};

/// Minimum vertex count of a clip polygon.
pub const MIN_CLIP_POINTS: usize = 3;

/// Closed polygon in layer-local pixel space masking a raster operation.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipPath {
    points: Vec<Point>,
    path: BezPath,
}

impl ClipPath {
    /// Connect `points` in order and close the polygon.
    ///
    /// `None` for fewer than [`MIN_CLIP_POINTS`] points or any non-finite coordinate.
    pub fn from_layer_points(points: &[Point]) -> Option<Self> {
        if points.len() < MIN_CLIP_POINTS {
            return None;
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return None;
        }
        let mut path = BezPath::new();
        path.move_to(points[0]);
        for p in &points[1..] {
            path.line_to(*p);
        }
        path.close_path();
        Some(Self {
            points: points.to_vec(),
            path,
        })
    }

    /// Polygon vertices in input order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Closed path form.
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// Axis-aligned bounds of the polygon.
    pub fn bounds(&self) -> Rect {
        let first = self.points[0];
        self.points[1..]
            .iter()
            .fold(Rect::from_points(first, first), |r, p| {
                r.union_pt(*p)
            })
    }

    /// Rasterize the polygon (non-zero fill, anti-aliased) over a `width` x `height`
    /// surface.
    ///
    /// Only the polygon's bounds clipped to the surface are rendered, in tiles of at
    /// most [`COVERAGE_TILE`] pixels per side, so surface size is not bounded by the
    /// rasterizer.
    #[tracing::instrument(skip(self), fields(points = self.points.len()))]
    pub fn rasterize_coverage(&self, width: u32, height: u32) -> CanvasResult<CoverageMask> {
        let Some((x0, y0, x1, y1)) = self.pixel_window(width, height) else {
            return Ok(CoverageMask::default());
        };
        let mut mask = CoverageMask {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
            data: vec![0; (x1 - x0) as usize * (y1 - y0) as usize],
        };

        let mut ty = y0;
        while ty < y1 {
            let th = COVERAGE_TILE.min(y1 - ty);
            let mut tx = x0;
            while tx < x1 {
                let tw = COVERAGE_TILE.min(x1 - tx);
                let tile = self.rasterize_tile(tx, ty, tw, th)?;
                for row in 0..th {
                    let dst =
                        (ty - y0 + row) as usize * mask.width as usize + (tx - x0) as usize;
                    let src = row as usize * tw as usize;
                    mask.data[dst..dst + tw as usize]
                        .copy_from_slice(&tile[src..src + tw as usize]);
                }
                tx += tw;
            }
            ty += th;
        }
        Ok(mask)
    }

    /// Integer pixel window `[x0, x1) x [y0, y1)` of the bounds inside the surface.
    fn pixel_window(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let b = self.bounds();
        let clamp = |v: f64, max: u32| v.clamp(0.0, f64::from(max)) as u32;
        let x0 = clamp(b.x0.floor(), width);
        let y0 = clamp(b.y0.floor(), height);
        let x1 = clamp(b.x1.ceil(), width);
        let y1 = clamp(b.y1.ceil(), height);
        (x1 > x0 && y1 > y0).then_some((x0, y0, x1, y1))
    }

    fn rasterize_tile(&self, tx: u32, ty: u32, tw: u32, th: u32) -> CanvasResult<Vec<u8>> {
        let w: u16 = tw
            .try_into()
            .map_err(|_| CanvasError::raster("clip tile width exceeds u16"))?;
        let h: u16 = th
            .try_into()
            .map_err(|_| CanvasError::raster("clip tile height exceeds u16"))?;

        let mut local = self.path.clone();
        local.apply_affine(Affine::translate((-f64::from(tx), -f64::from(ty))));
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        ctx.fill_path(&bezpath_to_cpu(&local));
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|px| px[3])
            .collect())
    }
}

/// Largest side of one rasterized coverage tile.
pub const COVERAGE_TILE: u32 = 4096;

/// 8-bit coverage over a window of a surface; pixels outside the window have none.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoverageMask {
    /// Window left edge in surface pixels.
    pub x: u32,
    /// Window top edge in surface pixels.
    pub y: u32,
    /// Window width.
    pub width: u32,
    /// Window height.
    pub height: u32,
    /// Row-major coverage of the window.
    pub data: Vec<u8>,
}

impl CoverageMask {
    /// Coverage at surface pixel `(x, y)`.
    pub fn at(&self, x: u32, y: u32) -> u8 {
        if x < self.x || y < self.y {
            return 0;
        }
        let (lx, ly) = (x - self.x, y - self.y);
        if lx >= self.width || ly >= self.height {
            return 0;
        }
        self.data[ly as usize * self.width as usize + lx as usize]
    }

    /// True when no pixel is covered by the window.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/raster/clip.rs"]
mod tests;
