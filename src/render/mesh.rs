//! Subdivided textured plane.
//!
//! The design is drawn as a `cols x rows` grid of quads (two triangles each) in texture pixel
//! space, mapped to the canvas by the sprite affine. Each covered pixel takes the bilinear
//! texture sample at its interpolated texture coordinate, masked by the crop rect.

use crate::{
    assets::PreparedImage,
    foundation::{
        core::{Affine, Point, Rect},
        error::{MockupError, MockupResult},
    },
    render::surface::{Surface, sample_bilinear_clamped},
};

/// Grid resolution of the design plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshGrid {
    pub cols: u32,
    pub rows: u32,
}

impl Default for MeshGrid {
    fn default() -> Self {
        Self::PREVIEW
    }
}

impl MeshGrid {
    pub const PREVIEW: Self = Self { cols: 20, rows: 20 };
    pub const EXPORT: Self = Self { cols: 40, rows: 40 };

    pub fn new(cols: u32, rows: u32) -> MockupResult<Self> {
        if cols == 0 || rows == 0 {
            return Err(MockupError::validation("mesh grid needs at least one cell"));
        }
        Ok(Self { cols, rows })
    }

    /// Vertex positions over a `width x height` plane, row-major, `(cols+1) * (rows+1)`.
    pub fn vertices(&self, width: f64, height: f64) -> Vec<Point> {
        let mut out = Vec::with_capacity(((self.cols + 1) * (self.rows + 1)) as usize);
        for r in 0..=self.rows {
            let y = height * f64::from(r) / f64::from(self.rows);
            for c in 0..=self.cols {
                out.push(Point::new(width * f64::from(c) / f64::from(self.cols), y));
            }
        }
        out
    }

    /// Triangle vertex indices, two per cell.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let stride = (self.cols + 1) as usize;
        (0..self.rows as usize).flat_map(move |r| {
            (0..self.cols as usize).flat_map(move |c| {
                let i0 = r * stride + c;
                let i1 = i0 + 1;
                let i2 = i0 + stride;
                let i3 = i2 + 1;
                [[i0, i1, i2], [i1, i3, i2]]
            })
        })
    }
}

/// One textured-plane draw call.
#[derive(Clone, Copy, Debug)]
pub struct MeshDraw<'a> {
    pub texture: &'a PreparedImage,
    /// Texture pixel space to target pixel space.
    pub local_to_canvas: Affine,
    /// Visible region in texture pixel space.
    pub mask: Rect,
    pub opacity: f32,
}

/// Rasterize `draw` into `dst`, overwriting covered pixels.
///
/// `dst` is expected to be the design's own offscreen layer, so shared triangle edges write
/// the same value twice instead of double-blending.
pub fn draw_textured_mesh(dst: &mut Surface, grid: MeshGrid, draw: &MeshDraw<'_>) -> MockupResult<()> {
    let tex = draw.texture;
    if tex.width == 0 || tex.height == 0 {
        return Err(MockupError::render("cannot draw an empty texture"));
    }
    if draw.local_to_canvas.determinant().abs() < 1e-12 {
        return Ok(());
    }
    let opacity = draw.opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return Ok(());
    }

    let tex_rect = Rect::new(0.0, 0.0, f64::from(tex.width), f64::from(tex.height));
    let visible = draw.mask.intersect(tex_rect);
    if visible.width() <= 0.0 || visible.height() <= 0.0 {
        return Ok(());
    }

    let local = grid.vertices(tex_rect.width(), tex_rect.height());
    let screen: Vec<Point> = local.iter().map(|&p| draw.local_to_canvas * p).collect();

    for [a, b, c] in grid.triangles() {
        raster_triangle(
            dst,
            [screen[a], screen[b], screen[c]],
            [local[a], local[b], local[c]],
            |u, v| {
                if !rect_contains(visible, u, v) {
                    return None;
                }
                let s = sample_bilinear_clamped(
                    &tex.rgba8_premul,
                    tex.width,
                    tex.height,
                    u as f32,
                    v as f32,
                );
                Some(s.map(|ch| (ch * opacity).round().clamp(0.0, 255.0) as u8))
            },
        );
    }
    Ok(())
}

fn rect_contains(r: Rect, x: f64, y: f64) -> bool {
    x >= r.x0 && x < r.x1 && y >= r.y0 && y < r.y1
}

fn edge(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

fn raster_triangle<F>(dst: &mut Surface, screen: [Point; 3], uv: [Point; 3], shade: F)
where
    F: Fn(f64, f64) -> Option<[u8; 4]>,
{
    let [p0, p1, p2] = screen;
    let area = edge(p0, p1, p2);
    if area.abs() < 1e-12 {
        return;
    }

    let min_x = p0.x.min(p1.x).min(p2.x).floor().max(0.0) as i64;
    let min_y = p0.y.min(p1.y).min(p2.y).floor().max(0.0) as i64;
    let max_x = (p0.x.max(p1.x).max(p2.x).ceil() as i64).min(i64::from(dst.width) - 1);
    let max_y = (p0.y.max(p1.y).max(p2.y).ceil() as i64).min(i64::from(dst.height) - 1);
    if min_x > max_x || min_y > max_y {
        return;
    }

    const EPS: f64 = 1e-9;
    let width = dst.width as usize;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let w0 = edge(p1, p2, p) / area;
            let w1 = edge(p2, p0, p) / area;
            let w2 = edge(p0, p1, p) / area;
            if w0 < -EPS || w1 < -EPS || w2 < -EPS {
                continue;
            }
            let u = w0 * uv[0].x + w1 * uv[1].x + w2 * uv[2].x;
            let v = w0 * uv[0].y + w1 * uv[1].y + w2 * uv[2].y;
            if let Some(px) = shade(u, v) {
                let idx = (y as usize * width + x as usize) * 4;
                dst.data[idx..idx + 4].copy_from_slice(&px);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/mesh.rs"]
mod tests;
