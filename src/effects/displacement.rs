//! Luminance-driven displacement ("volume map") used to bend the design along fabric folds.

use crate::{
    assets::PreparedImage,
    effects::{
        blur::{EdgeMode, gaussian_blur_gray},
        color_matrix::ColorMatrix,
    },
    foundation::{
        core::Canvas,
        error::{MockupError, MockupResult},
        math::lerp,
    },
    render::surface::{Surface, resample_image, sample_bilinear},
};

/// Volume-map blur sigma as a fraction of the shorter canvas side.
///
/// The visible support of a Gaussian is about 3 sigma, so this spreads each fold over 9% of
/// the reference dimension.
pub const VOLUME_BLUR_SIGMA_FRACTION: f32 = 0.03;

/// Sub-samples per axis taken for every output pixel of the displacement.
pub const DISPLACEMENT_RESOLUTION: u32 = 2;

/// Blurred grayscale field derived from the mockup. Never drawn; read by [`Displacement`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VolumeMap {
    pub width: u32,
    pub height: u32,
    /// One byte per pixel, row-major.
    pub data: Vec<u8>,
}

impl VolumeMap {
    /// Resample the mockup to `target`, desaturate and blur it.
    pub fn build(source: &PreparedImage, target: Canvas) -> MockupResult<Self> {
        let resampled = resample_image(source, target)?;
        Self::from_surface(&resampled)
    }

    /// Same as [`VolumeMap::build`] for a mockup that is already at target size.
    pub fn from_surface(surface: &Surface) -> MockupResult<Self> {
        let mut gray_rgba = vec![0u8; surface.data.len()];
        ColorMatrix::desaturate().apply_rgba8_premul(&surface.data, &mut gray_rgba)?;
        let gray: Vec<u8> = gray_rgba.chunks_exact(4).map(|px| px[0]).collect();

        let sigma = VOLUME_BLUR_SIGMA_FRACTION * surface.width.min(surface.height) as f32;
        let data = gaussian_blur_gray(&gray, surface.width, surface.height, sigma, EdgeMode::Wrap)?;
        Ok(Self {
            width: surface.width,
            height: surface.height,
            data,
        })
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Bilinear read in `0..1` with repeat addressing, so any coordinate is valid.
    pub fn sample_wrapped(&self, x: f32, y: f32) -> f32 {
        let fx = x - 0.5;
        let fy = y - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;

        let w = i64::from(self.width);
        let h = i64::from(self.height);
        let at = |xi: i64, yi: i64| {
            let xi = xi.rem_euclid(w) as usize;
            let yi = yi.rem_euclid(h) as usize;
            f32::from(self.data[yi * self.width as usize + xi])
        };
        let (x0, y0) = (x0 as i64, y0 as i64);
        let top = lerp(at(x0, y0), at(x0 + 1, y0), tx);
        let bottom = lerp(at(x0, y0 + 1), at(x0 + 1, y0 + 1), tx);
        lerp(top, bottom, ty) / 255.0
    }
}

/// Displacement operator applied to the design container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Displacement {
    /// Maximum offset in output pixels for a map value of 0 or 1 is `strength / 2`.
    pub strength: f32,
    pub resolution: u32,
}

impl Displacement {
    pub fn new(strength: f32) -> Self {
        Self {
            strength,
            resolution: DISPLACEMENT_RESOLUTION,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.strength == 0.0
    }

    /// Warp `src` through `map`: each output pixel reads `src` at `p + (m(p) - 0.5) * strength`.
    pub fn apply(&self, map: &VolumeMap, src: &Surface) -> MockupResult<Surface> {
        if map.width != src.width || map.height != src.height {
            return Err(MockupError::render(format!(
                "volume map is {}x{} but the layer is {}x{}",
                map.width, map.height, src.width, src.height
            )));
        }
        if !self.strength.is_finite() {
            return Err(MockupError::validation("displacement strength must be finite"));
        }
        if self.is_identity() {
            return Ok(src.clone());
        }

        let mut out = Surface::new(src.canvas())?;
        let Some(region) = self.affected_region(src) else {
            return Ok(out);
        };

        let res = self.resolution.max(1);
        let inv_samples = 1.0 / (res * res) as f32;
        let width = src.width as usize;
        for y in region.1..region.3 {
            for x in region.0..region.2 {
                let mut acc = [0.0f32; 4];
                for j in 0..res {
                    for i in 0..res {
                        let sx = x as f32 + (i as f32 + 0.5) / res as f32;
                        let sy = y as f32 + (j as f32 + 0.5) / res as f32;
                        let off = (map.sample_wrapped(sx, sy) - 0.5) * self.strength;
                        let s = sample_bilinear(&src.data, src.width, src.height, sx + off, sy + off);
                        for c in 0..4 {
                            acc[c] += s[c];
                        }
                    }
                }
                let idx = (y as usize * width + x as usize) * 4;
                for c in 0..4 {
                    out.data[idx + c] = (acc[c] * inv_samples).round().clamp(0.0, 255.0) as u8;
                }
                // keep premultiplied invariant after rounding
                let a = out.data[idx + 3];
                for c in 0..3 {
                    out.data[idx + c] = out.data[idx + c].min(a);
                }
            }
        }
        Ok(out)
    }

    /// Pixel box `(x0, y0, x1, y1)` that can receive non-transparent output.
    fn affected_region(&self, src: &Surface) -> Option<(u32, u32, u32, u32)> {
        let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0u32, 0u32);
        for (i, px) in src.data.chunks_exact(4).enumerate() {
            if px[3] == 0 {
                continue;
            }
            let x = (i % src.width as usize) as u32;
            let y = (i / src.width as usize) as u32;
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x + 1);
            y1 = y1.max(y + 1);
        }
        if x0 == u32::MAX {
            return None;
        }
        let pad = (self.strength.abs() * 0.5).ceil() as u32 + 2;
        Some((
            x0.saturating_sub(pad),
            y0.saturating_sub(pad),
            x1.saturating_add(pad).min(src.width),
            y1.saturating_add(pad).min(src.height),
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/displacement.rs"]
mod tests;
