use image::{RgbaImage, imageops::FilterType};

use crate::{
    assets::PreparedImage,
    foundation::{
        core::Canvas,
        error::{MockupError, MockupResult},
        math::lerp,
    },
};

/// Premultiplied RGBA8 render target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(canvas: Canvas) -> MockupResult<Self> {
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; canvas.byte_len()?],
        })
    }

    pub fn from_image(image: &PreparedImage) -> Self {
        Self {
            width: image.width,
            height: image.height,
            data: image.rgba8_premul.as_ref().clone(),
        }
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        sample_px(&self.data, self.width, self.height, x as i64, y as i64)
    }

    /// Bilinear sample at continuous pixel coordinates; transparent outside the surface.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> [f32; 4] {
        sample_bilinear(&self.data, self.width, self.height, x, y)
    }
}

/// Resample a decoded image to exactly `target`, in premultiplied space.
pub fn resample_image(image: &PreparedImage, target: Canvas) -> MockupResult<Surface> {
    if image.width == target.width && image.height == target.height {
        return Ok(Surface::from_image(image));
    }
    let src = RgbaImage::from_raw(
        image.width,
        image.height,
        image.rgba8_premul.as_ref().clone(),
    )
    .ok_or_else(|| MockupError::render("image buffer does not match its dimensions"))?;
    let out = image::imageops::resize(&src, target.width, target.height, FilterType::Triangle);
    Ok(Surface {
        width: target.width,
        height: target.height,
        data: out.into_raw(),
    })
}

pub(crate) fn sample_px(src: &[u8], width: u32, height: u32, x: i64, y: i64) -> [u8; 4] {
    if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
        return [0, 0, 0, 0];
    }
    let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
    [src[idx], src[idx + 1], src[idx + 2], src[idx + 3]]
}

/// Bilinear fetch with pixel centers at `i + 0.5`. Returns premultiplied `0..255` floats.
pub(crate) fn sample_bilinear(src: &[u8], width: u32, height: u32, x: f32, y: f32) -> [f32; 4] {
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = sample_px(src, width, height, x0, y0);
    let p10 = sample_px(src, width, height, x0 + 1, y0);
    let p01 = sample_px(src, width, height, x0, y0 + 1);
    let p11 = sample_px(src, width, height, x0 + 1, y0 + 1);

    let mut out = [0.0f32; 4];
    for (c, o) in out.iter_mut().enumerate() {
        let top = lerp(f32::from(p00[c]), f32::from(p10[c]), tx);
        let bottom = lerp(f32::from(p01[c]), f32::from(p11[c]), tx);
        *o = lerp(top, bottom, ty);
    }
    out
}

/// Bilinear fetch with clamp-to-edge addressing, for texture reads inside the texture rect.
pub(crate) fn sample_bilinear_clamped(
    src: &[u8],
    width: u32,
    height: u32,
    x: f32,
    y: f32,
) -> [f32; 4] {
    let x = x.clamp(0.5, width as f32 - 0.5);
    let y = y.clamp(0.5, height as f32 - 0.5);
    sample_bilinear(src, width, height, x, y)
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
