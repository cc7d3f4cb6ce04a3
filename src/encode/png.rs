use image::{ExtendedColorType, ImageEncoder, RgbaImage, codecs::png::PngEncoder};

use crate::{
    foundation::{
        error::{MockupError, MockupResult},
        math::unpremultiply_rgba8_in_place,
    },
    render::surface::Surface,
};

/// Straight-alpha copy of a premultiplied surface.
pub fn surface_to_rgba_image(surface: &Surface) -> MockupResult<RgbaImage> {
    let mut data = surface.data.clone();
    unpremultiply_rgba8_in_place(&mut data);
    RgbaImage::from_raw(surface.width, surface.height, data)
        .ok_or_else(|| MockupError::encode("surface buffer does not match its dimensions"))
}

/// Lossless PNG of a rendered surface (the intermediate handed to the export resizer).
pub fn encode_png(surface: &Surface) -> MockupResult<Vec<u8>> {
    let rgba = surface_to_rgba_image(surface)?;
    encode_rgba_png(&rgba)
}

pub(crate) fn encode_rgba_png(rgba: &RgbaImage) -> MockupResult<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| MockupError::encode(format!("png encode: {e}")))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
