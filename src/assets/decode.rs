use std::sync::Arc;

use crate::{
    assets::PreparedImage,
    foundation::error::{MockupError, MockupResult},
    foundation::math::premultiply_rgba8_in_place,
};

/// Decode PNG/JPEG/WebP bytes into a premultiplied texture.
///
/// Zero-sized images are rejected so downstream geometry never divides by zero.
pub fn decode_image(bytes: &[u8]) -> MockupResult<PreparedImage> {
    if bytes.is_empty() {
        return Err(MockupError::decode("image bytes are empty"));
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| MockupError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(MockupError::decode(format!(
            "decoded image has zero dimension ({width}x{height})"
        )));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
