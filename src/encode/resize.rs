//! Final export sizing and format conversion.

use image::{
    ExtendedColorType, ImageEncoder, Rgb, RgbImage, RgbaImage,
    codecs::{jpeg::JpegEncoder, webp::WebPEncoder},
    imageops::FilterType,
};

use crate::{
    encode::png::encode_rgba_png,
    foundation::{
        error::{MockupError, MockupResult},
        math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place},
    },
    settings::{ExportFormat, ExportPreset},
};

pub const WIDE_EXPORT_WIDTH: u32 = 2000;
pub const SQUARE_EXPORT_SIZE: u32 = 2048;
pub const JPEG_QUALITY: u8 = 98;

/// Target dimensions for `preset` applied to a `width x height` source.
pub fn target_size(
    width: u32,
    height: u32,
    preset: ExportPreset,
    custom_width: Option<u32>,
) -> MockupResult<(u32, u32)> {
    if width == 0 || height == 0 {
        return Err(MockupError::validation("cannot resize an empty image"));
    }
    let aspect = f64::from(width) / f64::from(height);
    let keep_aspect = |w: u32| (w, ((f64::from(w) / aspect).round() as u32).max(1));
    match preset {
        ExportPreset::Original => Ok((width, height)),
        ExportPreset::Wide2000 => Ok(keep_aspect(WIDE_EXPORT_WIDTH)),
        ExportPreset::Square2048 => Ok((SQUARE_EXPORT_SIZE, SQUARE_EXPORT_SIZE)),
        ExportPreset::Custom => match custom_width {
            Some(w) if w > 0 => Ok(keep_aspect(w)),
            _ => Err(MockupError::validation(
                "custom export preset needs a width > 0",
            )),
        },
    }
}

/// Decode `bytes`, resize per `preset` and encode as `format`.
///
/// Pure: identical inputs give identical bytes.
pub fn resize_image(
    bytes: &[u8],
    preset: ExportPreset,
    custom_width: Option<u32>,
    format: ExportFormat,
) -> MockupResult<Vec<u8>> {
    let src = image::load_from_memory(bytes)
        .map_err(|e| MockupError::decode(format!("export intermediate: {e}")))?
        .to_rgba8();
    let (w, h) = target_size(src.width(), src.height(), preset, custom_width)?;

    let sized = match preset {
        ExportPreset::Square2048 => contain_on_white(&src, w),
        _ => resample_rgba(&src, w, h),
    };
    encode_as(&sized, format)
}

/// Lanczos3 resize done in premultiplied space so transparent edges do not bleed color.
fn resample_rgba(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if src.width() == width && src.height() == height {
        return src.clone();
    }
    let mut premul = src.clone();
    premultiply_rgba8_in_place(&mut premul);
    let mut out = image::imageops::resize(&premul, width, height, FilterType::Lanczos3);
    unpremultiply_rgba8_in_place(&mut out);
    out
}

fn contain_on_white(src: &RgbaImage, size: u32) -> RgbaImage {
    let aspect = f64::from(src.width()) / f64::from(src.height());
    let (draw_w, draw_h) = if aspect > 1.0 {
        (size, ((f64::from(size) / aspect).round() as u32).max(1))
    } else {
        (((f64::from(size) * aspect).round() as u32).max(1), size)
    };
    let fitted = resample_rgba(src, draw_w, draw_h);

    let mut canvas = RgbaImage::from_pixel(size, size, image::Rgba([255, 255, 255, 255]));
    let x = i64::from((size - draw_w) / 2);
    let y = i64::from((size - draw_h) / 2);
    image::imageops::overlay(&mut canvas, &fitted, x, y);
    canvas
}

fn flatten_on_white(src: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(src.width(), src.height(), |x, y| {
        let [r, g, b, a] = src.get_pixel(x, y).0;
        let a = u32::from(a);
        let over_white = |c: u8| ((u32::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        Rgb([over_white(r), over_white(g), over_white(b)])
    })
}

fn encode_as(img: &RgbaImage, format: ExportFormat) -> MockupResult<Vec<u8>> {
    match format {
        ExportFormat::Png => encode_rgba_png(img),
        ExportFormat::Jpg => {
            let rgb = flatten_on_white(img);
            let mut out = Vec::new();
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
                .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                .map_err(|e| MockupError::encode(format!("jpeg encode: {e}")))?;
            Ok(out)
        }
        ExportFormat::Webp => {
            let mut out = Vec::new();
            WebPEncoder::new_lossless(&mut out)
                .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
                .map_err(|e| MockupError::encode(format!("webp encode: {e}")))?;
            Ok(out)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/resize.rs"]
mod tests;
