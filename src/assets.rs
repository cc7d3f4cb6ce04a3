use std::sync::Arc;

pub mod decode;
pub mod store;

/// Decoded raster in premultiplied RGBA8 form.
///
/// Cloning is cheap: the pixel buffer is shared. Two images are the same texture exactly
/// when they share the buffer (see [`PreparedImage::buffer_id`]).
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Identity of the underlying decoded buffer.
    pub fn buffer_id(&self) -> usize {
        Arc::as_ptr(&self.rgba8_premul) as usize
    }

    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }
}
