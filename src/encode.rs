pub mod png;
pub mod resize;

pub use png::encode_png;
pub use resize::resize_image;
