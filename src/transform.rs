pub mod engine;

pub use engine::{CropRect, SpriteGeometry, Transform, TransformEngine};
