#![forbid(unsafe_code)]

//! Product mockup compositing: a design placed on a photo with a displacement warp and
//! realism overlays, previewed interactively and exported in batches.

pub mod assets;
pub mod batch;
pub mod effects;
pub mod encode;
pub mod foundation;
pub mod interaction;
pub mod render;
pub mod settings;
pub mod studio;
pub mod transform;

pub use assets::{
    PreparedImage,
    store::{TextureCache, TextureHandle},
};
pub use batch::{BatchExportPipeline, BatchJob, BatchProgress, BatchReport, FsHost, HostIo};
pub use encode::{encode_png, resize_image};
pub use foundation::core::{Affine, Canvas, Point, Rect, RgbColor, Vec2};
pub use foundation::error::{MockupError, MockupResult};
pub use foundation::logging::{LoggingConfig, init_logging};
pub use interaction::{InteractionController, PointerEvent};
pub use render::{CompositorStage, Surface};
pub use settings::{ExportFormat, ExportPreset, RenderSettings, SettingsStore};
pub use studio::Studio;
pub use transform::{CropRect, Transform, TransformEngine};
