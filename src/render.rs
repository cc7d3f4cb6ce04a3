pub mod mesh;
pub mod stage;
pub mod surface;

pub use mesh::{MeshDraw, MeshGrid, draw_textured_mesh};
pub use stage::{
    CompositorStage, DesignLayer, LayerRole, LayerStack, StageKind, build_layer_stack,
};
pub use surface::{Surface, resample_image};
