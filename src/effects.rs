//! CPU image kernels used by the compositor stage.

pub mod blend;
pub mod blur;
pub mod color_matrix;
pub mod displacement;
pub mod realism;
