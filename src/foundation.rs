pub mod core;
pub mod error;
pub mod logging;
pub(crate) mod math;
