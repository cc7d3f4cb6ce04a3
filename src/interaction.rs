pub mod controller;

pub use controller::{Gesture, Guides, InteractionController, Modifiers, PointerEvent};
