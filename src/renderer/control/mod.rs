//! Interactive controls
//!
//! Keyboard bindings for the light and overlay parameters.

mod light;

pub use light::LightControl;
