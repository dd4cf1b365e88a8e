//! Shaderpad engine crate.
//!
//! Fullscreen fragment-shader runtime: a typed uniform tree packed into one
//! std140-style block, a fullscreen pass that uploads it every frame, and the
//! window/GPU plumbing that drives the app.

pub mod core;
pub mod device;
pub mod logging;
pub mod render;
pub mod time;
pub mod uniforms;
pub mod window;
