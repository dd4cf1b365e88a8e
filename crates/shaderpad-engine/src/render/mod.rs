//! GPU rendering subsystem.
//!
//! Passes own their GPU resources (pipeline, bind group, uniform buffer) for
//! their whole lifetime; nothing is recreated per frame.
//!
//! Convention:
//! - one uniform block per pass at group 0, binding 0, fragment stage
//! - fullscreen geometry is generated in the vertex shader (no vertex buffers)

mod ctx;
mod fullscreen;

pub use ctx::{RenderCtx, RenderTarget};
pub use fullscreen::{FullscreenPass, PassConfig};
