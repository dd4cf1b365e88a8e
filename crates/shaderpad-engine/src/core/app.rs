use winit::event::WindowEvent;
use winit::window::WindowId;

use super::ctx::FrameCtx;
use crate::device::Gpu;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by the runtime, all on the event-loop thread.
///
/// Call order: `on_init` once the GPU exists, `on_resize` with the initial
/// size, then `on_frame` once per redraw with `on_resize` whenever the
/// drawable size changes.
pub trait App {
    /// Builds GPU resources. An error stops the runtime and is returned from
    /// `Runtime::run`.
    fn on_init(&mut self, gpu: &Gpu<'_>) -> anyhow::Result<()> {
        let _ = gpu;
        Ok(())
    }

    /// Called with the drawable size in physical pixels; never with a zero
    /// dimension.
    fn on_resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Called for window events.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
