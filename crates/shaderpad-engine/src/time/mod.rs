//! Time subsystem.
//!
//! The frame clock is the scheduler interface of the runtime: one tick per
//! presented frame, carrying a monotonically increasing millisecond timestamp
//! that drives time uniforms.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
