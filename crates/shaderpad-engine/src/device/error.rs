/// Outcome of a failed surface acquisition.
///
/// Every variant except `Fatal` means "skip this frame"; the next redraw
/// retries acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured (lost/outdated); retry next frame.
    Reconfigured,
    /// Transient error (timeout/other); skip the current frame.
    SkipFrame,
    /// Unrecoverable (out of memory); stop the loop.
    Fatal,
}

impl SurfaceErrorAction {
    #[inline]
    pub fn is_fatal(self) -> bool {
        self == SurfaceErrorAction::Fatal
    }
}
