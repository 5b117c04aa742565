//! Frame-coalesced repaint requests
//!
//! Pointer moves arrive far more often than frames are drawn. A [`FrameGate`]
//! folds every repaint request made between two frames into one, so a live
//! preview is redrawn at most once per frame no matter how many moves hit it.

/// Coalescing gate between repaint requests and frames
///
/// # Example
///
/// ```
/// use pdf_studio_scheduler::FrameGate;
///
/// let mut gate = FrameGate::new();
/// assert!(gate.request());
/// assert!(!gate.request());
///
/// assert!(gate.begin_frame());
/// assert!(!gate.begin_frame());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    /// Whether a repaint is waiting for the next frame
    pending: bool,

    /// Requests received since creation
    requests: u64,

    /// Frames that actually repainted
    frames: u64,
}

impl FrameGate {
    /// Create a gate with nothing pending
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a repaint on the next frame
    ///
    /// Returns `true` if this request armed the gate, `false` if a repaint was
    /// already pending and this one was folded into it.
    pub fn request(&mut self) -> bool {
        self.requests += 1;
        let armed = !self.pending;
        self.pending = true;
        armed
    }

    /// Consume the pending repaint at frame start
    ///
    /// Returns `true` if the frame should repaint.
    pub fn begin_frame(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        self.frames += 1;
        true
    }

    /// Drop a pending repaint without drawing it
    pub fn discard(&mut self) {
        self.pending = false;
    }

    /// Check if a repaint is waiting
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Requests that were folded into an earlier one
    pub fn coalesced(&self) -> u64 {
        self.requests.saturating_sub(self.frames + u64::from(self.pending))
    }

    /// Frames that repainted
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
