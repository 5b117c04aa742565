//! PDF Studio Scheduler Library
//!
//! Timing primitives for the single-threaded editing loop.
//!
//! The editor never spawns timers of its own. Deferred work (such as the
//! debounced persistence write) is parked in a [`DeferredQueue`] measured on an
//! injectable [`Clock`] and collected by the host loop, and preview repaints
//! are folded into whole frames by a [`FrameGate`].
//!
//! # Example
//!
//! ```
//! use pdf_studio_scheduler::{DeferredQueue, FrameGate, ManualClock};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut writes = DeferredQueue::new(clock.clone());
//! let mut frames = FrameGate::new();
//!
//! // A burst of edits: each one re-arms the write.
//! let mut pending = writes.schedule(Duration::from_millis(300), 1);
//! for revision in 2..=5 {
//!     writes.cancel(&pending);
//!     pending = writes.schedule(Duration::from_millis(300), revision);
//!     frames.request();
//! }
//!
//! clock.advance(Duration::from_millis(300));
//! assert_eq!(writes.take_due(), vec![5]);
//! assert!(frames.begin_frame());
//! ```

mod cancel;
mod clock;
mod deferred;
mod frame;

// Re-export public API
pub use cancel::CancellationToken;
pub use clock::{Clock, ManualClock, SystemClock};
pub use deferred::{DeferredHandle, DeferredQueue, TaskId};
pub use frame::FrameGate;
