//! PDF Studio Core Library
//!
//! Client-side annotation editing engine for PDF pages.
//!
//! Pointer input is mapped onto page-local pixels by [`CoordinateMapper`],
//! interpreted by the pure [`interaction::transition`] state machine against
//! the active tool of a [`ToolController`], and applied to the
//! [`AnnotationStore`]. Text drafts live in a [`TextEditSession`] until they
//! are committed, and every accepted mutation is written back through the
//! debounced [`PersistenceSync`]. [`EditorSession`] ties the pieces together
//! for one open file.

pub mod coords;
pub mod editor;
pub mod error;
pub mod interaction;
pub mod placement;
pub mod store;
pub mod sync;
pub mod text_session;
pub mod tools;

pub use coords::{CoordinateMapper, LayoutBox};
pub use editor::{CaretMove, EditorSession, EditorView};
pub use error::{EditError, RejectReason};
pub use interaction::{
    Effect, Gesture, HitTarget, InteractionState, PointerEvent, Preview, ShapePreview,
    Transition, TransitionContext,
};
pub use placement::{place_item, shape_from_drag, stroke_from_points, PlacementContext};
pub use store::AnnotationStore;
pub use sync::{PersistenceSync, SyncStats, SyncStatus, WriteRequest};
pub use text_session::{TextCommit, TextEditSession};
pub use tools::{ShapeTool, Tool, ToolController, ToolMode, ToolSetting};
