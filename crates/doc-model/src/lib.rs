//! Annotation data model shared by the editing engine, storage and CLI.

mod annotation;
mod color;
mod config;
mod document;
pub mod geometry;
mod patch;
mod stamp;
mod style;

pub use annotation::{
    Annotation, AnnotationKind, BoxShape, CircleShape, CommentNote, FreehandStroke, ItemId,
    LineShape, RedactionBox, SignatureMark, StampMark, Stroke, TextFrame,
};
pub use color::{Color, ColorParseError};
pub use config::{EditorConfig, PlacementSizes};
pub use document::{
    validate_item, EditsDocument, ValidationIssue, EDITS_SCHEMA_VERSION, MIN_FREEHAND_POINTS,
};
pub use geometry::{resize_frame, Handle, Point, Rect, Size, SizeLimits};
pub use patch::ItemPatch;
pub use stamp::StampKind;
pub use style::{
    ShadowLevel, TextAlign, TextStyle, TextStyleProperty, DEFAULT_FONT_FAMILY, FONT_CHOICES,
};

/// Path drawn for a freshly placed signature.
pub const DEFAULT_SIGNATURE_PATH: &str =
    "M8 72 Q 34 18 76 42 T 140 54 Q 168 92 210 30 Q 228 24 248 62";
