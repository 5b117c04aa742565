//! Error taxonomy of the editing engine
//!
//! Every variant is handled where it is detected: rejected gestures are
//! dropped, stale ids are ignored, failed writes surface as a transient sync
//! status, and pointer input without a laid-out page is skipped.

use doc_model::{ItemId, ValidationIssue};

/// Why a would-be item or edit was refused
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectReason {
    /// Creation drag stayed under the threshold on both axes
    #[error("creation drag of ({dx}, {dy}) is below the {threshold}px threshold")]
    BelowCreationThreshold { dx: f32, dy: f32, threshold: f32 },

    /// Freehand stroke too short to keep
    #[error("stroke has {points} points, at least {required} are needed")]
    TooFewPoints { points: usize, required: usize },

    /// Item id already present in the document
    #[error("item id `{0}` already exists")]
    DuplicateId(ItemId),

    /// Geometric sanity check failed
    #[error(transparent)]
    Invalid(#[from] ValidationIssue),
}

/// Errors raised by the editing components
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    /// Degenerate geometry or an invalid item; the change is discarded
    #[error("validation rejected: {0}")]
    ValidationRejected(#[from] RejectReason),

    /// Mutation addressed an id that is not on the current page
    #[error("no item `{id}` on page {page}")]
    NotFound { id: ItemId, page: u32 },

    /// Remote write rejected or unreachable
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    /// Reference surface has no measurable layout box yet
    #[error("page surface has no measurable layout box")]
    CoordinateUnavailable,
}

impl From<ValidationIssue> for EditError {
    fn from(issue: ValidationIssue) -> Self {
        EditError::ValidationRejected(RejectReason::Invalid(issue))
    }
}
