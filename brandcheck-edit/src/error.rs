//! Error types for brandcheck-edit.
//!
//! An `ApplyError` never escapes [`crate::apply`]; it becomes the `reason` of a skipped
//! `FixOutcome`.

use brandcheck_types::scene::ElementId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApplyError {
    /// No element carries the target id.
    #[error("target element '{0}' not found")]
    TargetMissing(ElementId),

    /// More than one element carries the target id.
    #[error("target element '{id}' is ambiguous ({count} elements share the id)")]
    TargetAmbiguous { id: ElementId, count: usize },

    /// The mutation does not make sense for this kind of element.
    #[error("{change} cannot be applied to {kind} element '{id}'")]
    Unsupported {
        id: ElementId,
        kind: &'static str,
        change: &'static str,
    },

    #[error("invalid {what}: {value}")]
    InvalidValue { what: &'static str, value: String },
}
