//! Error types for the editor core.

use thiserror::Error;

use crate::lines::LineId;

/// Errors raised by the pure editor operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditorError {
    /// An operation referenced a line id that is not in the store.
    #[error("no line with id {0}")]
    UnknownLine(LineId),

    #[error("line index {index} out of range (document has {len} lines)")]
    LineIndexOutOfRange { index: usize, len: usize },

    #[error("offset {offset} out of range (document length {len})")]
    OffsetOutOfRange { offset: usize, len: usize },

    /// A DOM node that should carry a line or root marker did not.
    #[error("expected marker {0} was not found on the node or its ancestors")]
    MissingMarker(&'static str),

    /// The node handed to the cursor model does not belong to the editor root.
    #[error("node is not inside the editor root")]
    NodeNotInEditor,

    #[error("DOM operation failed: {0}")]
    Dom(#[from] DomError),

    #[error("could not persist document: {0}")]
    Persist(String),
}

/// Failures of the narrow DOM interface used by the cursor model and reconciler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DomError {
    #[error("node is not a child of the given parent")]
    NotAChild,

    #[error("node is not an element")]
    NotAnElement,

    /// Error surfaced by a real DOM implementation.
    #[error("platform DOM error: {0}")]
    Platform(String),
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        EditorError::Persist(err.to_string())
    }
}
