//! Error types shared across the editor core.

use crate::connector::ConnectorId;
use crate::entity::EntityId;
use thiserror::Error;

/// Errors raised by the connector graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectorError {
    #[error("Unknown connector: {0}")]
    UnknownConnector(ConnectorId),
    #[error("Connector {0} cannot be attached to itself")]
    SelfAttachment(ConnectorId),
    #[error("Connector {child} is already attached to {parent}")]
    AlreadyAttached {
        child: ConnectorId,
        parent: ConnectorId,
    },
    #[error("Attaching {child} below {parent} would create a cycle")]
    WouldCreateCycle {
        parent: ConnectorId,
        child: ConnectorId,
    },
    #[error("Connector {child} is not attached to {parent}")]
    NotAttached {
        parent: ConnectorId,
        child: ConnectorId,
    },
}

/// User-facing validation failures. The display text is shown to the user as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Select at least two items to group")]
    GroupNeedsTwoItems,
    #[error("Select a group to ungroup")]
    UngroupNeedsGroup,
    #[error("Select at least two items to align")]
    AlignNeedsTwoItems,
    #[error("Nothing is selected")]
    EmptySelection,
    #[error("Nothing to paste")]
    EmptyClipboard,
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Nothing to redo")]
    NothingToRedo,
}

/// Errors from the snapshot codec used by copy/paste.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to encode bundle: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Failed to decode bundle: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Errors from a clipboard backend.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Top level editor error.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A caller passed an argument that violates the API contract.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The user asked for something the current selection does not allow.
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// An infrastructure failure during an operation such as copy or paste.
    #[error("{operation} failed: {source}")]
    OperationFailed {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error(transparent)]
    Connector(#[from] ConnectorError),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),
}

impl EditorError {
    /// Wrap an infrastructure failure into a single "operation failed" error.
    pub fn operation_failed<E>(operation: &'static str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        EditorError::OperationFailed {
            operation,
            source: Box::new(source),
        }
    }

    /// Whether this is a user-facing validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, EditorError::Validation(_))
    }
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_user_facing() {
        let err = EditorError::from(ValidationError::GroupNeedsTwoItems);
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Select at least two items to group");
    }

    #[test]
    fn test_operation_failed_keeps_source() {
        let cause = ClipboardError::Unavailable("locked".to_string());
        let err = EditorError::operation_failed("Paste", cause);
        assert_eq!(err.to_string(), "Paste failed: Clipboard unavailable: locked");
        assert!(std::error::Error::source(&err).is_some());
    }
}
