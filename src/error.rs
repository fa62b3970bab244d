use thiserror::Error;

/// Top-level error type for the correlation and reconciliation layer.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors raised while navigating or mutating the document tree.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("{child} is not a member of its expected {container}")]
    NotInContainer {
        child: &'static str,
        container: &'static str,
    },

    #[error("no document is loaded")]
    NoDocument,

    #[error("invalid document structure: {0}")]
    InvalidStructure(String),
}

/// Errors reported by the solid kernel.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("kernel rejected {operation}: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    #[error("unknown kernel tag {0}")]
    UnknownTag(u32),

    #[error("invalid kernel input: {0}")]
    InvalidInput(String),

    #[error("face {0} is not planar")]
    NotPlanar(u32),
}

/// Errors raised when correlating kernel tags with document handles.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("no corresponding entity for {0}")]
    NoMatch(String),

    #[error("multiple corresponding entities for {0}")]
    MultipleMatches(String),

    #[error("translation failed: {0}")]
    Failed(String),
}

/// Errors raised by the tree reconciler.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("{counter} traversal diverged after copy: {original} nodes in source, {copy} in copy")]
    OrdinalMismatch {
        counter: &'static str,
        original: usize,
        copy: usize,
    },
}

/// Errors related to edit operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Convenience type alias for results using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;
