use serde::{Deserialize, Serialize};

/// Behavioural switches for a [`Session`](crate::session::Session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Clear the update ledger once a reconciliation has been applied to a copy.
    pub consume_ledger_on_reconcile: bool,
    /// Compare node counts of the source and copy traversals before patching.
    pub verify_copy_order: bool,
    /// Name given to the occurrence and part created when a body is added to
    /// an empty session.
    pub document_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            consume_ledger_on_reconcile: true,
            verify_copy_order: true,
            document_name: "Untitled".into(),
        }
    }
}
