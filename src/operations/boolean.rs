use tracing::{info, warn};

use crate::document::ItemId;
use crate::error::{OperationError, Result};
use crate::kernel::{BooleanOp, SolidKernel, Translator};
use crate::session::Session;

use super::AddBody;

/// Combines tool bodies into a target body.
pub struct BooleanEdit {
    op: BooleanOp,
    target: ItemId,
    tools: Vec<ItemId>,
}

impl BooleanEdit {
    /// Creates a new `BooleanEdit` operation.
    #[must_use]
    pub fn new(op: BooleanOp, target: ItemId, tools: Vec<ItemId>) -> Self {
        Self { op, target, tools }
    }

    /// Executes the boolean.
    ///
    /// The first result body regenerates the target, the tools are recorded
    /// as deleted, and any further result bodies are added to the document.
    /// An empty result deletes the target as well. Returns the items created
    /// for the extra results.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no tools, the target is among them, a
    /// body cannot be translated, or the kernel rejects the boolean.
    ///
    /// Once the kernel has applied the boolean, the target and tool changes
    /// are committed. If an extra result cannot be added to the document,
    /// the extra results added before it stay in the document, that result
    /// and the ones after it are discarded from the kernel, and the error is
    /// returned.
    pub fn execute<K: SolidKernel + Translator>(
        &self,
        session: &mut Session<K>,
    ) -> Result<Vec<ItemId>> {
        if self.tools.is_empty() {
            return Err(OperationError::InvalidInput("boolean needs a tool body".into()).into());
        }
        if self.tools.contains(&self.target) {
            return Err(
                OperationError::InvalidInput("target is also used as a tool".into()).into(),
            );
        }
        let target = session.resolve_body(self.target)?;
        let tools = self
            .tools
            .iter()
            .map(|&tool| session.resolve_body(tool))
            .collect::<Result<Vec<_>>>()?;

        let results = session.kernel.boolean(self.op, target, &tools)?;

        for &tool in &self.tools {
            session.commit_delete_body(tool);
        }
        let Some((&first, extra)) = results.split_first() else {
            session.commit_delete_body(self.target);
            info!(op = ?self.op, target = ?self.target, "boolean consumed every body");
            return Ok(Vec::new());
        };
        session.commit_update(self.target, target, first);
        let mut added = Vec::with_capacity(extra.len());
        for (i, &body) in extra.iter().enumerate() {
            match AddBody::new(body).execute(session) {
                Ok(brep) => added.push(brep),
                Err(err) => {
                    for &orphan in &extra[i..] {
                        if let Err(cleanup) = session.kernel.delete_body(orphan) {
                            warn!(%orphan, %cleanup, "could not discard orphaned kernel body");
                        }
                    }
                    return Err(err);
                }
            }
        }
        info!(
            op = ?self.op,
            target = ?self.target,
            tools = tools.len(),
            results = results.len(),
            "boolean applied"
        );
        Ok(added)
    }
}
