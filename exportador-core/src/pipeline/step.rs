//! The export step contract.

use super::context::ExportContext;
use async_trait::async_trait;

/// One stage of the export pipeline.
///
/// A step either mutates the context and succeeds, or fails with an error
/// whose `Display` is the text shown to the operator. Steps are never
/// retried and never re-run for the same context.
#[async_trait]
pub trait ExportStep: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Runs the step against the shared context.
    async fn execute(&self, context: &mut ExportContext) -> crate::Result<()>;
}
