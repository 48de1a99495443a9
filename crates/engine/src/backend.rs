//! Messaging backend contract consumed by the dispatcher.

use std::future::Future;

use herald_common::error::DispatchError;
use herald_common::types::{BatchHandle, OutboundEmail};

/// A batch-oriented messaging backend.
///
/// The dispatcher drives each batch through exactly one open, N enqueues,
/// and one flush; a handle is never reused after its flush resolves.
/// Implementations hold their own state behind `&self` because several
/// batch dispatchers run concurrently against one backend instance.
pub trait MailBackend: Send + Sync {
    /// Allocate a new batch context. Bookkeeping only; the returned handle
    /// is unique among concurrently open batches.
    fn open_batch(&self) -> BatchHandle;

    /// Append one message to an open batch. Enqueue order is send order
    /// within the batch.
    fn enqueue(&self, batch: BatchHandle, email: &OutboundEmail);

    /// Deliver everything enqueued against `batch`, resolving when the
    /// delivery work is done or failed. Awaited exactly once per handle.
    fn flush(
        &self,
        batch: BatchHandle,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;
}
