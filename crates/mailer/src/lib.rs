//! Simulated batch email backend.
//!
//! Stand-in for a real provider with the timing shape the dispatcher is
//! designed around: flushing a batch costs a fixed per-message latency, so
//! a batch of N messages takes N × latency to deliver. All state is owned
//! by the instance and guarded for concurrent batch dispatchers; there are
//! no process-global counters.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use herald_common::error::DispatchError;
use herald_common::types::{BatchHandle, OutboundEmail};
use herald_engine::backend::MailBackend;

/// In-process email backend with simulated delivery latency.
pub struct SimulatedMailer {
    next_batch: AtomicU64,
    queues: Mutex<HashMap<BatchHandle, Vec<OutboundEmail>>>,
    sent: Mutex<Vec<OutboundEmail>>,
    failing: Mutex<HashSet<u64>>,
    per_message_latency: Duration,
}

impl SimulatedMailer {
    pub fn new(per_message_latency: Duration) -> Self {
        Self {
            next_batch: AtomicU64::new(0),
            queues: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            per_message_latency,
        }
    }

    /// Make the `batch_no`-th opened batch (1-based) fail its flush, for
    /// exercising the partial-failure path.
    pub fn fail_flush(&self, batch_no: u64) {
        self.failing
            .lock()
            .expect("mailer state poisoned")
            .insert(batch_no);
    }

    /// Messages delivered so far, in flush-completion order.
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("mailer state poisoned").clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().expect("mailer state poisoned").len()
    }
}

impl MailBackend for SimulatedMailer {
    fn open_batch(&self) -> BatchHandle {
        let handle = BatchHandle(self.next_batch.fetch_add(1, Ordering::SeqCst) + 1);
        self.queues
            .lock()
            .expect("mailer state poisoned")
            .insert(handle, Vec::new());
        handle
    }

    fn enqueue(&self, batch: BatchHandle, email: &OutboundEmail) {
        let mut queues = self.queues.lock().expect("mailer state poisoned");
        if let Some(queue) = queues.get_mut(&batch) {
            queue.push(email.clone());
        } else {
            tracing::warn!(batch = %batch, "Enqueue against unknown batch, dropping message");
        }
    }

    async fn flush(&self, batch: BatchHandle) -> Result<(), DispatchError> {
        let messages = {
            let mut queues = self.queues.lock().expect("mailer state poisoned");
            queues.remove(&batch)
        };
        let Some(messages) = messages else {
            return Err(DispatchError::Backend(format!(
                "flush of unknown or already flushed {batch}"
            )));
        };

        let latency = self.per_message_latency * messages.len() as u32;
        tracing::info!(
            batch = %batch,
            queued = messages.len(),
            latency_ms = latency.as_millis() as u64,
            "Sending batch"
        );

        tokio::time::sleep(latency).await;

        if self
            .failing
            .lock()
            .expect("mailer state poisoned")
            .contains(&batch.0)
        {
            return Err(DispatchError::Backend(format!(
                "delivery rejected for {batch}"
            )));
        }

        let delivered = messages.len();
        self.sent
            .lock()
            .expect("mailer state poisoned")
            .extend(messages);
        tracing::info!(batch = %batch, delivered, "Batch sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_handles_are_unique_and_sequential() {
        let mailer = SimulatedMailer::new(Duration::from_millis(10));
        assert_eq!(mailer.open_batch(), BatchHandle(1));
        assert_eq!(mailer.open_batch(), BatchHandle(2));
        assert_eq!(mailer.open_batch(), BatchHandle(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_delivers_queued_messages_after_latency() {
        let mailer = SimulatedMailer::new(Duration::from_millis(10));
        let batch = mailer.open_batch();
        for n in 0..4 {
            mailer.enqueue(
                batch,
                &OutboundEmail {
                    to: format!("{n}@example.com"),
                    subject: "s".to_string(),
                    body: "b".to_string(),
                },
            );
        }

        let start = tokio::time::Instant::now();
        mailer.flush(batch).await.unwrap();

        assert_eq!(mailer.sent_count(), 4);
        assert_eq!(start.elapsed(), Duration::from_millis(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_twice_is_a_backend_error() {
        let mailer = SimulatedMailer::new(Duration::from_millis(10));
        let batch = mailer.open_batch();
        mailer.flush(batch).await.unwrap();

        let err = mailer.flush(batch).await.unwrap_err();
        assert!(matches!(err, DispatchError::Backend(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_flush_rejects_delivery() {
        let mailer = SimulatedMailer::new(Duration::from_millis(10));
        mailer.fail_flush(1);
        let batch = mailer.open_batch();
        mailer.enqueue(
            batch,
            &OutboundEmail {
                to: "x@example.com".to_string(),
                subject: "s".to_string(),
                body: "b".to_string(),
            },
        );

        let err = mailer.flush(batch).await.unwrap_err();
        assert!(matches!(err, DispatchError::Backend(_)));
        assert_eq!(mailer.sent_count(), 0);
    }
}
