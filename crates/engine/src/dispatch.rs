//! Wave-throttled batch dispatcher.
//!
//! Work items are chunked twice: into batches sized for the backend, then
//! into waves sized for the allowed concurrency. Waves run strictly one
//! after another; batches within a wave run concurrently. The barrier
//! between waves is the `join_all` await: every batch in wave *i* reaches a
//! terminal state before any batch in wave *i+1* is opened.
//!
//! Per batch the backend sees one `open_batch`, one `enqueue` per rendered
//! item (in item order), and one awaited `flush`. A batch whose items all
//! failed to render still flushes, empty.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;

use herald_common::config::DispatchConfig;
use herald_common::error::DispatchError;
use herald_common::types::{BatchHandle, OutboundEmail};

use crate::backend::MailBackend;
use crate::chunk::chunk;

/// Terminal outcome of one batch dispatch.
#[derive(Debug)]
struct BatchOutcome {
    handle: BatchHandle,
    queued: usize,
    item_errors: Vec<DispatchError>,
    flush_error: Option<DispatchError>,
}

/// Aggregated result of a full dispatch run.
///
/// Per-item errors are collected alongside successes rather than aborting
/// their batch; flush failures fail their batch only and are surfaced here
/// after the wave barrier. Nothing is retried.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Batches that reached `Done`.
    pub batches_done: usize,
    /// Messages enqueued on successfully flushed batches.
    pub messages_sent: usize,
    /// Item-scoped lookup and render failures, in dispatch order.
    pub item_errors: Vec<DispatchError>,
    /// Batches whose flush failed, with the backend error.
    pub failed_batches: Vec<(BatchHandle, DispatchError)>,
    /// Waves that ran to the barrier. When a wave contains a failed batch,
    /// no later wave starts and `waves_run` stays short of the total.
    pub waves_run: usize,
    /// False when a flush failure stopped dispatch before the last wave.
    pub completed: bool,
}

impl DispatchReport {
    /// True when every batch flushed and every item rendered.
    pub fn is_clean(&self) -> bool {
        self.completed && self.failed_batches.is_empty() && self.item_errors.is_empty()
    }

    /// JSON summary for logging and CLI output.
    pub fn summary(&self) -> serde_json::Value {
        json!({
            "batches_done": self.batches_done,
            "messages_sent": self.messages_sent,
            "item_errors": self.item_errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            "failed_batches": self
                .failed_batches
                .iter()
                .map(|(handle, error)| json!({ "batch": handle.to_string(), "error": error.to_string() }))
                .collect::<Vec<_>>(),
            "waves_run": self.waves_run,
            "completed": self.completed,
        })
    }
}

/// Orchestrates rendering and wave-by-wave delivery against one backend.
#[derive(Debug)]
pub struct Dispatcher<B> {
    backend: Arc<B>,
    config: DispatchConfig,
}

impl<B: MailBackend> Dispatcher<B> {
    /// Build a dispatcher, rejecting zero batch size or wave width before
    /// any dispatch work can begin.
    pub fn new(backend: Arc<B>, config: DispatchConfig) -> Result<Self, DispatchError> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    /// Render and deliver every item, wave by wave.
    ///
    /// `render` is invoked exactly once per item, in item order within each
    /// batch. Waves are strictly sequential; a flush failure lets its
    /// sibling batches finish the wave, then stops dispatch (no later wave
    /// starts).
    pub async fn dispatch_all<T, F>(&self, items: Vec<T>, render: F) -> DispatchReport
    where
        F: Fn(&T) -> Result<OutboundEmail, DispatchError>,
    {
        let total_items = items.len();
        let batches = chunk(items, self.config.batch_size);
        let waves = chunk(batches, self.config.wave_width);
        let total_waves = waves.len();

        tracing::info!(
            items = total_items,
            batch_size = self.config.batch_size,
            wave_width = self.config.wave_width,
            waves = total_waves,
            "Dispatch started"
        );

        let mut report = DispatchReport {
            completed: true,
            ..DispatchReport::default()
        };

        for (wave_no, wave) in waves.into_iter().enumerate() {
            tracing::debug!(wave = wave_no, batches = wave.len(), "Wave started");

            // Wave barrier: every batch future reaches a terminal state
            // before this await resolves.
            let outcomes = join_all(
                wave.into_iter()
                    .map(|batch| self.dispatch_batch(batch, &render)),
            )
            .await;
            report.waves_run += 1;

            let mut wave_failed = false;
            for outcome in outcomes {
                report.item_errors.extend(outcome.item_errors);
                match outcome.flush_error {
                    None => {
                        report.batches_done += 1;
                        report.messages_sent += outcome.queued;
                    }
                    Some(error) => {
                        tracing::warn!(batch = %outcome.handle, %error, "Batch flush failed");
                        report.failed_batches.push((outcome.handle, error));
                        wave_failed = true;
                    }
                }
            }

            if wave_failed && wave_no + 1 < total_waves {
                tracing::warn!(
                    wave = wave_no,
                    remaining_waves = total_waves - wave_no - 1,
                    "Stopping dispatch after failed wave"
                );
                report.completed = false;
                break;
            }
        }

        tracing::info!(
            batches_done = report.batches_done,
            messages_sent = report.messages_sent,
            item_errors = report.item_errors.len(),
            failed_batches = report.failed_batches.len(),
            "Dispatch finished"
        );
        report
    }

    /// Drive one batch through open → queuing → flushing.
    ///
    /// Items that fail to render are recorded and skipped; the batch still
    /// flushes so the backend sees a complete open/flush pair per handle.
    async fn dispatch_batch<T, F>(&self, batch: Vec<T>, render: &F) -> BatchOutcome
    where
        F: Fn(&T) -> Result<OutboundEmail, DispatchError>,
    {
        let handle = self.backend.open_batch();
        let mut queued = 0;
        let mut item_errors = Vec::new();

        for item in &batch {
            match render(item) {
                Ok(email) => {
                    self.backend.enqueue(handle, &email);
                    queued += 1;
                }
                Err(error) => item_errors.push(error),
            }
        }

        tracing::debug!(
            batch = %handle,
            queued,
            skipped = item_errors.len(),
            "Batch queued, flushing"
        );
        let flush_error = self.backend.flush(handle).await.err();

        BatchOutcome {
            handle,
            queued,
            item_errors,
            flush_error,
        }
    }
}
