//! Per-job progress monitoring
//!
//! A [`JobMonitor`] follows one file-processing job on the notification
//! channel and exposes a UI-facing progress percentage: 0 before any event,
//! the reported value (50 when the backend omits one) while processing, 100
//! on completion. On the first terminal event it signals the caller's
//! refresh hook exactly once; duplicate terminal deliveries, including
//! replays after a reconnect, are no-ops.

use checkop_common::events::{FileStatus, FileStatusEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::debug;

use super::registry::Subscription;

/// Progress assumed while processing when the backend sends no percentage.
const DEFAULT_PROCESSING_PROGRESS: u8 = 50;

/// How a monitored job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    /// Carries the backend's failure reason when one was reported.
    Failed(Option<String>),
}

/// Handle for one monitored job. Dropping it detaches from the channel.
pub struct JobMonitor {
    progress: watch::Receiver<u8>,
    _subscription: Subscription,
}

impl JobMonitor {
    pub(crate) fn new(progress: watch::Receiver<u8>, subscription: Subscription) -> Self {
        Self {
            progress,
            _subscription: subscription,
        }
    }

    /// Current progress percentage (0-100).
    pub fn progress(&self) -> u8 {
        *self.progress.borrow()
    }

    /// Observable progress for async consumers (`changed().await`).
    pub fn progress_watch(&self) -> watch::Receiver<u8> {
        self.progress.clone()
    }
}

/// Event handler backing a [`JobMonitor`] subscription.
///
/// Kept separate from the channel wiring so the terminal-idempotency rules
/// can be exercised without a transport.
pub(crate) struct StatusHandler<F: Fn(JobOutcome) + Send + Sync> {
    file_id: String,
    progress: watch::Sender<u8>,
    handled: AtomicBool,
    on_refresh: F,
}

impl<F: Fn(JobOutcome) + Send + Sync> StatusHandler<F> {
    pub(crate) fn new(file_id: String, progress: watch::Sender<u8>, on_refresh: F) -> Self {
        Self {
            file_id,
            progress,
            handled: AtomicBool::new(false),
            on_refresh,
        }
    }

    pub(crate) fn handle(&self, event: &FileStatusEvent) {
        if event.file_id != self.file_id {
            return;
        }
        match event.status {
            FileStatus::Processing => {
                let value = event.progress.unwrap_or(DEFAULT_PROCESSING_PROGRESS).min(100);
                let _ = self.progress.send(value);
            }
            FileStatus::Completed => {
                if !self.handled.swap(true, Ordering::SeqCst) {
                    let _ = self.progress.send(100);
                    (self.on_refresh)(JobOutcome::Completed);
                } else {
                    debug!(file_id = %self.file_id, "Duplicate terminal event ignored");
                }
            }
            FileStatus::Failed => {
                // Failure refreshes dependent views too (so the error row
                // becomes visible) but does not force a progress value.
                if !self.handled.swap(true, Ordering::SeqCst) {
                    (self.on_refresh)(JobOutcome::Failed(event.error.clone()));
                } else {
                    debug!(file_id = %self.file_id, "Duplicate terminal event ignored");
                }
            }
        }
    }
}
