//! Notification channel for file-processing job status
//!
//! Maintains one persistent WebSocket to the backend, multiplexes
//! `file_status` events by job id, and fans them out to subscribers.
//! Connection loss is handled internally with bounded exponential backoff;
//! callers never manage the transport. The channel is an explicitly
//! constructed service object: one instance per process lifetime, torn down
//! with [`NotificationChannel::disconnect`] on logout and reconstructed by
//! the application afterwards.

mod backoff;
mod monitor;
mod registry;

pub use monitor::{JobMonitor, JobOutcome};
pub use registry::{Subscription, SubscriptionKey};

use backoff::ReconnectPolicy;
use checkop_common::events::{parse_channel_payload, FileStatusEvent};
use futures::StreamExt;
use monitor::StatusHandler;
use registry::SubscriptionRegistry;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Push channel for backend job-status events.
pub struct NotificationChannel {
    registry: Arc<SubscriptionRegistry>,
    shutdown: CancellationToken,
}

impl NotificationChannel {
    /// Start the channel: spawns the connection task immediately. There is
    /// no explicit connect operation; the transport opens (and re-opens) on
    /// its own.
    pub fn start(ws_url: impl Into<String>) -> Self {
        let registry = Arc::new(SubscriptionRegistry::new());
        let shutdown = CancellationToken::new();

        tokio::spawn(run_transport(
            ws_url.into(),
            Arc::clone(&registry),
            shutdown.clone(),
        ));

        Self { registry, shutdown }
    }

    /// Register `callback` for every event whose job id equals `file_id`.
    pub fn subscribe(
        &self,
        file_id: &str,
        callback: impl Fn(&FileStatusEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribe_key(SubscriptionKey::File(file_id.to_string()), callback)
    }

    /// Register `callback` for every job-status event (wildcard).
    pub fn subscribe_all(
        &self,
        callback: impl Fn(&FileStatusEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribe_key(SubscriptionKey::All, callback)
    }

    fn subscribe_key(
        &self,
        key: SubscriptionKey,
        callback: impl Fn(&FileStatusEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.registry.add(key.clone(), Arc::new(callback));
        Subscription::new(Arc::clone(&self.registry), key, id)
    }

    /// Follow one job: progress percentage plus a refresh signal fired
    /// exactly once when the job reaches a terminal state.
    pub fn monitor_job(
        &self,
        file_id: &str,
        on_refresh: impl Fn(JobOutcome) + Send + Sync + 'static,
    ) -> JobMonitor {
        let (tx, rx) = watch::channel(0u8);
        let handler = StatusHandler::new(file_id.to_string(), tx, on_refresh);
        let subscription = self.subscribe(file_id, move |event| handler.handle(event));
        JobMonitor::new(rx, subscription)
    }

    /// Deliberate teardown (logout): closes the transport, cancels any
    /// pending reconnect, and clears all subscriptions. The channel is
    /// inert afterwards; build a new one with [`NotificationChannel::start`].
    pub fn disconnect(&self) {
        self.shutdown.cancel();
        self.registry.clear();
        info!("Notification channel disconnected");
    }

    /// Live registration count, for diagnostics.
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }
}

/// Connection loop: connect, read until close, back off, retry. Gives up
/// silently once the reconnect budget is exhausted.
async fn run_transport(
    ws_url: String,
    registry: Arc<SubscriptionRegistry>,
    shutdown: CancellationToken,
) {
    let mut policy = ReconnectPolicy::new();

    loop {
        let connected = tokio::select! {
            _ = shutdown.cancelled() => return,
            result = connect_async(&ws_url) => result,
        };

        match connected {
            Ok((stream, _response)) => {
                info!(url = %ws_url, "Notification channel connected");
                policy.reset();
                let (_write, mut read) = stream.split();

                loop {
                    let message = tokio::select! {
                        _ = shutdown.cancelled() => return,
                        message = read.next() => message,
                    };
                    match message {
                        Some(Ok(Message::Text(text))) => dispatch_payload(&registry, &text),
                        Some(Ok(Message::Close(_))) | None => {
                            warn!("Notification channel closed by server");
                            break;
                        }
                        // Control frames handled by tungstenite; binary unused
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!(error = %e, "Notification channel read error");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Notification channel connect failed");
            }
        }

        let Some(delay) = policy.next_delay() else {
            // Silent give-up: the hosting session is expected to restart
            // the channel on its next boundary.
            warn!(
                attempts = policy.attempts(),
                "Notification channel giving up on reconnection"
            );
            return;
        };
        debug!(delay_secs = delay.as_secs(), "Scheduling reconnection");
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// Parse one inbound payload and fan it out. Foreign type tags are ignored;
/// malformed payloads are logged and dropped, never propagated.
fn dispatch_payload(registry: &SubscriptionRegistry, raw: &str) {
    match parse_channel_payload(raw) {
        Ok(Some(event)) => registry.dispatch(&event),
        Ok(None) => {}
        Err(e) => {
            warn!(error = %e, "Dropping malformed channel payload");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkop_common::events::FileStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn payload_dispatch_routes_by_file_id() {
        let registry = SubscriptionRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_c = Arc::clone(&seen);
        registry.add(
            SubscriptionKey::File("job-7".into()),
            Arc::new(move |event: &FileStatusEvent| {
                seen_c.lock().unwrap().push(event.clone());
            }),
        );

        dispatch_payload(
            &registry,
            r#"{"type":"file_status","data":{"file_id":"job-7","status":"processing","progress":10}}"#,
        );
        dispatch_payload(
            &registry,
            r#"{"type":"file_status","data":{"file_id":"job-8","status":"completed"}}"#,
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].file_id, "job-7");
        assert_eq!(seen[0].status, FileStatus::Processing);
    }

    #[test]
    fn foreign_and_malformed_payloads_are_dropped() {
        let registry = SubscriptionRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_c = Arc::clone(&hits);
        registry.add(
            SubscriptionKey::All,
            Arc::new(move |_: &FileStatusEvent| {
                hits_c.fetch_add(1, Ordering::SeqCst);
            }),
        );

        dispatch_payload(&registry, r#"{"type":"heartbeat","data":{}}"#);
        dispatch_payload(&registry, "{{{{not json");
        dispatch_payload(&registry, r#"{"type":"file_status","data":{"bogus":true}}"#);

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn monitor_receives_events_via_registry() {
        let channel = NotificationChannel::start("wss://127.0.0.1:1/unreachable");
        let refreshes = Arc::new(AtomicUsize::new(0));
        let refreshes_c = Arc::clone(&refreshes);
        let monitor = channel.monitor_job("job-1", move |_| {
            refreshes_c.fetch_add(1, Ordering::SeqCst);
        });

        dispatch_payload(
            &channel.registry,
            r#"{"type":"file_status","data":{"file_id":"job-1","status":"processing","progress":60}}"#,
        );
        assert_eq!(monitor.progress(), 60);

        dispatch_payload(
            &channel.registry,
            r#"{"type":"file_status","data":{"file_id":"job-1","status":"completed"}}"#,
        );
        dispatch_payload(
            &channel.registry,
            r#"{"type":"file_status","data":{"file_id":"job-1","status":"completed"}}"#,
        );

        assert_eq!(monitor.progress(), 100);
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
        channel.disconnect();
    }

    #[tokio::test]
    async fn disconnect_clears_subscriptions() {
        let channel = NotificationChannel::start("wss://127.0.0.1:1/unreachable");
        let _sub = channel.subscribe("job-1", |_| {});
        assert_eq!(channel.subscriber_count(), 1);
        channel.disconnect();
        assert_eq!(channel.subscriber_count(), 0);
    }
}
