//! Notification Channel Integration Tests
//!
//! Runs the channel against a real local WebSocket server: event delivery
//! through a live socket, wildcard fan-out, and reconnection after the
//! server drops the connection. Backoff arithmetic and give-up behavior are
//! covered by unit tests; these suites only exercise the transport wiring.

use checkop_client::notify::{JobOutcome, NotificationChannel};
use futures::SinkExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Serve one WebSocket connection: accept, wait for `gate`, send `frames`,
/// then hold the connection open. Returns the ws:// URL to dial.
async fn serve_frames(frames: Vec<String>, gate: oneshot::Receiver<()>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let _ = gate.await;
        for frame in frames {
            ws.send(Message::Text(frame)).await.unwrap();
        }
        // Keep the socket open; the test runtime tears everything down
        tokio::time::sleep(Duration::from_secs(60)).await;
    });
    format!("ws://{addr}")
}

fn status_frame(file_id: &str, status: &str, progress: Option<u8>) -> String {
    match progress {
        Some(p) => format!(
            r#"{{"type":"file_status","data":{{"file_id":"{file_id}","status":"{status}","progress":{p}}}}}"#
        ),
        None => format!(
            r#"{{"type":"file_status","data":{{"file_id":"{file_id}","status":"{status}"}}}}"#
        ),
    }
}

#[tokio::test]
async fn monitor_follows_a_job_over_a_live_socket() {
    let (open, gate) = oneshot::channel();
    let url = serve_frames(
        vec![
            status_frame("job-1", "processing", Some(30)),
            status_frame("job-1", "completed", None),
            // Replay after completion must not re-fire the refresh
            status_frame("job-1", "completed", None),
        ],
        gate,
    )
    .await;

    let channel = NotificationChannel::start(url);
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
    let monitor = channel.monitor_job("job-1", move |outcome| {
        let _ = outcome_tx.send(outcome);
    });

    // Subscription registered; let the server talk
    open.send(()).unwrap();

    let mut progress = monitor.progress_watch();
    timeout(Duration::from_secs(5), progress.wait_for(|p| *p == 100))
        .await
        .expect("no completion within 5s")
        .unwrap();
    assert_eq!(monitor.progress(), 100);

    let outcome = timeout(Duration::from_secs(5), outcome_rx.recv())
        .await
        .expect("no refresh signal within 5s")
        .unwrap();
    assert_eq!(outcome, JobOutcome::Completed);

    // The replayed terminal event must not produce a second signal
    assert!(
        timeout(Duration::from_millis(500), outcome_rx.recv())
            .await
            .is_err(),
        "duplicate terminal event reached the refresh hook"
    );
    channel.disconnect();
}

#[tokio::test]
async fn wildcard_subscription_sees_every_job() {
    let (open, gate) = oneshot::channel();
    let url = serve_frames(
        vec![
            status_frame("job-a", "processing", Some(10)),
            status_frame("job-b", "completed", None),
            // Foreign payloads must pass through without disturbing delivery
            r#"{"type":"heartbeat","data":{}}"#.to_string(),
            status_frame("job-c", "failed", None),
        ],
        gate,
    )
    .await;

    let channel = NotificationChannel::start(url);
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    let seen_tx = Arc::new(seen_tx);
    let seen_tx_c = Arc::clone(&seen_tx);
    let _sub = channel.subscribe_all(move |event| {
        let _ = seen_tx_c.send(event.file_id.clone());
    });
    open.send(()).unwrap();

    let mut ids = Vec::new();
    for _ in 0..3 {
        let id = timeout(Duration::from_secs(5), seen_rx.recv())
            .await
            .expect("missing wildcard delivery")
            .unwrap();
        ids.push(id);
    }
    assert_eq!(ids, vec!["job-a", "job-b", "job-c"]);
    channel.disconnect();
}

#[tokio::test]
async fn channel_reconnects_after_server_drop() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (open, gate) = oneshot::channel::<()>();

    tokio::spawn(async move {
        // First connection: handshake, then drop it immediately
        let (stream, _) = listener.accept().await.unwrap();
        let ws = accept_async(stream).await.unwrap();
        drop(ws);

        // Second connection arrives after the 1s backoff step
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let _ = gate.await;
        ws.send(Message::Text(status_frame("job-9", "completed", None)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
    });

    let channel = NotificationChannel::start(format!("ws://{addr}"));
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
    let _monitor = channel.monitor_job("job-9", move |outcome| {
        let _ = outcome_tx.send(outcome);
    });
    open.send(()).unwrap();

    // Subscriptions survive the drop; delivery resumes on the new socket
    let outcome = timeout(Duration::from_secs(10), outcome_rx.recv())
        .await
        .expect("no delivery after reconnect")
        .unwrap();
    assert_eq!(outcome, JobOutcome::Completed);
    channel.disconnect();
}
