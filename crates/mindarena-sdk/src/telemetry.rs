//! Best-effort telemetry queue
//!
//! Coaching events are pushed onto a bounded channel and delivered by a
//! background worker. Enqueueing never waits and never fails the caller: a
//! full or closed queue drops the event, and delivery errors are logged.

use crate::client::ArenaClient;
use mindarena_types::{InitSessionRequest, InterventionResponse, KeystrokeEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Outbound coaching event
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    InitSession(InitSessionRequest),
    Keystroke(KeystrokeEvent),
    Intervention(InterventionResponse),
}

impl TelemetryEvent {
    fn kind(&self) -> &'static str {
        match self {
            TelemetryEvent::InitSession(_) => "init_session",
            TelemetryEvent::Keystroke(_) => "keystroke",
            TelemetryEvent::Intervention(_) => "intervention_response",
        }
    }
}

/// Cloneable producer side of the queue
#[derive(Clone)]
pub struct TelemetrySender {
    sender: mpsc::Sender<TelemetryEvent>,
}

impl TelemetrySender {
    /// Queue an event; returns false if it was dropped
    pub fn enqueue(&self, event: TelemetryEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                debug!(kind = event.kind(), "telemetry queue full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                debug!(kind = event.kind(), "telemetry queue closed, dropping event");
                false
            }
        }
    }
}

/// Queue plus the worker draining it
pub struct TelemetryQueue {
    sender: TelemetrySender,
    worker: JoinHandle<usize>,
}

impl TelemetryQueue {
    /// Spawn the worker on the current tokio runtime
    pub fn spawn(client: ArenaClient) -> Self {
        let buffer = client.config().telemetry_buffer.max(1);
        let (sender, mut receiver) = mpsc::channel::<TelemetryEvent>(buffer);

        let worker = tokio::spawn(async move {
            let mut delivered = 0usize;
            while let Some(event) = receiver.recv().await {
                let kind = event.kind();
                let result = match &event {
                    TelemetryEvent::InitSession(req) => client.init_session(req).await,
                    TelemetryEvent::Keystroke(ev) => client.track_keystroke(ev).await,
                    TelemetryEvent::Intervention(resp) => client.respond_to_intervention(resp).await,
                };
                match result {
                    Ok(()) => delivered += 1,
                    Err(e) => warn!(kind, error = %e, "telemetry delivery failed"),
                }
            }
            delivered
        });

        Self {
            sender: TelemetrySender { sender },
            worker,
        }
    }

    pub fn sender(&self) -> TelemetrySender {
        self.sender.clone()
    }

    pub fn enqueue(&self, event: TelemetryEvent) -> bool {
        self.sender.enqueue(event)
    }

    /// Close the queue, wait for queued events to drain, and return how many
    /// were delivered. Outstanding `TelemetrySender` clones keep the worker
    /// alive until they are dropped.
    pub async fn shutdown(self) -> usize {
        drop(self.sender);
        match self.worker.await {
            Ok(delivered) => delivered,
            Err(e) => {
                warn!(error = %e, "telemetry worker panicked");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::credentials::MemoryCredentialStore;
    use crate::mock::MockTransport;
    use crate::session::SessionContext;
    use crate::transport::Method;
    use mindarena_types::{AuthUser, SessionId};
    use serde_json::json;
    use std::sync::Arc;

    fn client(transport: Arc<MockTransport>, buffer: usize) -> ArenaClient {
        let session = SessionContext::new(Arc::new(MemoryCredentialStore::new()));
        session.login("tok", AuthUser::new("ada@example.com")).unwrap();
        let config = ClientConfig {
            telemetry_buffer: buffer,
            ..ClientConfig::default()
        };
        ArenaClient::with_transport(config, transport, session)
    }

    fn keystroke(n: u32) -> TelemetryEvent {
        TelemetryEvent::Keystroke(KeystrokeEvent {
            session_id: SessionId::from("s1"),
            keystrokes: n,
            chars_typed: n,
            timestamp_ms: u64::from(n) * 100,
            snapshot: None,
        })
    }

    #[tokio::test]
    async fn test_events_are_delivered() {
        let transport = Arc::new(MockTransport::new());
        transport.on(Method::Post, "/arena/track", 200, json!({"ok": true}));

        let queue = TelemetryQueue::spawn(client(transport.clone(), 16));
        assert!(queue.enqueue(keystroke(1)));
        assert!(queue.enqueue(keystroke(2)));

        assert_eq!(queue.shutdown().await, 2);
        assert_eq!(transport.count(Method::Post, "/arena/track"), 2);
    }

    #[tokio::test]
    async fn test_delivery_failures_do_not_stop_worker() {
        let transport = Arc::new(MockTransport::new());
        transport
            .fail(Method::Post, "/arena/track", "connection reset")
            .on(Method::Post, "/arena/track", 200, json!({}));

        let queue = TelemetryQueue::spawn(client(transport.clone(), 16));
        queue.enqueue(keystroke(1));
        queue.enqueue(keystroke(2));

        assert_eq!(queue.shutdown().await, 1);
        assert_eq!(transport.count(Method::Post, "/arena/track"), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_full_queue_drops_without_blocking() {
        let transport = Arc::new(MockTransport::new());
        transport.on(Method::Post, "/arena/track", 200, json!({}));

        // The worker cannot run until this task yields, so the second
        // event finds the single slot occupied.
        let queue = TelemetryQueue::spawn(client(transport, 1));
        assert!(queue.enqueue(keystroke(1)));
        assert!(!queue.enqueue(keystroke(2)));

        assert_eq!(queue.shutdown().await, 1);
    }
}
