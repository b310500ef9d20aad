//! Events delivered by the hosting layer
//!
//! Content surfaces run concurrently inside the hosting layer. Their events
//! are funnelled through one unbounded channel into the dispatcher, in
//! arrival order per surface.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use vyrnix_download::{Transfer, TransferId, TransferOutcome};

/// What the hosting layer should do with an intercepted request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RequestVerdict {
    Cancel,
    Redirect { url: String },
    Proceed,
}

pub enum HostEvent {
    LoadFinished {
        tab_id: String,
        seq: u64,
    },
    LoadFailed {
        tab_id: String,
        seq: u64,
        code: i32,
        description: String,
    },
    FaviconUpdated {
        tab_id: String,
        seq: u64,
        favicon: Option<String>,
    },
    /// Content asked for a new top-level surface (e.g. `target="_blank"`)
    NewWindowRequested { tab_id: String, url: String },
    /// Every outbound request, top-level loads included
    RequestIntercepted {
        url: String,
        tab_id: Option<String>,
        reply: oneshot::Sender<RequestVerdict>,
    },
    DownloadStarted {
        transfer_id: TransferId,
        transfer: Box<dyn Transfer>,
    },
    DownloadUpdated { transfer_id: TransferId },
    DownloadDone {
        transfer_id: TransferId,
        outcome: TransferOutcome,
    },
}

impl HostEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::LoadFinished { .. } => "load-finished",
            HostEvent::LoadFailed { .. } => "load-failed",
            HostEvent::FaviconUpdated { .. } => "favicon-updated",
            HostEvent::NewWindowRequested { .. } => "new-window",
            HostEvent::RequestIntercepted { .. } => "request-intercepted",
            HostEvent::DownloadStarted { .. } => "download-started",
            HostEvent::DownloadUpdated { .. } => "download-updated",
            HostEvent::DownloadDone { .. } => "download-done",
        }
    }
}

impl std::fmt::Debug for HostEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostEvent::LoadFinished { tab_id, seq }
            | HostEvent::LoadFailed { tab_id, seq, .. }
            | HostEvent::FaviconUpdated { tab_id, seq, .. } => f
                .debug_struct(self.name())
                .field("tab_id", tab_id)
                .field("seq", seq)
                .finish(),
            HostEvent::NewWindowRequested { tab_id, url } => f
                .debug_struct(self.name())
                .field("tab_id", tab_id)
                .field("url", url)
                .finish(),
            HostEvent::RequestIntercepted { url, tab_id, .. } => f
                .debug_struct(self.name())
                .field("url", url)
                .field("tab_id", tab_id)
                .finish(),
            HostEvent::DownloadStarted { transfer_id, .. }
            | HostEvent::DownloadUpdated { transfer_id } => f
                .debug_struct(self.name())
                .field("transfer_id", transfer_id)
                .finish(),
            HostEvent::DownloadDone {
                transfer_id,
                outcome,
            } => f
                .debug_struct(self.name())
                .field("transfer_id", transfer_id)
                .field("outcome", outcome)
                .finish(),
        }
    }
}

/// Sending side, cloned into every hosting-layer callback
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<HostEvent>,
}

pub struct EventStream {
    rx: mpsc::UnboundedReceiver<HostEvent>,
}

pub fn event_channel() -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSink { tx }, EventStream { rx })
}

impl EventSink {
    /// Returns false once the dispatcher has stopped.
    pub fn send(&self, event: HostEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(event = e.0.name(), "Dispatcher gone, dropping host event");
                false
            }
        }
    }

    pub fn load_finished(&self, tab_id: &str, seq: u64) -> bool {
        self.send(HostEvent::LoadFinished {
            tab_id: tab_id.to_string(),
            seq,
        })
    }

    pub fn load_failed(&self, tab_id: &str, seq: u64, code: i32, description: &str) -> bool {
        self.send(HostEvent::LoadFailed {
            tab_id: tab_id.to_string(),
            seq,
            code,
            description: description.to_string(),
        })
    }

    /// Submit a request for a verdict. If the dispatcher is gone the
    /// receiver resolves to an error, which hosts treat as proceed.
    pub fn submit_request(
        &self,
        url: &str,
        tab_id: Option<&str>,
    ) -> oneshot::Receiver<RequestVerdict> {
        let (reply, rx) = oneshot::channel();
        self.send(HostEvent::RequestIntercepted {
            url: url.to_string(),
            tab_id: tab_id.map(str::to_string),
            reply,
        });
        rx
    }

    pub async fn intercept(&self, url: &str, tab_id: Option<&str>) -> RequestVerdict {
        self.submit_request(url, tab_id)
            .await
            .unwrap_or(RequestVerdict::Proceed)
    }
}

impl EventStream {
    pub async fn recv(&mut self) -> Option<HostEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<HostEvent> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_serialization() {
        let json = serde_json::to_value(RequestVerdict::Redirect {
            url: "https://example.com/".to_string(),
        })
        .unwrap();
        assert_eq!(json["action"], "redirect");
        assert_eq!(json["url"], "https://example.com/");

        let json = serde_json::to_value(RequestVerdict::Cancel).unwrap();
        assert_eq!(json["action"], "cancel");
    }

    #[tokio::test]
    async fn test_dropped_dispatcher_means_proceed() {
        let (sink, stream) = event_channel();
        drop(stream);

        assert!(!sink.load_finished("tab", 1));
        assert_eq!(
            sink.intercept("https://ads.example/", None).await,
            RequestVerdict::Proceed
        );
    }

    #[test]
    fn test_events_arrive_in_order() {
        let (sink, mut stream) = event_channel();
        sink.load_finished("a", 1);
        sink.load_failed("a", 2, -105, "NAME_NOT_RESOLVED");

        assert!(matches!(
            stream.try_recv(),
            Some(HostEvent::LoadFinished { seq: 1, .. })
        ));
        assert!(matches!(
            stream.try_recv(),
            Some(HostEvent::LoadFailed { seq: 2, code: -105, .. })
        ));
        assert!(stream.try_recv().is_none());
    }
}
