use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error};
use uuid::Uuid;

use crate::ApiState;

/// A session state transition. Delivered to every subscriber, not only the
/// one that triggered it.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "transition")]
pub enum SessionEvent {
    SignedIn { user_id: Uuid, email: String },
    SignedOut { user_id: Uuid },
}

/// Process-wide notification channel for session transitions. Created once
/// in `serve`; any number of concurrent subscribers may observe it,
/// independent of which view is mounted.
#[derive(Clone, Debug)]
pub struct SessionHub {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: SessionEvent) {
        // A send with no subscribers is not an error.
        if self.tx.send(event.clone()).is_err() {
            debug!(task = "publish session event", event = format!("{:?}", event));
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

/// Streams session transitions over a WebSocket, one JSON object per
/// transition.
pub async fn events(
    ws: WebSocketUpgrade,
    State(state): State<ApiState>,
) -> Response {
    let receiver = state.sessions.subscribe();
    ws.on_upgrade(|socket| stream_events(socket, receiver))
}

async fn stream_events(
    socket: WebSocket,
    mut receiver: broadcast::Receiver<SessionEvent>,
) {
    let (mut sender, _) = socket.split();

    loop {
        let event = match receiver.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                error!(task = "receive session event", skipped = skipped);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return,
        };

        let text = serde_json::to_string(&event);
        let Ok(text) = text else {
            error!(
                task = "serialize session event",
                error = text.unwrap_err().to_string()
            );
            continue;
        };

        if let Err(e) = sender.send(Message::Text(text)).await {
            error!(task = "send session event", error = e.to_string());
            return;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_every_subscriber_receives_every_transition() {
        // Arrange
        let hub = SessionHub::new(16);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();
        let user_id = Uuid::new_v4();

        // Act
        hub.publish(SessionEvent::SignedIn {
            user_id,
            email: "reporter@uni.edu".to_string(),
        });
        hub.publish(SessionEvent::SignedOut { user_id });

        // Assert
        for receiver in [&mut first, &mut second] {
            assert_eq!(
                receiver.recv().await.unwrap(),
                SessionEvent::SignedIn {
                    user_id,
                    email: "reporter@uni.edu".to_string(),
                }
            );
            assert_eq!(
                receiver.recv().await.unwrap(),
                SessionEvent::SignedOut { user_id }
            );
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_not_an_error() {
        let hub = SessionHub::new(4);
        hub.publish(SessionEvent::SignedOut {
            user_id: Uuid::new_v4(),
        });
    }
}
