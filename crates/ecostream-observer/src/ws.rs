//! Live metrics over `WebSocket`.
//!
//! `GET /ws/metrics` upgrades to a socket that carries one JSON text
//! frame per completed metrics cycle, encoded from [`CycleOutcome`].
//! Every connection subscribes to the shared outcome channel on
//! [`AppState`]. Slow connections drop the outcomes they missed and
//! resume with the newest one.
//!
//! Inbound traffic is limited to pings, which are answered, and the
//! close handshake. Anything else the client sends is discarded.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use ecostream_types::CycleOutcome;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

type Outbound = SplitSink<WebSocket, Message>;

/// Whether a metrics stream keeps going after handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Close(&'static str),
}

/// `GET /ws/metrics` -- upgrade and stream cycle outcomes.
pub async fn ws_metrics(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| stream_outcomes(socket, state))
}

async fn stream_outcomes(socket: WebSocket, state: Arc<AppState>) {
    let mut outcomes = state.subscribe();
    let (mut outbound, mut inbound) = socket.split();
    debug!(subscribers = state.tx.receiver_count(), "Metrics stream opened");

    let reason = loop {
        let step = tokio::select! {
            next = outcomes.recv() => relay(&mut outbound, next).await,
            frame = inbound.next() => reply(&mut outbound, frame).await,
        };
        if let Step::Close(reason) = step {
            break reason;
        }
    };

    debug!(reason, "Metrics stream closed");
}

/// Forward one item from the outcome channel to the client.
async fn relay(outbound: &mut Outbound, next: Result<CycleOutcome, RecvError>) -> Step {
    match next {
        Ok(outcome) => match outcome_frame(&outcome) {
            Ok(frame) => push(outbound, frame).await,
            Err(e) => {
                warn!(error = %e, "Dropping cycle outcome that failed to encode");
                Step::Continue
            }
        },
        Err(RecvError::Lagged(skipped)) => {
            debug!(skipped, "Metrics stream behind, resuming at newest outcome");
            Step::Continue
        }
        Err(RecvError::Closed) => Step::Close("outcome channel closed"),
    }
}

/// React to one inbound frame, or to the end of the inbound stream.
async fn reply(outbound: &mut Outbound, frame: Option<Result<Message, axum::Error>>) -> Step {
    match frame {
        None | Some(Ok(Message::Close(_))) => Step::Close("client closed"),
        Some(Ok(Message::Ping(payload))) => push(outbound, Message::Pong(payload)).await,
        Some(Ok(_)) => Step::Continue,
        Some(Err(e)) => {
            debug!(error = %e, "Metrics stream read failed");
            Step::Close("read failed")
        }
    }
}

async fn push(outbound: &mut Outbound, frame: Message) -> Step {
    match outbound.send(frame).await {
        Ok(()) => Step::Continue,
        Err(_) => Step::Close("send failed"),
    }
}

/// Text frame carrying `outcome` as JSON.
fn outcome_frame(outcome: &CycleOutcome) -> Result<Message, serde_json::Error> {
    serde_json::to_string(outcome).map(|json| Message::Text(json.into()))
}
