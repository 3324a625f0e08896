//! WebSocket event subscriptions.
//!
//! The subscription handle owns the reader task: dropping it (or calling
//! [`EventSubscription::unsubscribe`]) cancels delivery. The socket
//! reconnects with a fixed backoff until the handle is released, so
//! delivery is at-least-once and polling remains the completeness backstop.

use crate::types::EventEnvelope;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use solver_types::{Result, SolverError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

type Handler = Arc<dyn Fn(EventEnvelope) + Send + Sync>;

/// Live subscription to one Move event type.
pub struct EventSubscription {
	event_type: String,
	task: JoinHandle<()>,
}

impl EventSubscription {
	pub(crate) async fn connect(
		ws_url: String,
		event_type: String,
		handler: Handler,
	) -> Result<Self> {
		// Establish the first connection eagerly so a bad endpoint fails
		// the caller instead of spinning in the background.
		let stream = open_stream(&ws_url, &event_type).await?;
		info!(event_type, "event subscription established");

		let task_event_type = event_type.clone();
		let task = tokio::spawn(async move {
			run_subscription(ws_url, task_event_type, handler, Some(stream)).await;
		});

		Ok(Self { event_type, task })
	}

	/// Cancels the subscription. Equivalent to dropping the handle.
	pub fn unsubscribe(self) {
		info!(event_type = %self.event_type, "unsubscribing");
	}
}

impl Drop for EventSubscription {
	fn drop(&mut self) {
		self.task.abort();
	}
}

type WsStream =
	tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn open_stream(ws_url: &str, event_type: &str) -> Result<WsStream> {
	let (mut stream, _) = connect_async(ws_url)
		.await
		.map_err(|e| SolverError::Transient(format!("websocket connect failed: {e}")))?;

	let request = json!({
		"jsonrpc": "2.0",
		"id": 1,
		"method": "suix_subscribeEvent",
		"params": [{"MoveEventType": event_type}],
	});
	stream
		.send(Message::Text(request.to_string()))
		.await
		.map_err(|e| SolverError::Transient(format!("subscribe request failed: {e}")))?;

	Ok(stream)
}

async fn run_subscription(
	ws_url: String,
	event_type: String,
	handler: Handler,
	mut pending: Option<WsStream>,
) {
	loop {
		let stream = match pending.take() {
			Some(stream) => stream,
			None => match open_stream(&ws_url, &event_type).await {
				Ok(stream) => {
					info!(event_type, "event subscription re-established");
					stream
				}
				Err(e) => {
					warn!(event_type, error = %e, "subscription reconnect failed");
					tokio::time::sleep(RECONNECT_DELAY).await;
					continue;
				}
			},
		};

		read_until_closed(stream, &event_type, &handler).await;
		tokio::time::sleep(RECONNECT_DELAY).await;
	}
}

async fn read_until_closed(mut stream: WsStream, event_type: &str, handler: &Handler) {
	while let Some(message) = stream.next().await {
		match message {
			Ok(Message::Text(text)) => {
				if let Some(envelope) = parse_notification(&text) {
					debug!(event_type, "subscription delivery");
					handler(envelope);
				}
			}
			Ok(Message::Ping(payload)) => {
				if stream.send(Message::Pong(payload)).await.is_err() {
					break;
				}
			}
			Ok(Message::Close(_)) => {
				warn!(event_type, "subscription closed by server");
				break;
			}
			Ok(_) => {}
			Err(e) => {
				warn!(event_type, error = %e, "subscription read error");
				break;
			}
		}
	}
}

/// Parses a `suix_subscribeEvent` notification frame; subscription acks and
/// unrelated frames return `None`.
fn parse_notification(text: &str) -> Option<EventEnvelope> {
	let frame: Value = serde_json::from_str(text).ok()?;
	if frame.get("method").and_then(Value::as_str) != Some("suix_subscribeEvent") {
		return None;
	}
	let result = frame.pointer("/params/result")?;

	Some(EventEnvelope {
		type_string: result.get("type")?.as_str()?.to_string(),
		parsed_json: result.get("parsedJson").cloned().unwrap_or(Value::Null),
		timestamp_ms: match result.get("timestampMs") {
			Some(Value::String(s)) => s.parse().unwrap_or_default(),
			Some(Value::Number(n)) => n.as_u64().unwrap_or_default(),
			_ => 0,
		},
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn notification_frames_are_parsed() {
		let text = r#"{
			"jsonrpc": "2.0",
			"method": "suix_subscribeEvent",
			"params": {
				"subscription": 7,
				"result": {
					"type": "0xabc::intents::IntentCreated",
					"parsedJson": {"intent_id": "0x1"},
					"timestampMs": "1722550000000"
				}
			}
		}"#;
		let envelope = parse_notification(text).unwrap();
		assert_eq!(envelope.type_string, "0xabc::intents::IntentCreated");
		assert_eq!(envelope.timestamp_ms, 1_722_550_000_000);
	}

	#[test]
	fn ack_frames_are_ignored() {
		assert!(parse_notification(r#"{"jsonrpc":"2.0","id":1,"result":7}"#).is_none());
		assert!(parse_notification("not json").is_none());
	}
}
