//! Realtime insert feed over the store's phoenix-style websocket.
//!
//! The feed is unscoped: the store broadcasts an event for every insert on
//! the `messages` collection and each client filters on its own side by
//! re-fetching its conversation. This module only turns socket frames into
//! [`InsertNotice`] values on a broadcast channel; it never fetches rows.

use std::time::Duration;

use futures::{Sink, SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use ruah_shared::constants::TABLE_MESSAGES;
use ruah_shared::MessageId;

use crate::error::{Result, StoreError};
use crate::models::InsertNotice;

/// Keep-alive interval required by the phoenix transport.
const HEARTBEAT_SECS: u64 = 30;

#[derive(Serialize)]
struct PhoenixFrame<'a> {
    topic: &'a str,
    event: &'a str,
    payload: serde_json::Value,
    #[serde(rename = "ref")]
    reference: &'a str,
}

/// Derive the websocket endpoint from the REST base URL.
pub fn websocket_url(base_url: &str, api_key: &str) -> String {
    let ws_base = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        format!("wss://{base_url}")
    };
    format!(
        "{}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
        ws_base.trim_end_matches('/'),
        api_key
    )
}

fn insert_topic() -> String {
    format!("realtime:public:{TABLE_MESSAGES}")
}

/// Run the feed until the socket closes, publishing one [`InsertNotice`]
/// per message insert into `tx`.
pub async fn run_feed(ws_url: &str, tx: broadcast::Sender<InsertNotice>) -> Result<()> {
    let (socket, _) = connect_async(ws_url)
        .await
        .map_err(|e| StoreError::Realtime(format!("connect failed: {e}")))?;
    let (mut sink, mut stream) = socket.split();

    let topic = insert_topic();
    let join = PhoenixFrame {
        topic: &topic,
        event: "phx_join",
        payload: serde_json::json!({}),
        reference: "1",
    };
    send_frame(&mut sink, &join).await?;
    tracing::debug!(topic = %topic, "joined realtime channel");

    let mut heartbeat = tokio::time::interval(Duration::from_secs(HEARTBEAT_SECS));
    heartbeat.tick().await; // first tick is immediate

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                let frame = PhoenixFrame {
                    topic: "phoenix",
                    event: "heartbeat",
                    payload: serde_json::json!({}),
                    reference: "0",
                };
                send_frame(&mut sink, &frame).await?;
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(WsMessage::Text(text))) => {
                        if let Some(notice) = parse_insert(&text) {
                            tracing::debug!(message_id = %notice.message_id, "message insert event");
                            // No receivers is fine; nobody is on the chat tab.
                            let _ = tx.send(notice);
                        }
                    }
                    Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => {}
                    Some(Ok(WsMessage::Close(_))) | None => {
                        return Err(StoreError::Realtime("socket closed".into()));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        return Err(StoreError::Realtime(format!("socket error: {e}")));
                    }
                }
            }
        }
    }
}

async fn send_frame<S>(sink: &mut S, frame: &PhoenixFrame<'_>) -> Result<()>
where
    S: Sink<WsMessage> + Unpin,
    S::Error: std::fmt::Display,
{
    let text = serde_json::to_string(frame)?;
    sink.send(WsMessage::Text(text))
        .await
        .map_err(|e| StoreError::Realtime(format!("send failed: {e}")))
}

/// Extract an insert notice from a raw frame, if it is one.
fn parse_insert(text: &str) -> Option<InsertNotice> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    if value.get("event")?.as_str()? != "INSERT" {
        return None;
    }
    let id = value.get("payload")?.get("record")?.get("id")?.as_str()?;
    let message_id = MessageId(id.parse().ok()?);
    Some(InsertNotice { message_id })
}
