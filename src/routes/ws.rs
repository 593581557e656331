use std::collections::HashSet;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use crate::{events::ROOM_GLOBAL, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ClientAction {
    Subscribe,
    Unsubscribe,
}

#[derive(Debug, Deserialize)]
struct ClientMessage {
    action: ClientAction,
    room: String,
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.events.subscribe();
    let mut rooms: HashSet<String> = HashSet::new();

    let welcome = serde_json::json!({
        "success": true,
        "message": "Connected to ChainTrack WebSocket",
        "timestamp": Utc::now(),
    });
    if sender
        .send(Message::Text(welcome.to_string().into()))
        .await
        .is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<ClientMessage>(text.as_str()) {
                            Ok(msg) => {
                                let (joined, verb) = match msg.action {
                                    ClientAction::Subscribe => {
                                        rooms.insert(msg.room.clone());
                                        (true, "subscribed")
                                    }
                                    ClientAction::Unsubscribe => {
                                        rooms.remove(&msg.room);
                                        (false, "unsubscribed")
                                    }
                                };
                                tracing::debug!(room = %msg.room, joined, "websocket room change");
                                serde_json::json!({
                                    "success": true,
                                    "message": verb,
                                    "room": msg.room,
                                    "timestamp": Utc::now(),
                                })
                            }
                            Err(_) => serde_json::json!({
                                "success": false,
                                "error": "Expected {\"action\":\"subscribe\"|\"unsubscribe\",\"room\":\"...\"}",
                                "timestamp": Utc::now(),
                            }),
                        };
                        if sender
                            .send(Message::Text(reply.to_string().into()))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        let wanted = rooms.contains(&event.room)
                            || rooms.contains(ROOM_GLOBAL);
                        if !wanted {
                            continue;
                        }
                        let Ok(body) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if sender.send(Message::Text(body.into())).await.is_err() {
                            break;
                        }
                    }
                    // Slow consumers skip missed events rather than dropping
                    // the connection.
                    Err(RecvError::Lagged(missed)) => {
                        tracing::debug!(missed, "websocket subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("websocket client disconnected");
}
