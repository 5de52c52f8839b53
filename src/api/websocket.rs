//! WebSocket handler for live auth-state updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use tracing::debug;

use super::handlers::AppState;
use super::types::{ClientMessage, ErrorBody, ServerMessage};
use crate::provider::{use_auth, AuthContext};

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let auth = use_auth(&state.scope);
    ws.on_upgrade(move |socket| handle_socket(socket, auth))
}

async fn send(
    sink: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).map_err(axum::Error::new)?;
    sink.send(Message::Text(json.into())).await
}

/// Push the current state, then every change, until the client leaves.
async fn handle_socket(socket: WebSocket, auth: AuthContext) {
    let (mut sink, mut stream) = socket.split();
    let mut rx = auth.watch();

    let state = rx.borrow_and_update().clone();
    if send(&mut sink, &ServerMessage::State { state }).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                if send(&mut sink, &ServerMessage::State { state }).await.is_err() {
                    break;
                }
            }
            msg = stream.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                        continue;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };

                let reply = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::SignIn { email, password }) => {
                        let result = auth.sign_in(&email, &password).await;
                        ServerMessage::SignInResult {
                            error: result.as_ref().err().map(ErrorBody::from),
                        }
                    }
                    Ok(ClientMessage::SignOut) => {
                        auth.sign_out().await;
                        ServerMessage::SignOutComplete
                    }
                    Ok(ClientMessage::Ping) => ServerMessage::Pong,
                    Err(e) => ServerMessage::Error {
                        code: "PARSE_ERROR".to_string(),
                        message: e.to_string(),
                    },
                };
                if send(&mut sink, &reply).await.is_err() {
                    break;
                }
            }
        }
    }

    debug!("Auth state socket closed");
}
