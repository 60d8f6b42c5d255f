//! HTTP and WebSocket routes for the kernel server.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::{IntoResponse, Json},
    routing::get,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::{Mutex as TokioMutex, Notify};
use tower_http::cors::CorsLayer;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::SessionHandle;

/// Application state shared across handlers.
pub struct AppState {
    /// Active kernel session.
    pub session: SessionHandle,
    /// Signalled when a client asks the kernel to stop.
    pub shutdown: Arc<Notify>,
}

type SocketSender = Arc<TokioMutex<SplitSink<WebSocket, Message>>>;

/// Create the router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/kernel_info", get(kernel_info_handler))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler.
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Kernel implementation and language details.
async fn kernel_info_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.lock().await;
    Json(session.kernel_info())
}

/// WebSocket upgrade handler.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

/// Handle WebSocket connection.
async fn handle_websocket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Subscribe to the output channel
    let mut rx = state.session.lock().await.subscribe();

    let sender = Arc::new(TokioMutex::new(sender));
    let sender_clone = sender.clone();

    let forward_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    if !send_message(&sender_clone, &msg).await {
                        break;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Client lagged, dropped {} messages", skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Handle incoming client messages
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => {
                    let stop = matches!(msg, ClientMessage::ShutdownRequest { restart: false, .. });
                    handle_client_message(msg, &state, &sender).await;
                    if stop {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to parse client message: {} (input: {})", e, text);
                    send_message(
                        &sender,
                        &ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        },
                    )
                    .await;
                }
            },
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::warn!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    forward_task.abort();
}

/// Send a server message through the WebSocket.
///
/// Returns `false` once the socket is gone.
async fn send_message(sender: &SocketSender, msg: &ServerMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => {
            let mut sender = sender.lock().await;
            sender.send(Message::Text(json.into())).await.is_ok()
        }
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            true
        }
    }
}

/// Handle a client message.
async fn handle_client_message(msg: ClientMessage, state: &Arc<AppState>, sender: &SocketSender) {
    let parent_id = msg
        .id()
        .map(String::from)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    match msg {
        ClientMessage::KernelInfoRequest { .. } => {
            let info = state.session.lock().await.kernel_info();
            send_message(sender, &ServerMessage::KernelInfoReply { parent_id, info }).await;
        }

        ClientMessage::ExecuteRequest { code, silent, .. } => {
            // The compiler call is synchronous, keep it off the async workers
            let session = state.session.clone();
            let request_id = parent_id.clone();
            let result = tokio::task::spawn_blocking(move || {
                let mut session = session.blocking_lock();
                session.execute(&request_id, &code, silent)
            })
            .await;

            match result {
                Ok(reply) => {
                    send_message(sender, &reply).await;
                }
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                    send_message(
                        sender,
                        &ServerMessage::Error {
                            message: format!("Execute request {} aborted", parent_id),
                        },
                    )
                    .await;
                }
            }
        }

        ClientMessage::ShutdownRequest { restart, .. } => {
            let result = state.session.lock().await.shutdown(restart);
            match result {
                Ok(()) => {
                    send_message(sender, &ServerMessage::ShutdownReply { parent_id, restart })
                        .await;
                }
                Err(e) => {
                    tracing::error!("Shutdown error: {}", e);
                    send_message(
                        sender,
                        &ServerMessage::Error {
                            message: e.to_string(),
                        },
                    )
                    .await;
                }
            }

            if !restart {
                state.shutdown.notify_one();
            }
        }
    }
}

