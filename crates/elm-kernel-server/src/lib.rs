//! Elm notebook kernel server.
//!
//! Hosts a [`CellController`](elm_kernel_core::CellController) behind a
//! WebSocket endpoint so a notebook front-end can submit cells and receive
//! rendered output.
//!
//! # Architecture
//!
//! The server consists of:
//! - **Session**: Owns the controller and the execution counter
//! - **Protocol**: Defines client/server message types
//! - **Routes**: HTTP and WebSocket handlers

pub mod error;
pub mod protocol;
pub mod routes;
pub mod session;

use std::net::SocketAddr;
use std::sync::Arc;

use elm_kernel_core::KernelConfig;
use tokio::sync::{Mutex, Notify};

pub use error::{ServerError, ServerResult};
pub use protocol::{ClientMessage, ExecutionState, ServerMessage};
pub use routes::{AppState, create_router};
pub use session::{KernelSession, SessionHandle};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Compiler and project settings for the kernel.
    pub kernel: KernelConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8888,
            kernel: KernelConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Socket address built from `host` and `port`.
    pub fn addr(&self) -> ServerResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }
}

/// Start the kernel server and run until Ctrl+C or a shutdown request.
pub async fn serve(config: ServerConfig) -> ServerResult<()> {
    let addr = config.addr()?;

    let (session, _rx) = KernelSession::new(config.kernel)?;
    let session = Arc::new(Mutex::new(session));
    let shutdown = Arc::new(Notify::new());

    let state = Arc::new(AppState {
        session: session.clone(),
        shutdown: shutdown.clone(),
    });

    let app = create_router(state);

    tracing::info!("Starting Elm kernel at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Serve with graceful shutdown
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    tracing::info!("Received shutdown signal");
                }
            }
            _ = shutdown.notified() => {
                tracing::info!("Shutdown requested by client");
            }
        }
    });

    server.await?;

    // Release the scratch workspace if no client did
    let mut session = session.lock().await;
    if !session.controller().is_shut_down() {
        session.shutdown(false)?;
    }

    tracing::info!("Server shutdown complete");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8888);
        assert_eq!(config.addr().unwrap().port(), 8888);
    }

    #[test]
    fn test_invalid_address() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.addr(), Err(ServerError::InvalidAddress(_))));
    }
}
