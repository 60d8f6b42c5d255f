//! Kernel session management.
//!
//! Owns the cell controller and the execution counter, and broadcasts
//! everything published on the output channel to connected clients.

use std::sync::Arc;

use elm_kernel_core::{
    CellController, DisplayData, ExecuteStatus, KernelConfig, KernelHost, KernelInfo,
};
use tokio::sync::{Mutex, broadcast};

use crate::error::ServerResult;
use crate::protocol::{ExecutionState, ServerMessage};

/// Capacity for the broadcast channel.
/// If clients fall behind, older messages will be dropped.
const MESSAGE_CHANNEL_CAPACITY: usize = 256;

/// A running kernel.
pub struct KernelSession {
    /// Accumulates cells and compiles them.
    controller: CellController,

    /// Configuration used to rebuild the controller on restart.
    config: KernelConfig,

    /// Count of non-silent execute requests handled so far.
    execution_count: u32,

    /// Broadcast channel for the output channel.
    tx: broadcast::Sender<ServerMessage>,
}

/// Thread-safe session handle.
pub type SessionHandle = Arc<Mutex<KernelSession>>;

/// Host handed to the controller for a single execute request.
struct BroadcastHost<'a> {
    tx: &'a broadcast::Sender<ServerMessage>,
    parent_id: &'a str,
    execution_count: u32,
    silent: bool,
}

impl KernelHost for BroadcastHost<'_> {
    fn publish_display(&mut self, display: DisplayData) {
        if self.silent {
            return;
        }
        // No subscribers is not an error
        let _ = self.tx.send(ServerMessage::DisplayData {
            parent_id: self.parent_id.to_string(),
            data: display.data,
            metadata: display.metadata,
        });
    }

    fn execution_count(&self) -> u32 {
        self.execution_count
    }
}

impl KernelSession {
    /// Create a new kernel session.
    pub fn new(config: KernelConfig) -> ServerResult<(Self, broadcast::Receiver<ServerMessage>)> {
        let controller = CellController::new(config.clone())?;
        let (tx, rx) = broadcast::channel(MESSAGE_CHANNEL_CAPACITY);

        tracing::info!(
            "Kernel session started (compiler: {}, workspace: {})",
            config.compiler.display(),
            controller.workspace().path().display()
        );

        let session = Self {
            controller,
            config,
            execution_count: 0,
            tx,
        };
        Ok((session, rx))
    }

    /// Subscribe to the output channel.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.tx.subscribe()
    }

    /// Broadcast a message to all clients.
    pub fn broadcast(&self, msg: ServerMessage) {
        let _ = self.tx.send(msg);
    }

    pub fn execution_count(&self) -> u32 {
        self.execution_count
    }

    pub fn controller(&self) -> &CellController {
        &self.controller
    }

    pub fn kernel_info(&self) -> KernelInfo {
        KernelInfo::default()
    }

    /// Execute one cell and build the reply.
    ///
    /// Blocks while the compiler runs.
    pub fn execute(&mut self, parent_id: &str, code: &str, silent: bool) -> ServerMessage {
        if !silent {
            self.execution_count += 1;
        }
        self.broadcast_status(Some(parent_id), ExecutionState::Busy);

        let mut host = BroadcastHost {
            tx: &self.tx,
            parent_id,
            execution_count: self.execution_count,
            silent,
        };

        let (status, error) = match self.controller.execute(&mut host, code) {
            Ok(status) => (status, None),
            Err(e) => {
                tracing::error!("Execute request {} failed: {}", parent_id, e);
                (ExecuteStatus::Error, Some(e.to_string()))
            }
        };

        self.broadcast_status(Some(parent_id), ExecutionState::Idle);

        ServerMessage::ExecuteReply {
            parent_id: parent_id.to_string(),
            status,
            execution_count: self.execution_count,
            error,
        }
    }

    /// Stop the kernel, or rebuild it from scratch when `restart` is set.
    pub fn shutdown(&mut self, restart: bool) -> ServerResult<()> {
        self.controller.shutdown()?;

        if restart {
            self.controller = CellController::new(self.config.clone())?;
            self.execution_count = 0;
            tracing::info!(
                "Kernel restarted (workspace: {})",
                self.controller.workspace().path().display()
            );
            self.broadcast_status(None, ExecutionState::Starting);
        } else {
            tracing::info!("Kernel shut down");
        }

        Ok(())
    }

    fn broadcast_status(&self, parent_id: Option<&str>, execution_state: ExecutionState) {
        self.broadcast(ServerMessage::Status {
            parent_id: parent_id.map(String::from),
            execution_state,
        });
    }
}
