//! WebSocket protocol messages for the kernel server.
//!
//! Message names follow the Jupyter messaging protocol. Every request may
//! carry an `id`; replies and the displays produced while handling the
//! request echo it as `parent_id`.

use elm_kernel_core::{ExecuteStatus, KernelInfo, MimeBundle};
use serde::{Deserialize, Serialize};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask for implementation and language details.
    KernelInfoRequest {
        #[serde(default)]
        id: Option<String>,
    },

    /// Execute one cell.
    ExecuteRequest {
        #[serde(default)]
        id: Option<String>,
        /// Cell source.
        code: String,
        /// Run without publishing displays or bumping the execution count.
        #[serde(default)]
        silent: bool,
    },

    /// Stop or restart the kernel.
    ShutdownRequest {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        restart: bool,
    },
}

impl ClientMessage {
    /// Request id, if the client supplied one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::KernelInfoRequest { id }
            | Self::ExecuteRequest { id, .. }
            | Self::ShutdownRequest { id, .. } => id.as_deref(),
        }
    }
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Kernel busy/idle notification.
    Status {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<String>,
        execution_state: ExecutionState,
    },

    /// Reply to `kernel_info_request`.
    KernelInfoReply { parent_id: String, info: KernelInfo },

    /// Rich output published while executing a request.
    DisplayData {
        parent_id: String,
        data: MimeBundle,
        metadata: serde_json::Value,
    },

    /// Reply to `execute_request`.
    ///
    /// Sent directly on the requesting socket, while `status` and
    /// `display_data` go out on the broadcast channel. The two streams are
    /// not ordered with respect to each other: a client may see the reply
    /// before the displays it belongs to, and should match them by
    /// `parent_id`.
    ExecuteReply {
        parent_id: String,
        status: ExecuteStatus,
        execution_count: u32,
        /// Infrastructure failure description when `status` is `error`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Reply to `shutdown_request`.
    ShutdownReply { parent_id: String, restart: bool },

    /// Generic error message.
    Error {
        /// Error description.
        message: String,
    },
}

/// Kernel execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    Starting,
    Busy,
    Idle,
}
