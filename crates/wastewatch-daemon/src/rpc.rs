//! JSON-RPC server over Unix socket.
//!
//! Listens on a Unix domain socket, accepts connections, and dispatches
//! newline-delimited JSON-RPC calls to the command handlers. The caller
//! identity of every request is taken from the connecting process's peer
//! credentials.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};
use wastewatch_reports::ServiceError;
use wastewatch_types::Identity;

use crate::commands;
use crate::DaemonState;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Method name.
    pub method: String,
    /// Parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    /// JSON-RPC version.
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Result or error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcError {
    pub code: i32,
    /// Error name.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcResponse {
    /// Create a success response.
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

impl RpcError {
    fn new(code: i32, message: &str, data: Option<serde_json::Value>) -> Self {
        Self {
            code,
            message: message.to_string(),
            data,
        }
    }

    // Standard JSON-RPC errors

    /// Parse error (-32700).
    pub fn parse_error() -> Self {
        Self::new(-32700, "PARSE_ERROR", None)
    }

    /// Invalid request (-32600).
    pub fn invalid_request() -> Self {
        Self::new(-32600, "INVALID_REQUEST", None)
    }

    /// Method not found (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            -32601,
            "METHOD_NOT_FOUND",
            Some(serde_json::json!({"method": method})),
        )
    }

    /// Invalid params (-32602).
    pub fn invalid_params(detail: &str) -> Self {
        Self::new(
            -32602,
            "INVALID_PARAMS",
            Some(serde_json::json!({"detail": detail})),
        )
    }

    /// Internal error (-32603).
    pub fn internal_error(detail: &str) -> Self {
        Self::new(
            -32603,
            "INTERNAL_ERROR",
            Some(serde_json::json!({"detail": detail})),
        )
    }
}

impl From<ServiceError> for RpcError {
    fn from(err: ServiceError) -> Self {
        let detail = err.to_string();
        match err {
            ServiceError::AlreadyRegistered => Self::new(-32020, "ALREADY_REGISTERED", None),
            ServiceError::Unauthorized => Self::new(-32021, "UNAUTHORIZED", None),
            ServiceError::InvalidPayload(fields) => {
                let fields: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
                Self::new(
                    -32022,
                    "INVALID_PAYLOAD",
                    Some(serde_json::json!({"fields": fields})),
                )
            }
            ServiceError::InvalidStatus(status) => Self::new(
                -32023,
                "INVALID_STATUS",
                Some(serde_json::json!({"status": status})),
            ),
            ServiceError::InvalidTransition { id, current } => Self::new(
                -32024,
                "INVALID_TRANSITION",
                Some(serde_json::json!({"id": id, "current": current})),
            ),
            ServiceError::NotFound(id) => Self::new(
                -32025,
                "NOT_FOUND",
                Some(serde_json::json!({"id": id, "detail": detail})),
            ),
            ServiceError::Internal(_) => Self::internal_error(&detail),
        }
    }
}

/// The RPC server.
pub struct RpcServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
}

impl RpcServer {
    /// Create a new RPC server.
    pub fn new(state: Arc<DaemonState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Run the server, accepting connections.
    pub async fn run(&self) -> anyhow::Result<()> {
        // Remove stale socket file
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("IPC server listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(state, stream).await {
                            warn!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Identity of the process on the other end of the socket.
fn peer_identity(stream: &UnixStream) -> anyhow::Result<Identity> {
    let cred = stream.peer_cred()?;
    Ok(Identity::new(format!("uid:{}", cred.uid())))
}

/// Handle a single client connection.
async fn handle_connection(state: Arc<DaemonState>, stream: UnixStream) -> anyhow::Result<()> {
    let caller = peer_identity(&stream)?;
    debug!(caller = %caller, "client connected");

    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break; // EOF
        }

        let response = handle_line(&state, &caller, &line).await;

        let mut response_json = serde_json::to_string(&response)?;
        response_json.push('\n');
        writer.write_all(response_json.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Parse one request line and dispatch it.
///
/// Malformed JSON is a parse error; valid JSON that is not a 2.0 request
/// object is an invalid request.
pub async fn handle_line(state: &DaemonState, caller: &Identity, line: &str) -> RpcResponse {
    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(_) => return RpcResponse::error(serde_json::Value::Null, RpcError::parse_error()),
    };
    let id = value.get("id").cloned().unwrap_or(serde_json::Value::Null);

    match serde_json::from_value::<RpcRequest>(value) {
        Ok(request) if request.jsonrpc == "2.0" => dispatch_request(state, caller, request).await,
        _ => RpcResponse::error(id, RpcError::invalid_request()),
    }
}

/// Dispatch a JSON-RPC request to the appropriate command handler.
///
/// The service lock is held for the whole call, so operations never
/// interleave.
pub async fn dispatch_request(
    state: &DaemonState,
    caller: &Identity,
    request: RpcRequest,
) -> RpcResponse {
    let id = request.id.clone();
    let method = request.method.as_str();
    let params = &request.params;

    debug!("Dispatching RPC method: {}", method);

    let service = state.service.lock().await;

    let result = match method {
        // Identity
        "register_user" => commands::users::register_user(&service, caller, params),
        "get_registered_user" => commands::users::get_registered_user(&service),

        // Report mutations
        "create_report" => commands::reports::create_report(&service, caller, params),
        "update_report" => commands::reports::update_report(&service, caller, params),
        "delete_report" => commands::reports::delete_report(&service, caller, params),
        "resolve_report" => commands::reports::resolve_report(&service, caller, params),

        // Report queries
        "get_report_location" => commands::reports::get_report_location(&service, params),
        "list_reports" => commands::reports::list_reports(&service),
        "list_reports_by_status" => commands::reports::list_reports_by_status(&service, params),
        "list_reports_by_reporter" => {
            commands::reports::list_reports_by_reporter(&service, params)
        }

        _ => Err(RpcError::method_not_found(method)),
    };

    match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(err) => RpcResponse::error(id, err),
    }
}
