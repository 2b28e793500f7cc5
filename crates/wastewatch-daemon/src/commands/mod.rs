//! IPC command handlers.
//!
//! Each submodule implements the commands for one IPC category. Handlers
//! run with the service lock held by the dispatcher.

pub mod reports;
pub mod users;

use serde_json::Value;

use crate::rpc::RpcError;

type Result = std::result::Result<Value, RpcError>;

/// Required string parameter.
fn str_param<'a>(params: &'a Value, name: &str) -> std::result::Result<&'a str, RpcError> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params(&format!("{name} required")))
}
