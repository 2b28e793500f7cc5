//! wastewatch-daemon: serves the report store to local clients.
//!
//! Single OS process running a Tokio runtime. Clients talk JSON-RPC over a
//! Unix socket; the socket's peer credentials identify the caller.

mod commands;
mod config;
mod rpc;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wastewatch_reports::{IdentityRegistry, ReportService, ServicePolicy};

use crate::config::DaemonConfig;
use crate::rpc::RpcServer;

/// Daemon-wide shared state.
pub struct DaemonState {
    /// The report service. Every RPC call holds this lock for its whole
    /// duration, so calls execute one at a time.
    pub service: Mutex<ReportService>,
}

impl DaemonState {
    fn new(conn: rusqlite::Connection, config: &DaemonConfig) -> Self {
        let max_record_bytes = config.storage.max_record_bytes;
        let service = ReportService::new(conn, IdentityRegistry::new(max_record_bytes))
            .with_max_record_bytes(max_record_bytes)
            .with_policy(ServicePolicy::from(&config.policy));
        Self {
            service: Mutex::new(service),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = DaemonConfig::load()?;

    // 2. Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("WasteWatch daemon starting");

    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;

    // 3. Open database
    let conn = wastewatch_db::open(&config.db_path())?;
    let socket_path = config.socket_path();
    let state = Arc::new(DaemonState::new(conn, &config));

    {
        let service = state.service.lock().await;
        if service.registered_user()?.is_none() {
            info!("No user registered yet; the first register_user call claims the store");
        }
    }

    // 4. Run the RPC server until shutdown
    let rpc_server = RpcServer::new(state.clone(), socket_path.clone());
    info!("Starting JSON-RPC server on {:?}", socket_path);

    tokio::select! {
        result = rpc_server.run() => {
            if let Err(e) = result {
                error!("RPC server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    // Clean up socket file
    let _ = std::fs::remove_file(&socket_path);

    info!("Daemon stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Daemon state over an in-memory database.
    pub fn memory_state() -> DaemonState {
        let conn = wastewatch_db::open_memory().expect("open in-memory db");
        DaemonState::new(conn, &DaemonConfig::default())
    }

    #[tokio::test]
    async fn test_state_applies_policy() {
        let mut config = DaemonConfig::default();
        config.policy.resolve_requires_authorization = false;
        let conn = wastewatch_db::open_memory().expect("open");
        let state = DaemonState::new(conn, &config);

        let service = state.service.lock().await;
        assert!(!service.policy().resolve_requires_authorization);
    }
}
