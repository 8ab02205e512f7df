//! `WordlinkServer` builder and server loop.
//!
//! This is the entry point for running a Wordlink game server. It ties
//! together all the layers: transport → protocol → room, plus the health
//! monitor and audit writer that run beside them.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::task::JoinHandle;
use wordlink_protocol::JsonCodec;
use wordlink_room::{AuditLog, AuditSink, HealthMonitor, RoomConfig, RoomRegistry};
use wordlink_transport::{WebSocketConnection, WebSocketTransport};

use crate::WordlinkError;
use crate::handler::handle_connection;
use crate::lifecycle::ConnectionLifecycleManager;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) lifecycle: Arc<ConnectionLifecycleManager>,
    pub(crate) codec: JsonCodec,
    pub(crate) active_connections: AtomicUsize,
    pub(crate) internal_errors: AtomicU64,
}

/// Builder for configuring and starting a Wordlink server.
///
/// # Example
///
/// ```rust,no_run
/// use wordlink::prelude::*;
///
/// # async fn start() -> Result<(), WordlinkError> {
/// let server = WordlinkServer::builder()
///     .bind("0.0.0.0:8080")
///     .room_config(RoomConfig::default())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct WordlinkServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    audit: AuditLog,
    audit_task: Option<JoinHandle<()>>,
}

impl WordlinkServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
            audit: AuditLog::disabled(),
            audit_task: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Records every accepted word to `sink`.
    ///
    /// Starts the audit writer task, so this must be called inside a Tokio
    /// runtime.
    pub fn audit_sink(mut self, sink: impl AuditSink) -> Self {
        if let Some(previous) = self.audit_task.take() {
            previous.abort();
        }
        let (audit, task) = AuditLog::spawn(sink);
        self.audit = audit;
        self.audit_task = Some(task);
        self
    }

    /// Binds the listener and assembles the server.
    pub async fn build(self) -> Result<WordlinkServer, WordlinkError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let registry = Arc::new(RoomRegistry::with_audit(self.room_config, self.audit));

        let state = Arc::new(ServerState {
            lifecycle: Arc::new(ConnectionLifecycleManager::new(registry)),
            codec: JsonCodec,
            active_connections: AtomicUsize::new(0),
            internal_errors: AtomicU64::new(0),
        });

        Ok(WordlinkServer {
            transport,
            state,
            _audit_task: self.audit_task,
        })
    }
}

impl Default for WordlinkServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Wordlink game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct WordlinkServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
    _audit_task: Option<JoinHandle<()>>,
}

impl WordlinkServer {
    /// Creates a new builder.
    pub fn builder() -> WordlinkServerBuilder {
        WordlinkServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// The room registry this server routes into.
    pub fn registry(&self) -> Arc<RoomRegistry> {
        Arc::clone(self.state.lifecycle.registry())
    }

    /// Number of connections currently being handled.
    pub fn active_connections(&self) -> usize {
        self.state.active_connections.load(Ordering::Relaxed)
    }

    /// Number of events that failed on a server fault rather than a
    /// player mistake, since startup.
    pub fn internal_errors(&self) -> u64 {
        self.state.internal_errors.load(Ordering::Relaxed)
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), WordlinkError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` resolves.
    ///
    /// Starts the health monitor first and stops it on the way out.
    /// Connection tasks already running are left to finish on their own.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), WordlinkError> {
        let monitor = HealthMonitor::from_registry(self.registry()).spawn();
        tracing::info!(addr = ?self.local_addr().ok(), "Wordlink server running");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested, no longer accepting");
                    break;
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => self.spawn_handler(conn),
                    Err(e) => tracing::error!(error = %e, "accept failed"),
                },
            }
        }

        monitor.shutdown().await;
        tracing::info!(
            active = self.active_connections(),
            internal_errors = self.internal_errors(),
            "server stopped"
        );
        Ok(())
    }

    fn spawn_handler(&self, conn: WebSocketConnection) {
        let state = Arc::clone(&self.state);
        let active = state.active_connections.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(active, "connection accepted");

        tokio::spawn(async move {
            if let Err(e) = handle_connection(conn, Arc::clone(&state)).await {
                tracing::debug!(error = %e, "connection ended with error");
            }
            let active = state.active_connections.fetch_sub(1, Ordering::Relaxed) - 1;
            tracing::info!(active, "connection closed");
        });
    }
}
