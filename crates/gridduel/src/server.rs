//! `GridDuelServer` builder and accept loop.
//!
//! This is the entry point for running a GridDuel server. It ties the
//! layers together: transport → handler → hub → dispatcher.

use std::path::PathBuf;

use gridduel_account::AccountStore;
use gridduel_protocol::CsvCodec;
use gridduel_replay::ReplayStore;
use gridduel_transport::{Transport, WebSocketTransport};
use tokio::task::JoinHandle;

use crate::dispatcher::Dispatcher;
use crate::handler::handle_connection;
use crate::hub::{spawn_hub, HubHandle};
use crate::{DispatchConfig, GridDuelError, ServerConfig};

/// Builder for configuring and starting a GridDuel server.
///
/// # Example
///
/// ```rust,ignore
/// use gridduel::prelude::*;
///
/// let server = GridDuelServer::builder()
///     .bind("0.0.0.0:8080")
///     .data_dir("data")
///     .build(MemoryAccountStore::new())
///     .await?;
/// server.run().await
/// ```
pub struct GridDuelServerBuilder {
    bind_addr: String,
    data_dir: PathBuf,
    dispatch: DispatchConfig,
}

impl GridDuelServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    /// Starts from a loaded [`ServerConfig`]. The accounts file is not
    /// used here; open the store yourself and pass it to [`build`](Self::build).
    pub fn from_config(config: ServerConfig) -> Self {
        Self {
            bind_addr: config.bind_addr,
            data_dir: config.data_dir,
            dispatch: config.dispatch,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the directory replays are stored in.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Sets the dispatcher configuration.
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.dispatch = config;
        self
    }

    /// Opens the replay store, binds the listener, and starts the hub.
    ///
    /// # Errors
    /// - [`GridDuelError::Replay`] if the data directory or replay index
    ///   can't be read
    /// - [`GridDuelError::Transport`] if the address can't be bound
    pub async fn build<S: AccountStore>(self, store: S) -> Result<GridDuelServer, GridDuelError> {
        let replays = ReplayStore::open(&self.data_dir)?;
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let dispatcher = Dispatcher::new(store, replays, self.dispatch);
        let (hub, hub_task) = spawn_hub(dispatcher, CsvCodec);

        Ok(GridDuelServer {
            transport,
            hub,
            hub_task,
        })
    }
}

impl Default for GridDuelServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound GridDuel server.
///
/// Call [`run()`](Self::run) or [`run_until()`](Self::run_until) to start
/// accepting connections.
pub struct GridDuelServer {
    transport: WebSocketTransport,
    hub: HubHandle,
    hub_task: JoinHandle<()>,
}

impl GridDuelServer {
    /// Creates a new builder.
    pub fn builder() -> GridDuelServerBuilder {
        GridDuelServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), GridDuelError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `signal` resolves, then shuts down.
    ///
    /// Shutdown stops accepting, flushes the replay index through the
    /// hub, and waits for the hub task to exit. Connection tasks still
    /// running are left to notice the hub is gone.
    ///
    /// # Errors
    /// Returns [`GridDuelError::Replay`] if the final flush fails.
    pub async fn run_until(
        mut self,
        signal: impl Future<Output = ()>,
    ) -> Result<(), GridDuelError> {
        tracing::info!("GridDuel server running");
        tokio::pin!(signal);

        loop {
            tokio::select! {
                () = &mut signal => {
                    tracing::info!("shutdown requested");
                    break;
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let hub = self.hub.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, hub).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        self.transport.shutdown().await?;
        let flushed = self.hub.shutdown().await;
        if let Err(e) = self.hub_task.await {
            tracing::error!(error = %e, "hub task failed");
        }
        flushed
    }
}
