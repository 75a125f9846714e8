use super::connection::{ServerConnector, ToolOutput, ToolServerConnection};
use super::error::ToolInvokeError;
use super::namespace;
use crate::config::ServerConfig;
use crate::domain::types::NamespacedTool;
use futures::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// A live connection together with the configuration it was created from.
/// Replaced wholesale on reconnect, never mutated.
pub struct ServerConnection {
    name: String,
    config: ServerConfig,
    client: Arc<dyn ToolServerConnection>,
}

impl ServerConnection {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn client(&self) -> Arc<dyn ToolServerConnection> {
        Arc::clone(&self.client)
    }
}

/// Outcome of [`ConnectionManager::connect_all`]. Individual failures do not abort siblings.
#[derive(Debug, Default)]
pub struct ConnectSummary {
    pub connected: Vec<String>,
    pub already_connected: Vec<String>,
    pub failed: Vec<(String, ToolInvokeError)>,
}

impl ConnectSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct ConnectionManager {
    connector: Arc<dyn ServerConnector>,
    connections: RwLock<HashMap<String, Arc<ServerConnection>>>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn ServerConnector>) -> Self {
        Self {
            connector,
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Connect every configured server that has no live connection, concurrently.
    pub async fn connect_all(
        &self,
        configs: &[ServerConfig],
    ) -> Result<ConnectSummary, ToolInvokeError> {
        if configs.is_empty() {
            return Err(ToolInvokeError::NoServersConfigured);
        }

        let mut summary = ConnectSummary::default();
        let pending: Vec<&ServerConfig> = {
            let live = self.connections.read().await;
            configs
                .iter()
                .filter(|config| {
                    let connected = live.contains_key(&config.name);
                    if connected {
                        summary.already_connected.push(config.name.clone());
                    }
                    !connected
                })
                .collect()
        };

        // Each server is installed as soon as its own handshake finishes, so a slow
        // sibling never hides the ones that are already usable.
        let attempts = pending.into_iter().map(|config| async move {
            let outcome = match self.open(config).await {
                Ok(connection) => {
                    self.install(connection).await;
                    Ok(())
                }
                Err(err) => Err(err),
            };
            (config.name.clone(), outcome)
        });

        for (name, outcome) in join_all(attempts).await {
            match outcome {
                Ok(()) => {
                    summary.connected.push(name);
                }
                Err(err) => {
                    error!(server = %name, %err, "Failed to connect to MCP server");
                    summary.failed.push((name, err));
                }
            }
        }

        info!(
            connected = summary.connected.len(),
            already_connected = summary.already_connected.len(),
            failed = summary.failed.len(),
            "MCP connection pass finished"
        );
        Ok(summary)
    }

    /// Merge the tool catalogs of every connected server.
    ///
    /// A server whose listing still fails after its reconnect is left out of the
    /// result; the error is returned only when no server could be listed.
    pub async fn list_tools(&self) -> Result<Vec<NamespacedTool>, ToolInvokeError> {
        let servers = self.connected_servers().await;
        let listings = servers.iter().map(|server| async move {
            let listing = self
                .with_reconnect(server, |client| async move { client.list_tools().await })
                .await;
            (server, listing)
        });

        let mut tools = Vec::new();
        let mut last_error = None;
        let mut listed_any = false;
        for (server, listing) in join_all(listings).await {
            match listing {
                Ok(server_tools) => {
                    listed_any = true;
                    debug!(server = %server, count = server_tools.len(), "Listed tools");
                    for tool in server_tools {
                        if !namespace::is_valid_bare_name(&tool.name) {
                            warn!(
                                server = %server,
                                tool = %tool.name,
                                "Skipping tool whose name collides with the namespace separator"
                            );
                            continue;
                        }
                        tools.push(NamespacedTool {
                            namespaced_name: namespace::qualify(server, &tool.name),
                            server: server.clone(),
                            description: tool.description.unwrap_or_default(),
                            input_schema: tool.input_schema,
                            name: tool.name,
                        });
                    }
                }
                Err(err) => {
                    error!(server = %server, %err, "Failed to list tools");
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) if !listed_any => Err(err),
            _ => Ok(tools),
        }
    }

    /// Route a namespaced call to its server.
    pub async fn call_tool(
        &self,
        namespaced_name: &str,
        arguments: Value,
    ) -> Result<ToolOutput, ToolInvokeError> {
        let (server, tool) =
            namespace::split(namespaced_name).ok_or_else(|| ToolInvokeError::UnknownNamespace {
                name: namespaced_name.to_string(),
            })?;

        self.with_reconnect(server, |client| {
            let arguments = arguments.clone();
            async move { client.call_tool(tool, arguments).await }
        })
        .await
    }

    /// Close every live connection; failures are logged and the set is cleared regardless.
    pub async fn disconnect_all(&self) {
        let drained: Vec<Arc<ServerConnection>> = {
            let mut live = self.connections.write().await;
            live.drain().map(|(_, connection)| connection).collect()
        };

        let closes = drained.iter().map(|connection| async move {
            if let Err(err) = connection.client.close().await {
                warn!(server = %connection.name, %err, "Failed to close MCP server connection");
            } else {
                debug!(server = %connection.name, "Closed MCP server connection");
            }
        });
        join_all(closes).await;
        info!(count = drained.len(), "Disconnected all MCP servers");
    }

    pub async fn connected_servers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.connections.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn is_connected(&self, server: &str) -> bool {
        self.connections.read().await.contains_key(server)
    }

    /// Run `operation` once; on a transport failure replace the connection and run it
    /// exactly once more. Protocol errors from the server propagate untouched.
    async fn with_reconnect<T, F, Fut>(&self, server: &str, operation: F) -> Result<T, ToolInvokeError>
    where
        F: Fn(Arc<dyn ToolServerConnection>) -> Fut,
        Fut: Future<Output = Result<T, ToolInvokeError>>,
    {
        let current = self.live(server).await?;
        match operation(current.client()).await {
            Err(err) if err.is_connection_failure() => {
                warn!(server, %err, "Operation failed, attempting reconnect");
                let fresh = self.reconnect(&current).await?;
                operation(fresh.client()).await
            }
            outcome => outcome,
        }
    }

    async fn live(&self, server: &str) -> Result<Arc<ServerConnection>, ToolInvokeError> {
        self.connections
            .read()
            .await
            .get(server)
            .cloned()
            .ok_or_else(|| ToolInvokeError::ServerNotConnected {
                server: server.to_string(),
            })
    }

    async fn reconnect(
        &self,
        stale: &Arc<ServerConnection>,
    ) -> Result<Arc<ServerConnection>, ToolInvokeError> {
        let removed = {
            let mut live = self.connections.write().await;
            match live.get(&stale.name) {
                Some(existing) if !Arc::ptr_eq(existing, stale) => {
                    debug!(server = %stale.name, "Connection already replaced by another caller");
                    return Ok(Arc::clone(existing));
                }
                Some(_) => live.remove(&stale.name).is_some(),
                None => false,
            }
        };

        if removed {
            if let Err(err) = stale.client.close().await {
                debug!(server = %stale.name, %err, "Failed to close stale connection");
            }
        }

        let fresh = self.open(&stale.config).await?;
        info!(server = %stale.name, "Reconnected to MCP server");
        Ok(self.install(fresh).await)
    }

    async fn open(&self, config: &ServerConfig) -> Result<Arc<ServerConnection>, ToolInvokeError> {
        debug!(server = %config.name, command = %config.command.display(), "Connecting to MCP server");
        let client = self.connector.connect(config).await?;
        Ok(Arc::new(ServerConnection {
            name: config.name.clone(),
            config: config.clone(),
            client,
        }))
    }

    /// Publish a connection unless another caller won the race, in which case the
    /// newcomer is closed and the existing one returned.
    async fn install(&self, connection: Arc<ServerConnection>) -> Arc<ServerConnection> {
        let winner = {
            let mut live = self.connections.write().await;
            match live.get(&connection.name) {
                Some(existing) => Some(Arc::clone(existing)),
                None => {
                    live.insert(connection.name.clone(), Arc::clone(&connection));
                    None
                }
            }
        };

        match winner {
            Some(existing) => {
                if let Err(err) = connection.client.close().await {
                    debug!(server = %connection.name, %err, "Failed to close redundant connection");
                }
                existing
            }
            None => connection,
        }
    }
}
