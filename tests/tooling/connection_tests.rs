// Connection manager tests - namespacing, routing and the reconnect-once policy

#[path = "../support/mod.rs"]
mod support;

use open_agent_core::config::ServerConfig;
use open_agent_core::tooling::{ConnectionManager, ToolInvokeError, ToolOutput, ToolRegistry};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::timeout;
use support::{FakeConnector, FakeServer};

fn configs(names: &[&str]) -> Vec<ServerConfig> {
    names
        .iter()
        .map(|name| ServerConfig::new(*name, "mcp-server"))
        .collect()
}

#[tokio::test]
async fn namespaced_names_are_distinct_and_prefixed() {
    let connector = FakeConnector::default()
        .with_server("notion", FakeServer::new(&["search", "fetch"]))
        .with_server("github", FakeServer::new(&["search", "create_issue"]));
    let manager = ConnectionManager::new(Arc::new(connector));

    let summary = manager
        .connect_all(&configs(&["notion", "github"]))
        .await
        .expect("connect");
    assert!(summary.is_complete());

    let tools = manager.list_tools().await.expect("tools");
    let names: HashSet<_> = tools.iter().map(|t| t.namespaced_name.as_str()).collect();
    assert_eq!(names.len(), 4);
    for tool in &tools {
        assert!(tool.namespaced_name.starts_with(&format!("{}__", tool.server)));
        assert_eq!(tool.namespaced_name, format!("{}__{}", tool.server, tool.name));
    }
    assert!(names.contains("notion__search"));
    assert!(names.contains("github__search"));
}

#[tokio::test]
async fn empty_configuration_is_rejected_before_connecting() {
    let notion = FakeServer::new(&["search"]);
    let manager = ConnectionManager::new(Arc::new(
        FakeConnector::default().with_server("notion", Arc::clone(&notion)),
    ));

    let result = manager.connect_all(&[]).await;

    assert!(matches!(result, Err(ToolInvokeError::NoServersConfigured)));
    assert_eq!(notion.connects(), 0);
}

#[tokio::test]
async fn one_failing_server_does_not_block_others() {
    let manager = ConnectionManager::new(Arc::new(
        FakeConnector::default().with_server("notion", FakeServer::new(&["search"])),
    ));

    let summary = manager
        .connect_all(&configs(&["notion", "missing"]))
        .await
        .expect("connect");

    assert_eq!(summary.connected, vec!["notion".to_string()]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "missing");
    assert_eq!(manager.connected_servers().await, vec!["notion".to_string()]);

    let tools = manager.list_tools().await.expect("tools");
    assert_eq!(tools.len(), 1);
}

#[tokio::test]
async fn hanging_server_does_not_hide_connected_siblings() {
    let manager = Arc::new(ConnectionManager::new(Arc::new(
        FakeConnector::default()
            .with_server("notion", FakeServer::new(&["search"]))
            .with_hanging_server("slow"),
    )));

    let pass = tokio::spawn({
        let manager = Arc::clone(&manager);
        async move {
            let configs = configs(&["notion", "slow"]);
            manager.connect_all(&configs).await
        }
    });

    timeout(Duration::from_secs(5), async {
        while !manager.is_connected("notion").await {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("notion is usable while slow is still connecting");

    let tools = manager.list_tools().await.expect("tools");
    let names: Vec<&str> = tools.iter().map(|t| t.namespaced_name.as_str()).collect();
    assert_eq!(names, vec!["notion__search"]);
    assert!(!manager.is_connected("slow").await);
    assert!(!pass.is_finished());
    pass.abort();
}

#[tokio::test]
async fn unknown_tools_never_reach_a_server() {
    let notion = FakeServer::new(&["search"]);
    let manager = ConnectionManager::new(Arc::new(
        FakeConnector::default().with_server("notion", Arc::clone(&notion)),
    ));
    manager
        .connect_all(&configs(&["notion"]))
        .await
        .expect("connect");

    let bare = manager.call_tool("search", json!({})).await;
    let ghost = manager.call_tool("ghost__search", json!({})).await;

    assert!(matches!(bare, Err(ToolInvokeError::UnknownNamespace { .. })));
    assert!(matches!(ghost, Err(ToolInvokeError::ServerNotConnected { .. })));
    assert_eq!(notion.invocations(), 0);
    assert_eq!(notion.connects(), 1);
}

#[tokio::test]
async fn broken_connection_is_replaced_once() {
    let notion = FakeServer::new(&["search"]);
    notion.broken_connections.store(1, Ordering::SeqCst);
    let manager = ConnectionManager::new(Arc::new(
        FakeConnector::default().with_server("notion", Arc::clone(&notion)),
    ));
    manager
        .connect_all(&configs(&["notion"]))
        .await
        .expect("connect");

    let output = manager
        .call_tool("notion__search", json!({"query": "roadmap"}))
        .await
        .expect("call succeeds on fresh connection");

    assert_eq!(
        output,
        ToolOutput::TextBlocks(vec![r#"notion:search {"query":"roadmap"}"#.to_string()])
    );
    assert_eq!(notion.connects(), 2);
    assert_eq!(notion.invocations(), 2);
}

#[tokio::test]
async fn reconnect_is_attempted_only_once_per_operation() {
    let notion = FakeServer::new(&["search"]);
    notion.broken_connections.store(2, Ordering::SeqCst);
    let manager = ConnectionManager::new(Arc::new(
        FakeConnector::default().with_server("notion", Arc::clone(&notion)),
    ));
    manager
        .connect_all(&configs(&["notion"]))
        .await
        .expect("connect");

    let first = manager.call_tool("notion__search", json!({})).await;
    assert!(matches!(first, Err(ToolInvokeError::Terminated { .. })));
    assert_eq!(notion.connects(), 2);
    assert_eq!(notion.invocations(), 2);

    // The next operation gets its own single reconnect and reaches a healthy connection.
    manager
        .call_tool("notion__search", json!({}))
        .await
        .expect("third connection is healthy");
    assert_eq!(notion.connects(), 3);
    assert_eq!(notion.invocations(), 4);
}

#[tokio::test]
async fn protocol_errors_do_not_reconnect() {
    let notion = FakeServer::new(&["search"]);
    notion.push_result(Err(ToolInvokeError::Rpc {
        server: "notion".into(),
        code: -32602,
        message: "query is required".into(),
    }));
    let manager = ConnectionManager::new(Arc::new(
        FakeConnector::default().with_server("notion", Arc::clone(&notion)),
    ));
    manager
        .connect_all(&configs(&["notion"]))
        .await
        .expect("connect");

    let err = manager
        .call_tool("notion__search", json!({}))
        .await
        .expect_err("rejected");

    assert!(err.is_invalid_arguments());
    assert_eq!(notion.connects(), 1);
    assert_eq!(notion.invocations(), 1);
}

#[tokio::test]
async fn registry_catalog_survives_reconnects() {
    let notion = FakeServer::new(&["search"]);
    notion.broken_connections.store(1, Ordering::SeqCst);
    let manager = Arc::new(ConnectionManager::new(Arc::new(
        FakeConnector::default().with_server("notion", Arc::clone(&notion)),
    )));
    manager
        .connect_all(&configs(&["notion"]))
        .await
        .expect("connect");
    let registry = ToolRegistry::new(Arc::clone(&manager));

    let before = registry.tools().await.expect("tools").to_vec();
    registry
        .invoke("notion__search", json!({}))
        .await
        .expect("invoke");
    let after = registry.tools().await.expect("tools").to_vec();

    assert_eq!(before, after);
    assert_eq!(notion.connects(), 2);
}

#[tokio::test]
async fn disconnect_all_clears_connections() {
    let manager = ConnectionManager::new(Arc::new(
        FakeConnector::default().with_server("notion", FakeServer::new(&["search"])),
    ));
    manager
        .connect_all(&configs(&["notion"]))
        .await
        .expect("connect");
    assert!(manager.is_connected("notion").await);

    manager.disconnect_all().await;

    assert!(!manager.is_connected("notion").await);
    let result = manager.call_tool("notion__search", json!({})).await;
    assert!(matches!(result, Err(ToolInvokeError::ServerNotConnected { .. })));
}
