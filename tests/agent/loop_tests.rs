// Agent loop tests - end-to-end turns against fake servers and a scripted backend

#[path = "../support/mod.rs"]
mod support;

use open_agent_core::agent::{Agent, LoopState};
use open_agent_core::config::{AgentSettings, ServerConfig};
use open_agent_core::constants::ITERATION_LIMIT_MESSAGE;
use open_agent_core::model::{ModelError, ModelResponse};
use open_agent_core::tooling::{ConnectionManager, ToolOutput, ToolRegistry};
use open_agent_core::types::{ConversationMessage, MessageRole, ToolInvocationRequest};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use support::{FakeConnector, FakeServer, ScriptedBackend};

async fn registry(server: Arc<FakeServer>) -> Arc<ToolRegistry> {
    let manager = Arc::new(ConnectionManager::new(Arc::new(
        FakeConnector::default().with_server("notion", server),
    )));
    manager
        .connect_all(&[ServerConfig::new("notion", "npx")])
        .await
        .expect("connect");
    Arc::new(ToolRegistry::new(manager))
}

fn call(id: &str, arguments: &str) -> ModelResponse {
    ModelResponse::with_tool_calls(vec![ToolInvocationRequest::new(
        id,
        "notion__search",
        arguments,
    )])
}

fn count_role(conversation: &[ConversationMessage], role: MessageRole) -> usize {
    conversation.iter().filter(|m| m.role() == role).count()
}

#[tokio::test]
async fn malformed_arguments_from_notion_example() {
    let notion = FakeServer::new(&["search"]);
    let backend = ScriptedBackend::new(vec![
        Ok(call("call-1", "{query: pages")),
        Ok(ModelResponse::text("I could not search your pages.")),
    ]);
    let agent = Agent::new(
        Arc::clone(&backend),
        registry(Arc::clone(&notion)).await,
        AgentSettings::default(),
    );

    let outcome = agent.chat("list my pages", None).await.expect("chat");

    assert_eq!(notion.invocations(), 0);
    assert_eq!(count_role(&outcome.conversation, MessageRole::Tool), 1);
    let tool_message = outcome
        .conversation
        .iter()
        .find(|m| m.role() == MessageRole::Tool)
        .and_then(ConversationMessage::text)
        .expect("tool message");
    assert!(tool_message.contains("{query: pages"));
    // The loop went on to a second decision.
    assert_eq!(backend.request_count(), 2);
    assert_eq!(outcome.response, "I could not search your pages.");
}

#[tokio::test]
async fn iteration_limit_respects_configured_ceiling() {
    let notion = FakeServer::new(&["search"]);
    let backend = ScriptedBackend::repeating(call("call-x", r#"{"query":"again"}"#));
    let settings = AgentSettings {
        max_iterations: 3,
        ..AgentSettings::default()
    };
    let agent = Agent::new(Arc::clone(&backend), registry(Arc::clone(&notion)).await, settings);
    let history = vec![
        ConversationMessage::system("custom"),
        ConversationMessage::user("earlier"),
        ConversationMessage::assistant("earlier answer"),
    ];

    let outcome = agent.chat("keep going", Some(history)).await.expect("chat");

    assert_eq!(outcome.state, LoopState::StoppedByLimit);
    assert_eq!(outcome.response, ITERATION_LIMIT_MESSAGE);
    // 4 seed messages, 3 x (assistant + tool), sentinel
    assert_eq!(outcome.conversation.len(), 4 + 3 * 2 + 1);
    assert_eq!(backend.request_count(), 3);
    assert_eq!(notion.invocations(), 3);
}

#[tokio::test]
async fn conversation_can_be_continued_with_returned_history() {
    let backend = ScriptedBackend::new(vec![
        Ok(call("call-1", "{}")),
        Ok(ModelResponse::text("Found 1 page.")),
        Ok(ModelResponse::text("It is called Roadmap.")),
    ]);
    let agent = Agent::new(
        Arc::clone(&backend),
        registry(FakeServer::new(&["search"])).await,
        AgentSettings::default(),
    );

    let first = agent.chat("list my pages", None).await.expect("first");
    let seeded = first.conversation.len();
    let second = agent
        .chat("what is it called?", Some(first.conversation))
        .await
        .expect("second");

    assert_eq!(second.response, "It is called Roadmap.");
    assert_eq!(second.conversation.len(), seeded + 2);
    assert_eq!(count_role(&second.conversation, MessageRole::System), 1);
    assert_eq!(*backend.requests.lock().expect("lock"), vec![2, 4, seeded + 1]);
}

#[tokio::test(start_paused = true)]
async fn dead_connection_is_recovered_within_one_call() {
    let notion = FakeServer::new(&["search"]);
    notion.broken_connections.store(1, Ordering::SeqCst);
    let backend = ScriptedBackend::new(vec![
        Ok(call("call-1", "{}")),
        Ok(ModelResponse::text("ok")),
    ]);
    let agent = Agent::new(backend, registry(Arc::clone(&notion)).await, AgentSettings::default());

    let outcome = agent.chat("search", None).await.expect("chat");

    let result = outcome.conversation[3].text().expect("tool text");
    assert_eq!(result, "notion:search {}");
    assert_eq!(notion.connects(), 2);
}

#[tokio::test]
async fn degraded_answer_includes_collected_results() {
    let notion = FakeServer::new(&["search"]);
    notion.push_result(Ok(ToolOutput::TextBlocks(vec![
        "Roadmap".into(),
        "Meeting notes".into(),
    ])));
    let backend = ScriptedBackend::new(vec![
        Ok(call("call-1", "{}")),
        Err(ModelError::invalid_response(
            "fireworks",
            "invalid request: prompt exceeds context window",
        )),
    ]);
    let agent = Agent::new(backend, registry(notion).await, AgentSettings::default());

    let outcome = agent.chat("list my pages", None).await.expect("chat");

    assert_eq!(outcome.state, LoopState::Done);
    assert!(outcome.response.contains("list my pages"));
    assert!(outcome.response.contains("### notion__search\nRoadmap\nMeeting notes"));
}
