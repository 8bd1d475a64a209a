//! Tests for docchat-agent: augmentation, session history shape, and the
//! orchestration loop driven by a scripted model

use async_trait::async_trait;
use docchat_agent::*;
use docchat_client::CapabilityClient;
use docchat_core::{Error, InvocationResult, Result};
use docchat_host::{create_default_host, Action, CapabilityHost};
use docchat_llm::{
    ContentBlock, MessageContent, ModelError, ModelProvider, ModelReply, ModelRequest,
    ModelResult, ToolCall,
};
use docchat_store::DocumentStore;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

// ===========================================================================
// Scripted model provider
// ===========================================================================

/// Deterministic provider: each call pops the next scripted reply; when the
/// script runs dry it falls back to a fixed reply.
struct ScriptedProvider {
    replies: Mutex<VecDeque<ModelReply>>,
    fallback: ModelReply,
}

impl ScriptedProvider {
    fn sequence(replies: Vec<ModelReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: ModelReply::Text("(script exhausted)".into()),
        }
    }

    /// Always answers with the same reply.
    fn constant(reply: ModelReply) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: reply,
        }
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn models(&self) -> &[&str] {
        &["scripted"]
    }

    async fn complete(&self, _request: ModelRequest) -> ModelResult<ModelReply> {
        Ok(self
            .replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Provider whose channel is down.
struct FailingProvider;

#[async_trait]
impl ModelProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    fn models(&self) -> &[&str] {
        &["failing"]
    }

    async fn complete(&self, _request: ModelRequest) -> ModelResult<ModelReply> {
        Err(ModelError::RequestFailed("connection refused".into()))
    }
}

fn tool_use(calls: Vec<(&str, &str, serde_json::Value)>) -> ModelReply {
    ModelReply::ToolUse {
        text: None,
        calls: calls
            .into_iter()
            .map(|(id, name, args)| ToolCall {
                id: id.into(),
                name: name.into(),
                args,
            })
            .collect(),
    }
}

fn seeded_host() -> CapabilityHost {
    create_default_host(Arc::new(DocumentStore::seeded()))
}

fn runtime_with(provider: impl ModelProvider + 'static, host: CapabilityHost) -> AgentRuntime {
    AgentRuntime::new(
        Arc::new(provider),
        CapabilityClient::connect(host),
        AgentConfig {
            max_rounds: 4,
            ..Default::default()
        },
    )
}

async fn drain(mut rx: mpsc::Receiver<AgentEvent>) -> Vec<AgentEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

// ===========================================================================
// Context augmentation
// ===========================================================================

#[tokio::test]
async fn augment_attaches_referenced_document() {
    let client = CapabilityClient::connect(seeded_host());
    let augmented = augment(&client, "what is @report.pdf about?").await;

    assert!(!augmented.is_partial());
    assert!(augmented.message.starts_with("what is @report.pdf about?"));
    assert!(augmented.message.contains(r#"<document id="report.pdf">"#));
    assert!(augmented
        .message
        .contains("The report details the state of a 20m condenser tower."));
}

#[tokio::test]
async fn augment_missing_reference_is_partial_not_fatal() {
    let client = CapabilityClient::connect(seeded_host());
    let augmented = augment(&client, "@missing.pdf and @plan.md").await;

    assert!(augmented.is_partial());
    assert_eq!(augmented.unresolved.len(), 1);
    let (id, err) = &augmented.unresolved[0];
    assert_eq!(id, "missing.pdf");
    assert_eq!(*err, Error::NotFound("missing.pdf".into()));

    // The resolvable reference still resolved.
    assert!(augmented.message.contains(r#"<document id="plan.md">"#));
}

#[tokio::test]
async fn augment_fetches_duplicates_once() {
    let client = CapabilityClient::connect(seeded_host());
    let augmented = augment(&client, "compare @plan.md with @plan.md please").await;
    assert_eq!(
        augmented.message.matches(r#"<document id="plan.md">"#).count(),
        1
    );
}

#[test]
fn scan_references_preserves_order_and_dedups() {
    assert_eq!(
        scan_references("see @b.txt then @a.txt then @b.txt again"),
        ["b.txt", "a.txt"]
    );
    assert!(scan_references("no references here").is_empty());
    assert!(scan_references("dangling sigil @ alone").is_empty());
}

// ===========================================================================
// Session history shape
// ===========================================================================

#[tokio::test]
async fn tool_results_collected_in_single_user_message() {
    let session = Session::new(Some("test"));

    session
        .add_assistant_with_tools(
            None,
            vec![
                ContentBlock::ToolUse {
                    id: "tc-a".into(),
                    name: "read_doc".into(),
                    input: json!({}),
                },
                ContentBlock::ToolUse {
                    id: "tc-b".into(),
                    name: "read_doc".into(),
                    input: json!({}),
                },
                ContentBlock::ToolUse {
                    id: "tc-c".into(),
                    name: "edit_doc".into(),
                    input: json!({}),
                },
            ],
        )
        .await;

    session.add_tool_result("tc-a", "result a", false).await;
    session.add_tool_result("tc-b", "result b", false).await;
    session.add_tool_result("tc-c", "result c", true).await;

    let messages = session.get_messages().await;
    let user_messages: Vec<_> = messages.iter().filter(|m| m.role == "user").collect();
    assert_eq!(user_messages.len(), 1, "results must share one user message");

    match &user_messages[0].content {
        MessageContent::Blocks(blocks) => {
            let ids: Vec<&str> = blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::ToolResult { tool_use_id, .. } => Some(tool_use_id.as_str()),
                    _ => None,
                })
                .collect();
            assert_eq!(ids, ["tc-a", "tc-b", "tc-c"]);
        }
        other => panic!("expected blocks, got {:?}", other),
    }
}

// ===========================================================================
// Orchestration loop
// ===========================================================================

#[tokio::test]
async fn one_dispatch_round_then_terminal_answer() {
    let provider = ScriptedProvider::sequence(vec![
        tool_use(vec![("tc-1", "read_doc", json!({ "doc_id": "plan.md" }))]),
        ModelReply::Text("The plan covers the implementation steps.".into()),
    ]);
    let runtime = runtime_with(provider, seeded_host());
    let session = runtime.new_session();
    let (event_tx, event_rx) = mpsc::channel(256);

    let answer = runtime
        .run_turn(&session, TurnInput::Chat("what does the plan say?".into()), event_tx)
        .await
        .unwrap();
    assert_eq!(answer, "The plan covers the implementation steps.");

    // user, assistant tool-use, user tool-results, assistant text.
    let messages = session.get_messages().await;
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].role, "user");
    assert_eq!(messages[1].role, "assistant");
    assert_eq!(messages[2].role, "user");
    assert_eq!(messages[3].role, "assistant");

    let events = drain(event_rx).await;
    let tool_calls = events
        .iter()
        .filter(|e| matches!(e, AgentEvent::ToolCall { .. }))
        .count();
    let tool_results = events
        .iter()
        .filter(|e| matches!(e, AgentEvent::ToolResult { .. }))
        .count();
    assert_eq!(tool_calls, 1);
    assert_eq!(tool_results, 1);
    assert!(events
        .iter()
        .any(|e| matches!(e, AgentEvent::Done { rounds: 1 })));
}

/// Echoes its `value` argument after a delay, to race against fast calls.
struct SlowEchoAction {
    delay_ms: u64,
}

#[async_trait]
impl Action for SlowEchoAction {
    fn name(&self) -> &str {
        "slow_echo"
    }

    fn description(&self) -> &str {
        "Echo a value after a delay."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "value": { "type": "string" }
            },
            "required": ["value"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<InvocationResult> {
        tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        Ok(InvocationResult::text(
            args["value"].as_str().unwrap_or_default().to_string(),
        ))
    }
}

#[tokio::test]
async fn results_keep_request_order_even_when_first_call_finishes_last() {
    let mut host = seeded_host();
    host.register_action(SlowEchoAction { delay_ms: 150 });

    let provider = ScriptedProvider::sequence(vec![
        tool_use(vec![
            ("tc-slow", "slow_echo", json!({ "value": "slow result" })),
            ("tc-fast", "read_doc", json!({ "doc_id": "plan.md" })),
        ]),
        ModelReply::Text("done".into()),
    ]);
    let runtime = runtime_with(provider, host);
    let session = runtime.new_session();
    let (event_tx, _event_rx) = mpsc::channel(256);

    runtime
        .run_turn(&session, TurnInput::Chat("go".into()), event_tx)
        .await
        .unwrap();

    let messages = session.get_messages().await;
    let results = match &messages[2].content {
        MessageContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    ..
                } => Some((tool_use_id.as_str(), content.as_str())),
                _ => None,
            })
            .collect::<Vec<_>>(),
        other => panic!("expected blocks, got {:?}", other),
    };

    // The slow call's result comes first because the model asked for it
    // first, even though the fast call completed earlier.
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "tc-slow");
    assert_eq!(results[0].1, "slow result");
    assert_eq!(results[1].0, "tc-fast");
    assert!(results[1].1.contains("plan"));
}

#[tokio::test]
async fn failed_invocation_is_reported_to_the_model_not_fatal() {
    let provider = ScriptedProvider::sequence(vec![
        tool_use(vec![("tc-1", "read_doc", json!({ "doc_id": "missing.pdf" }))]),
        ModelReply::Text("That document does not exist.".into()),
    ]);
    let runtime = runtime_with(provider, seeded_host());
    let session = runtime.new_session();
    let (event_tx, event_rx) = mpsc::channel(256);

    let answer = runtime
        .run_turn(&session, TurnInput::Chat("read missing.pdf".into()), event_tx)
        .await
        .unwrap();
    assert_eq!(answer, "That document does not exist.");

    let messages = session.get_messages().await;
    match &messages[2].content {
        MessageContent::Blocks(blocks) => match &blocks[0] {
            ContentBlock::ToolResult {
                content, is_error, ..
            } => {
                assert_eq!(*is_error, Some(true));
                assert!(content.contains("not found"));
            }
            other => panic!("expected tool result, got {:?}", other),
        },
        other => panic!("expected blocks, got {:?}", other),
    }

    let events = drain(event_rx).await;
    assert!(events
        .iter()
        .any(|e| matches!(e, AgentEvent::ToolResult { is_error: true, .. })));
}

#[tokio::test]
async fn runaway_tool_chain_fails_with_tool_loop_exceeded() {
    let provider = ScriptedProvider::constant(tool_use(vec![(
        "tc-loop",
        "read_doc",
        json!({ "doc_id": "plan.md" }),
    )]));
    let runtime = runtime_with(provider, seeded_host());
    let session = runtime.new_session();
    let (event_tx, _event_rx) = mpsc::channel(256);

    let result = runtime
        .run_turn(&session, TurnInput::Chat("loop forever".into()), event_tx)
        .await;
    assert_eq!(result.unwrap_err(), Error::ToolLoopExceeded(4));

    // History up to the cap is preserved: the seed message plus one
    // assistant + one result message per round.
    assert_eq!(session.message_count().await, 1 + 2 * 4);
}

#[tokio::test]
async fn unresolved_reference_is_surfaced_as_event() {
    let provider = ScriptedProvider::constant(ModelReply::Text("ok".into()));
    let runtime = runtime_with(provider, seeded_host());
    let session = runtime.new_session();
    let (event_tx, event_rx) = mpsc::channel(256);

    runtime
        .run_turn(&session, TurnInput::Chat("about @nope.pdf".into()), event_tx)
        .await
        .unwrap();

    let events = drain(event_rx).await;
    assert!(events.iter().any(|e| matches!(
        e,
        AgentEvent::UnresolvedReference { id, .. } if id == "nope.pdf"
    )));
}

// ===========================================================================
// Workflow turns
// ===========================================================================

#[tokio::test]
async fn workflow_input_becomes_the_turn_seed() {
    let provider = ScriptedProvider::constant(ModelReply::Text("summary here".into()));
    let runtime = runtime_with(provider, seeded_host());
    let session = runtime.new_session();
    let (event_tx, _event_rx) = mpsc::channel(256);

    let answer = runtime
        .run_turn(
            &session,
            TurnInput::Workflow {
                name: "summarize".into(),
                args: json!({ "doc_id": "plan.md" }),
            },
            event_tx,
        )
        .await
        .unwrap();
    assert_eq!(answer, "summary here");

    let messages = session.get_messages().await;
    assert_eq!(messages[0].role, "user");
    match &messages[0].content {
        MessageContent::Text(text) => {
            assert!(text.contains("plan.md"));
            assert!(text.contains("read_doc"));
        }
        other => panic!("expected text, got {:?}", other),
    }
}

#[tokio::test]
async fn workflow_for_unknown_document_aborts_the_turn() {
    let provider = ScriptedProvider::constant(ModelReply::Text("never reached".into()));
    let runtime = runtime_with(provider, seeded_host());
    let session = runtime.new_session();
    let (event_tx, _event_rx) = mpsc::channel(256);

    let result = runtime
        .run_turn(
            &session,
            TurnInput::Workflow {
                name: "summarize".into(),
                args: json!({ "doc_id": "missing.pdf" }),
            },
            event_tx,
        )
        .await;
    assert_eq!(result.unwrap_err(), Error::NotFound("missing.pdf".into()));
    assert_eq!(session.message_count().await, 0);
}

// ===========================================================================
// Unrecoverable failures
// ===========================================================================

#[tokio::test]
async fn model_call_failure_aborts_the_turn_but_keeps_history() {
    let runtime = runtime_with(FailingProvider, seeded_host());
    let session = runtime.new_session();
    let (event_tx, _event_rx) = mpsc::channel(256);

    let result = runtime
        .run_turn(&session, TurnInput::Chat("hello".into()), event_tx)
        .await;
    assert!(matches!(result.unwrap_err(), Error::ModelCall(_)));

    // The user's message survived; the session can take another turn.
    assert_eq!(session.message_count().await, 1);
}
