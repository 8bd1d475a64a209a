//! The orchestration loop — user turn in, terminal model answer out

use crate::augment;
use crate::session::Session;
use docchat_client::CapabilityClient;
use docchat_core::{CapabilityDescriptor, Error, Result, SeedRole};
use docchat_llm::{ContentBlock, ModelProvider, ModelReply, ModelRequest, ModelTool, ToolCall};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Cap on a single appended tool result, so one oversized payload cannot
/// swamp the context.
const MAX_RESULT_CHARS: usize = 50_000;

/// One turn's input: free chat text, or an explicit workflow command.
#[derive(Clone, Debug)]
pub enum TurnInput {
    Chat(String),
    Workflow {
        name: String,
        args: serde_json::Value,
    },
}

/// Progress events emitted while a turn runs.
#[derive(Clone, Debug)]
pub enum AgentEvent {
    UnresolvedReference { id: String, reason: String },
    ToolCall { id: String, name: String },
    ToolResult {
        id: String,
        name: String,
        result: String,
        is_error: bool,
    },
    Done { rounds: usize },
}

pub struct AgentConfig {
    pub model: String,
    /// Bound on non-terminal action rounds per turn.
    pub max_rounds: usize,
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_rounds: 8,
            max_tokens: 4096,
            system_prompt: Some(
                "You are a document assistant. Use the available tools to read \
                 and edit documents when the conversation calls for it."
                    .to_string(),
            ),
        }
    }
}

pub struct AgentRuntime {
    provider: Arc<dyn ModelProvider>,
    client: CapabilityClient,
    config: AgentConfig,
}

impl AgentRuntime {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        client: CapabilityClient,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            client,
            config,
        }
    }

    pub fn client(&self) -> &CapabilityClient {
        &self.client
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Create a session carrying this runtime's system prompt.
    pub fn new_session(&self) -> Session {
        Session::new(self.config.system_prompt.as_deref())
    }

    /// Drive one user turn to its terminal answer.
    ///
    /// Store and host failures inside the turn are fed back to the model as
    /// failed tool results; only transport, model-call, and round-cap
    /// failures surface here, with the history up to that point preserved.
    pub async fn run_turn(
        &self,
        session: &Session,
        input: TurnInput,
        event_tx: mpsc::Sender<AgentEvent>,
    ) -> Result<String> {
        self.seed_turn(session, input, &event_tx).await?;

        let mut rounds = 0;
        loop {
            if rounds >= self.config.max_rounds {
                warn!("round cap hit after {} rounds", rounds);
                return Err(Error::ToolLoopExceeded(rounds));
            }

            let actions = self.client.list_actions().await?;
            let request = ModelRequest {
                model: self.config.model.clone(),
                messages: session.get_messages().await,
                tools: Some(actions.iter().map(to_model_tool).collect()),
                max_tokens: Some(self.config.max_tokens),
                system: session.system_prompt().map(String::from),
            };

            let reply = self
                .provider
                .complete(request)
                .await
                .map_err(|e| Error::ModelCall(e.to_string()))?;

            // The single place the model's decision is inspected.
            match reply {
                ModelReply::Text(text) => {
                    session.add_assistant_text(&text).await;
                    info!("turn complete after {} action round(s)", rounds);
                    let _ = event_tx.send(AgentEvent::Done { rounds }).await;
                    return Ok(text);
                }
                ModelReply::ToolUse { text, calls } => {
                    rounds += 1;
                    self.dispatch_round(session, text.as_deref(), calls, &event_tx)
                        .await?;
                }
            }
        }
    }

    /// Turn the input into the turn's initial messages: augmented chat text,
    /// or a workflow's resolved seed messages.
    async fn seed_turn(
        &self,
        session: &Session,
        input: TurnInput,
        event_tx: &mpsc::Sender<AgentEvent>,
    ) -> Result<()> {
        match input {
            TurnInput::Chat(text) => {
                let augmented = augment::augment(&self.client, &text).await;
                for (id, err) in &augmented.unresolved {
                    warn!("unresolved reference @{}: {}", id, err);
                    let _ = event_tx
                        .send(AgentEvent::UnresolvedReference {
                            id: id.clone(),
                            reason: err.to_string(),
                        })
                        .await;
                }
                session.add_user_message(&augmented.message).await;
            }
            TurnInput::Workflow { name, args } => {
                let seeds = self.client.resolve_workflow(&name, args).await?;
                for seed in seeds {
                    match seed.role {
                        SeedRole::User => session.add_user_message(&seed.content).await,
                        SeedRole::Assistant => session.add_assistant_text(&seed.content).await,
                    }
                }
            }
        }
        Ok(())
    }

    /// Execute one non-terminal round: append the assistant's tool-use
    /// message, run every requested invocation, and append one result per
    /// call in the model's request order. Invocations run concurrently;
    /// `join_all` yields results in input order, which is the ordering
    /// contract. Concurrency is only an optimization.
    async fn dispatch_round(
        &self,
        session: &Session,
        text: Option<&str>,
        calls: Vec<ToolCall>,
        event_tx: &mpsc::Sender<AgentEvent>,
    ) -> Result<()> {
        let blocks: Vec<ContentBlock> = calls
            .iter()
            .map(|c| ContentBlock::ToolUse {
                id: c.id.clone(),
                name: c.name.clone(),
                input: c.args.clone(),
            })
            .collect();
        session.add_assistant_with_tools(text, blocks).await;

        for call in &calls {
            debug!("dispatch: {} ({})", call.name, call.id);
            let _ = event_tx
                .send(AgentEvent::ToolCall {
                    id: call.id.clone(),
                    name: call.name.clone(),
                })
                .await;
        }

        let results = join_all(
            calls
                .iter()
                .map(|c| self.client.invoke_action(&c.name, c.args.clone())),
        )
        .await;

        // A failed call is data for the model, not a turn abort. A dead
        // transport does abort, but only after the error results are
        // appended, so every tool_use block keeps its matching result.
        let mut transport_failure = None;
        for (call, result) in calls.iter().zip(results) {
            let (content, is_error) = match result {
                Ok(payload) => (truncate(payload.to_content_string()), false),
                Err(err) => {
                    if matches!(err, Error::Transport(_)) && transport_failure.is_none() {
                        transport_failure = Some(err.clone());
                    }
                    (err.to_string(), true)
                }
            };
            let _ = event_tx
                .send(AgentEvent::ToolResult {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    result: content.clone(),
                    is_error,
                })
                .await;
            session.add_tool_result(&call.id, &content, is_error).await;
        }

        match transport_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn to_model_tool(descriptor: &CapabilityDescriptor) -> ModelTool {
    ModelTool {
        name: descriptor.name.clone(),
        description: descriptor.description.clone(),
        input_schema: descriptor.input_schema.clone(),
    }
}

fn truncate(result: String) -> String {
    if result.len() <= MAX_RESULT_CHARS {
        return result;
    }
    let mut cut = MAX_RESULT_CHARS;
    while !result.is_char_boundary(cut) {
        cut -= 1;
    }
    format!(
        "{}...\n[truncated, {} total chars]",
        &result[..cut],
        result.len()
    )
}
