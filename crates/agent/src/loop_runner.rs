//! The round-bounded agent loop.

use std::sync::Arc;

use burrow_core::error::{Error, ProviderError};
use burrow_core::message::{Conversation, Message, ToolCall};
use burrow_core::provider::{Provider, ProviderRequest};
use burrow_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

use crate::dispatch::dispatch;

/// The loop's states. One `AwaitingModel → (tool path) → AwaitingModel`
/// cycle consumes one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Ready,
    AwaitingModel,
    ProcessingToolCalls,
    Done,
    Aborted,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The model produced a final text answer.
    Done(String),
    /// The round budget was exhausted before a final answer.
    Aborted,
}

/// The agent loop that interleaves model calls with tool execution.
pub struct AgentLoop {
    /// The model backend.
    provider: Arc<dyn Provider>,

    /// The model to use.
    model: String,

    /// Temperature setting.
    temperature: f32,

    /// System instruction sent with every request.
    system_instruction: String,

    /// The fixed tool registry.
    tools: Arc<ToolRegistry>,

    /// Hard bound on rounds per session.
    max_rounds: u32,

    /// Per-round diagnostics on stdout.
    verbose: bool,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        system_instruction: impl Into<String>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            system_instruction: system_instruction.into(),
            tools,
            max_rounds: 20,
            verbose: false,
        }
    }

    /// Set the maximum number of rounds.
    pub fn with_max_rounds(mut self, max: u32) -> Self {
        self.max_rounds = max;
        self
    }

    /// Enable per-round diagnostics.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run a session from the user's prompt to an outcome.
    ///
    /// Tool failures stay inside the conversation as error-string results;
    /// only transport-tier failures (unreachable model, response missing
    /// usage metadata) surface as `Err` and must abort the process.
    pub async fn run(&self, prompt: &str) -> Result<LoopOutcome, Error> {
        let mut conversation = Conversation::new();
        conversation.push(Message::user(prompt));

        info!(
            conversation_id = %conversation.id,
            model = %self.model,
            "Starting agent session"
        );

        let definitions = self.tools.definitions();
        let mut state = LoopState::Ready;
        let mut round: u32 = 0;
        let mut pending: Vec<ToolCall> = Vec::new();
        let mut final_text = String::new();

        loop {
            state = match state {
                LoopState::Ready => LoopState::AwaitingModel,

                LoopState::AwaitingModel => {
                    if round >= self.max_rounds {
                        LoopState::Aborted
                    } else {
                        round += 1;
                        debug!(round, "Requesting model turn");

                        let request = ProviderRequest {
                            model: self.model.clone(),
                            system_instruction: Some(self.system_instruction.clone()),
                            messages: conversation.messages.clone(),
                            temperature: self.temperature,
                            tools: definitions.clone(),
                        };

                        let response = self.provider.complete(request).await?;

                        // Deliberate asymmetry: tool errors are
                        // conversational, a response without usage
                        // counters is a transport failure.
                        let usage = response.usage.ok_or_else(|| {
                            ProviderError::MalformedResponse(
                                "response missing usage metadata".into(),
                            )
                        })?;

                        if self.verbose {
                            println!("Prompt tokens: {}", usage.prompt_tokens);
                            println!("Response tokens: {}", usage.response_tokens);
                        }

                        // The model sees its own turn verbatim next round,
                        // tool requests included.
                        pending = response.message.tool_calls.clone();
                        final_text = response.message.content.clone();
                        conversation.push(response.message);

                        if pending.is_empty() {
                            LoopState::Done
                        } else {
                            LoopState::ProcessingToolCalls
                        }
                    }
                }

                LoopState::ProcessingToolCalls => {
                    // Strictly sequential, in model-issued order: a later
                    // call may depend on an earlier call's side effects.
                    let mut envelopes = Vec::with_capacity(pending.len());
                    for call in pending.drain(..) {
                        envelopes.push(dispatch(&call, &self.tools, self.verbose).await);
                    }
                    conversation.push(Message::tool_results(envelopes));
                    LoopState::AwaitingModel
                }

                LoopState::Done => {
                    info!(rounds = round, "Session finished with a final answer");
                    return Ok(LoopOutcome::Done(final_text));
                }

                LoopState::Aborted => {
                    warn!(rounds = round, "Round budget exhausted without a final answer");
                    return Ok(LoopOutcome::Aborted);
                }
            };
        }
    }
}
