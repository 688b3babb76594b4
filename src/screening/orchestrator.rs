//! ScreeningOrchestrator: picks one action per turn, calls the model and
//! folds the result back into the conversation state.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::DEFAULT_HISTORY_WINDOW;
use crate::error::LlmError;
use crate::llm::{CompletionRequest, LlmProvider, complete_json};

use super::model::TechQuestionSet;
use super::prompts::{
    ALREADY_CONCLUDED_REPLY, ASK_FOR_TECH_STACK_REPLY, QUESTIONS_PENDING_REPLY,
    conclusion_message, detect_conversation_ending, extraction_prompt, fallback_prompt,
    greeting_prompt, questions_ready_message, response_prompt, tech_questions_prompt,
};
use super::state::{ConversationState, Message, Stage};

/// What the orchestrator does with an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Greet,
    ExtractInfo,
    GenerateQuestions,
    Respond,
    Conclude,
    /// Non-ending message after the screening finished.
    AlreadyConcluded,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greet => "greet",
            Self::ExtractInfo => "extract_info",
            Self::GenerateQuestions => "generate_questions",
            Self::Respond => "respond",
            Self::Conclude => "conclude",
            Self::AlreadyConcluded => "already_concluded",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Choose the action for `message` given the state *before* it is logged.
///
/// End-intent always wins. Otherwise the stage decides.
pub fn decide(state: &ConversationState, message: &str) -> Action {
    if detect_conversation_ending(message) {
        return Action::Conclude;
    }

    match state.stage() {
        Stage::Greeting if state.history().is_empty() => Action::Greet,
        Stage::InfoGathering if state.should_advance_to_tech_questions() => {
            Action::GenerateQuestions
        }
        Stage::InfoGathering => Action::ExtractInfo,
        Stage::TechQuestions | Stage::Greeting => Action::Respond,
        Stage::Conclusion => Action::AlreadyConcluded,
    }
}

/// Result of asking the model for candidate fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Extracted(Map<String, Value>),
    Failed(String),
}

/// Tuning for model calls.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Messages of context included in prompts.
    pub history_window: usize,
    /// Temperature for greetings and conversational replies.
    pub chat_temperature: f32,
    pub response_max_tokens: u32,
    pub extraction_max_tokens: u32,
    pub questions_max_tokens: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
            chat_temperature: 0.7,
            response_max_tokens: 512,
            extraction_max_tokens: 512,
            questions_max_tokens: 2048,
        }
    }
}

/// The completed turn: the action taken, the reply, and the new state.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub action: Action,
    pub response: String,
    pub state: ConversationState,
}

/// Drives a screening conversation one turn at a time.
///
/// Holds no per-conversation data; every call is a function of the
/// supplied state and message.
pub struct ScreeningOrchestrator {
    llm: Arc<dyn LlmProvider>,
    config: OrchestratorConfig,
}

impl ScreeningOrchestrator {
    pub fn new(llm: Arc<dyn LlmProvider>, config: OrchestratorConfig) -> Self {
        Self { llm, config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Process one inbound message.
    ///
    /// Works on a copy of `state`. On error nothing is committed and the
    /// caller's state stays the last good one. On success exactly one
    /// assistant message has been appended.
    pub async fn process_turn(
        &self,
        state: &ConversationState,
        message: &str,
    ) -> Result<TurnOutcome, LlmError> {
        let message = message.trim();
        let mut next = state.clone();

        let action = decide(&next, message);
        info!(action = %action, stage = %next.stage(), "Processing screening turn");

        next.add_message(Message::user(message));

        let response = match action {
            Action::Greet => self.greet(&mut next).await?,
            Action::ExtractInfo => self.extract_info(&mut next, message).await?,
            Action::GenerateQuestions => self.generate_questions(&mut next).await,
            Action::Respond => self.respond(&next, message).await?,
            Action::Conclude => {
                next.conclude();
                info!(summary = ?next.summary(), "Screening concluded");
                conclusion_message(next.candidate().full_name.as_deref())
            }
            Action::AlreadyConcluded => ALREADY_CONCLUDED_REPLY.to_string(),
        };

        next.add_message(Message::assistant(response.clone()));

        if next.stage() != state.stage() {
            info!(from = %state.stage(), to = %next.stage(), "Screening stage changed");
        }

        Ok(TurnOutcome {
            action,
            response,
            state: next,
        })
    }

    async fn greet(&self, state: &mut ConversationState) -> Result<String, LlmError> {
        let greeting = self.generate(greeting_prompt()).await?;
        if let Err(e) = state.transition_to(Stage::InfoGathering) {
            warn!(error = %e, "Greeting did not advance the stage");
        }
        Ok(greeting)
    }

    async fn extract_info(
        &self,
        state: &mut ConversationState,
        message: &str,
    ) -> Result<String, LlmError> {
        let history = state.history_text(self.config.history_window);
        match self.extract(message, &history).await {
            ExtractionOutcome::Extracted(fields) => {
                let changed = state.merge_extracted(&fields);
                debug!(changed = ?changed, "Merged extracted candidate info");
            }
            ExtractionOutcome::Failed(reason) => {
                warn!(reason = %reason, "Candidate extraction failed, keeping known info");
            }
        }

        let prompt = response_prompt(
            message,
            &state.history_text(self.config.history_window),
            state.candidate(),
            state.stage(),
        );
        self.generate(&prompt).await
    }

    /// Ask the model for candidate fields. Never fails the turn.
    pub async fn extract(&self, message: &str, history: &str) -> ExtractionOutcome {
        let prompt = extraction_prompt(message, history);
        match complete_json(self.llm.as_ref(), &prompt, self.config.extraction_max_tokens).await {
            Ok(fields) => ExtractionOutcome::Extracted(fields),
            Err(e) => ExtractionOutcome::Failed(e.to_string()),
        }
    }

    /// Generate the question set. Any failure degrades to a placeholder and
    /// leaves the stage alone so the next turn retries.
    async fn generate_questions(&self, state: &mut ConversationState) -> String {
        let tech_stack = state.candidate().tech_stack_list();
        if tech_stack.is_empty() {
            return ASK_FOR_TECH_STACK_REPLY.to_string();
        }

        let prompt = tech_questions_prompt(&tech_stack);
        let questions =
            match complete_json(self.llm.as_ref(), &prompt, self.config.questions_max_tokens).await
            {
                Ok(raw) => TechQuestionSet::from_json_map(&raw),
                Err(e) => {
                    warn!(error = %e, "Question generation failed, will retry next turn");
                    return QUESTIONS_PENDING_REPLY.to_string();
                }
            };

        let display = questions.to_display();
        let covered: Vec<String> = questions.iter().map(|(tech, _)| tech.clone()).collect();
        if let Err(e) = state.set_tech_questions(questions) {
            warn!(error = %e, "Question generation degraded, will retry next turn");
            return QUESTIONS_PENDING_REPLY.to_string();
        }
        if let Err(e) = state.transition_to(Stage::TechQuestions) {
            warn!(error = %e, "Questions stored without a stage change");
        }

        info!(technologies = covered.len(), "Technical questions generated");
        questions_ready_message(&covered, &display)
    }

    async fn respond(&self, state: &ConversationState, message: &str) -> Result<String, LlmError> {
        // Greeting with history means the greet never landed; steer back.
        let prompt = if state.stage() == Stage::Greeting {
            fallback_prompt(message)
        } else {
            response_prompt(
                message,
                &state.history_text(self.config.history_window),
                state.candidate(),
                state.stage(),
            )
        };
        self.generate(&prompt).await
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = CompletionRequest::prompt(prompt, self.config.chat_temperature)
            .with_max_tokens(self.config.response_max_tokens);
        let response = self.llm.complete(request).await?;

        let text = response.content.trim();
        if text.is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.llm.model_name().to_string(),
                reason: "empty completion".to_string(),
            });
        }
        Ok(text.to_string())
    }
}
