//! Conversation state machine: stage, candidate record and message log.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::model::{CandidateField, CandidateRecord, TechQuestionSet};
use crate::error::StateError;
use crate::lenient::null_as_default;

/// The stages of a screening conversation.
///
/// Progresses forward only: Greeting → InfoGathering → TechQuestions →
/// Conclusion. Any non-terminal stage may jump straight to Conclusion.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Greeting,
    InfoGathering,
    TechQuestions,
    Conclusion,
}

impl Stage {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, target),
            (Greeting, InfoGathering)
                | (InfoGathering, TechQuestions)
                | (Greeting | InfoGathering | TechQuestions, Conclusion)
        )
    }

    /// Whether this stage is terminal (the conversation is over).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Conclusion)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::InfoGathering => "info_gathering",
            Self::TechQuestions => "tech_questions",
            Self::Conclusion => "conclusion",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author of a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Full per-conversation state.
///
/// Serialized as-is into the snapshot the caller sends back on every turn:
/// `{stage, candidate_info, tech_questions, conversation_history,
/// questions_asked}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationState {
    stage: Stage,
    #[serde(deserialize_with = "null_as_default")]
    candidate_info: CandidateRecord,
    #[serde(deserialize_with = "null_as_default")]
    tech_questions: TechQuestionSet,
    #[serde(deserialize_with = "null_as_default")]
    conversation_history: Vec<Message>,
    /// Reserved; carried through untouched.
    #[serde(deserialize_with = "null_as_default")]
    questions_asked: Vec<Value>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from a caller-supplied snapshot.
    ///
    /// Individual fields are read leniently (null as empty, numbers as
    /// text). A missing or null snapshot, or one that is not a snapshot at
    /// all, starts a fresh conversation.
    pub fn from_snapshot(snapshot: Option<Value>) -> Self {
        match snapshot {
            None | Some(Value::Null) => Self::new(),
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(error = %e, "Malformed conversation snapshot, starting fresh");
                Self::new()
            }),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn candidate(&self) -> &CandidateRecord {
        &self.candidate_info
    }

    pub fn tech_questions(&self) -> &TechQuestionSet {
        &self.tech_questions
    }

    pub fn history(&self) -> &[Message] {
        &self.conversation_history
    }

    pub fn questions_asked(&self) -> &[Value] {
        &self.questions_asked
    }

    pub fn is_concluded(&self) -> bool {
        self.stage.is_terminal()
    }

    pub fn add_message(&mut self, message: Message) {
        self.conversation_history.push(message);
    }

    /// Render the last `window` messages as `Candidate:`/`Assistant:` lines.
    pub fn history_text(&self, window: usize) -> String {
        if self.conversation_history.is_empty() {
            return "No previous messages.".to_string();
        }

        let skip = self.conversation_history.len().saturating_sub(window);
        self.conversation_history[skip..]
            .iter()
            .map(|m| {
                let speaker = match m.role {
                    MessageRole::Assistant => "Assistant",
                    MessageRole::User => "Candidate",
                };
                format!("{speaker}: {}", m.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Merge extracted candidate data. No-op once concluded.
    pub fn merge_extracted(&mut self, extracted: &Map<String, Value>) -> Vec<CandidateField> {
        if self.is_concluded() {
            return Vec::new();
        }
        self.candidate_info.merge(extracted)
    }

    pub fn is_info_complete(&self) -> bool {
        self.candidate_info.is_complete()
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.candidate_info.missing_fields()
    }

    /// Store the generated question set. Written at most once.
    pub fn set_tech_questions(&mut self, questions: TechQuestionSet) -> Result<(), StateError> {
        if !self.tech_questions.is_empty() {
            return Err(StateError::QuestionsAlreadyGenerated);
        }
        if questions.is_empty() {
            return Err(StateError::EmptyQuestionSet);
        }
        self.tech_questions = questions;
        Ok(())
    }

    /// Move to `target`, refusing anything but a valid forward step.
    pub fn transition_to(&mut self, target: Stage) -> Result<Stage, StateError> {
        if !self.stage.can_transition_to(target) {
            return Err(StateError::InvalidTransition {
                from: self.stage.to_string(),
                to: target.to_string(),
            });
        }
        self.stage = target;
        Ok(target)
    }

    /// Jump to Conclusion from wherever we are. Idempotent.
    pub fn conclude(&mut self) {
        self.stage = Stage::Conclusion;
    }

    /// Ready to generate technical questions: still gathering, every field
    /// collected, and no question set yet.
    pub fn should_advance_to_tech_questions(&self) -> bool {
        self.stage == Stage::InfoGathering
            && self.is_info_complete()
            && !self.candidate_info.tech_stack.is_empty()
            && self.tech_questions.is_empty()
    }

    /// Compact overview for display.
    pub fn summary(&self) -> StateSummary {
        StateSummary {
            stage: self.stage,
            info_complete: self.is_info_complete(),
            missing_fields: self.missing_fields(),
            tech_stack: self.candidate_info.tech_stack_list(),
            questions_generated: !self.tech_questions.is_empty(),
            total_messages: self.conversation_history.len(),
        }
    }
}

/// Snapshot summary for UIs and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSummary {
    pub stage: Stage,
    pub info_complete: bool,
    pub missing_fields: Vec<&'static str>,
    pub tech_stack: Vec<String>,
    pub questions_generated: bool,
    pub total_messages: usize,
}
