//! Candidate screening: a staged interview that collects contact details,
//! then asks technical questions about the declared tech stack.

pub mod model;
pub mod orchestrator;
pub mod prompts;
pub mod routes;
pub mod state;

pub use model::{CandidateField, CandidateRecord, Experience, TechQuestionSet};
pub use orchestrator::{
    Action, ExtractionOutcome, OrchestratorConfig, ScreeningOrchestrator, TurnOutcome, decide,
};
pub use routes::{ChatRequest, ChatResponse, ScreeningRouteState, screening_routes};
pub use state::{ConversationState, Message, MessageRole, Stage, StateSummary};
