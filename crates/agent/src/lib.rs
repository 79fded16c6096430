//! Conversation action orchestrator.
//!
//! Each inbound message goes through a constrained loop:
//! 1. **Intent resolution** (`resolver`) - the model picks exactly one typed [`Action`]
//!    through a structured-output schema.
//! 2. **Execution** (`executor`) - catalog reads are deterministic; the model only phrases
//!    the reply around the vehicles it is handed.
//! 3. **Media selection** (`media`) - images attach only to priced, named recommendations.
//! 4. **Persistence** (`runtime`) - identity conversations keep their last 20 turns.
//!
//! The model never decides which vehicles exist, what they cost, or whether they are
//! available.
//!
//! [`Action`]: rentbot_core::domain::action::Action

pub mod executor;
pub mod llm;
pub mod media;
pub mod openai;
pub mod prompt;
pub mod resolver;
pub mod runtime;

pub use llm::{LlmClient, LlmError};
pub use openai::OpenAiCompatibleClient;
pub use runtime::{AgentRuntime, TurnContext, TurnError, TurnOutcome, APOLOGY_TEXT};
