//! Messaging-gateway interface
//!
//! - **Webhook** (`webhook`) - parses the gateway's form-encoded delivery and classifies it
//!   as text, voice, unsupported media, or empty.
//! - **Transcription** (`transcribe`) - boundary for turning voice notes into text before
//!   they reach the orchestrator.
//! - **TwiML** (`twiml`) - encodes a reply and its image URLs as the gateway's XML response.
//!
//! ```text
//! Gateway POST → InboundMessage → (Transcriber) → AgentRuntime → TwimlReply
//! ```

pub mod transcribe;
pub mod twiml;
pub mod webhook;

pub use transcribe::{NoopTranscriber, TranscriptionError, Transcriber};
pub use twiml::TwimlReply;
pub use webhook::{InboundContent, InboundMessage, WebhookError};
