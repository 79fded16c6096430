use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptionError {
    #[error("voice transcription is not configured")]
    Unavailable,
    #[error("voice transcription failed: {0}")]
    Failed(String),
}

/// Turns a voice note into text. Implementations fetch the media themselves.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        media_url: &str,
        content_type: &str,
    ) -> Result<String, TranscriptionError>;
}

/// Used when no speech-to-text service is wired in; every voice note is declined.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTranscriber;

#[async_trait]
impl Transcriber for NoopTranscriber {
    async fn transcribe(&self, _: &str, _: &str) -> Result<String, TranscriptionError> {
        Err(TranscriptionError::Unavailable)
    }
}
