use std::collections::HashMap;

use thiserror::Error;

pub const UNSUPPORTED_MEDIA_REPLY: &str = "Sorry, I can only understand text and voice messages. \
Please type your request or send a voice note.";
pub const EMPTY_MESSAGE_REPLY: &str =
    "Hi! Send me a message or a voice note and I'll help you find the perfect rental car.";
pub const VOICE_UNAVAILABLE_REPLY: &str = "Sorry, I couldn't understand your voice message. \
Could you please type your request instead?";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    /// Gateway sender address, e.g. `whatsapp:+971500000001`. Used as the conversation identity.
    pub from: String,
    pub content: InboundContent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundContent {
    Text(String),
    Voice { media_url: String, content_type: String },
    UnsupportedMedia { content_type: String },
    Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("webhook payload is missing the `From` field")]
    MissingSender,
    #[error("webhook `NumMedia` is not a count: `{0}`")]
    InvalidMediaCount(String),
    #[error("webhook declares media but `{field}` is missing")]
    MissingMediaField { field: String },
}

impl InboundMessage {
    /// Classifies a form-decoded webhook delivery. When media is attached, the first item
    /// decides: audio becomes [`InboundContent::Voice`], anything else is unsupported.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, WebhookError> {
        let from = form
            .get("From")
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .ok_or(WebhookError::MissingSender)?
            .to_string();

        let media_count = match form.get("NumMedia").map(|value| value.trim()) {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| WebhookError::InvalidMediaCount(raw.to_string()))?,
        };

        let content = if media_count > 0 {
            let content_type = required(form, "MediaContentType0")?;
            if is_audio(&content_type) {
                InboundContent::Voice { media_url: required(form, "MediaUrl0")?, content_type }
            } else {
                InboundContent::UnsupportedMedia { content_type }
            }
        } else {
            match form.get("Body").map(|body| body.trim()).filter(|body| !body.is_empty()) {
                Some(body) => InboundContent::Text(body.to_string()),
                None => InboundContent::Empty,
            }
        };

        Ok(Self { from, content })
    }
}

fn required(form: &HashMap<String, String>, field: &str) -> Result<String, WebhookError> {
    form.get(field)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| WebhookError::MissingMediaField { field: field.to_string() })
}

fn is_audio(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("audio/")
}
