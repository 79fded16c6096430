//! Messaging-gateway webhook: `POST /webhook/whatsapp`.
//!
//! Every well-formed delivery is answered with TwiML, including failures, so the sender
//! always receives a reply.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use rentbot_agent::{AgentRuntime, TurnContext, APOLOGY_TEXT};
use rentbot_messaging::webhook::{
    EMPTY_MESSAGE_REPLY, UNSUPPORTED_MEDIA_REPLY, VOICE_UNAVAILABLE_REPLY,
};
use rentbot_messaging::{twiml, InboundContent, InboundMessage, Transcriber, TwimlReply};
use tracing::{info, warn};

#[derive(Clone)]
pub struct WebhookState {
    pub runtime: Arc<AgentRuntime>,
    pub transcriber: Arc<dyn Transcriber>,
}

pub fn router(state: WebhookState) -> Router {
    Router::new().route("/webhook/whatsapp", post(whatsapp)).with_state(state)
}

pub async fn whatsapp(
    State(state): State<WebhookState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let message = match InboundMessage::from_form(&form) {
        Ok(message) => message,
        Err(error) => {
            warn!(event_name = "server.webhook.rejected", error = %error, "malformed webhook delivery");
            return (StatusCode::BAD_REQUEST, error.to_string()).into_response();
        }
    };

    let reply = reply_for(&state, message).await;
    ([(header::CONTENT_TYPE, twiml::CONTENT_TYPE)], reply.render()).into_response()
}

async fn reply_for(state: &WebhookState, message: InboundMessage) -> TwimlReply {
    let InboundMessage { from, content } = message;

    let text = match content {
        InboundContent::Text(text) => text,
        InboundContent::Voice { media_url, content_type } => {
            match state.transcriber.transcribe(&media_url, &content_type).await {
                Ok(transcript) if !transcript.trim().is_empty() => {
                    info!(
                        event_name = "server.webhook.voice_transcribed",
                        identity = %from,
                        characters = transcript.len(),
                    );
                    transcript.trim().to_string()
                }
                Ok(_) => return TwimlReply::text(VOICE_UNAVAILABLE_REPLY),
                Err(error) => {
                    warn!(
                        event_name = "server.webhook.voice_failed",
                        identity = %from,
                        error = %error,
                        "voice note could not be transcribed"
                    );
                    return TwimlReply::text(VOICE_UNAVAILABLE_REPLY);
                }
            }
        }
        InboundContent::UnsupportedMedia { content_type } => {
            info!(
                event_name = "server.webhook.unsupported_media",
                identity = %from,
                content_type = %content_type,
            );
            return TwimlReply::text(UNSUPPORTED_MEDIA_REPLY);
        }
        InboundContent::Empty => return TwimlReply::text(EMPTY_MESSAGE_REPLY),
    };

    match state.runtime.handle_turn(TurnContext::Identity(from), &text).await {
        Ok(outcome) => TwimlReply::text(outcome.reply_text).with_media(outcome.media_urls),
        Err(error) => {
            warn!(
                event_name = "server.webhook.turn_failed",
                correlation_id = %error.correlation_id(),
                error = %error,
                "answering with apology"
            );
            TwimlReply::text(APOLOGY_TEXT)
        }
    }
}
