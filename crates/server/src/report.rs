//! Plain-text conversation reports for the rental desk.
//!
//! Each web-chat exchange produces one report. Delivery sits behind
//! [`ConversationReporter`]; the default [`LoggingReporter`] writes the rendered report to
//! the log, and an outbound mail transport can be plugged in without touching handlers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rentbot_core::domain::conversation::{ConversationTurn, TurnRole};
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;
use tracing::info;

const TEMPLATE_NAME: &str = "conversation_report.txt";

const TEMPLATE: &str = "Car Rental Chatbot Inquiry Report
================================

Time: {{ time }}

Latest Customer Message:
------------------------
{{ customer_message }}

Bot Response:
-------------
{{ bot_response }}
{% if has_history %}
Full Conversation History:
==================================================
{% for turn in history %}
{{ loop.index }}. {{ turn.speaker }}:
{{ turn.content }}
{% endfor %}{% endif %}
---
This is an automated report from the Car Rental Chatbot system.
";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationReport {
    pub created_at: DateTime<Utc>,
    pub customer_message: String,
    pub bot_response: String,
    /// Every turn of the conversation, including the exchange being reported.
    pub history: Vec<ConversationTurn>,
}

impl ConversationReport {
    pub fn subject(&self) -> String {
        format!("Car Rental Chatbot Inquiry - {}", self.created_at.format("%Y-%m-%d %H:%M"))
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report template failed: {0}")]
    Template(#[from] tera::Error),
    #[error("report delivery failed: {0}")]
    Delivery(String),
}

#[derive(Serialize)]
struct HistoryLine<'a> {
    speaker: &'static str,
    content: &'a str,
}

pub struct ReportRenderer {
    tera: Tera,
}

impl ReportRenderer {
    pub fn new() -> Result<Self, ReportError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self { tera })
    }

    pub fn render(&self, report: &ConversationReport) -> Result<String, ReportError> {
        let history = report
            .history
            .iter()
            .map(|turn| HistoryLine {
                speaker: match turn.role {
                    TurnRole::User => "Customer",
                    TurnRole::Assistant => "Bot",
                },
                content: &turn.content,
            })
            .collect::<Vec<_>>();

        let mut context = Context::new();
        context.insert("time", &report.created_at.format("%Y-%m-%d %H:%M:%S").to_string());
        context.insert("customer_message", &report.customer_message);
        context.insert("bot_response", &report.bot_response);
        context.insert("has_history", &!history.is_empty());
        context.insert("history", &history);

        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

#[async_trait]
pub trait ConversationReporter: Send + Sync {
    async fn deliver(&self, report: &ConversationReport) -> Result<(), ReportError>;
}

pub struct LoggingReporter {
    renderer: ReportRenderer,
    recipient: Option<String>,
}

impl LoggingReporter {
    pub fn new(recipient: Option<String>) -> Result<Self, ReportError> {
        Ok(Self { renderer: ReportRenderer::new()?, recipient })
    }
}

#[async_trait]
impl ConversationReporter for LoggingReporter {
    async fn deliver(&self, report: &ConversationReport) -> Result<(), ReportError> {
        let body = self.renderer.render(report)?;
        info!(
            event_name = "server.report.generated",
            recipient = self.recipient.as_deref().unwrap_or("unset"),
            subject = %report.subject(),
            body = %body,
            "conversation report generated"
        );
        Ok(())
    }
}
