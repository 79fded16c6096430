use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use rentbot_core::domain::action::Action;
use rentbot_core::domain::conversation::ConversationTurn;
use rentbot_core::domain::search::SearchCriteria;
use rentbot_db::repositories::{RepositoryError, VehicleRepository};

use crate::llm::{ChatMessage, CompletionRequest, LlmClient};
use crate::prompt::{inventory_note, search_results_note};

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("reply rendering failed: {0}")]
    Render(String),
    #[error("catalog unavailable: {0}")]
    Catalog(#[from] RepositoryError),
}

/// Runs a resolved [`Action`] against the catalog and renders the reply text.
pub struct ActionExecutor {
    catalog: Arc<dyn VehicleRepository>,
    llm: Arc<dyn LlmClient>,
    currency_code: String,
}

impl ActionExecutor {
    pub fn new(
        catalog: Arc<dyn VehicleRepository>,
        llm: Arc<dyn LlmClient>,
        currency_code: impl Into<String>,
    ) -> Self {
        Self { catalog, llm, currency_code: currency_code.into() }
    }

    /// `history` must already end with the user turn being answered.
    pub async fn execute(
        &self,
        action: &Action,
        system_prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<String, ExecuteError> {
        match action {
            Action::SearchCars { criteria } if criteria.is_unconstrained() => {
                warn!(
                    event_name = "agent.action.unconstrained_search",
                    "search_cars carried no criteria; listing inventory instead"
                );
                self.list_inventory(system_prompt, history).await
            }
            Action::SearchCars { criteria } => self.search(criteria, system_prompt, history).await,
            Action::GetInventory => self.list_inventory(system_prompt, history).await,
            Action::DirectResponse { text } => Ok(text.clone()),
        }
    }

    async fn search(
        &self,
        criteria: &SearchCriteria,
        system_prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<String, ExecuteError> {
        let vehicles = self.catalog.search(criteria).await?;
        debug!(
            event_name = "agent.catalog.searched",
            criteria = %criteria.describe(),
            matches = vehicles.len()
        );

        let note = search_results_note(criteria, &vehicles, &self.currency_code);
        self.render(system_prompt, history, note).await
    }

    async fn list_inventory(
        &self,
        system_prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<String, ExecuteError> {
        let vehicles = self.catalog.list_available().await?;
        debug!(event_name = "agent.catalog.listed", vehicles = vehicles.len());

        let note = inventory_note(&vehicles, &self.currency_code);
        self.render(system_prompt, history, note).await
    }

    async fn render(
        &self,
        system_prompt: &str,
        history: &[ConversationTurn],
        note: String,
    ) -> Result<String, ExecuteError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::system(note));

        let reply = self
            .llm
            .complete(CompletionRequest::text(messages))
            .await
            .map_err(|error| ExecuteError::Render(error.to_string()))?;

        if let Some(refusal) = reply.refusal.as_deref().filter(|text| !text.trim().is_empty()) {
            return Err(ExecuteError::Render(format!("render refused: {refusal}")));
        }
        reply
            .text()
            .map(str::to_string)
            .ok_or_else(|| ExecuteError::Render("render returned no text".to_string()))
    }
}
