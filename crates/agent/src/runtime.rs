use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{error, info, warn};
use uuid::Uuid;

use rentbot_core::domain::action::ActionType;
use rentbot_core::domain::conversation::{retain_recent, ConversationTurn, HISTORY_CAP};
use rentbot_db::repositories::{ConversationRepository, RepositoryError, VehicleRepository};

use crate::executor::{ActionExecutor, ExecuteError};
use crate::llm::LlmClient;
use crate::media::MediaSelector;
use crate::prompt::system_prompt;
use crate::resolver::{IntentResolver, ResolveError};

pub const APOLOGY_TEXT: &str =
    "I apologize, but I'm having trouble processing your request right now. Could you please try again?";

/// Where a turn's history comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnContext {
    /// Stored history keyed by identity; the exchange is persisted afterwards.
    Identity(String),
    /// Caller-supplied history; nothing is persisted.
    Inline(Vec<ConversationTurn>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply_text: String,
    pub media_urls: Vec<String>,
    /// True only when an identity turn was written to the conversation store.
    pub persisted: bool,
    /// `None` when the turn fell back to the apology.
    pub action: Option<ActionType>,
    pub correlation_id: String,
}

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("catalog unavailable: {source}")]
    Catalog {
        correlation_id: String,
        #[source]
        source: RepositoryError,
    },
}

impl TurnError {
    pub fn correlation_id(&self) -> &str {
        match self {
            Self::Catalog { correlation_id, .. } => correlation_id,
        }
    }
}

/// One async mutex per identity so concurrent deliveries for the same sender run in order.
#[derive(Default)]
pub struct IdentityLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl IdentityLocks {
    pub async fn acquire(&self, identity: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = match self.locks.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            // Entries nobody holds or waits on are dropped.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(identity.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        match self.locks.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

/// Composes resolver, executor, media selection and conversation persistence into a
/// single turn handler.
pub struct AgentRuntime {
    resolver: IntentResolver,
    executor: ActionExecutor,
    media: MediaSelector,
    conversations: Arc<dyn ConversationRepository>,
    system_prompt: String,
    locks: IdentityLocks,
}

impl AgentRuntime {
    pub fn new(
        catalog: Arc<dyn VehicleRepository>,
        conversations: Arc<dyn ConversationRepository>,
        llm: Arc<dyn LlmClient>,
        currency_code: &str,
    ) -> Self {
        Self {
            resolver: IntentResolver::new(llm.clone()),
            executor: ActionExecutor::new(catalog.clone(), llm, currency_code),
            media: MediaSelector::new(catalog, currency_code),
            conversations,
            system_prompt: system_prompt(currency_code),
            locks: IdentityLocks::default(),
        }
    }

    pub async fn handle_turn(
        &self,
        context: TurnContext,
        incoming_text: &str,
    ) -> Result<TurnOutcome, TurnError> {
        let correlation_id = Uuid::new_v4().to_string();

        let (identity, _guard, mut history) = match context {
            TurnContext::Identity(identity) => {
                let guard = self.locks.acquire(&identity).await;
                let history = self.load_history(&identity, &correlation_id).await;
                (Some(identity), Some(guard), history)
            }
            TurnContext::Inline(mut history) => {
                retain_recent(&mut history, HISTORY_CAP);
                (None, None, history)
            }
        };

        info!(
            event_name = "agent.turn.started",
            correlation_id = %correlation_id,
            identity = identity.as_deref().unwrap_or("inline"),
            history_turns = history.len(),
        );

        let (reply_text, action) = match self
            .resolver
            .resolve(&self.system_prompt, &history, incoming_text)
            .await
        {
            Ok(action) => {
                history.push(ConversationTurn::user(incoming_text));
                match self.executor.execute(&action, &self.system_prompt, &history).await {
                    Ok(reply) => (reply, Some(action.kind())),
                    Err(ExecuteError::Render(reason)) => {
                        warn!(
                            event_name = "agent.turn.render_failed",
                            correlation_id = %correlation_id,
                            action = action.kind().as_str(),
                            reason = %reason,
                        );
                        (APOLOGY_TEXT.to_string(), None)
                    }
                    Err(ExecuteError::Catalog(source)) => {
                        error!(
                            event_name = "agent.turn.catalog_unavailable",
                            correlation_id = %correlation_id,
                            action = action.kind().as_str(),
                            error = %source,
                        );
                        return Err(TurnError::Catalog { correlation_id, source });
                    }
                }
            }
            Err(ResolveError::Failure(reason)) => {
                warn!(
                    event_name = "agent.turn.resolution_failed",
                    correlation_id = %correlation_id,
                    reason = %reason,
                );
                (APOLOGY_TEXT.to_string(), None)
            }
            Err(ResolveError::Declined(reason)) => {
                warn!(
                    event_name = "agent.turn.resolution_declined",
                    correlation_id = %correlation_id,
                    reason = %reason,
                );
                (APOLOGY_TEXT.to_string(), None)
            }
        };

        let media_urls =
            if action.is_some() { self.media.select(&reply_text).await } else { Vec::new() };

        let persisted = match &identity {
            Some(identity) => {
                match self.conversations.append(identity, incoming_text, &reply_text).await {
                    Ok(()) => true,
                    Err(error) => {
                        warn!(
                            event_name = "agent.turn.persist_failed",
                            correlation_id = %correlation_id,
                            identity = %identity,
                            error = %error,
                        );
                        false
                    }
                }
            }
            None => false,
        };

        info!(
            event_name = "agent.turn.completed",
            correlation_id = %correlation_id,
            action = action.map(|kind| kind.as_str()).unwrap_or("apology"),
            media = media_urls.len(),
            persisted,
        );

        Ok(TurnOutcome { reply_text, media_urls, persisted, action, correlation_id })
    }

    async fn load_history(&self, identity: &str, correlation_id: &str) -> Vec<ConversationTurn> {
        match self.conversations.get(identity).await {
            Ok(mut turns) => {
                retain_recent(&mut turns, HISTORY_CAP);
                turns
            }
            Err(error) => {
                warn!(
                    event_name = "agent.turn.history_unavailable",
                    correlation_id = %correlation_id,
                    identity = %identity,
                    error = %error,
                    "continuing with empty history"
                );
                Vec::new()
            }
        }
    }
}
