use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use rentbot_core::domain::action::{Action, ActionEnvelope};
use rentbot_core::domain::conversation::ConversationTurn;

use crate::llm::{ChatMessage, CompletionRequest, LlmClient, ResponseSchema};
use crate::prompt::action_schema;

pub const ACTION_SCHEMA_NAME: &str = "rental_action";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Transport or status failure, undecodable output, or an envelope that violates the
    /// action contract.
    #[error("intent resolution failed: {0}")]
    Failure(String),
    /// The model answered but refused or returned nothing.
    #[error("intent resolution declined: {0}")]
    Declined(String),
}

/// Turns the conversation so far into exactly one [`Action`].
pub struct IntentResolver {
    llm: Arc<dyn LlmClient>,
}

impl IntentResolver {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn resolve(
        &self,
        system_prompt: &str,
        history: &[ConversationTurn],
        new_message: &str,
    ) -> Result<Action, ResolveError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(new_message));

        let request = CompletionRequest::structured(
            messages,
            ResponseSchema { name: ACTION_SCHEMA_NAME.to_string(), schema: action_schema() },
        );

        let reply = self
            .llm
            .complete(request)
            .await
            .map_err(|error| ResolveError::Failure(error.to_string()))?;

        if let Some(refusal) = reply.refusal.as_deref().filter(|text| !text.trim().is_empty()) {
            return Err(ResolveError::Declined(refusal.to_string()));
        }
        let content =
            reply.text().ok_or_else(|| ResolveError::Declined("empty completion".to_string()))?;

        let envelope: ActionEnvelope = serde_json::from_str(content).map_err(|error| {
            ResolveError::Failure(format!("undecodable action envelope: {error}"))
        })?;
        let action =
            Action::try_from(envelope).map_err(|error| ResolveError::Failure(error.to_string()))?;

        debug!(event_name = "agent.intent.resolved", action = action.kind().as_str());
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use rentbot_core::domain::action::Action;
    use rentbot_core::domain::conversation::ConversationTurn;
    use rentbot_core::domain::search::SearchCriteria;
    use rentbot_core::domain::vehicle::VehicleCategory;

    use super::{IntentResolver, ResolveError, ACTION_SCHEMA_NAME};
    use crate::llm::fake::ScriptedLlm;
    use crate::llm::{ChatRole, LlmError, LlmReply};

    fn resolver_with(reply: Result<LlmReply, LlmError>) -> (IntentResolver, Arc<ScriptedLlm>) {
        let llm = Arc::new(ScriptedLlm::new(vec![reply]));
        (IntentResolver::new(llm.clone()), llm)
    }

    #[tokio::test]
    async fn sends_system_history_and_new_message_in_order() {
        let (resolver, llm) = resolver_with(Ok(LlmReply::content(
            r#"{"action_type":"direct_response","search_criteria":null,"response":"Hi!"}"#,
        )));
        let history =
            vec![ConversationTurn::user("hello"), ConversationTurn::assistant("Welcome!")];

        let action = resolver.resolve("rules", &history, "thanks").await.expect("resolve");
        assert_eq!(action, Action::DirectResponse { text: "Hi!".to_string() });

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        let roles = requests[0].messages.iter().map(|message| message.role).collect::<Vec<_>>();
        assert_eq!(
            roles,
            vec![ChatRole::System, ChatRole::User, ChatRole::Assistant, ChatRole::User]
        );
        assert_eq!(requests[0].messages[3].content, "thanks");
        assert_eq!(
            requests[0].response_schema.as_ref().map(|schema| schema.name.as_str()),
            Some(ACTION_SCHEMA_NAME)
        );
    }

    #[tokio::test]
    async fn search_envelope_yields_typed_criteria() {
        let (resolver, _) = resolver_with(Ok(LlmReply::content(
            r#"{"action_type":"search_cars","search_criteria":{"max_price":50,"min_passengers":5,"category":null,"fuel_type":null},"response":null}"#,
        )));

        let action = resolver
            .resolve("rules", &[], "Show me cars under 50 AED with 5 passengers")
            .await
            .expect("resolve");
        assert_eq!(
            action,
            Action::SearchCars {
                criteria: SearchCriteria {
                    max_price: Some(Decimal::new(50, 0)),
                    min_passengers: Some(5),
                    ..SearchCriteria::default()
                }
            }
        );
    }

    #[tokio::test]
    async fn category_display_names_decode() {
        let (resolver, _) = resolver_with(Ok(LlmReply::content(
            r#"{"action_type":"search_cars","search_criteria":{"max_price":null,"min_passengers":null,"category":"Pickup Truck","fuel_type":null},"response":null}"#,
        )));

        let action = resolver.resolve("rules", &[], "need a truck").await.expect("resolve");
        assert_eq!(
            action,
            Action::SearchCars {
                criteria: SearchCriteria {
                    category: Some(VehicleCategory::PickupTruck),
                    ..SearchCriteria::default()
                }
            }
        );
    }

    #[tokio::test]
    async fn transport_failure_is_a_resolution_failure() {
        let (resolver, _) = resolver_with(Err(LlmError::Timeout));
        let result = resolver.resolve("rules", &[], "hi").await;
        assert!(matches!(result, Err(ResolveError::Failure(_))));
    }

    #[tokio::test]
    async fn malformed_output_is_a_resolution_failure() {
        let (resolver, _) = resolver_with(Ok(LlmReply::content("I think you want a car")));
        assert!(matches!(
            resolver.resolve("rules", &[], "hi").await,
            Err(ResolveError::Failure(_))
        ));

        let (resolver, _) = resolver_with(Ok(LlmReply::content(
            r#"{"action_type":"direct_response","search_criteria":null,"response":""}"#,
        )));
        assert!(matches!(
            resolver.resolve("rules", &[], "hi").await,
            Err(ResolveError::Failure(_))
        ));
    }

    #[tokio::test]
    async fn refusal_and_empty_content_are_declines() {
        let (resolver, _) = resolver_with(Ok(LlmReply::refusal("I can't help with that")));
        assert_eq!(
            resolver.resolve("rules", &[], "hi").await,
            Err(ResolveError::Declined("I can't help with that".to_string()))
        );

        let (resolver, _) = resolver_with(Ok(LlmReply::default()));
        assert!(matches!(
            resolver.resolve("rules", &[], "hi").await,
            Err(ResolveError::Declined(_))
        ));
    }
}
