use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::search::SearchCriteria;

/// The structured decision taken for a single user turn.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SearchCars { criteria: SearchCriteria },
    GetInventory,
    DirectResponse { text: String },
}

impl Action {
    pub fn kind(&self) -> ActionType {
        match self {
            Self::SearchCars { .. } => ActionType::SearchCars,
            Self::GetInventory => ActionType::GetInventory,
            Self::DirectResponse { .. } => ActionType::DirectResponse,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    SearchCars,
    GetInventory,
    DirectResponse,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SearchCars => "search_cars",
            Self::GetInventory => "get_inventory",
            Self::DirectResponse => "direct_response",
        }
    }
}

/// Flat wire form emitted by the language model. Only the field matching
/// `action_type` is meaningful.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub action_type: ActionType,
    #[serde(default)]
    pub search_criteria: Option<SearchCriteria>,
    #[serde(default)]
    pub response: Option<String>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("direct_response action carried no response text")]
    MissingResponseText,
    #[error("search criteria out of range: {0}")]
    InvalidCriteria(String),
}

impl TryFrom<ActionEnvelope> for Action {
    type Error = EnvelopeError;

    fn try_from(envelope: ActionEnvelope) -> Result<Self, Self::Error> {
        match envelope.action_type {
            ActionType::SearchCars => {
                // Missing criteria decode as the empty filter; the executor treats that
                // as a full inventory listing.
                let criteria = envelope.search_criteria.unwrap_or_default();
                criteria
                    .validate()
                    .map_err(|error| EnvelopeError::InvalidCriteria(error.to_string()))?;
                Ok(Self::SearchCars { criteria })
            }
            ActionType::GetInventory => Ok(Self::GetInventory),
            ActionType::DirectResponse => {
                let text = envelope
                    .response
                    .filter(|text| !text.trim().is_empty())
                    .ok_or(EnvelopeError::MissingResponseText)?;
                Ok(Self::DirectResponse { text })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{Action, ActionEnvelope, ActionType, EnvelopeError};
    use crate::domain::search::SearchCriteria;

    fn decode(value: serde_json::Value) -> Result<Action, EnvelopeError> {
        let envelope: ActionEnvelope = serde_json::from_value(value).expect("envelope decodes");
        Action::try_from(envelope)
    }

    #[test]
    fn search_envelope_becomes_search_action() {
        let action = decode(json!({
            "action_type": "search_cars",
            "search_criteria": {"max_price": 50, "min_passengers": 5},
            "response": null
        }))
        .expect("valid search");

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
        assert_eq!(action.kind(), ActionType::SearchCars);
    }

    #[test]
    fn search_without_criteria_decodes_as_unconstrained() {
        let action = decode(json!({"action_type": "search_cars"})).expect("tolerated");
        assert_eq!(action, Action::SearchCars { criteria: SearchCriteria::default() });
    }

    #[test]
    fn direct_response_requires_text() {
        assert_eq!(
            decode(json!({"action_type": "direct_response", "response": "  "})),
            Err(EnvelopeError::MissingResponseText)
        );
        assert_eq!(
            decode(json!({"action_type": "direct_response", "response": "Hello there!"})),
            Ok(Action::DirectResponse { text: "Hello there!".to_string() })
        );
    }

    #[test]
    fn out_of_range_criteria_are_rejected() {
        let result = decode(json!({
            "action_type": "search_cars",
            "search_criteria": {"min_passengers": 40}
        }));
        assert!(matches!(result, Err(EnvelopeError::InvalidCriteria(_))));
    }

    #[test]
    fn unknown_action_type_fails_to_decode() {
        let result = serde_json::from_value::<ActionEnvelope>(json!({"action_type": "book_car"}));
        assert!(result.is_err());
    }
}
