use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of turns retained per identity.
pub const HISTORY_CAP: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: TurnRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: TurnRole::Assistant, content: content.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub identity: String,
    pub turns: Vec<ConversationTurn>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationState {
    pub fn new(identity: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self { identity: identity.into(), turns: Vec::new(), updated_at: now }
    }

    /// Appends the user turn then the assistant turn and drops the oldest turns beyond
    /// [`HISTORY_CAP`].
    pub fn append_exchange(
        &mut self,
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.turns.push(ConversationTurn::user(user_text));
        self.turns.push(ConversationTurn::assistant(assistant_text));
        retain_recent(&mut self.turns, HISTORY_CAP);
        self.updated_at = now;
    }
}

pub fn retain_recent(turns: &mut Vec<ConversationTurn>, cap: usize) {
    if turns.len() > cap {
        let overflow = turns.len() - cap;
        turns.drain(..overflow);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{ConversationState, ConversationTurn, TurnRole, HISTORY_CAP};

    #[test]
    fn append_exchange_keeps_user_before_assistant() {
        let mut state = ConversationState::new("whatsapp:+971500000000", Utc::now());
        state.append_exchange("hi", "hello!", Utc::now());

        assert_eq!(
            state.turns,
            vec![ConversationTurn::user("hi"), ConversationTurn::assistant("hello!")]
        );
    }

    #[test]
    fn append_exchange_drops_oldest_turns_beyond_cap() {
        let mut state = ConversationState::new("session-1", Utc::now());
        for index in 0..11 {
            state.append_exchange(format!("user {index}"), format!("bot {index}"), Utc::now());
        }

        assert_eq!(state.turns.len(), HISTORY_CAP);
        assert_eq!(state.turns[0], ConversationTurn::user("user 1"));
        assert_eq!(state.turns[HISTORY_CAP - 1], ConversationTurn::assistant("bot 10"));
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&ConversationTurn::user("x")).expect("serialize");
        assert_eq!(json, r#"{"role":"user","content":"x"}"#);
        assert_eq!(TurnRole::Assistant.as_str(), "assistant");
    }
}
