use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use rentbot_core::domain::conversation::{ConversationState, ConversationTurn};

use super::{ConversationRepository, RepositoryError};
use crate::DbPool;

pub struct SqlConversationRepository {
    pool: DbPool,
}

impl SqlConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConversationRepository for SqlConversationRepository {
    async fn get(&self, identity: &str) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let row = sqlx::query(
            "SELECT history_json, updated_at FROM conversation WHERE identity = ?",
        )
        .bind(identity)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(state_from_row(identity, &row)?.turns),
            None => Ok(Vec::new()),
        }
    }

    /// The write lock is taken when the transaction starts. A deferred transaction would read
    /// a snapshot first and then fail with SQLITE_BUSY_SNAPSHOT if any other connection
    /// committed before the upsert.
    async fn append(
        &self,
        identity: &str,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let row = sqlx::query(
            "SELECT history_json, updated_at FROM conversation WHERE identity = ?",
        )
        .bind(identity)
        .fetch_optional(&mut *tx)
        .await?;

        let now = Utc::now();
        let mut state = match row {
            Some(row) => state_from_row(identity, &row)?,
            None => ConversationState::new(identity, now),
        };
        state.append_exchange(user_text, assistant_text, now);

        let history_json = serde_json::to_string(&state.turns)
            .map_err(|error| RepositoryError::Decode(format!("encode history: {error}")))?;

        sqlx::query(
            "INSERT INTO conversation (identity, history_json, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(identity) DO UPDATE SET
                history_json = excluded.history_json,
                updated_at = excluded.updated_at",
        )
        .bind(&state.identity)
        .bind(history_json)
        .bind(state.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn state_from_row(identity: &str, row: &SqliteRow) -> Result<ConversationState, RepositoryError> {
    let history_json: String =
        row.try_get("history_json").map_err(|error| RepositoryError::Decode(error.to_string()))?;
    let updated_at: String =
        row.try_get("updated_at").map_err(|error| RepositoryError::Decode(error.to_string()))?;

    let turns = serde_json::from_str(&history_json)
        .map_err(|error| RepositoryError::Decode(format!("invalid history_json: {error}")))?;
    let updated_at = DateTime::parse_from_rfc3339(&updated_at)
        .map_err(|error| RepositoryError::Decode(format!("invalid updated_at `{updated_at}`: {error}")))?
        .with_timezone(&Utc);

    Ok(ConversationState { identity: identity.to_string(), turns, updated_at })
}
