use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use super::{run_pending, MIGRATOR};
    use crate::{connect_with_settings, DbPool};

    async fn schema_objects(pool: &DbPool) -> Vec<String> {
        sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master
             WHERE type IN ('table', 'index') AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx%'
             ORDER BY name",
        )
        .fetch_all(pool)
        .await
        .expect("list schema objects")
    }

    #[tokio::test]
    async fn baseline_creates_catalog_and_conversation_storage() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run is a no-op");

        assert_eq!(
            schema_objects(&pool).await,
            vec!["conversation", "idx_vehicle_available", "idx_vehicle_category", "vehicle"]
        );
    }

    #[tokio::test]
    async fn one_conversation_row_per_identity() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("migrate");

        let insert = "INSERT INTO conversation (identity, history_json, updated_at) VALUES (?, '[]', ?)";
        sqlx::query(insert)
            .bind("whatsapp:+971500000000")
            .bind("2026-01-01T00:00:00Z")
            .execute(&pool)
            .await
            .expect("first row");
        let duplicate = sqlx::query(insert)
            .bind("whatsapp:+971500000000")
            .bind("2026-01-01T00:00:01Z")
            .execute(&pool)
            .await;

        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn undo_removes_everything_and_rerun_restores_it() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("migrate");
        let migrated = schema_objects(&pool).await;

        MIGRATOR.undo(&pool, 0).await.expect("undo");
        assert!(schema_objects(&pool).await.is_empty());

        run_pending(&pool).await.expect("re-run");
        assert_eq!(schema_objects(&pool).await, migrated);
    }
}
