use crate::commands::{with_migrated_database, CommandResult};

pub fn run() -> CommandResult {
    with_migrated_database("migrate", |config, _pool| async move {
        Ok(format!("applied pending migrations to `{}`", config.database.url))
    })
}
