use rentbot_db::{CatalogSeed, SeedOutcome, SqlVehicleRepository};

use crate::commands::{with_migrated_database, CommandFailure, CommandResult};

pub fn run() -> CommandResult {
    with_migrated_database("seed", |_config, pool| async move {
        let catalog = SqlVehicleRepository::new(pool);
        let outcome = CatalogSeed::load_if_empty(&catalog)
            .await
            .map_err(|error| CommandFailure::new("seed_execution", error.to_string(), 6))?;
        Ok(seed_message(outcome))
    })
}

fn seed_message(outcome: SeedOutcome) -> String {
    match outcome {
        SeedOutcome::Inserted(count) => format!("seeded {count} vehicles into the empty catalog"),
        SeedOutcome::Skipped(existing) => {
            format!("catalog already holds {existing} vehicles; seed skipped")
        }
    }
}
