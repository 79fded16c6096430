pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{CatalogSeed, SeedOutcome};
pub use repositories::{
    ConversationRepository, InMemoryConversationRepository, InMemoryVehicleRepository,
    RepositoryError, SqlConversationRepository, SqlVehicleRepository, VehicleRepository,
};
