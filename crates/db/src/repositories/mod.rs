use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use rentbot_core::domain::conversation::ConversationTurn;
use rentbot_core::domain::search::SearchCriteria;
use rentbot_core::domain::vehicle::{NewVehicle, Vehicle, VehicleId};
use rentbot_core::errors::DomainError;

pub mod conversation;
pub mod memory;
pub mod vehicle;

pub use conversation::SqlConversationRepository;
pub use memory::{InMemoryConversationRepository, InMemoryVehicleRepository};
pub use vehicle::SqlVehicleRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// The vehicle catalog.
///
/// `list_available` and `search` are the read surface used while answering customers;
/// both return vehicles in insertion order. The remaining operations are maintenance
/// hooks for seeding and the operator CLI.
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn list_available(&self) -> Result<Vec<Vehicle>, RepositoryError>;
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Vehicle>, RepositoryError>;

    async fn insert(&self, vehicle: NewVehicle) -> Result<Vehicle, RepositoryError>;
    async fn find_by_id(&self, id: VehicleId) -> Result<Option<Vehicle>, RepositoryError>;
    async fn list_all(&self) -> Result<Vec<Vehicle>, RepositoryError>;
    async fn set_availability(
        &self,
        id: VehicleId,
        available: bool,
    ) -> Result<Vehicle, RepositoryError>;
    async fn set_daily_price(
        &self,
        id: VehicleId,
        daily_price: Decimal,
    ) -> Result<Vehicle, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
}

/// Per-identity conversation history, capped at the most recent turns.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Stored turns in order, empty for an unseen identity.
    async fn get(&self, identity: &str) -> Result<Vec<ConversationTurn>, RepositoryError>;

    /// Appends the user turn then the assistant turn, truncating to the cap.
    async fn append(
        &self,
        identity: &str,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<(), RepositoryError>;
}
