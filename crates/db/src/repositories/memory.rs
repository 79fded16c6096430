use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use rentbot_core::domain::conversation::{ConversationState, ConversationTurn};
use rentbot_core::domain::search::SearchCriteria;
use rentbot_core::domain::vehicle::{validate_daily_price, NewVehicle, Vehicle, VehicleId};
use rentbot_core::errors::DomainError;

use super::{ConversationRepository, RepositoryError, VehicleRepository};

#[derive(Default)]
pub struct InMemoryVehicleRepository {
    vehicles: RwLock<Vec<Vehicle>>,
}

impl InMemoryVehicleRepository {
    /// Builds a catalog with ids assigned in iteration order, starting at 1.
    pub fn with_vehicles(vehicles: impl IntoIterator<Item = NewVehicle>) -> Self {
        let vehicles = vehicles
            .into_iter()
            .enumerate()
            .map(|(index, vehicle)| vehicle.into_vehicle(VehicleId(index as i64 + 1)))
            .collect();
        Self { vehicles: RwLock::new(vehicles) }
    }

    async fn update<F>(&self, id: VehicleId, apply: F) -> Result<Vehicle, RepositoryError>
    where
        F: FnOnce(&mut Vehicle) + Send,
    {
        let mut vehicles = self.vehicles.write().await;
        let vehicle = vehicles
            .iter_mut()
            .find(|vehicle| vehicle.id == id)
            .ok_or(DomainError::VehicleNotFound(id.0))?;
        apply(vehicle);
        Ok(vehicle.clone())
    }
}

#[async_trait::async_trait]
impl VehicleRepository for InMemoryVehicleRepository {
    async fn list_available(&self) -> Result<Vec<Vehicle>, RepositoryError> {
        let vehicles = self.vehicles.read().await;
        Ok(vehicles.iter().filter(|vehicle| vehicle.available).cloned().collect())
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Vehicle>, RepositoryError> {
        let vehicles = self.vehicles.read().await;
        Ok(vehicles.iter().filter(|vehicle| criteria.matches(vehicle)).cloned().collect())
    }

    async fn insert(&self, vehicle: NewVehicle) -> Result<Vehicle, RepositoryError> {
        vehicle.validate()?;
        let mut vehicles = self.vehicles.write().await;
        let next_id = vehicles.iter().map(|vehicle| vehicle.id.0).max().unwrap_or(0) + 1;
        let vehicle = vehicle.into_vehicle(VehicleId(next_id));
        vehicles.push(vehicle.clone());
        Ok(vehicle)
    }

    async fn find_by_id(&self, id: VehicleId) -> Result<Option<Vehicle>, RepositoryError> {
        let vehicles = self.vehicles.read().await;
        Ok(vehicles.iter().find(|vehicle| vehicle.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Vehicle>, RepositoryError> {
        Ok(self.vehicles.read().await.clone())
    }

    async fn set_availability(
        &self,
        id: VehicleId,
        available: bool,
    ) -> Result<Vehicle, RepositoryError> {
        self.update(id, |vehicle| vehicle.available = available).await
    }

    async fn set_daily_price(
        &self,
        id: VehicleId,
        daily_price: Decimal,
    ) -> Result<Vehicle, RepositoryError> {
        validate_daily_price(daily_price)?;
        self.update(id, |vehicle| vehicle.daily_price = daily_price).await
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.vehicles.read().await.len() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryConversationRepository {
    conversations: RwLock<HashMap<String, ConversationState>>,
}

#[async_trait::async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn get(&self, identity: &str) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let conversations = self.conversations.read().await;
        Ok(conversations.get(identity).map(|state| state.turns.clone()).unwrap_or_default())
    }

    async fn append(
        &self,
        identity: &str,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let mut conversations = self.conversations.write().await;
        conversations
            .entry(identity.to_string())
            .or_insert_with(|| ConversationState::new(identity, now))
            .append_exchange(user_text, assistant_text, now);
        Ok(())
    }
}
