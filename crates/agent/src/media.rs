use std::sync::Arc;

use tracing::warn;

use rentbot_core::media::{has_per_day_price, select_media};
use rentbot_db::repositories::VehicleRepository;

/// Picks the vehicle images that accompany a rendered reply.
pub struct MediaSelector {
    catalog: Arc<dyn VehicleRepository>,
    currency_code: String,
}

impl MediaSelector {
    pub fn new(catalog: Arc<dyn VehicleRepository>, currency_code: impl Into<String>) -> Self {
        Self { catalog, currency_code: currency_code.into() }
    }

    /// At most three image URLs. A catalog failure yields no media rather than an error,
    /// since the reply has already been rendered.
    pub async fn select(&self, reply_text: &str) -> Vec<String> {
        if !has_per_day_price(reply_text, &self.currency_code) {
            return Vec::new();
        }

        match self.catalog.list_available().await {
            Ok(vehicles) => select_media(reply_text, &vehicles, &self.currency_code),
            Err(error) => {
                warn!(
                    event_name = "agent.media.catalog_unavailable",
                    error = %error,
                    "media selection skipped"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use rentbot_core::domain::vehicle::{
        FuelType, NewVehicle, Transmission, VehicleCategory,
    };
    use rentbot_db::repositories::{InMemoryVehicleRepository, VehicleRepository};

    use super::MediaSelector;

    fn vehicle(make: &str, model: &str, image: Option<&str>, available: bool) -> NewVehicle {
        NewVehicle {
            make: make.to_string(),
            model: model.to_string(),
            year: 2024,
            category: VehicleCategory::Economy,
            daily_price: Decimal::new(12845, 2),
            passenger_capacity: 5,
            luggage_capacity: 2,
            transmission: Transmission::Automatic,
            fuel_type: FuelType::Gasoline,
            features: Vec::new(),
            image_url: image.map(str::to_string),
            available,
        }
    }

    #[tokio::test]
    async fn priced_reply_gets_named_vehicle_image() {
        let catalog = Arc::new(InMemoryVehicleRepository::with_vehicles([
            vehicle("Toyota", "Corolla", Some("https://img.example/corolla.jpg"), true),
            vehicle("Honda", "Civic", Some("https://img.example/civic.jpg"), true),
        ]));
        let selector = MediaSelector::new(catalog, "AED");

        let media = selector.select("**2024 Toyota Corolla** - AED 128.45/day").await;
        assert_eq!(media, vec!["https://img.example/corolla.jpg".to_string()]);
        assert!(selector.select("The Toyota Corolla is a great city car").await.is_empty());
    }

    #[tokio::test]
    async fn unavailable_vehicles_are_not_illustrated() {
        let catalog = Arc::new(InMemoryVehicleRepository::with_vehicles([vehicle(
            "Toyota",
            "Corolla",
            Some("https://img.example/corolla.jpg"),
            true,
        )]));
        let selector = MediaSelector::new(catalog.clone(), "AED");
        let corolla = catalog.list_all().await.expect("list")[0].id;
        catalog.set_availability(corolla, false).await.expect("toggle");

        assert!(selector.select("**2024 Toyota Corolla** - AED 128.45/day").await.is_empty());
    }

    #[tokio::test]
    async fn configured_currency_drives_the_price_marker() {
        let catalog = Arc::new(InMemoryVehicleRepository::with_vehicles([vehicle(
            "Toyota",
            "Corolla",
            Some("https://img.example/corolla.jpg"),
            true,
        )]));
        let selector = MediaSelector::new(catalog, "USD");

        assert!(selector.select("**2024 Toyota Corolla** - AED 128.45/day").await.is_empty());
        assert_eq!(selector.select("Toyota Corolla - USD 35 per day").await.len(), 1);
    }
}
