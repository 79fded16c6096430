use rentbot_core::domain::vehicle::{Vehicle, VehicleId};
use rentbot_core::errors::DomainError;
use rentbot_db::{RepositoryError, SqlVehicleRepository, VehicleRepository};

use crate::commands::{with_migrated_database, CommandFailure, CommandResult};
use crate::InventoryAction;

pub fn run(action: InventoryAction) -> CommandResult {
    with_migrated_database("inventory", |config, pool| async move {
        let catalog = SqlVehicleRepository::new(pool);
        let currency = config.assistant.currency_code;

        match action {
            InventoryAction::List { all } => {
                let listed =
                    if all { catalog.list_all().await } else { catalog.list_available().await };
                let vehicles = listed.map_err(repository_failure)?;
                Ok(render_listing(&vehicles, &currency))
            }
            InventoryAction::SetAvailability { id, available } => {
                let vehicle = catalog
                    .set_availability(VehicleId(id), available)
                    .await
                    .map_err(repository_failure)?;
                Ok(format!(
                    "{}: marked {}",
                    render_row(&vehicle, &currency),
                    if available { "available" } else { "unavailable" }
                ))
            }
            InventoryAction::SetPrice { id, price } => {
                let vehicle = catalog
                    .set_daily_price(VehicleId(id), price)
                    .await
                    .map_err(repository_failure)?;
                Ok(format!("{}: price updated", render_row(&vehicle, &currency)))
            }
        }
    })
}

fn repository_failure(error: RepositoryError) -> CommandFailure {
    match error {
        RepositoryError::Domain(DomainError::VehicleNotFound(id)) => {
            CommandFailure::new("not_found", format!("vehicle {id} was not found"), 7)
        }
        RepositoryError::Domain(domain) => CommandFailure::new("invalid_input", domain.to_string(), 8),
        other => CommandFailure::new("inventory", other.to_string(), 6),
    }
}

fn render_row(vehicle: &Vehicle, currency_code: &str) -> String {
    let marker = if vehicle.available { "" } else { " [unavailable]" };
    format!("#{} {}{marker}", vehicle.id, vehicle.display_line(currency_code))
}

fn render_listing(vehicles: &[Vehicle], currency_code: &str) -> String {
    if vehicles.is_empty() {
        return "catalog is empty; run `rentbot seed` to load the demo fleet".to_string();
    }
    let mut lines = vec![format!("{} vehicles:", vehicles.len())];
    lines.extend(vehicles.iter().map(|vehicle| render_row(vehicle, currency_code)));
    lines.join("\n")
}
