use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::vehicle::{FuelType, Vehicle, VehicleCategory};
use crate::errors::DomainError;

pub const MAX_PASSENGER_FILTER: u32 = 15;

/// Partial filter over the available fleet. Every field is optional and an absent field
/// imposes no constraint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_passengers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<VehicleCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<FuelType>,
}

impl SearchCriteria {
    pub fn is_unconstrained(&self) -> bool {
        self.max_price.is_none()
            && self.min_passengers.is_none()
            && self.category.is_none()
            && self.fuel_type.is_none()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(max_price) = self.max_price {
            if max_price <= Decimal::ZERO {
                return Err(DomainError::InvariantViolation(format!(
                    "max_price must be positive, got {max_price}"
                )));
            }
        }
        if let Some(min_passengers) = self.min_passengers {
            if !(1..=MAX_PASSENGER_FILTER).contains(&min_passengers) {
                return Err(DomainError::InvariantViolation(format!(
                    "min_passengers must be in range 1..={MAX_PASSENGER_FILTER}, got {min_passengers}"
                )));
            }
        }
        Ok(())
    }

    /// Availability plus every present predicate.
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        vehicle.available
            && self.max_price.map_or(true, |max_price| vehicle.daily_price <= max_price)
            && self
                .min_passengers
                .map_or(true, |min_passengers| vehicle.passenger_capacity >= min_passengers)
            && self.category.map_or(true, |category| vehicle.category == category)
            && self.fuel_type.map_or(true, |fuel_type| vehicle.fuel_type == fuel_type)
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(max_price) = self.max_price {
            parts.push(format!("max daily price {max_price}"));
        }
        if let Some(min_passengers) = self.min_passengers {
            parts.push(format!("at least {min_passengers} passengers"));
        }
        if let Some(category) = self.category {
            parts.push(format!("category {}", category.as_str()));
        }
        if let Some(fuel_type) = self.fuel_type {
            parts.push(format!("fuel type {}", fuel_type.as_str()));
        }

        if parts.is_empty() {
            "no constraints".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::SearchCriteria;
    use crate::domain::vehicle::{
        FuelType, NewVehicle, Transmission, Vehicle, VehicleCategory, VehicleId,
    };

    fn vehicle(price: i64, passengers: u32, category: VehicleCategory, fuel: FuelType) -> Vehicle {
        NewVehicle {
            make: "Test".to_string(),
            model: "Car".to_string(),
            year: 2024,
            category,
            daily_price: Decimal::new(price, 0),
            passenger_capacity: passengers,
            luggage_capacity: 2,
            transmission: Transmission::Automatic,
            fuel_type: fuel,
            features: Vec::new(),
            image_url: None,
            available: true,
        }
        .into_vehicle(VehicleId(1))
    }

    #[test]
    fn empty_criteria_only_requires_availability() {
        let criteria = SearchCriteria::default();
        let mut car = vehicle(500, 2, VehicleCategory::Sports, FuelType::Gasoline);
        assert!(criteria.is_unconstrained());
        assert!(criteria.matches(&car));

        car.available = false;
        assert!(!criteria.matches(&car));
    }

    #[test]
    fn price_bound_is_inclusive() {
        let criteria =
            SearchCriteria { max_price: Some(Decimal::new(50, 0)), ..SearchCriteria::default() };
        assert!(criteria.matches(&vehicle(50, 5, VehicleCategory::Economy, FuelType::Gasoline)));
        assert!(!criteria.matches(&vehicle(51, 5, VehicleCategory::Economy, FuelType::Gasoline)));
    }

    #[test]
    fn all_present_predicates_must_hold() {
        let criteria = SearchCriteria {
            max_price: Some(Decimal::new(100, 0)),
            min_passengers: Some(7),
            category: Some(VehicleCategory::Minivan),
            fuel_type: Some(FuelType::Hybrid),
        };

        assert!(criteria.matches(&vehicle(70, 8, VehicleCategory::Minivan, FuelType::Hybrid)));
        assert!(!criteria.matches(&vehicle(70, 8, VehicleCategory::Minivan, FuelType::Gasoline)));
        assert!(!criteria.matches(&vehicle(70, 5, VehicleCategory::Minivan, FuelType::Hybrid)));
        assert!(!criteria.matches(&vehicle(70, 8, VehicleCategory::Economy, FuelType::Hybrid)));
    }

    #[test]
    fn validation_enforces_ranges() {
        let zero_price =
            SearchCriteria { max_price: Some(Decimal::ZERO), ..SearchCriteria::default() };
        assert!(zero_price.validate().is_err());

        let too_many = SearchCriteria { min_passengers: Some(16), ..SearchCriteria::default() };
        assert!(too_many.validate().is_err());

        let fine = SearchCriteria { min_passengers: Some(15), ..SearchCriteria::default() };
        assert!(fine.validate().is_ok());
    }

    #[test]
    fn criteria_deserialize_from_llm_numbers_and_display_names() {
        let criteria: SearchCriteria = serde_json::from_value(serde_json::json!({
            "max_price": 50,
            "min_passengers": 5,
            "category": "Compact SUV",
            "fuel_type": null
        }))
        .expect("criteria should decode");

        assert_eq!(criteria.max_price, Some(Decimal::new(50, 0)));
        assert_eq!(criteria.min_passengers, Some(5));
        assert_eq!(criteria.category, Some(VehicleCategory::CompactSuv));
        assert_eq!(criteria.fuel_type, None);
        assert_eq!(criteria.describe(), "max daily price 50, at least 5 passengers, category Compact SUV");
    }
}
