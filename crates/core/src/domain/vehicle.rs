use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(pub i64);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleCategory {
    Economy,
    #[serde(rename = "Compact SUV")]
    CompactSuv,
    #[serde(rename = "Mid-Size SUV")]
    MidSizeSuv,
    #[serde(rename = "Full-Size SUV")]
    FullSizeSuv,
    Luxury,
    Minivan,
    Electric,
    #[serde(rename = "Pickup Truck")]
    PickupTruck,
    Sports,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 9] = [
        Self::Economy,
        Self::CompactSuv,
        Self::MidSizeSuv,
        Self::FullSizeSuv,
        Self::Luxury,
        Self::Minivan,
        Self::Electric,
        Self::PickupTruck,
        Self::Sports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Economy => "Economy",
            Self::CompactSuv => "Compact SUV",
            Self::MidSizeSuv => "Mid-Size SUV",
            Self::FullSizeSuv => "Full-Size SUV",
            Self::Luxury => "Luxury",
            Self::Minivan => "Minivan",
            Self::Electric => "Electric",
            Self::PickupTruck => "Pickup Truck",
            Self::Sports => "Sports",
        }
    }
}

impl FromStr for VehicleCategory {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| DomainError::UnknownVariant { kind: "category", value: value.to_string() })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transmission {
    Automatic,
    Manual,
}

impl Transmission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Automatic => "Automatic",
            Self::Manual => "Manual",
        }
    }
}

impl FromStr for Transmission {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "automatic" => Ok(Self::Automatic),
            "manual" => Ok(Self::Manual),
            _ => Err(DomainError::UnknownVariant { kind: "transmission", value: value.to_string() }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Gasoline,
    Hybrid,
    Electric,
}

impl FuelType {
    pub const ALL: [FuelType; 3] = [Self::Gasoline, Self::Hybrid, Self::Electric];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gasoline => "Gasoline",
            Self::Hybrid => "Hybrid",
            Self::Electric => "Electric",
        }
    }
}

impl FromStr for FuelType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|fuel| fuel.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| DomainError::UnknownVariant { kind: "fuel_type", value: value.to_string() })
    }
}

/// A vehicle as it is submitted to the catalog, before an id is assigned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub make: String,
    pub model: String,
    pub year: u16,
    pub category: VehicleCategory,
    pub daily_price: Decimal,
    pub passenger_capacity: u32,
    pub luggage_capacity: u32,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub available: bool,
}

impl NewVehicle {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.make.trim().is_empty() || self.model.trim().is_empty() {
            return Err(DomainError::InvariantViolation(
                "vehicle make and model must not be empty".to_string(),
            ));
        }
        validate_daily_price(self.daily_price)?;
        if self.passenger_capacity < 1 {
            return Err(DomainError::InvariantViolation(
                "passenger_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_vehicle(self, id: VehicleId) -> Vehicle {
        Vehicle {
            id,
            make: self.make,
            model: self.model,
            year: self.year,
            category: self.category,
            daily_price: self.daily_price,
            passenger_capacity: self.passenger_capacity,
            luggage_capacity: self.luggage_capacity,
            transmission: self.transmission,
            fuel_type: self.fuel_type,
            features: self.features,
            image_url: self.image_url,
            available: self.available,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub category: VehicleCategory,
    pub daily_price: Decimal,
    pub passenger_capacity: u32,
    pub luggage_capacity: u32,
    pub transmission: Transmission,
    pub fuel_type: FuelType,
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub available: bool,
}

impl Vehicle {
    /// The `"{make} {model}"` label used to recognise the vehicle in rendered replies.
    pub fn name(&self) -> String {
        format!("{} {}", self.make, self.model)
    }

    /// One-line summary, e.g. `2024 Toyota Corolla - AED 128.45/day (5 passengers, ...)`.
    /// Lists at most three features.
    pub fn display_line(&self, currency_code: &str) -> String {
        let features = self.features.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
        let mut line = format!(
            "{} {} - {} {:.2}/day ({} passengers",
            self.year,
            self.name(),
            currency_code,
            self.daily_price,
            self.passenger_capacity
        );
        if !features.is_empty() {
            line.push_str(", ");
            line.push_str(&features);
        }
        line.push(')');
        line
    }
}

pub fn validate_daily_price(price: Decimal) -> Result<(), DomainError> {
    if price <= Decimal::ZERO {
        return Err(DomainError::InvariantViolation(format!(
            "daily_price must be positive, got {price}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{FuelType, NewVehicle, Transmission, VehicleCategory, VehicleId};
    use crate::errors::DomainError;

    fn corolla() -> NewVehicle {
        NewVehicle {
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2024,
            category: VehicleCategory::Economy,
            daily_price: Decimal::new(12845, 2),
            passenger_capacity: 5,
            luggage_capacity: 2,
            transmission: Transmission::Automatic,
            fuel_type: FuelType::Gasoline,
            features: vec![
                "Air Conditioning".to_string(),
                "Bluetooth".to_string(),
                "Backup Camera".to_string(),
                "Cruise Control".to_string(),
            ],
            image_url: None,
            available: true,
        }
    }

    #[test]
    fn categories_round_trip_through_display_names() {
        for category in VehicleCategory::ALL {
            let json = serde_json::to_string(&category).expect("serialize");
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            assert_eq!(category.as_str().parse::<VehicleCategory>().expect("parse"), category);
        }
        assert_eq!("pickup truck".parse::<VehicleCategory>().ok(), Some(VehicleCategory::PickupTruck));
    }

    #[test]
    fn unknown_fuel_type_is_rejected() {
        let error = "Diesel".parse::<FuelType>().expect_err("diesel is not offered");
        assert!(matches!(error, DomainError::UnknownVariant { kind: "fuel_type", .. }));
    }

    #[test]
    fn validation_rejects_non_positive_price_and_empty_cabin() {
        let mut free = corolla();
        free.daily_price = Decimal::ZERO;
        assert!(free.validate().is_err());

        let mut no_seats = corolla();
        no_seats.passenger_capacity = 0;
        assert!(no_seats.validate().is_err());

        assert!(corolla().validate().is_ok());
    }

    #[test]
    fn display_line_lists_price_and_top_three_features() {
        let vehicle = corolla().into_vehicle(VehicleId(1));
        assert_eq!(
            vehicle.display_line("AED"),
            "2024 Toyota Corolla - AED 128.45/day (5 passengers, Air Conditioning, Bluetooth, Backup Camera)"
        );
    }
}
