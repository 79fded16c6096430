use rust_decimal::Decimal;
use tracing::info;

use rentbot_core::domain::vehicle::{
    FuelType, NewVehicle, Transmission, VehicleCategory,
};

use crate::repositories::{RepositoryError, VehicleRepository};

struct SeedVehicle {
    make: &'static str,
    model: &'static str,
    year: u16,
    category: VehicleCategory,
    /// Daily price in fils (hundredths of a dirham).
    daily_price_fils: i64,
    passengers: u32,
    luggage: u32,
    transmission: Transmission,
    fuel_type: FuelType,
    features: &'static [&'static str],
    image_url: &'static str,
}

const FLEET: &[SeedVehicle] = &[
    SeedVehicle {
        make: "Toyota",
        model: "Corolla",
        year: 2024,
        category: VehicleCategory::Economy,
        daily_price_fils: 12845,
        passengers: 5,
        luggage: 2,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Gasoline,
        features: &["Air Conditioning", "Bluetooth", "Backup Camera"],
        image_url: "https://via.placeholder.com/400x250/4A90E2/FFFFFF?text=Toyota+Corolla+2024",
    },
    SeedVehicle {
        make: "Honda",
        model: "Civic",
        year: 2024,
        category: VehicleCategory::Economy,
        daily_price_fils: 13946,
        passengers: 5,
        luggage: 2,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Gasoline,
        features: &["Air Conditioning", "Bluetooth", "Lane Assist"],
        image_url: "https://via.placeholder.com/400x250/5C6BC0/FFFFFF?text=Honda+Civic+2024",
    },
    SeedVehicle {
        make: "Hyundai",
        model: "Elantra",
        year: 2023,
        category: VehicleCategory::Economy,
        daily_price_fils: 12111,
        passengers: 5,
        luggage: 2,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Gasoline,
        features: &["Air Conditioning", "Bluetooth"],
        image_url: "https://via.placeholder.com/400x250/42A5F5/FFFFFF?text=Hyundai+Elantra+2023",
    },
    SeedVehicle {
        make: "Mazda",
        model: "CX-5",
        year: 2024,
        category: VehicleCategory::CompactSuv,
        daily_price_fils: 20185,
        passengers: 5,
        luggage: 3,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Gasoline,
        features: &["Air Conditioning", "Bluetooth", "Apple CarPlay", "All-Wheel Drive"],
        image_url: "https://via.placeholder.com/400x250/7E57C2/FFFFFF?text=Mazda+CX-5+2024",
    },
    SeedVehicle {
        make: "Honda",
        model: "CR-V",
        year: 2024,
        category: VehicleCategory::CompactSuv,
        daily_price_fils: 21286,
        passengers: 5,
        luggage: 4,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Gasoline,
        features: &["Air Conditioning", "Bluetooth", "Sunroof", "Backup Camera"],
        image_url: "https://via.placeholder.com/400x250/AB47BC/FFFFFF?text=Honda+CR-V+2024",
    },
    SeedVehicle {
        make: "Toyota",
        model: "RAV4",
        year: 2023,
        category: VehicleCategory::CompactSuv,
        daily_price_fils: 20919,
        passengers: 5,
        luggage: 3,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Hybrid,
        features: &["Air Conditioning", "Bluetooth", "All-Wheel Drive", "Lane Assist"],
        image_url: "https://via.placeholder.com/400x250/8E24AA/FFFFFF?text=Toyota+RAV4+2023",
    },
    SeedVehicle {
        make: "Chevrolet",
        model: "Tahoe",
        year: 2024,
        category: VehicleCategory::FullSizeSuv,
        daily_price_fils: 31195,
        passengers: 8,
        luggage: 5,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Gasoline,
        features: &[
            "Air Conditioning",
            "Bluetooth",
            "Third Row Seating",
            "Leather Interior",
            "4WD",
        ],
        image_url: "https://via.placeholder.com/400x250/EF5350/FFFFFF?text=Chevrolet+Tahoe+2024",
    },
    SeedVehicle {
        make: "Ford",
        model: "Explorer",
        year: 2024,
        category: VehicleCategory::MidSizeSuv,
        daily_price_fils: 27525,
        passengers: 7,
        luggage: 4,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Gasoline,
        features: &["Air Conditioning", "Bluetooth", "Third Row Seating", "Apple CarPlay"],
        image_url: "https://via.placeholder.com/400x250/E53935/FFFFFF?text=Ford+Explorer+2024",
    },
    SeedVehicle {
        make: "BMW",
        model: "3 Series",
        year: 2024,
        category: VehicleCategory::Luxury,
        daily_price_fils: 34865,
        passengers: 5,
        luggage: 2,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Gasoline,
        features: &[
            "Premium Sound System",
            "Leather Interior",
            "Sunroof",
            "Navigation",
            "Heated Seats",
        ],
        image_url: "https://via.placeholder.com/400x250/212121/FFFFFF?text=BMW+3+Series+2024",
    },
    SeedVehicle {
        make: "Mercedes-Benz",
        model: "C-Class",
        year: 2024,
        category: VehicleCategory::Luxury,
        daily_price_fils: 35966,
        passengers: 5,
        luggage: 2,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Gasoline,
        features: &[
            "Premium Sound System",
            "Leather Interior",
            "Sunroof",
            "Navigation",
            "Massage Seats",
        ],
        image_url: "https://via.placeholder.com/400x250/424242/FFFFFF?text=Mercedes+C-Class+2024",
    },
    SeedVehicle {
        make: "Audi",
        model: "A4",
        year: 2023,
        category: VehicleCategory::Luxury,
        daily_price_fils: 33764,
        passengers: 5,
        luggage: 2,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Gasoline,
        features: &[
            "Premium Sound System",
            "Leather Interior",
            "Virtual Cockpit",
            "All-Wheel Drive",
        ],
        image_url: "https://via.placeholder.com/400x250/616161/FFFFFF?text=Audi+A4+2023",
    },
    SeedVehicle {
        make: "Chrysler",
        model: "Pacifica",
        year: 2024,
        category: VehicleCategory::Minivan,
        daily_price_fils: 25690,
        passengers: 8,
        luggage: 4,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Hybrid,
        features: &["Air Conditioning", "Bluetooth", "Stow-n-Go Seating", "Rear Entertainment"],
        image_url: "https://via.placeholder.com/400x250/26A69A/FFFFFF?text=Chrysler+Pacifica+2024",
    },
    SeedVehicle {
        make: "Honda",
        model: "Odyssey",
        year: 2024,
        category: VehicleCategory::Minivan,
        daily_price_fils: 24956,
        passengers: 8,
        luggage: 4,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Gasoline,
        features: &["Air Conditioning", "Bluetooth", "Power Sliding Doors", "Backup Camera"],
        image_url: "https://via.placeholder.com/400x250/00897B/FFFFFF?text=Honda+Odyssey+2024",
    },
    SeedVehicle {
        make: "Tesla",
        model: "Model 3",
        year: 2024,
        category: VehicleCategory::Electric,
        daily_price_fils: 32296,
        passengers: 5,
        luggage: 2,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Electric,
        features: &["Autopilot", "Premium Sound System", "Glass Roof", "Supercharging Included"],
        image_url: "https://via.placeholder.com/400x250/FF5722/FFFFFF?text=Tesla+Model+3+2024",
    },
    SeedVehicle {
        make: "Nissan",
        model: "Leaf",
        year: 2024,
        category: VehicleCategory::Electric,
        daily_price_fils: 19084,
        passengers: 5,
        luggage: 2,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Electric,
        features: &["Air Conditioning", "Bluetooth", "Quick Charging", "ProPILOT Assist"],
        image_url: "https://via.placeholder.com/400x250/FF6F00/FFFFFF?text=Nissan+Leaf+2024",
    },
    SeedVehicle {
        make: "Ford",
        model: "F-150",
        year: 2024,
        category: VehicleCategory::PickupTruck,
        daily_price_fils: 28626,
        passengers: 6,
        luggage: 2,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Gasoline,
        features: &["4WD", "Towing Package", "Bed Liner", "Bluetooth", "Backup Camera"],
        image_url: "https://via.placeholder.com/400x250/795548/FFFFFF?text=Ford+F-150+2024",
    },
    SeedVehicle {
        make: "Chevrolet",
        model: "Silverado",
        year: 2024,
        category: VehicleCategory::PickupTruck,
        daily_price_fils: 27892,
        passengers: 6,
        luggage: 2,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Gasoline,
        features: &["4WD", "Towing Package", "Apple CarPlay", "Bluetooth"],
        image_url: "https://via.placeholder.com/400x250/6D4C41/FFFFFF?text=Chevy+Silverado+2024",
    },
    SeedVehicle {
        make: "Ford",
        model: "Mustang",
        year: 2024,
        category: VehicleCategory::Sports,
        daily_price_fils: 40370,
        passengers: 4,
        luggage: 2,
        transmission: Transmission::Manual,
        fuel_type: FuelType::Gasoline,
        features: &["Performance Package", "Premium Sound System", "Sport Seats", "Track Apps"],
        image_url: "https://via.placeholder.com/400x250/C62828/FFFFFF?text=Ford+Mustang+2024",
    },
    SeedVehicle {
        make: "Chevrolet",
        model: "Camaro",
        year: 2024,
        category: VehicleCategory::Sports,
        daily_price_fils: 39636,
        passengers: 4,
        luggage: 2,
        transmission: Transmission::Automatic,
        fuel_type: FuelType::Gasoline,
        features: &[
            "Performance Exhaust",
            "Sport Suspension",
            "Premium Interior",
            "Brembo Brakes",
        ],
        image_url: "https://via.placeholder.com/400x250/AD1457/FFFFFF?text=Chevy+Camaro+2024",
    },
];

/// The demo rental fleet, priced in AED.
pub struct CatalogSeed;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted(usize),
    /// The catalog already held this many vehicles; nothing was written.
    Skipped(u64),
}

impl CatalogSeed {
    pub fn vehicles() -> Vec<NewVehicle> {
        FLEET
            .iter()
            .map(|seed| NewVehicle {
                make: seed.make.to_string(),
                model: seed.model.to_string(),
                year: seed.year,
                category: seed.category,
                daily_price: Decimal::new(seed.daily_price_fils, 2),
                passenger_capacity: seed.passengers,
                luggage_capacity: seed.luggage,
                transmission: seed.transmission,
                fuel_type: seed.fuel_type,
                features: seed.features.iter().map(|feature| feature.to_string()).collect(),
                image_url: Some(seed.image_url.to_string()),
                available: true,
            })
            .collect()
    }

    /// Inserts the fleet only when the catalog is empty.
    pub async fn load_if_empty(
        repository: &dyn VehicleRepository,
    ) -> Result<SeedOutcome, RepositoryError> {
        let existing = repository.count().await?;
        if existing > 0 {
            info!(
                event_name = "db.seed.skipped",
                existing_vehicles = existing,
                "catalog already populated; seed skipped"
            );
            return Ok(SeedOutcome::Skipped(existing));
        }

        let vehicles = Self::vehicles();
        let total = vehicles.len();
        for vehicle in vehicles {
            repository.insert(vehicle).await?;
        }

        info!(event_name = "db.seed.inserted", inserted_vehicles = total, "catalog seeded");
        Ok(SeedOutcome::Inserted(total))
    }
}
