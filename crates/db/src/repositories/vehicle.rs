use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite};

use rentbot_core::domain::search::SearchCriteria;
use rentbot_core::domain::vehicle::{
    validate_daily_price, FuelType, NewVehicle, Transmission, Vehicle, VehicleCategory, VehicleId,
};
use rentbot_core::errors::DomainError;

use super::{RepositoryError, VehicleRepository};
use crate::DbPool;

const VEHICLE_COLUMNS: &str = "id, make, model, year, category, daily_price, passenger_capacity, \
     luggage_capacity, transmission, fuel_type, features_json, image_url, available";

pub struct SqlVehicleRepository {
    pool: DbPool,
}

impl SqlVehicleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn require(&self, id: VehicleId) -> Result<Vehicle, RepositoryError> {
        self.find_by_id(id).await?.ok_or(RepositoryError::Domain(DomainError::VehicleNotFound(id.0)))
    }
}

#[async_trait::async_trait]
impl VehicleRepository for SqlVehicleRepository {
    async fn list_available(&self) -> Result<Vec<Vehicle>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicle WHERE available = 1 ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(vehicle_from_row).collect()
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Vehicle>, RepositoryError> {
        let mut query_builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {VEHICLE_COLUMNS} FROM vehicle WHERE available = 1"));

        if let Some(min_passengers) = criteria.min_passengers {
            query_builder.push(" AND passenger_capacity >= ");
            query_builder.push_bind(i64::from(min_passengers));
        }
        if let Some(category) = criteria.category {
            query_builder.push(" AND category = ");
            query_builder.push_bind(category.as_str());
        }
        if let Some(fuel_type) = criteria.fuel_type {
            query_builder.push(" AND fuel_type = ");
            query_builder.push_bind(fuel_type.as_str());
        }
        query_builder.push(" ORDER BY id ASC");

        let rows = query_builder.build().fetch_all(&self.pool).await?;
        let mut vehicles = rows.into_iter().map(vehicle_from_row).collect::<Result<Vec<_>, _>>()?;
        // Prices are decimal text, which SQLite can only compare as floats; the price bound is
        // applied on the decoded `Decimal` instead.
        vehicles.retain(|vehicle| criteria.matches(vehicle));
        Ok(vehicles)
    }

    async fn insert(&self, vehicle: NewVehicle) -> Result<Vehicle, RepositoryError> {
        vehicle.validate()?;

        let features_json = serde_json::to_string(&vehicle.features)
            .map_err(|error| RepositoryError::Decode(format!("invalid features: {error}")))?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO vehicle (
                make,
                model,
                year,
                category,
                daily_price,
                passenger_capacity,
                luggage_capacity,
                transmission,
                fuel_type,
                features_json,
                image_url,
                available,
                created_at,
                updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&vehicle.make)
        .bind(&vehicle.model)
        .bind(i64::from(vehicle.year))
        .bind(vehicle.category.as_str())
        .bind(vehicle.daily_price.to_string())
        .bind(i64::from(vehicle.passenger_capacity))
        .bind(i64::from(vehicle.luggage_capacity))
        .bind(vehicle.transmission.as_str())
        .bind(vehicle.fuel_type.as_str())
        .bind(features_json)
        .bind(vehicle.image_url.as_deref())
        .bind(vehicle.available)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(vehicle.into_vehicle(VehicleId(result.last_insert_rowid())))
    }

    async fn find_by_id(&self, id: VehicleId) -> Result<Option<Vehicle>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {VEHICLE_COLUMNS} FROM vehicle WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(vehicle_from_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Vehicle>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {VEHICLE_COLUMNS} FROM vehicle ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(vehicle_from_row).collect()
    }

    async fn set_availability(
        &self,
        id: VehicleId,
        available: bool,
    ) -> Result<Vehicle, RepositoryError> {
        let result = sqlx::query("UPDATE vehicle SET available = ?, updated_at = ? WHERE id = ?")
            .bind(available)
            .bind(Utc::now().to_rfc3339())
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::VehicleNotFound(id.0).into());
        }
        self.require(id).await
    }

    async fn set_daily_price(
        &self,
        id: VehicleId,
        daily_price: Decimal,
    ) -> Result<Vehicle, RepositoryError> {
        validate_daily_price(daily_price)?;

        let result = sqlx::query("UPDATE vehicle SET daily_price = ?, updated_at = ? WHERE id = ?")
            .bind(daily_price.to_string())
            .bind(Utc::now().to_rfc3339())
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::VehicleNotFound(id.0).into());
        }
        self.require(id).await
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM vehicle").fetch_one(&self.pool).await?;
        u64::try_from(count)
            .map_err(|_| RepositoryError::Decode(format!("negative vehicle count `{count}`")))
    }
}

fn vehicle_from_row(row: SqliteRow) -> Result<Vehicle, RepositoryError> {
    let category: String = row.try_get("category").map_err(decode_error)?;
    let daily_price: String = row.try_get("daily_price").map_err(decode_error)?;
    let transmission: String = row.try_get("transmission").map_err(decode_error)?;
    let fuel_type: String = row.try_get("fuel_type").map_err(decode_error)?;
    let features_json: String = row.try_get("features_json").map_err(decode_error)?;
    let year: i64 = row.try_get("year").map_err(decode_error)?;
    let passenger_capacity: i64 = row.try_get("passenger_capacity").map_err(decode_error)?;
    let luggage_capacity: i64 = row.try_get("luggage_capacity").map_err(decode_error)?;

    Ok(Vehicle {
        id: VehicleId(row.try_get("id").map_err(decode_error)?),
        make: row.try_get("make").map_err(decode_error)?,
        model: row.try_get("model").map_err(decode_error)?,
        year: u16::try_from(year)
            .map_err(|_| RepositoryError::Decode(format!("invalid vehicle year `{year}`")))?,
        category: VehicleCategory::from_str(&category)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?,
        daily_price: Decimal::from_str(&daily_price).map_err(|error| {
            RepositoryError::Decode(format!("invalid daily_price `{daily_price}`: {error}"))
        })?,
        passenger_capacity: u32::try_from(passenger_capacity).map_err(|_| {
            RepositoryError::Decode(format!("invalid passenger_capacity `{passenger_capacity}`"))
        })?,
        luggage_capacity: u32::try_from(luggage_capacity).map_err(|_| {
            RepositoryError::Decode(format!("invalid luggage_capacity `{luggage_capacity}`"))
        })?,
        transmission: Transmission::from_str(&transmission)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?,
        fuel_type: FuelType::from_str(&fuel_type)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?,
        features: serde_json::from_str(&features_json).map_err(|error| {
            RepositoryError::Decode(format!("invalid features_json: {error}"))
        })?,
        image_url: row.try_get("image_url").map_err(decode_error)?,
        available: row.try_get("available").map_err(decode_error)?,
    })
}

fn decode_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}
