//! Create house command.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::models::House;

/// Year constraints mirror the domain rule that house age is bounded.
const MAX_HOUSE_YEAR: i64 = 552;

/// Command to create a new house.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHouseCommand {
    pub name: String,
    pub year: i64,
    pub number_of_flats_on_floor: i64,

    /// Principal creating the house; filled from the request headers, not the
    /// body.
    #[serde(skip)]
    pub created_by: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateHouseError {
    #[error("Name must not be empty")]
    NameRequired,

    #[error("Year must be between 1 and {MAX_HOUSE_YEAR}")]
    YearOutOfRange,

    #[error("Number of flats on floor must be greater than 0")]
    FlatsOnFloorOutOfRange,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<House, CreateHouseError>> for CreateHouseCommand {}

impl crate::cqrs::middleware::Command for CreateHouseCommand {}

impl CreateHouseCommand {
    pub fn validate(&self) -> Result<(), CreateHouseError> {
        if self.name.trim().is_empty() {
            return Err(CreateHouseError::NameRequired);
        }
        if !(1..=MAX_HOUSE_YEAR).contains(&self.year) {
            return Err(CreateHouseError::YearOutOfRange);
        }
        if self.number_of_flats_on_floor < 1 {
            return Err(CreateHouseError::FlatsOnFloorOutOfRange);
        }
        Ok(())
    }
}

/// Handler for creating houses.
#[tracing::instrument(skip(pool, command), fields(name = %command.name))]
pub async fn handle(pool: PgPool, command: CreateHouseCommand) -> Result<House, CreateHouseError> {
    command.validate()?;

    let house = sqlx::query_as::<_, House>(
        r#"
        INSERT INTO houses (name, year, number_of_flats_on_floor, created_by)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, year, number_of_flats_on_floor, created_by, created_at
        "#,
    )
    .bind(&command.name)
    .bind(command.year)
    .bind(command.number_of_flats_on_floor)
    .bind(&command.created_by)
    .fetch_one(&pool)
    .await?;

    tracing::info!(house_id = house.id, "House created");

    Ok(house)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> CreateHouseCommand {
        CreateHouseCommand {
            name: "Riverside Tower".to_string(),
            year: 12,
            number_of_flats_on_floor: 4,
            created_by: "alice".to_string(),
        }
    }

    #[test]
    fn test_valid_command() {
        assert!(command().validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut cmd = command();
        cmd.name = "   ".to_string();
        assert!(matches!(
            cmd.validate(),
            Err(CreateHouseError::NameRequired)
        ));
    }

    #[test]
    fn test_year_bounds() {
        let mut cmd = command();
        cmd.year = 0;
        assert!(cmd.validate().is_err());
        cmd.year = 553;
        assert!(cmd.validate().is_err());
        cmd.year = 552;
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_flats_on_floor_must_be_positive() {
        let mut cmd = command();
        cmd.number_of_flats_on_floor = 0;
        assert!(matches!(
            cmd.validate(),
            Err(CreateHouseError::FlatsOnFloorOutOfRange)
        ));
    }
}
