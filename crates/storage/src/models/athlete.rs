use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Athlete row joined with the names of its category and training center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Athlete {
    pub id: Uuid,
    pub name: String,
    pub cpf: String,
    pub weight: Decimal,
    pub height: Decimal,
    pub sex: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub category_id: Uuid,
    pub category_name: String,
    pub training_center_id: Uuid,
    pub training_center_name: String,
}
