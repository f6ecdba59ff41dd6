use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::common::{PaginationParams, default_page, default_page_size};
use crate::models::Athlete;

/// Category referenced by name inside an athlete payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CategoryRef {
    #[serde(rename = "nome")]
    #[schema(example = "Scale")]
    #[validate(length(min = 1, max = 25))]
    pub name: String,
}

/// Training center referenced by name inside an athlete payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct TrainingCenterRef {
    #[serde(rename = "nome")]
    #[schema(example = "MiamiFit")]
    #[validate(length(min = 1, max = 30))]
    pub name: String,
}

/// Request payload for creating a new athlete
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateAthleteRequest {
    #[serde(rename = "nome")]
    #[schema(example = "Joao")]
    #[validate(length(
        min = 1,
        max = 50,
        message = "Name must be between 1 and 50 characters"
    ))]
    pub name: String,

    #[schema(example = "12345678900")]
    #[validate(length(min = 1, max = 11, message = "CPF must have at most 11 characters"))]
    pub cpf: String,

    #[serde(rename = "peso", with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 75.5)]
    #[validate(custom(function = "validate_positive"))]
    pub weight: Decimal,

    #[serde(rename = "altura", with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 1.70)]
    #[validate(custom(function = "validate_positive"))]
    pub height: Decimal,

    #[serde(rename = "sexo")]
    #[schema(example = "M")]
    #[validate(custom(function = "validate_sex"))]
    pub sex: String,

    #[serde(rename = "categoria")]
    #[validate(nested)]
    pub category: CategoryRef,

    #[serde(rename = "centro_treinamento")]
    #[validate(nested)]
    pub training_center: TrainingCenterRef,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateAthleteRequest {
    #[serde(rename = "nome")]
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 11))]
    pub cpf: Option<String>,

    #[serde(rename = "peso", default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    #[validate(custom(function = "validate_positive"))]
    pub weight: Option<Decimal>,

    #[serde(rename = "altura", default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    #[validate(custom(function = "validate_positive"))]
    pub height: Option<Decimal>,

    #[serde(rename = "sexo")]
    #[validate(custom(function = "validate_sex"))]
    pub sex: Option<String>,
}

impl UpdateAthleteRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.cpf.is_none()
            && self.weight.is_none()
            && self.height.is_none()
            && self.sex.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AthleteResponse {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    pub cpf: String,
    #[serde(rename = "peso", with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub weight: Decimal,
    #[serde(rename = "altura", with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub height: Decimal,
    #[serde(rename = "sexo")]
    pub sex: String,
    #[serde(rename = "categoria")]
    pub category: CategoryRef,
    #[serde(rename = "centro_treinamento")]
    pub training_center: TrainingCenterRef,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Athlete> for AthleteResponse {
    fn from(athlete: Athlete) -> Self {
        Self {
            id: athlete.id,
            name: athlete.name,
            cpf: athlete.cpf,
            weight: athlete.weight,
            height: athlete.height,
            sex: athlete.sex,
            category: CategoryRef {
                name: athlete.category_name,
            },
            training_center: TrainingCenterRef {
                name: athlete.training_center_name,
            },
            created_at: athlete.created_at,
            updated_at: athlete.updated_at,
        }
    }
}

/// Query string of the athlete listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AthleteFilter {
    /// Substring the athlete name must contain (case-sensitive)
    pub nome: Option<String>,
    /// Substring the CPF must contain
    pub cpf: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for AthleteFilter {
    fn default() -> Self {
        Self {
            nome: None,
            cpf: None,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl AthleteFilter {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.pagination().validate()
    }

    pub fn name(&self) -> Option<&str> {
        self.nome.as_deref().filter(|s| !s.is_empty())
    }

    pub fn cpf(&self) -> Option<&str> {
        self.cpf.as_deref().filter(|s| !s.is_empty())
    }
}

fn validate_positive(value: &Decimal) -> Result<(), validator::ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        Err(validator::ValidationError::new("must_be_positive"))
    }
}

fn validate_sex(sex: &str) -> Result<(), validator::ValidationError> {
    const VALID_SEXES: &[&str] = &["M", "F"];

    if VALID_SEXES.contains(&sex) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_sex"))
    }
}
