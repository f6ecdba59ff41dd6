use chrono::{NaiveDateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::athlete::{AthleteFilter, UpdateAthleteRequest};
use crate::error::{Result, StorageError};
use crate::models::Athlete;

const SELECT_ATHLETE: &str = r#"
    SELECT a.id, a.name, a.cpf, a.weight, a.height, a.sex,
           a.created_at, a.updated_at,
           a.category_id, c.name AS category_name,
           a.training_center_id, tc.name AS training_center_name
    FROM athletes a
    JOIN categories c ON c.id = a.category_id
    JOIN training_centers tc ON tc.id = a.training_center_id
"#;

/// Current UTC time at the precision Postgres stores, so a value written and
/// read back compares equal.
pub fn timestamp_now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

/// Fully resolved athlete row, ready to insert
#[derive(Debug, Clone)]
pub struct NewAthlete {
    pub id: Uuid,
    pub name: String,
    pub cpf: String,
    pub weight: Decimal,
    pub height: Decimal,
    pub sex: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub category_id: Uuid,
    pub training_center_id: Uuid,
}

/// Name and CPF of an athlete that collides with a new one
#[derive(Debug, Clone, FromRow)]
pub struct ExistingIdentity {
    pub name: String,
    pub cpf: String,
}

pub struct AthleteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AthleteRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List athletes matching the filter, returning one page and the total count
    pub async fn list(&self, filter: &AthleteFilter) -> Result<(Vec<Athlete>, i64)> {
        let pagination = filter.pagination();
        let offset = pagination.offset();
        let limit = pagination.limit();

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM athletes a WHERE 1=1");
        push_filters(&mut count, filter);
        let total_items = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        let mut query = QueryBuilder::new(SELECT_ATHLETE);
        query.push(" WHERE 1=1");
        push_filters(&mut query, filter);
        query.push(" ORDER BY a.name LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let athletes: Vec<Athlete> = query.build_query_as().fetch_all(self.pool).await?;

        Ok((athletes, total_items))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Athlete> {
        sqlx::query_as::<_, Athlete>(&format!("{SELECT_ATHLETE} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Find an athlete sharing the name or the CPF. A name match is preferred
    /// over a CPF match when both exist on different rows.
    pub async fn find_conflicting(&self, name: &str, cpf: &str) -> Result<Option<ExistingIdentity>> {
        let existing = sqlx::query_as::<_, ExistingIdentity>(
            r#"
            SELECT name, cpf
            FROM athletes
            WHERE name = $1 OR cpf = $2
            ORDER BY (name = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(name)
        .bind(cpf)
        .fetch_optional(self.pool)
        .await?;

        Ok(existing)
    }

    pub async fn insert(&self, athlete: &NewAthlete) -> Result<Athlete> {
        let inserted = sqlx::query_as::<_, Athlete>(&format!(
            r#"
            WITH a AS (
                INSERT INTO athletes (id, name, cpf, weight, height, sex,
                                      created_at, updated_at, category_id, training_center_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING *
            )
            {}
            "#,
            SELECT_ATHLETE.replace("FROM athletes a", "FROM a")
        ))
        .bind(athlete.id)
        .bind(&athlete.name)
        .bind(&athlete.cpf)
        .bind(athlete.weight)
        .bind(athlete.height)
        .bind(&athlete.sex)
        .bind(athlete.created_at)
        .bind(athlete.updated_at)
        .bind(athlete.category_id)
        .bind(athlete.training_center_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            let error = StorageError::from(e);
            if error.is_foreign_key_violation() {
                tracing::warn!(
                    athlete_id = %athlete.id,
                    category_id = %athlete.category_id,
                    training_center_id = %athlete.training_center_id,
                    "Athlete insert references a missing category or training center"
                );
            } else if error.is_unique_violation() {
                tracing::warn!(athlete_id = %athlete.id, "Athlete insert hit a unique constraint");
            }
            error
        })?;

        Ok(inserted)
    }

    /// Apply the fields present in `req` on top of `existing`
    pub async fn update(&self, existing: &Athlete, req: &UpdateAthleteRequest) -> Result<Athlete> {
        if req.is_empty() {
            return Ok(existing.clone());
        }

        let name = req.name.as_ref().unwrap_or(&existing.name);
        let cpf = req.cpf.as_ref().unwrap_or(&existing.cpf);
        let weight = req.weight.unwrap_or(existing.weight);
        let height = req.height.unwrap_or(existing.height);
        let sex = req.sex.as_ref().unwrap_or(&existing.sex);

        let updated = sqlx::query_as::<_, Athlete>(&format!(
            r#"
            WITH a AS (
                UPDATE athletes
                SET name = $2,
                    cpf = $3,
                    weight = $4,
                    height = $5,
                    sex = $6,
                    updated_at = $7
                WHERE id = $1
                RETURNING *
            )
            {}
            "#,
            SELECT_ATHLETE.replace("FROM athletes a", "FROM a")
        ))
        .bind(existing.id)
        .bind(name)
        .bind(cpf)
        .bind(weight)
        .bind(height)
        .bind(sex)
        .bind(timestamp_now())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            StorageError::from(e).unique_as_conflict(|| {
                format!("Another athlete already uses the name {name} or the CPF {cpf}")
            })
        })?
        .ok_or(StorageError::NotFound)?;

        Ok(updated)
    }

    /// Delete an athlete by ID
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM athletes WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

/// Case-sensitive substring filters; `strpos` avoids LIKE wildcard escaping
fn push_filters<'q>(query: &mut QueryBuilder<'q, Postgres>, filter: &'q AthleteFilter) {
    if let Some(name) = filter.name() {
        query.push(" AND strpos(a.name, ");
        query.push_bind(name);
        query.push(") > 0");
    }

    if let Some(cpf) = filter.cpf() {
        query.push(" AND strpos(a.cpf, ");
        query.push_bind(cpf);
        query.push(") > 0");
    }
}
