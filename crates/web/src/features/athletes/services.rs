use sqlx::PgPool;
use storage::{
    dto::athlete::{AthleteFilter, CreateAthleteRequest, UpdateAthleteRequest},
    error::{Result, StorageError},
    models::Athlete,
    repository::{
        athlete::{AthleteRepository, ExistingIdentity, NewAthlete, timestamp_now},
        category::CategoryRepository,
        training_center::TrainingCenterRepository,
    },
};
use uuid::Uuid;

/// One page of athletes filtered by name and CPF substrings, plus the total
pub async fn list_athletes(pool: &PgPool, filter: &AthleteFilter) -> Result<(Vec<Athlete>, i64)> {
    let repo = AthleteRepository::new(pool);
    repo.list(filter).await
}

pub async fn get_athlete(pool: &PgPool, id: Uuid) -> Result<Athlete> {
    let repo = AthleteRepository::new(pool);
    repo.find_by_id(id).await
}

/// Create an athlete, resolving its category and training center by name
pub async fn create_athlete(pool: &PgPool, request: &CreateAthleteRequest) -> Result<Athlete> {
    let repo = AthleteRepository::new(pool);

    if let Some(existing) = repo.find_conflicting(&request.name, &request.cpf).await? {
        return Err(StorageError::Conflict(conflict_message(&existing, request)));
    }

    let category = CategoryRepository::new(pool)
        .find_by_name(&request.category.name)
        .await?
        .ok_or_else(|| {
            StorageError::MissingReference(format!(
                "Category {} was not found",
                request.category.name
            ))
        })?;

    let training_center = TrainingCenterRepository::new(pool)
        .find_by_name(&request.training_center.name)
        .await?
        .ok_or_else(|| {
            StorageError::MissingReference(format!(
                "Training center {} was not found",
                request.training_center.name
            ))
        })?;

    let now = timestamp_now();
    let new_athlete = NewAthlete {
        id: Uuid::new_v4(),
        name: request.name.clone(),
        cpf: request.cpf.clone(),
        weight: request.weight,
        height: request.height,
        sex: request.sex.clone(),
        created_at: now,
        updated_at: now,
        category_id: category.id,
        training_center_id: training_center.id,
    };

    // Write failures surface as internal errors; the constraint detail stays in the log
    let athlete = repo.insert(&new_athlete).await.inspect_err(|e| {
        tracing::error!(error = %e, athlete_id = %new_athlete.id, "Failed to insert athlete");
    })?;
    tracing::info!(athlete_id = %athlete.id, "Athlete created");

    Ok(athlete)
}

/// Update the provided fields of an athlete. Name and CPF are not pre-checked
/// for uniqueness here; the storage constraint reports collisions.
pub async fn update_athlete(
    pool: &PgPool,
    id: Uuid,
    request: &UpdateAthleteRequest,
) -> Result<Athlete> {
    let repo = AthleteRepository::new(pool);

    let existing = repo.find_by_id(id).await?;
    repo.update(&existing, request).await
}

/// Hard delete; categories and training centers are left untouched
pub async fn delete_athlete(pool: &PgPool, id: Uuid) -> Result<()> {
    let repo = AthleteRepository::new(pool);
    repo.delete(id).await?;
    tracing::info!(athlete_id = %id, "Athlete deleted");

    Ok(())
}

fn conflict_message(existing: &ExistingIdentity, request: &CreateAthleteRequest) -> String {
    if existing.name == request.name {
        format!("An athlete named {} already exists", request.name)
    } else {
        format!("CPF {} is already linked to an athlete", request.cpf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use storage::dto::{
        athlete::{CategoryRef, TrainingCenterRef},
        category::CreateCategoryRequest,
        training_center::CreateTrainingCenterRequest,
    };

    fn request(name: &str, cpf: &str) -> CreateAthleteRequest {
        CreateAthleteRequest {
            name: name.to_string(),
            cpf: cpf.to_string(),
            weight: Decimal::new(755, 1),
            height: Decimal::new(170, 2),
            sex: "M".to_string(),
            category: CategoryRef {
                name: "Scale".to_string(),
            },
            training_center: TrainingCenterRef {
                name: "MiamiFit".to_string(),
            },
        }
    }

    async fn seed_references(pool: &PgPool) {
        CategoryRepository::new(pool)
            .create(&CreateCategoryRequest {
                name: "Scale".to_string(),
            })
            .await
            .unwrap();
        TrainingCenterRepository::new(pool)
            .create(&CreateTrainingCenterRequest {
                name: "MiamiFit".to_string(),
                address: "Rua Nozes, 10".to_string(),
                owner: "Carlos Alberto".to_string(),
            })
            .await
            .unwrap();
    }

    #[test]
    fn test_conflict_message_prefers_name() {
        let existing = ExistingIdentity {
            name: "Joao".to_string(),
            cpf: "111".to_string(),
        };
        let message = conflict_message(&existing, &request("Joao", "111"));
        assert!(message.contains("named Joao"));

        let existing = ExistingIdentity {
            name: "Maria".to_string(),
            cpf: "111".to_string(),
        };
        let message = conflict_message(&existing, &request("Joao", "111"));
        assert!(message.contains("CPF 111"));
    }

    #[sqlx::test(migrations = "../storage/migrations")]
    #[ignore = "requires a Postgres server at DATABASE_URL"]
    async fn test_create_then_get_round_trips(pool: PgPool) {
        seed_references(&pool).await;

        let created = create_athlete(&pool, &request("Joao", "12345678900"))
            .await
            .unwrap();
        let fetched = get_athlete(&pool, created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.category_name, "Scale");
        assert_eq!(fetched.training_center_name, "MiamiFit");
    }

    #[sqlx::test(migrations = "../storage/migrations")]
    #[ignore = "requires a Postgres server at DATABASE_URL"]
    async fn test_missing_category_writes_nothing(pool: PgPool) {
        seed_references(&pool).await;

        let mut req = request("Joao", "12345678900");
        req.category.name = "Unknown".to_string();

        let result = create_athlete(&pool, &req).await;
        assert!(matches!(result, Err(StorageError::MissingReference(_))));

        let (athletes, total) = list_athletes(&pool, &AthleteFilter::default())
            .await
            .unwrap();
        assert!(athletes.is_empty());
        assert_eq!(total, 0);
    }

    #[sqlx::test(migrations = "../storage/migrations")]
    #[ignore = "requires a Postgres server at DATABASE_URL"]
    async fn test_missing_training_center_is_rejected(pool: PgPool) {
        seed_references(&pool).await;

        let mut req = request("Joao", "12345678900");
        req.training_center.name = "Nowhere".to_string();

        let result = create_athlete(&pool, &req).await;
        assert!(matches!(result, Err(StorageError::MissingReference(_))));
    }

    #[sqlx::test(migrations = "../storage/migrations")]
    #[ignore = "requires a Postgres server at DATABASE_URL"]
    async fn test_name_conflict_wins_over_cpf(pool: PgPool) {
        seed_references(&pool).await;
        create_athlete(&pool, &request("Joao", "11111111111"))
            .await
            .unwrap();
        create_athlete(&pool, &request("Maria", "22222222222"))
            .await
            .unwrap();

        let same_both = create_athlete(&pool, &request("Joao", "11111111111")).await;
        match same_both {
            Err(StorageError::Conflict(msg)) => assert!(msg.contains("Joao")),
            other => panic!("expected conflict, got {other:?}"),
        }

        // name collides with one row, CPF with another
        let split = create_athlete(&pool, &request("Joao", "22222222222")).await;
        match split {
            Err(StorageError::Conflict(msg)) => assert!(msg.contains("named Joao")),
            other => panic!("expected conflict, got {other:?}"),
        }

        let cpf_only = create_athlete(&pool, &request("Pedro", "22222222222")).await;
        match cpf_only {
            Err(StorageError::Conflict(msg)) => assert!(msg.contains("CPF 22222222222")),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[sqlx::test(migrations = "../storage/migrations")]
    #[ignore = "requires a Postgres server at DATABASE_URL"]
    async fn test_empty_update_changes_nothing(pool: PgPool) {
        seed_references(&pool).await;
        let created = create_athlete(&pool, &request("Joao", "12345678900"))
            .await
            .unwrap();

        let updated = update_athlete(&pool, created.id, &UpdateAthleteRequest::default())
            .await
            .unwrap();

        assert_eq!(updated, created);
    }

    #[sqlx::test(migrations = "../storage/migrations")]
    #[ignore = "requires a Postgres server at DATABASE_URL"]
    async fn test_partial_update_touches_only_given_fields(pool: PgPool) {
        seed_references(&pool).await;
        let created = create_athlete(&pool, &request("Joao", "12345678900"))
            .await
            .unwrap();

        let patch = UpdateAthleteRequest {
            weight: Some(Decimal::new(80, 0)),
            ..UpdateAthleteRequest::default()
        };
        let updated = update_athlete(&pool, created.id, &patch).await.unwrap();

        assert_eq!(updated.weight, Decimal::new(80, 0));
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.cpf, created.cpf);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[sqlx::test(migrations = "../storage/migrations")]
    #[ignore = "requires a Postgres server at DATABASE_URL"]
    async fn test_update_into_taken_name_is_a_conflict(pool: PgPool) {
        seed_references(&pool).await;
        create_athlete(&pool, &request("Joao", "11111111111"))
            .await
            .unwrap();
        let maria = create_athlete(&pool, &request("Maria", "22222222222"))
            .await
            .unwrap();

        let patch = UpdateAthleteRequest {
            name: Some("Joao".to_string()),
            ..UpdateAthleteRequest::default()
        };
        let result = update_athlete(&pool, maria.id, &patch).await;
        assert!(matches!(result, Err(StorageError::Conflict(_))));
    }

    #[sqlx::test(migrations = "../storage/migrations")]
    #[ignore = "requires a Postgres server at DATABASE_URL"]
    async fn test_update_unknown_id_is_not_found(pool: PgPool) {
        let result =
            update_athlete(&pool, Uuid::new_v4(), &UpdateAthleteRequest::default()).await;
        assert!(matches!(result, Err(StorageError::NotFound)));
    }

    #[sqlx::test(migrations = "../storage/migrations")]
    #[ignore = "requires a Postgres server at DATABASE_URL"]
    async fn test_delete_then_get_is_not_found(pool: PgPool) {
        seed_references(&pool).await;
        let created = create_athlete(&pool, &request("Joao", "12345678900"))
            .await
            .unwrap();

        delete_athlete(&pool, created.id).await.unwrap();

        assert!(matches!(
            get_athlete(&pool, created.id).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            delete_athlete(&pool, created.id).await,
            Err(StorageError::NotFound)
        ));
    }
}
