use sqlx::PgPool;
use storage::{
    dto::training_center::CreateTrainingCenterRequest, error::Result, models::TrainingCenter,
    repository::training_center::TrainingCenterRepository,
};
use uuid::Uuid;

pub async fn list_training_centers(pool: &PgPool) -> Result<Vec<TrainingCenter>> {
    let repo = TrainingCenterRepository::new(pool);
    repo.list().await
}

pub async fn get_training_center(pool: &PgPool, id: Uuid) -> Result<TrainingCenter> {
    let repo = TrainingCenterRepository::new(pool);
    repo.find_by_id(id).await
}

/// Create a training center; duplicate names are accepted
pub async fn create_training_center(
    pool: &PgPool,
    request: &CreateTrainingCenterRequest,
) -> Result<TrainingCenter> {
    let repo = TrainingCenterRepository::new(pool);
    let center = repo.create(request).await?;
    tracing::info!(training_center_id = %center.id, name = %center.name, "Training center created");

    Ok(center)
}
