use sqlx::PgPool;
use storage::{
    dto::category::CreateCategoryRequest,
    error::{Result, StorageError},
    models::Category,
    repository::category::CategoryRepository,
};
use uuid::Uuid;

/// List all categories
pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>> {
    let repo = CategoryRepository::new(pool);
    repo.list().await
}

/// Get category by id
pub async fn get_category(pool: &PgPool, id: Uuid) -> Result<Category> {
    let repo = CategoryRepository::new(pool);
    repo.find_by_id(id).await
}

/// Create a category whose name is not taken yet
pub async fn create_category(pool: &PgPool, request: &CreateCategoryRequest) -> Result<Category> {
    let repo = CategoryRepository::new(pool);

    if repo.find_by_name(&request.name).await?.is_some() {
        return Err(StorageError::Conflict(format!(
            "Category name {} is already in use",
            request.name
        )));
    }

    let category = repo.create(request).await?;
    tracing::info!(category_id = %category.id, name = %category.name, "Category created");

    Ok(category)
}
