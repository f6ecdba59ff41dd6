use axum::Router;
use storage::Database;

use crate::features::{athletes, categories, training_centers};

/// Mount every entity under its public prefix
pub fn router(db: Database) -> Router {
    Router::new()
        .nest("/categorias", categories::routes())
        .nest("/centros_treinamento", training_centers::routes())
        .nest("/atletas", athletes::routes())
        .with_state(db)
}
