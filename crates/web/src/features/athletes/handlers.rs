use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        athlete::{AthleteFilter, AthleteResponse, CreateAthleteRequest, UpdateAthleteRequest},
        common::PaginatedResponse,
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::extract::JsonBody;

use super::services;

#[utoipa::path(
    get,
    path = "/atletas/listar_atleta",
    params(AthleteFilter),
    responses(
        (status = 200, description = "Paginated list of athletes", body = PaginatedResponse<AthleteResponse>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "atletas"
)]
pub async fn list_athletes(
    State(db): State<Database>,
    Query(filter): Query<AthleteFilter>,
) -> Result<Response, WebError> {
    filter.validate().map_err(WebError::BadRequest)?;

    let (athletes, total_items) = services::list_athletes(db.pool(), &filter).await?;

    let response = PaginatedResponse::new(
        athletes.into_iter().map(AthleteResponse::from).collect(),
        filter.page,
        filter.page_size,
        total_items,
    );

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/atletas/criar_atleta",
    request_body = CreateAthleteRequest,
    responses(
        (status = 201, description = "Athlete created successfully", body = AthleteResponse),
        (status = 400, description = "Invalid payload, duplicate name or CPF, or unknown category or training center"),
        (status = 500, description = "The athlete could not be written")
    ),
    tag = "atletas"
)]
pub async fn create_athlete(
    State(db): State<Database>,
    JsonBody(req): JsonBody<CreateAthleteRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let athlete = services::create_athlete(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(AthleteResponse::from(athlete))).into_response())
}

#[utoipa::path(
    get,
    path = "/atletas/{id}",
    params(
        ("id" = Uuid, Path, description = "Athlete id")
    ),
    responses(
        (status = 200, description = "Athlete found", body = AthleteResponse),
        (status = 404, description = "Athlete not found")
    ),
    tag = "atletas"
)]
pub async fn get_athlete(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let athlete = services::get_athlete(db.pool(), id).await?;

    Ok(Json(AthleteResponse::from(athlete)).into_response())
}

#[utoipa::path(
    patch,
    path = "/atletas/{id}",
    params(
        ("id" = Uuid, Path, description = "Athlete id")
    ),
    request_body = UpdateAthleteRequest,
    responses(
        (status = 200, description = "Athlete updated successfully", body = AthleteResponse),
        (status = 400, description = "Invalid payload or name/CPF already taken"),
        (status = 404, description = "Athlete not found")
    ),
    tag = "atletas"
)]
pub async fn update_athlete(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    JsonBody(update_req): JsonBody<UpdateAthleteRequest>,
) -> Result<Response, WebError> {
    update_req.validate()?;

    let updated = services::update_athlete(db.pool(), id, &update_req).await?;

    Ok(Json(AthleteResponse::from(updated)).into_response())
}

#[utoipa::path(
    delete,
    path = "/atletas/{id}",
    params(
        ("id" = Uuid, Path, description = "Athlete id")
    ),
    responses(
        (status = 204, description = "Athlete deleted successfully"),
        (status = 404, description = "Athlete not found")
    ),
    tag = "atletas"
)]
pub async fn delete_athlete(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_athlete(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
