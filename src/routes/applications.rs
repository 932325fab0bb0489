use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;

use super::extract::{JsonBody, PathId, QueryParams};
use crate::analytics::{group_by_job, ApplicationGroup};
use crate::entities::{Application, ApplicationStatusUpdate, NewApplication};
use crate::error::{AppError, ErrorBody};
use crate::filter::ApplicationFilter;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/applications", get(list_applications).post(create_application))
        .route("/applications/grouped", get(grouped_applications))
        .route(
            "/applications/{id}",
            get(get_application).delete(delete_application),
        )
        .route("/applications/{id}/status", patch(set_application_status))
}

#[utoipa::path(
    get,
    path = "/applications",
    tag = "applications",
    params(ApplicationFilter),
    responses(
        (status = 200, description = "Matching applications, newest first", body = Vec<Application>),
        (status = 400, description = "Malformed query", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_applications(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ApplicationFilter>,
) -> Json<Vec<Application>> {
    Json(state.store.list_applications(&filter).await)
}

/// Applications partitioned by job, groups in order of first appearance
#[utoipa::path(
    get,
    path = "/applications/grouped",
    tag = "applications",
    params(ApplicationFilter),
    responses((status = 200, body = Vec<ApplicationGroup>))
)]
#[tracing::instrument(skip(state))]
pub async fn grouped_applications(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ApplicationFilter>,
) -> Json<Vec<ApplicationGroup>> {
    let applications = state.store.list_applications(&filter).await;
    let groups = group_by_job(&applications);
    tracing::debug!(applications = applications.len(), groups = groups.len(), "applications grouped");
    Json(groups)
}

#[utoipa::path(
    get,
    path = "/applications/{id}",
    tag = "applications",
    params(("id" = Uuid, Path, description = "Application id")),
    responses(
        (status = 200, body = Application),
        (status = 404, description = "No such application", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_application(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(state.store.get_application(id).await?))
}

/// Record a student's application to a job
#[utoipa::path(
    post,
    path = "/applications",
    tag = "applications",
    request_body = NewApplication,
    responses(
        (status = 201, description = "Application created", body = Application),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 422, description = "Unknown job or student", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn create_application(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewApplication>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let application = state.store.create_application(input).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// Move an application to any status
#[utoipa::path(
    patch,
    path = "/applications/{id}/status",
    tag = "applications",
    params(("id" = Uuid, Path, description = "Application id")),
    request_body = ApplicationStatusUpdate,
    responses(
        (status = 200, body = Application),
        (status = 400, description = "Unknown status", body = ErrorBody),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 404, description = "No such application", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn set_application_status(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
    JsonBody(update): JsonBody<ApplicationStatusUpdate>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(state.store.set_application_status(id, update.status).await?))
}

#[utoipa::path(
    delete,
    path = "/applications/{id}",
    tag = "applications",
    params(("id" = Uuid, Path, description = "Application id")),
    responses(
        (status = 204, description = "Application deleted"),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 404, description = "No such application", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn delete_application(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.delete_application(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
