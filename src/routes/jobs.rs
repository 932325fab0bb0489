use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;

use super::extract::{JsonBody, PathId, QueryParams};
use crate::entities::{Application, Job, JobPatch, JobStatusUpdate, NewJob};
use crate::error::{AppError, ErrorBody};
use crate::filter::{ApplicationFilter, JobFilter};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route(
            "/jobs/{id}",
            get(get_job).put(update_job).patch(update_job).delete(delete_job),
        )
        .route("/jobs/{id}/status", patch(set_job_status))
        .route("/jobs/{id}/applications", get(job_applications))
}

#[utoipa::path(
    get,
    path = "/jobs",
    tag = "jobs",
    params(JobFilter),
    responses(
        (status = 200, description = "Matching jobs, newest first", body = Vec<Job>),
        (status = 400, description = "Malformed query", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_jobs(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<JobFilter>,
) -> Json<Vec<Job>> {
    Json(state.store.list_jobs(&filter).await)
}

#[utoipa::path(
    get,
    path = "/jobs/{id}",
    tag = "jobs",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, body = Job),
        (status = 404, description = "No such job", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_job(State(state): State<AppState>, PathId(id): PathId<Uuid>) -> Result<Json<Job>, AppError> {
    Ok(Json(state.store.get_job(id).await?))
}

/// Post a job for an existing company
#[utoipa::path(
    post,
    path = "/jobs",
    tag = "jobs",
    request_body = NewJob,
    responses(
        (status = 201, description = "Job created", body = Job),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 422, description = "Field validation failed or unknown company", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, input))]
pub async fn create_job(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewJob>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job = state.store.create_job(input).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[utoipa::path(
    method(put, patch),
    path = "/jobs/{id}",
    tag = "jobs",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = JobPatch,
    responses(
        (status = 200, body = Job),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 404, description = "No such job", body = ErrorBody),
        (status = 422, description = "Field validation failed or unknown company", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, patch))]
pub async fn update_job(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
    JsonBody(patch): JsonBody<JobPatch>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(state.store.update_job(id, patch).await?))
}

/// Open or close a job
#[utoipa::path(
    patch,
    path = "/jobs/{id}/status",
    tag = "jobs",
    params(("id" = Uuid, Path, description = "Job id")),
    request_body = JobStatusUpdate,
    responses(
        (status = 200, body = Job),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 404, description = "No such job", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn set_job_status(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
    JsonBody(update): JsonBody<JobStatusUpdate>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(state.store.set_job_status(id, update.status).await?))
}

#[utoipa::path(
    delete,
    path = "/jobs/{id}",
    tag = "jobs",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 204, description = "Job deleted; its applications are kept"),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 404, description = "No such job", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn delete_job(State(state): State<AppState>, PathId(id): PathId<Uuid>) -> Result<StatusCode, AppError> {
    state.store.delete_job(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Every application to one job
#[utoipa::path(
    get,
    path = "/jobs/{id}/applications",
    tag = "jobs",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, body = Vec<Application>),
        (status = 404, description = "No such job", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn job_applications(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<Json<Vec<Application>>, AppError> {
    state.store.get_job(id).await?;
    Ok(Json(state.store.list_applications(&ApplicationFilter::for_job(id)).await))
}
