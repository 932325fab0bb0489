use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use uuid::Uuid;

use super::extract::{JsonBody, PathId, QueryParams};
use crate::entities::{Company, CompanyPatch, NewCompany};
use crate::error::{AppError, ErrorBody};
use crate::filter::CompanyFilter;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route(
            "/companies/{id}",
            get(get_company)
                .put(update_company)
                .patch(update_company)
                .delete(delete_company),
        )
}

#[utoipa::path(
    get,
    path = "/companies",
    tag = "companies",
    params(CompanyFilter),
    responses((status = 200, description = "Matching companies, newest first", body = Vec<Company>))
)]
#[tracing::instrument(skip(state))]
pub async fn list_companies(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<CompanyFilter>,
) -> Json<Vec<Company>> {
    Json(state.store.list_companies(&filter).await)
}

#[utoipa::path(
    get,
    path = "/companies/{id}",
    tag = "companies",
    params(("id" = Uuid, Path, description = "Company id")),
    responses(
        (status = 200, body = Company),
        (status = 404, description = "No such company", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_company(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<Json<Company>, AppError> {
    Ok(Json(state.store.get_company(id).await?))
}

#[utoipa::path(
    post,
    path = "/companies",
    tag = "companies",
    request_body = NewCompany,
    responses(
        (status = 201, description = "Company created", body = Company),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 422, description = "Field validation failed", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, input))]
pub async fn create_company(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewCompany>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    let company = state.store.create_company(input).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// Update a company. A new name is copied onto its jobs and their applications.
#[utoipa::path(
    method(put, patch),
    path = "/companies/{id}",
    tag = "companies",
    params(("id" = Uuid, Path, description = "Company id")),
    request_body = CompanyPatch,
    responses(
        (status = 200, body = Company),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 404, description = "No such company", body = ErrorBody),
        (status = 422, description = "Field validation failed", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, patch))]
pub async fn update_company(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
    JsonBody(patch): JsonBody<CompanyPatch>,
) -> Result<Json<Company>, AppError> {
    Ok(Json(state.store.update_company(id, patch).await?))
}

#[utoipa::path(
    delete,
    path = "/companies/{id}",
    tag = "companies",
    params(("id" = Uuid, Path, description = "Company id")),
    responses(
        (status = 204, description = "Company deleted; its jobs are kept"),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 404, description = "No such company", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn delete_company(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.delete_company(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
