use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use uuid::Uuid;

use super::extract::{JsonBody, PathId, QueryParams};
use crate::entities::{Announcement, AnnouncementPatch, NewAnnouncement};
use crate::error::{AppError, ErrorBody};
use crate::filter::AnnouncementFilter;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/announcements", get(list_announcements).post(create_announcement))
        .route(
            "/announcements/{id}",
            get(get_announcement)
                .put(update_announcement)
                .patch(update_announcement)
                .delete(delete_announcement),
        )
}

#[utoipa::path(
    get,
    path = "/announcements",
    tag = "announcements",
    params(AnnouncementFilter),
    responses((status = 200, description = "Matching announcements, newest first", body = Vec<Announcement>))
)]
#[tracing::instrument(skip(state))]
pub async fn list_announcements(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<AnnouncementFilter>,
) -> Json<Vec<Announcement>> {
    Json(state.store.list_announcements(&filter).await)
}

#[utoipa::path(
    get,
    path = "/announcements/{id}",
    tag = "announcements",
    params(("id" = Uuid, Path, description = "Announcement id")),
    responses(
        (status = 200, body = Announcement),
        (status = 404, description = "No such announcement", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_announcement(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<Json<Announcement>, AppError> {
    Ok(Json(state.store.get_announcement(id).await?))
}

/// Publish an announcement to everyone, one branch, or one year of study
#[utoipa::path(
    post,
    path = "/announcements",
    tag = "announcements",
    request_body = NewAnnouncement,
    responses(
        (status = 201, description = "Announcement created", body = Announcement),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 422, description = "Field validation failed", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, input))]
pub async fn create_announcement(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewAnnouncement>,
) -> Result<(StatusCode, Json<Announcement>), AppError> {
    let announcement = state.store.create_announcement(input).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

#[utoipa::path(
    method(put, patch),
    path = "/announcements/{id}",
    tag = "announcements",
    params(("id" = Uuid, Path, description = "Announcement id")),
    request_body = AnnouncementPatch,
    responses(
        (status = 200, body = Announcement),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 404, description = "No such announcement", body = ErrorBody),
        (status = 422, description = "Field validation failed", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, patch))]
pub async fn update_announcement(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
    JsonBody(patch): JsonBody<AnnouncementPatch>,
) -> Result<Json<Announcement>, AppError> {
    Ok(Json(state.store.update_announcement(id, patch).await?))
}

#[utoipa::path(
    delete,
    path = "/announcements/{id}",
    tag = "announcements",
    params(("id" = Uuid, Path, description = "Announcement id")),
    responses(
        (status = 204, description = "Announcement deleted"),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 404, description = "No such announcement", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn delete_announcement(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.delete_announcement(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
