use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use uuid::Uuid;

use super::extract::{JsonBody, PathId, QueryParams};
use crate::entities::{Announcement, NewStudent, Student, StudentPatch};
use crate::error::{AppError, ErrorBody};
use crate::filter::StudentFilter;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/{id}",
            get(get_student)
                .put(update_student)
                .patch(update_student)
                .delete(delete_student),
        )
        .route("/students/{id}/announcements", get(student_announcements))
}

/// List students, optionally filtered by search text, branch and year
#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    params(StudentFilter),
    responses(
        (status = 200, description = "Matching students, newest first", body = Vec<Student>),
        (status = 400, description = "Malformed query", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<StudentFilter>,
) -> Json<Vec<Student>> {
    let students = state.store.list_students(&filter).await;
    tracing::debug!(count = students.len(), "students listed");
    Json(students)
}

#[utoipa::path(
    get,
    path = "/students/{id}",
    tag = "students",
    params(("id" = Uuid, Path, description = "Student id")),
    responses(
        (status = 200, body = Student),
        (status = 404, description = "No such student", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<Json<Student>, AppError> {
    Ok(Json(state.store.get_student(id).await?))
}

/// Register a student
#[utoipa::path(
    post,
    path = "/students",
    tag = "students",
    request_body = NewStudent,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 409, description = "Registration number already in use", body = ErrorBody),
        (status = 422, description = "Field validation failed", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, input))]
pub async fn create_student(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewStudent>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let student = state.store.create_student(input).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// Update some or all fields of a student. A changed name is copied onto their applications.
#[utoipa::path(
    method(put, patch),
    path = "/students/{id}",
    tag = "students",
    params(("id" = Uuid, Path, description = "Student id")),
    request_body = StudentPatch,
    responses(
        (status = 200, body = Student),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 404, description = "No such student", body = ErrorBody),
        (status = 409, description = "Registration number already in use", body = ErrorBody),
        (status = 422, description = "Field validation failed", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state, patch))]
pub async fn update_student(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
    JsonBody(patch): JsonBody<StudentPatch>,
) -> Result<Json<Student>, AppError> {
    Ok(Json(state.store.update_student(id, patch).await?))
}

/// Delete a student. Their applications are kept.
#[utoipa::path(
    delete,
    path = "/students/{id}",
    tag = "students",
    params(("id" = Uuid, Path, description = "Student id")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 404, description = "No such student", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.delete_student(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Announcements addressed to a student: everyone, their branch, or their year
#[utoipa::path(
    get,
    path = "/students/{id}/announcements",
    tag = "students",
    params(("id" = Uuid, Path, description = "Student id")),
    responses(
        (status = 200, body = Vec<Announcement>),
        (status = 404, description = "No such student", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn student_announcements(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<Json<Vec<Announcement>>, AppError> {
    Ok(Json(state.store.announcements_for_student(id).await?))
}
