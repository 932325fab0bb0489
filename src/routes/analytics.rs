use axum::{extract::State, routing::get, Json, Router};
use uuid::Uuid;

use super::extract::PathId;
use crate::analytics::{
    dashboard_stats, job_analytics, student_analytics, DashboardStats, JobAnalytics,
    StudentAnalytics,
};
use crate::error::{AppError, ErrorBody};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(get_dashboard_stats))
        .route("/analytics/students", get(get_student_analytics))
        .route("/analytics/jobs/{id}", get(get_job_analytics))
}

/// Headline counts for the dashboard, recomputed on every call
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "analytics",
    responses((status = 200, body = DashboardStats))
)]
#[tracing::instrument(skip(state))]
pub async fn get_dashboard_stats(State(state): State<AppState>) -> Json<DashboardStats> {
    let stats = state
        .store
        .read(|s| dashboard_stats(&s.students, &s.companies, &s.jobs, &s.applications))
        .await;
    Json(stats)
}

/// Branch and year distribution, profile completion and average CGPA
#[utoipa::path(
    get,
    path = "/analytics/students",
    tag = "analytics",
    responses((status = 200, body = StudentAnalytics))
)]
#[tracing::instrument(skip(state))]
pub async fn get_student_analytics(State(state): State<AppState>) -> Json<StudentAnalytics> {
    Json(state.store.read(|s| student_analytics(&s.students)).await)
}

/// Application counts per status and the selection rate for one job
#[utoipa::path(
    get,
    path = "/analytics/jobs/{id}",
    tag = "analytics",
    params(("id" = Uuid, Path, description = "Job id")),
    responses(
        (status = 200, body = JobAnalytics),
        (status = 404, description = "No such job", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_job_analytics(
    State(state): State<AppState>,
    PathId(id): PathId<Uuid>,
) -> Result<Json<JobAnalytics>, AppError> {
    let analytics = state
        .store
        .read(|s| {
            s.jobs
                .iter()
                .any(|j| j.id == id)
                .then(|| job_analytics(id, &s.applications))
        })
        .await
        .ok_or_else(|| AppError::not_found("job", id))?;
    Ok(Json(analytics))
}
