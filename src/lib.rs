use axum::{
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub mod analytics;
pub mod auth;
pub mod client;
pub mod config;
pub mod entities;
pub mod error;
pub mod filter;
pub mod routes;
pub mod seed;
pub mod store;
pub mod validation;

pub use client::ApiClient;
pub use crate::config::{RateLimit, Settings};
pub use error::AppError;
pub use store::{DataSource, Snapshot, Store};

/// Shared by every handler through axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    /// `None` keeps every mutating route answering 401
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            admin_token: None,
        }
    }

    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(Arc::from(token.into()));
        self
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Service is healthy")
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TPO Admin API",
        version = "0.1.0",
        description = "Students, companies, jobs, applications and announcements for a Training & Placement Office"
    ),
    paths(
        health_check,
        routes::analytics::get_dashboard_stats,
        routes::analytics::get_student_analytics,
        routes::analytics::get_job_analytics,
        routes::students::list_students,
        routes::students::get_student,
        routes::students::create_student,
        routes::students::update_student,
        routes::students::delete_student,
        routes::students::student_announcements,
        routes::companies::list_companies,
        routes::companies::get_company,
        routes::companies::create_company,
        routes::companies::update_company,
        routes::companies::delete_company,
        routes::jobs::list_jobs,
        routes::jobs::get_job,
        routes::jobs::create_job,
        routes::jobs::update_job,
        routes::jobs::set_job_status,
        routes::jobs::delete_job,
        routes::jobs::job_applications,
        routes::applications::list_applications,
        routes::applications::grouped_applications,
        routes::applications::get_application,
        routes::applications::create_application,
        routes::applications::set_application_status,
        routes::applications::delete_application,
        routes::announcements::list_announcements,
        routes::announcements::get_announcement,
        routes::announcements::create_announcement,
        routes::announcements::update_announcement,
        routes::announcements::delete_announcement
    ),
    components(schemas(
        error::ErrorBody,
        error::FieldError,
        entities::Student,
        entities::NewStudent,
        entities::StudentPatch,
        entities::Branch,
        entities::Company,
        entities::NewCompany,
        entities::CompanyPatch,
        entities::Job,
        entities::NewJob,
        entities::JobPatch,
        entities::JobStatus,
        entities::JobType,
        entities::JobStatusUpdate,
        entities::Application,
        entities::NewApplication,
        entities::ApplicationStatus,
        entities::ApplicationStatusUpdate,
        entities::Announcement,
        entities::NewAnnouncement,
        entities::AnnouncementPatch,
        entities::AnnouncementTarget,
        analytics::DashboardStats,
        analytics::StudentAnalytics,
        analytics::BranchCount,
        analytics::YearCount,
        analytics::ProfileCompletion,
        analytics::JobAnalytics,
        analytics::ApplicationGroup
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

/// Create the application without rate limiting
pub fn create_app(state: AppState) -> Router {
    create_app_with_rate_limit(state, None)
}

/// Create the application with all routes and middleware
pub fn create_app_with_rate_limit(state: AppState, rate_limit: Option<RateLimit>) -> Router {
    let api_doc = ApiDoc::openapi();

    // Writes are checked against the admin token; reads pass straight through.
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .merge(routes::analytics::router())
        .merge(routes::students::router())
        .merge(routes::companies::router())
        .merge(routes::jobs::router())
        .merge(routes::applications::router())
        .merge(routes::announcements::router())
        .route_layer(from_fn_with_state(state.clone(), auth::require_admin))
        .with_state(state);

    // Governor only guards the API routes, not the docs.
    let api_routes = match rate_limit {
        Some(limit) => {
            let governor_conf = GovernorConfigBuilder::default()
                .key_extractor(SmartIpKeyExtractor)
                .period(limit.period)
                .burst_size(limit.burst.get())
                .finish();
            match governor_conf {
                Some(config) => {
                    tracing::info!(burst = limit.burst.get(), period = ?limit.period, "rate limiting enabled");
                    api_routes.layer(GovernorLayer {
                        config: Arc::new(config),
                    })
                }
                None => {
                    tracing::warn!(?limit, "rate limit settings rejected, serving without rate limiting");
                    api_routes
                }
            }
        }
        None => api_routes,
    };

    let docs_router = SwaggerUi::new("/docs").url("/api-doc/openapi.json", api_doc);

    Router::new()
        .merge(api_routes)
        .merge(docs_router)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
