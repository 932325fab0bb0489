//! Typed client for the REST surface.
//!
//! GETs are retried with exponential backoff on connection failures, 429 and 5xx answers.
//! Writes are sent once. Non-2xx answers are turned back into the [`AppError`] the
//! server rendered, so callers see the same error taxonomy on both sides.

use async_trait::async_trait;
use backoff::future::retry_notify;
use backoff::Error as BackoffError;
use backoff::ExponentialBackoff;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::analytics::{ApplicationGroup, DashboardStats, JobAnalytics, StudentAnalytics};
use crate::config::Settings;
use crate::entities::{
    Announcement, AnnouncementPatch, Application, ApplicationStatus, ApplicationStatusUpdate,
    Company, CompanyPatch, Job, JobPatch, JobStatus, JobStatusUpdate, NewAnnouncement,
    NewApplication, NewCompany, NewJob, NewStudent, Student, StudentPatch,
};
use crate::error::{AppError, ErrorBody};
use crate::filter::{AnnouncementFilter, ApplicationFilter, CompanyFilter, JobFilter, StudentFilter};
use crate::store::{DataSource, Snapshot};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_RETRY_BUDGET: Duration = Duration::from_secs(30);
const NO_QUERY: &[(&str, &str)] = &[];

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    token: Option<String>,
    retry_budget: Duration,
}

fn retry_notify_handler<E>(err: E, duration: Duration)
where
    E: std::fmt::Display,
{
    tracing::warn!(
        "Request failed: {}. Retrying in {:.1}s...",
        err,
        duration.as_secs_f32()
    );
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let response = error_for_status(response).await?;
    Ok(response.json::<T>().await?)
}

async fn error_for_status(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or(ErrorBody {
        error: text,
        fields: None,
    });
    tracing::debug!(%status, error = %body.error, "API answered with an error");
    Err(body.into_app_error(status))
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| AppError::InvalidRequest(format!("invalid API url {}: {}", base_url, e)))?;
        // Url::join replaces the last path segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base,
            token: None,
            retry_budget: DEFAULT_RETRY_BUDGET,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let client = Self::with_timeout(&settings.api_url, settings.client_timeout)?;
        Ok(match &settings.admin_token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }

    /// Token sent as `Authorization: Bearer` on writes.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Upper bound on the time spent retrying one GET.
    pub fn with_retry_budget(mut self, budget: Duration) -> Self {
        self.retry_budget = budget;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| AppError::InvalidRequest(format!("invalid path {}: {}", path, e)))
    }

    #[tracing::instrument(skip(self, query), fields(base = %self.base))]
    async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.retry_budget),
            ..ExponentialBackoff::default()
        };

        let response = retry_notify(
            backoff,
            || async {
                match self.http.get(url.clone()).query(query).send().await {
                    Ok(resp) => {
                        let status = resp.status();
                        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                            tracing::debug!("Retrying on status: {}", status);
                            Err(BackoffError::transient(AppError::Upstream(format!(
                                "server returned retryable status {}",
                                status
                            ))))
                        } else {
                            Ok(resp)
                        }
                    }
                    Err(err) if err.is_timeout() || err.is_connect() || err.is_request() => {
                        tracing::debug!("Retrying on reqwest error: {}", err);
                        Err(BackoffError::transient(AppError::from(err)))
                    }
                    Err(err) => Err(BackoffError::permanent(AppError::from(err))),
                }
            },
            retry_notify_handler,
        )
        .await?;

        decode(response).await
    }

    fn write_request(&self, method: Method, path: &str) -> Result<RequestBuilder, AppError> {
        let request = self.http.request(method, self.endpoint(path)?);
        Ok(match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    #[tracing::instrument(skip(self, body), fields(base = %self.base))]
    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.write_request(method, path)?.json(body).send().await?;
        decode(response).await
    }

    #[tracing::instrument(skip(self), fields(base = %self.base))]
    async fn delete(&self, path: &str) -> Result<(), AppError> {
        let response = self.write_request(Method::DELETE, path)?.send().await?;
        error_for_status(response).await?;
        Ok(())
    }

    pub async fn health(&self) -> Result<String, AppError> {
        let url = self.endpoint("health")?;
        let response = error_for_status(self.http.get(url).send().await?).await?;
        Ok(response.text().await?)
    }

    // --- Analytics ---

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        self.get_json("dashboard/stats", NO_QUERY).await
    }

    pub async fn student_analytics(&self) -> Result<StudentAnalytics, AppError> {
        self.get_json("analytics/students", NO_QUERY).await
    }

    pub async fn job_analytics(&self, job_id: Uuid) -> Result<JobAnalytics, AppError> {
        self.get_json(&format!("analytics/jobs/{}", job_id), NO_QUERY).await
    }

    // --- Students ---

    pub async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, AppError> {
        self.get_json("students", filter).await
    }

    pub async fn get_student(&self, id: Uuid) -> Result<Student, AppError> {
        self.get_json(&format!("students/{}", id), NO_QUERY).await
    }

    pub async fn create_student(&self, input: &NewStudent) -> Result<Student, AppError> {
        self.send_json(Method::POST, "students", input).await
    }

    pub async fn update_student(&self, id: Uuid, patch: &StudentPatch) -> Result<Student, AppError> {
        self.send_json(Method::PATCH, &format!("students/{}", id), patch).await
    }

    pub async fn delete_student(&self, id: Uuid) -> Result<(), AppError> {
        self.delete(&format!("students/{}", id)).await
    }

    pub async fn student_announcements(&self, id: Uuid) -> Result<Vec<Announcement>, AppError> {
        self.get_json(&format!("students/{}/announcements", id), NO_QUERY).await
    }

    // --- Companies ---

    pub async fn list_companies(&self, filter: &CompanyFilter) -> Result<Vec<Company>, AppError> {
        self.get_json("companies", filter).await
    }

    pub async fn get_company(&self, id: Uuid) -> Result<Company, AppError> {
        self.get_json(&format!("companies/{}", id), NO_QUERY).await
    }

    pub async fn create_company(&self, input: &NewCompany) -> Result<Company, AppError> {
        self.send_json(Method::POST, "companies", input).await
    }

    pub async fn update_company(&self, id: Uuid, patch: &CompanyPatch) -> Result<Company, AppError> {
        self.send_json(Method::PATCH, &format!("companies/{}", id), patch).await
    }

    pub async fn delete_company(&self, id: Uuid) -> Result<(), AppError> {
        self.delete(&format!("companies/{}", id)).await
    }

    // --- Jobs ---

    pub async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, AppError> {
        self.get_json("jobs", filter).await
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Job, AppError> {
        self.get_json(&format!("jobs/{}", id), NO_QUERY).await
    }

    pub async fn create_job(&self, input: &NewJob) -> Result<Job, AppError> {
        self.send_json(Method::POST, "jobs", input).await
    }

    pub async fn update_job(&self, id: Uuid, patch: &JobPatch) -> Result<Job, AppError> {
        self.send_json(Method::PATCH, &format!("jobs/{}", id), patch).await
    }

    pub async fn set_job_status(&self, id: Uuid, status: JobStatus) -> Result<Job, AppError> {
        self.send_json(Method::PATCH, &format!("jobs/{}/status", id), &JobStatusUpdate { status })
            .await
    }

    pub async fn delete_job(&self, id: Uuid) -> Result<(), AppError> {
        self.delete(&format!("jobs/{}", id)).await
    }

    pub async fn job_applications(&self, id: Uuid) -> Result<Vec<Application>, AppError> {
        self.get_json(&format!("jobs/{}/applications", id), NO_QUERY).await
    }

    // --- Applications ---

    pub async fn list_applications(&self, filter: &ApplicationFilter) -> Result<Vec<Application>, AppError> {
        self.get_json("applications", filter).await
    }

    pub async fn grouped_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationGroup>, AppError> {
        self.get_json("applications/grouped", filter).await
    }

    pub async fn get_application(&self, id: Uuid) -> Result<Application, AppError> {
        self.get_json(&format!("applications/{}", id), NO_QUERY).await
    }

    pub async fn create_application(&self, input: &NewApplication) -> Result<Application, AppError> {
        self.send_json(Method::POST, "applications", input).await
    }

    pub async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, AppError> {
        self.send_json(
            Method::PATCH,
            &format!("applications/{}/status", id),
            &ApplicationStatusUpdate { status },
        )
        .await
    }

    pub async fn delete_application(&self, id: Uuid) -> Result<(), AppError> {
        self.delete(&format!("applications/{}", id)).await
    }

    // --- Announcements ---

    pub async fn list_announcements(
        &self,
        filter: &AnnouncementFilter,
    ) -> Result<Vec<Announcement>, AppError> {
        self.get_json("announcements", filter).await
    }

    pub async fn get_announcement(&self, id: Uuid) -> Result<Announcement, AppError> {
        self.get_json(&format!("announcements/{}", id), NO_QUERY).await
    }

    pub async fn create_announcement(&self, input: &NewAnnouncement) -> Result<Announcement, AppError> {
        self.send_json(Method::POST, "announcements", input).await
    }

    pub async fn update_announcement(
        &self,
        id: Uuid,
        patch: &AnnouncementPatch,
    ) -> Result<Announcement, AppError> {
        self.send_json(Method::PATCH, &format!("announcements/{}", id), patch).await
    }

    pub async fn delete_announcement(&self, id: Uuid) -> Result<(), AppError> {
        self.delete(&format!("announcements/{}", id)).await
    }
}

#[async_trait]
impl DataSource for ApiClient {
    /// Fetches all five collections concurrently; any failure fails the whole load.
    async fn load_snapshot(&self) -> Result<Snapshot, AppError> {
        let (all_students, all_companies, all_jobs, all_applications, all_announcements) = (
            StudentFilter::default(),
            CompanyFilter::default(),
            JobFilter::default(),
            ApplicationFilter::default(),
            AnnouncementFilter::default(),
        );
        let (students, companies, jobs, applications, announcements) = futures::try_join!(
            self.list_students(&all_students),
            self.list_companies(&all_companies),
            self.list_jobs(&all_jobs),
            self.list_applications(&all_applications),
            self.list_announcements(&all_announcements),
        )?;
        Ok(Snapshot {
            students,
            companies,
            jobs,
            applications,
            announcements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = ApiClient::new("http://127.0.0.1:3000/api").unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:3000/api/");
        assert_eq!(
            client.endpoint("students").unwrap().as_str(),
            "http://127.0.0.1:3000/api/students"
        );
    }

    #[test]
    fn rejects_malformed_base_url() {
        assert!(matches!(ApiClient::new("not a url"), Err(AppError::InvalidRequest(_))));
    }
}
