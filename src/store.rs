//! The in-process state container.
//!
//! One [`Snapshot`] behind an async `RwLock`: every mutation takes the write lock once, so
//! writes are applied one at a time. Each successful mutation is announced on a broadcast
//! channel that callers reach through [`Store::subscribe`].

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::entities::{
    Announcement, AnnouncementPatch, Application, ApplicationStatus, Company, CompanyPatch, Job,
    JobPatch, JobStatus, NewAnnouncement, NewApplication, NewCompany, NewJob, NewStudent, Student,
    StudentPatch,
};
use crate::error::{AppError, FieldError};
use crate::filter::{AnnouncementFilter, ApplicationFilter, CompanyFilter, JobFilter, StudentFilter};

const EVENT_BUFFER: usize = 64;

/// Every collection the dashboard works with, as plain vectors (newest first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub students: Vec<Student>,
    pub companies: Vec<Company>,
    pub jobs: Vec<Job>,
    pub applications: Vec<Application>,
    pub announcements: Vec<Announcement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Students,
    Companies,
    Jobs,
    Applications,
    Announcements,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    Created,
    Updated,
    Deleted,
    /// The whole collection was swapped out
    Replaced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub collection: Collection,
    pub change: Change,
    pub id: Option<Uuid>,
}

/// Read access to a complete data set, whether it lives in this process or behind the API.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn load_snapshot(&self) -> Result<Snapshot, AppError>;
}

#[derive(Debug, Clone)]
pub struct Store {
    state: Arc<RwLock<Snapshot>>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for Store {
    async fn load_snapshot(&self) -> Result<Snapshot, AppError> {
        Ok(self.snapshot().await)
    }
}

fn ensure_unique_registration(
    students: &[Student],
    registration_number: &str,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    let taken = students.iter().any(|s| {
        Some(s.id) != except && s.registration_number.eq_ignore_ascii_case(registration_number.trim())
    });
    if taken {
        tracing::warn!(registration_number, "duplicate registration number rejected");
        return Err(AppError::Conflict(format!(
            "registration number {} is already in use",
            registration_number
        )));
    }
    Ok(())
}

fn unknown_reference(field: &str, message: &str) -> AppError {
    AppError::Validation(vec![FieldError::new(field, message)])
}

impl Store {
    pub fn new() -> Self {
        Self::with_snapshot(Snapshot::default())
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            state: Arc::new(RwLock::new(snapshot)),
            events,
        }
    }

    /// Receives every change made after this call. A receiver that falls more than
    /// a few dozen events behind gets `RecvError::Lagged` and skips ahead.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn notify(&self, collection: Collection, change: Change, id: Option<Uuid>) {
        // No subscribers is not an error.
        let _ = self.events.send(StoreEvent { collection, change, id });
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.clone()
    }

    /// Runs `f` against the current contents under the read lock, without cloning them.
    pub async fn read<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        f(&*self.state.read().await)
    }

    /// Swaps in a complete data set.
    pub async fn replace(&self, snapshot: Snapshot) {
        *self.state.write().await = snapshot;
        tracing::info!("store contents replaced");
        for collection in [
            Collection::Students,
            Collection::Companies,
            Collection::Jobs,
            Collection::Applications,
            Collection::Announcements,
        ] {
            self.notify(collection, Change::Replaced, None);
        }
    }

    // --- Students ---

    pub async fn list_students(&self, filter: &StudentFilter) -> Vec<Student> {
        filter.apply(&self.state.read().await.students)
    }

    pub async fn get_student(&self, id: Uuid) -> Result<Student, AppError> {
        self.state
            .read()
            .await
            .students
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("student", id))
    }

    pub async fn create_student(&self, input: NewStudent) -> Result<Student, AppError> {
        input.validate()?;
        let mut state = self.state.write().await;
        ensure_unique_registration(&state.students, &input.registration_number, None)?;
        let student = input.into_student(Utc::now());
        state.students.insert(0, student.clone());
        drop(state);

        tracing::info!(student_id = %student.id, registration_number = %student.registration_number, "student created");
        self.notify(Collection::Students, Change::Created, Some(student.id));
        Ok(student)
    }

    /// Renaming a student also renames their applications.
    pub async fn update_student(&self, id: Uuid, patch: StudentPatch) -> Result<Student, AppError> {
        patch.validate()?;
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        if let Some(reg) = &patch.registration_number {
            ensure_unique_registration(&state.students, reg, Some(id))?;
        }
        let student = state
            .students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::not_found("student", id))?;
        let renamed = patch.apply(student, Utc::now());
        let updated = student.clone();

        if renamed {
            for app in state.applications.iter_mut().filter(|a| a.student_id == id) {
                app.student_name = updated.name.clone();
            }
        }
        drop(guard);

        tracing::info!(student_id = %id, renamed, "student updated");
        self.notify(Collection::Students, Change::Updated, Some(id));
        if renamed {
            self.notify(Collection::Applications, Change::Updated, None);
        }
        Ok(updated)
    }

    pub async fn delete_student(&self, id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let before = state.students.len();
        state.students.retain(|s| s.id != id);
        if state.students.len() == before {
            return Err(AppError::not_found("student", id));
        }
        drop(state);

        tracing::info!(student_id = %id, "student deleted");
        self.notify(Collection::Students, Change::Deleted, Some(id));
        Ok(())
    }

    pub async fn set_students(&self, students: Vec<Student>) {
        self.state.write().await.students = students;
        self.notify(Collection::Students, Change::Replaced, None);
    }

    // --- Companies ---

    pub async fn list_companies(&self, filter: &CompanyFilter) -> Vec<Company> {
        filter.apply(&self.state.read().await.companies)
    }

    pub async fn get_company(&self, id: Uuid) -> Result<Company, AppError> {
        self.state
            .read()
            .await
            .companies
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("company", id))
    }

    pub async fn create_company(&self, input: NewCompany) -> Result<Company, AppError> {
        input.validate()?;
        let company = input.into_company(Utc::now());
        self.state.write().await.companies.insert(0, company.clone());

        tracing::info!(company_id = %company.id, name = %company.name, "company created");
        self.notify(Collection::Companies, Change::Created, Some(company.id));
        Ok(company)
    }

    /// Renaming a company rewrites the company name on its jobs and on applications to them.
    pub async fn update_company(&self, id: Uuid, patch: CompanyPatch) -> Result<Company, AppError> {
        patch.validate()?;
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let company = state
            .companies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::not_found("company", id))?;
        let renamed = patch.apply(company, Utc::now());
        let updated = company.clone();

        if renamed {
            let mut job_ids = HashSet::new();
            for job in state.jobs.iter_mut().filter(|j| j.company_id == id) {
                job.company_name = updated.name.clone();
                job_ids.insert(job.id);
            }
            for app in state.applications.iter_mut() {
                if app.job_id.map_or(false, |j| job_ids.contains(&j)) {
                    app.company_name = updated.name.clone();
                }
            }
        }
        drop(guard);

        tracing::info!(company_id = %id, renamed, "company updated");
        self.notify(Collection::Companies, Change::Updated, Some(id));
        if renamed {
            self.notify(Collection::Jobs, Change::Updated, None);
            self.notify(Collection::Applications, Change::Updated, None);
        }
        Ok(updated)
    }

    /// Jobs of a deleted company are kept; their `companyId` dangles.
    pub async fn delete_company(&self, id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let before = state.companies.len();
        state.companies.retain(|c| c.id != id);
        if state.companies.len() == before {
            return Err(AppError::not_found("company", id));
        }
        drop(state);

        tracing::info!(company_id = %id, "company deleted");
        self.notify(Collection::Companies, Change::Deleted, Some(id));
        Ok(())
    }

    pub async fn set_companies(&self, companies: Vec<Company>) {
        self.state.write().await.companies = companies;
        self.notify(Collection::Companies, Change::Replaced, None);
    }

    // --- Jobs ---

    pub async fn list_jobs(&self, filter: &JobFilter) -> Vec<Job> {
        filter.apply(&self.state.read().await.jobs)
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Job, AppError> {
        self.state
            .read()
            .await
            .jobs
            .iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("job", id))
    }

    pub async fn create_job(&self, input: NewJob) -> Result<Job, AppError> {
        let draft = input.validate()?;
        let mut state = self.state.write().await;
        let company_name = state
            .companies
            .iter()
            .find(|c| c.id == draft.company_id)
            .map(|c| c.name.clone())
            .ok_or_else(|| unknown_reference("companyId", "Company not found"))?;
        let job = draft.into_job(company_name, Utc::now());
        state.jobs.insert(0, job.clone());
        drop(state);

        tracing::info!(job_id = %job.id, company_id = %job.company_id, title = %job.title, "job created");
        self.notify(Collection::Jobs, Change::Created, Some(job.id));
        Ok(job)
    }

    /// Retitling a job or moving it to another company updates its applications.
    pub async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<Job, AppError> {
        let company_id = patch.validate()?;
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let company = match company_id {
            Some(company_id) => {
                let name = state
                    .companies
                    .iter()
                    .find(|c| c.id == company_id)
                    .map(|c| c.name.clone())
                    .ok_or_else(|| unknown_reference("companyId", "Company not found"))?;
                Some((company_id, name))
            }
            None => None,
        };

        let job = state
            .jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| AppError::not_found("job", id))?;
        let changes = patch.apply(job, company, Utc::now());
        let updated = job.clone();

        if changes.retitled || changes.company_moved {
            for app in state.applications.iter_mut().filter(|a| a.job_id == Some(id)) {
                app.job_title = updated.title.clone();
                app.company_name = updated.company_name.clone();
            }
        }
        drop(guard);

        tracing::info!(job_id = %id, retitled = changes.retitled, company_moved = changes.company_moved, "job updated");
        self.notify(Collection::Jobs, Change::Updated, Some(id));
        if changes.retitled || changes.company_moved {
            self.notify(Collection::Applications, Change::Updated, None);
        }
        Ok(updated)
    }

    pub async fn set_job_status(&self, id: Uuid, status: JobStatus) -> Result<Job, AppError> {
        let mut state = self.state.write().await;
        let job = state
            .jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| AppError::not_found("job", id))?;
        job.status = status;
        job.updated_at = Utc::now();
        let updated = job.clone();
        drop(state);

        tracing::info!(job_id = %id, ?status, "job status set");
        self.notify(Collection::Jobs, Change::Updated, Some(id));
        Ok(updated)
    }

    /// Applications to a deleted job are kept and still group under its id.
    pub async fn delete_job(&self, id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let before = state.jobs.len();
        state.jobs.retain(|j| j.id != id);
        if state.jobs.len() == before {
            return Err(AppError::not_found("job", id));
        }
        drop(state);

        tracing::info!(job_id = %id, "job deleted");
        self.notify(Collection::Jobs, Change::Deleted, Some(id));
        Ok(())
    }

    pub async fn set_jobs(&self, jobs: Vec<Job>) {
        self.state.write().await.jobs = jobs;
        self.notify(Collection::Jobs, Change::Replaced, None);
    }

    // --- Applications ---

    pub async fn list_applications(&self, filter: &ApplicationFilter) -> Vec<Application> {
        filter.apply(&self.state.read().await.applications)
    }

    pub async fn get_application(&self, id: Uuid) -> Result<Application, AppError> {
        self.state
            .read()
            .await
            .applications
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("application", id))
    }

    pub async fn create_application(&self, input: NewApplication) -> Result<Application, AppError> {
        let mut state = self.state.write().await;

        let student = state.students.iter().find(|s| s.id == input.student_id);
        let job = state.jobs.iter().find(|j| j.id == input.job_id);
        let mut missing = Vec::new();
        if job.is_none() {
            missing.push(FieldError::new("jobId", "Job not found"));
        }
        if student.is_none() {
            missing.push(FieldError::new("studentId", "Student not found"));
        }
        let (Some(student), Some(job)) = (student, job) else {
            return Err(AppError::Validation(missing));
        };

        let now = Utc::now();
        let application = Application {
            id: Uuid::new_v4(),
            job_id: Some(job.id),
            student_id: student.id,
            student_name: student.name.clone(),
            job_title: job.title.clone(),
            company_name: job.company_name.clone(),
            status: input.status.unwrap_or(ApplicationStatus::Applied),
            applied_at: now,
            updated_at: now,
        };
        state.applications.insert(0, application.clone());
        drop(state);

        tracing::info!(application_id = %application.id, job_id = %input.job_id, student_id = %input.student_id, "application created");
        self.notify(Collection::Applications, Change::Created, Some(application.id));
        Ok(application)
    }

    /// Sets the status without checking the current one; any transition is allowed.
    pub async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, AppError> {
        let mut state = self.state.write().await;
        let app = state
            .applications
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::not_found("application", id))?;
        let previous = app.status;
        app.set_status(status, Utc::now());
        let updated = app.clone();
        drop(state);

        tracing::info!(application_id = %id, from = %previous, to = %status, "application status set");
        self.notify(Collection::Applications, Change::Updated, Some(id));
        Ok(updated)
    }

    pub async fn delete_application(&self, id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let before = state.applications.len();
        state.applications.retain(|a| a.id != id);
        if state.applications.len() == before {
            return Err(AppError::not_found("application", id));
        }
        drop(state);

        tracing::info!(application_id = %id, "application deleted");
        self.notify(Collection::Applications, Change::Deleted, Some(id));
        Ok(())
    }

    pub async fn set_applications(&self, applications: Vec<Application>) {
        self.state.write().await.applications = applications;
        self.notify(Collection::Applications, Change::Replaced, None);
    }

    // --- Announcements ---

    pub async fn list_announcements(&self, filter: &AnnouncementFilter) -> Vec<Announcement> {
        filter.apply(&self.state.read().await.announcements)
    }

    pub async fn get_announcement(&self, id: Uuid) -> Result<Announcement, AppError> {
        self.state
            .read()
            .await
            .announcements
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("announcement", id))
    }

    /// Announcements whose audience includes the given student.
    pub async fn announcements_for_student(&self, student_id: Uuid) -> Result<Vec<Announcement>, AppError> {
        let state = self.state.read().await;
        let student = state
            .students
            .iter()
            .find(|s| s.id == student_id)
            .ok_or_else(|| AppError::not_found("student", student_id))?;
        Ok(state
            .announcements
            .iter()
            .filter(|a| a.is_visible_to(student))
            .cloned()
            .collect())
    }

    pub async fn create_announcement(&self, input: NewAnnouncement) -> Result<Announcement, AppError> {
        input.validate()?;
        let announcement = input.into_announcement(Utc::now());
        self.state.write().await.announcements.insert(0, announcement.clone());

        tracing::info!(announcement_id = %announcement.id, target = ?announcement.target, "announcement created");
        self.notify(Collection::Announcements, Change::Created, Some(announcement.id));
        Ok(announcement)
    }

    pub async fn update_announcement(
        &self,
        id: Uuid,
        patch: AnnouncementPatch,
    ) -> Result<Announcement, AppError> {
        let mut state = self.state.write().await;
        let announcement = state
            .announcements
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::not_found("announcement", id))?;
        patch.validate(announcement)?;
        patch.apply(announcement, Utc::now());
        let updated = announcement.clone();
        drop(state);

        tracing::info!(announcement_id = %id, "announcement updated");
        self.notify(Collection::Announcements, Change::Updated, Some(id));
        Ok(updated)
    }

    pub async fn delete_announcement(&self, id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let before = state.announcements.len();
        state.announcements.retain(|a| a.id != id);
        if state.announcements.len() == before {
            return Err(AppError::not_found("announcement", id));
        }
        drop(state);

        tracing::info!(announcement_id = %id, "announcement deleted");
        self.notify(Collection::Announcements, Change::Deleted, Some(id));
        Ok(())
    }

    pub async fn set_announcements(&self, announcements: Vec<Announcement>) {
        self.state.write().await.announcements = announcements;
        self.notify(Collection::Announcements, Change::Replaced, None);
    }
}
