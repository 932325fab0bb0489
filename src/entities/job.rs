use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::{parse_date, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    /// Accepting applications; `ACTIVE` is read as an alias
    #[serde(alias = "ACTIVE")]
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Internship,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub company_id: Uuid,
    /// Copy of the owning company's name, kept in sync on rename
    pub company_name: String,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub salary: String,
    pub location: String,
    #[serde(rename = "type", default)]
    pub job_type: JobType,
    pub status: JobStatus,
    pub deadline: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload of the "post job" form. The company name is resolved from `companyId`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub company_id: String,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub salary: String,
    pub location: String,
    #[serde(rename = "type", default)]
    pub job_type: JobType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    /// `YYYY-MM-DD`; RFC 3339 timestamps are truncated to their date
    pub deadline: String,
}

/// Parses the `companyId` field of a form; a malformed id is reported like a missing one.
pub(crate) fn parse_company_id(v: &mut Validator, raw: &str) -> Option<Uuid> {
    if raw.trim().is_empty() {
        v.push("companyId", "Company is required");
        return None;
    }
    match Uuid::parse_str(raw.trim()) {
        Ok(id) => Some(id),
        Err(_) => {
            v.push("companyId", "Company not found");
            None
        }
    }
}

/// A validated [`NewJob`], ready for the store to attach the company name.
#[derive(Debug, Clone)]
pub struct JobDraft {
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub salary: String,
    pub location: String,
    pub job_type: JobType,
    pub status: JobStatus,
    pub deadline: NaiveDate,
}

impl JobDraft {
    pub fn into_job(self, company_name: String, now: DateTime<Utc>) -> Job {
        Job {
            id: Uuid::new_v4(),
            company_id: self.company_id,
            company_name,
            title: self.title,
            description: self.description,
            requirements: self.requirements,
            salary: self.salary,
            location: self.location,
            job_type: self.job_type,
            status: self.status,
            deadline: self.deadline,
            created_at: now,
            updated_at: now,
        }
    }
}

impl NewJob {
    pub fn validate(self) -> Result<JobDraft, AppError> {
        let mut v = Validator::new();
        let company_id = parse_company_id(&mut v, &self.company_id);
        v.min_len("title", &self.title, 2, "Job title is required");
        v.min_len("description", &self.description, 10, "Description must be at least 10 characters");
        v.min_len("requirements", &self.requirements, 10, "Requirements must be at least 10 characters");
        v.min_len("salary", &self.salary, 1, "Salary information is required");
        v.min_len("location", &self.location, 2, "Location is required");
        v.date("deadline", &self.deadline, "Deadline is required");
        v.finish()?;

        let (Some(company_id), Some(deadline)) = (company_id, parse_date(&self.deadline)) else {
            return Err(AppError::InternalError("validated job draft is incomplete".to_string()));
        };

        Ok(JobDraft {
            company_id,
            title: self.title.trim().to_string(),
            description: self.description,
            requirements: self.requirements,
            salary: self.salary.trim().to_string(),
            location: self.location.trim().to_string(),
            job_type: self.job_type,
            status: self.status.unwrap_or(JobStatus::Open),
            deadline,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

/// What a patch changed that dependants care about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobChanges {
    pub retitled: bool,
    pub company_moved: bool,
}

impl JobPatch {
    /// Validates present fields and returns the parsed company id, if one was given.
    pub fn validate(&self) -> Result<Option<Uuid>, AppError> {
        let mut v = Validator::new();
        let company_id = match &self.company_id {
            Some(raw) => parse_company_id(&mut v, raw),
            None => None,
        };
        if let Some(title) = &self.title {
            v.min_len("title", title, 2, "Job title is required");
        }
        if let Some(description) = &self.description {
            v.min_len("description", description, 10, "Description must be at least 10 characters");
        }
        if let Some(requirements) = &self.requirements {
            v.min_len("requirements", requirements, 10, "Requirements must be at least 10 characters");
        }
        if let Some(salary) = &self.salary {
            v.min_len("salary", salary, 1, "Salary information is required");
        }
        if let Some(location) = &self.location {
            v.min_len("location", location, 2, "Location is required");
        }
        if let Some(deadline) = &self.deadline {
            v.date("deadline", deadline, "Deadline is required");
        }
        v.finish()?;
        Ok(company_id)
    }

    /// Applies a validated patch. `company` carries the resolved id and name when `companyId` was sent.
    pub fn apply(self, job: &mut Job, company: Option<(Uuid, String)>, now: DateTime<Utc>) -> JobChanges {
        let mut changes = JobChanges::default();
        if let Some((company_id, company_name)) = company {
            changes.company_moved = company_id != job.company_id || company_name != job.company_name;
            job.company_id = company_id;
            job.company_name = company_name;
        }
        if let Some(title) = self.title {
            let title = title.trim().to_string();
            changes.retitled = title != job.title;
            job.title = title;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(requirements) = self.requirements {
            job.requirements = requirements;
        }
        if let Some(salary) = self.salary {
            job.salary = salary.trim().to_string();
        }
        if let Some(location) = self.location {
            job.location = location.trim().to_string();
        }
        if let Some(job_type) = self.job_type {
            job.job_type = job_type;
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(deadline) = self.deadline.as_deref().and_then(parse_date) {
            job.deadline = deadline;
        }
        job.updated_at = now;
        changes
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobStatusUpdate {
    pub status: JobStatus,
}
