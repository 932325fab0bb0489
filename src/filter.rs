//! List filtering: free-text search plus structured predicates.
//!
//! Text search is a case-insensitive substring test that matches when ANY of an entity's
//! search fields contains the term. Structured filters are ANDed with it.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entities::{
    Announcement, AnnouncementTarget, Application, ApplicationStatus, Branch, Company, Job,
    JobStatus, Student,
};

/// An entity that can be matched by the free-text search box.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    /// `needle` must already be lower-cased.
    fn matches_lowercase(&self, needle: &str) -> bool {
        self.search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl Searchable for Student {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.registration_number.as_str(), self.email.as_str()]
    }
}

impl Searchable for Company {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.industry.as_str(), self.location.as_str()]
    }
}

impl Searchable for Job {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.company_name.as_str(), self.location.as_str()]
    }
}

impl Searchable for Application {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.student_name.as_str(), self.job_title.as_str(), self.company_name.as_str()]
    }
}

impl Searchable for Announcement {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.content.as_str()]
    }
}

/// Lower-cased search term, or `None` when the term is blank and everything matches. A
/// non-blank term is used as typed, spaces included.
fn needle(term: Option<&str>) -> Option<String> {
    term.filter(|t| !t.trim().is_empty()).map(str::to_lowercase)
}

fn text_matches<T: Searchable>(item: &T, needle: Option<&str>) -> bool {
    match needle {
        Some(n) => item.matches_lowercase(n),
        None => true,
    }
}

/// Filters `items` by `term`. A blank term returns every item, in order.
pub fn search<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    let needle = needle(Some(term));
    items
        .iter()
        .filter(|item| text_matches(*item, needle.as_deref()))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StudentFilter {
    /// Matches name, registration number or email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<Branch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u8>,
}

impl StudentFilter {
    pub fn apply(&self, students: &[Student]) -> Vec<Student> {
        let needle = needle(self.search.as_deref());
        students
            .iter()
            .filter(|s| text_matches(*s, needle.as_deref()))
            .filter(|s| self.branch.map_or(true, |b| s.branch == b))
            .filter(|s| self.year.map_or(true, |y| s.year == y))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CompanyFilter {
    /// Matches name, industry or location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl CompanyFilter {
    pub fn apply(&self, companies: &[Company]) -> Vec<Company> {
        let needle = needle(self.search.as_deref());
        companies
            .iter()
            .filter(|c| text_matches(*c, needle.as_deref()))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct JobFilter {
    /// Matches title, company name or location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
}

impl JobFilter {
    pub fn apply(&self, jobs: &[Job]) -> Vec<Job> {
        let needle = needle(self.search.as_deref());
        jobs.iter()
            .filter(|j| text_matches(*j, needle.as_deref()))
            .filter(|j| self.status.map_or(true, |s| j.status == s))
            .filter(|j| self.company_id.map_or(true, |c| j.company_id == c))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ApplicationFilter {
    /// Matches student name, job title or company name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<Uuid>,
}

impl ApplicationFilter {
    pub fn for_job(job_id: Uuid) -> Self {
        Self {
            job_id: Some(job_id),
            ..Self::default()
        }
    }

    pub fn apply(&self, applications: &[Application]) -> Vec<Application> {
        let needle = needle(self.search.as_deref());
        applications
            .iter()
            .filter(|a| text_matches(*a, needle.as_deref()))
            .filter(|a| self.status.map_or(true, |s| a.status == s))
            .filter(|a| self.job_id.map_or(true, |j| a.job_id == Some(j)))
            .filter(|a| self.student_id.map_or(true, |s| a.student_id == s))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AnnouncementFilter {
    /// Matches title or content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<AnnouncementTarget>,
}

impl AnnouncementFilter {
    pub fn apply(&self, announcements: &[Announcement]) -> Vec<Announcement> {
        let needle = needle(self.search.as_deref());
        announcements
            .iter()
            .filter(|a| text_matches(*a, needle.as_deref()))
            .filter(|a| self.target.map_or(true, |t| a.target == t))
            .cloned()
            .collect()
    }
}
