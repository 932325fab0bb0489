//! Aggregates behind the dashboard and analytics screens.
//!
//! Everything here is a pure function over slices and is recomputed on each read.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{Application, ApplicationStatus, Branch, Company, Job, JobStatus, Student};

/// Rounded percentage of `part` in `whole`; 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Mean CGPA rounded to two decimals; 0 for an empty list.
pub fn average_cgpa(students: &[Student]) -> f64 {
    if students.is_empty() {
        return 0.0;
    }
    let mean = students.iter().map(|s| s.cgpa).sum::<f64>() / students.len() as f64;
    (mean * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: usize,
    pub total_companies: usize,
    pub total_jobs: usize,
    /// Jobs with status OPEN
    pub active_jobs: usize,
    pub total_applications: usize,
    /// Applications with status APPLIED
    pub pending_applications: usize,
    /// Percentage (0-100) of students whose profile is complete
    pub profile_completion: u32,
    /// Applications with status ACCEPTED
    pub placed_students: usize,
}

pub fn dashboard_stats(
    students: &[Student],
    companies: &[Company],
    jobs: &[Job],
    applications: &[Application],
) -> DashboardStats {
    let completed = students.iter().filter(|s| s.profile_completed).count();
    let count_status = |status: ApplicationStatus| applications.iter().filter(|a| a.status == status).count();

    DashboardStats {
        total_students: students.len(),
        total_companies: companies.len(),
        total_jobs: jobs.len(),
        active_jobs: jobs.iter().filter(|j| j.status == JobStatus::Open).count(),
        total_applications: applications.len(),
        pending_applications: count_status(ApplicationStatus::Applied),
        profile_completion: percentage(completed, students.len()),
        placed_students: count_status(ApplicationStatus::Accepted),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BranchCount {
    pub branch: Branch,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct YearCount {
    pub year: u8,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProfileCompletion {
    pub completed: usize,
    pub incomplete: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentAnalytics {
    pub total_students: usize,
    /// One entry per branch, zero counts included
    pub branch_distribution: Vec<BranchCount>,
    /// One entry per year 1-4, zero counts included
    pub year_distribution: Vec<YearCount>,
    pub profile_completion: ProfileCompletion,
    #[serde(rename = "averageCGPA")]
    pub average_cgpa: f64,
}

pub fn student_analytics(students: &[Student]) -> StudentAnalytics {
    let mut by_branch: HashMap<Branch, usize> = HashMap::new();
    let mut by_year: HashMap<u8, usize> = HashMap::new();
    for student in students {
        *by_branch.entry(student.branch).or_default() += 1;
        *by_year.entry(student.year).or_default() += 1;
    }

    let completed = students.iter().filter(|s| s.profile_completed).count();

    StudentAnalytics {
        total_students: students.len(),
        branch_distribution: Branch::ALL
            .iter()
            .map(|b| BranchCount {
                branch: *b,
                count: by_branch.get(b).copied().unwrap_or(0),
            })
            .collect(),
        year_distribution: (1..=4u8)
            .map(|year| YearCount {
                year,
                count: by_year.get(&year).copied().unwrap_or(0),
            })
            .collect(),
        profile_completion: ProfileCompletion {
            completed,
            incomplete: students.len() - completed,
            percentage: percentage(completed, students.len()),
        },
        average_cgpa: average_cgpa(students),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobAnalytics {
    pub job_id: Uuid,
    pub total: usize,
    pub applied: usize,
    pub shortlisted: usize,
    pub interview: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Accepted applications as a rounded percentage of all applications to the job
    pub selection_rate: u32,
}

pub fn job_analytics(job_id: Uuid, applications: &[Application]) -> JobAnalytics {
    let mut stats = JobAnalytics {
        job_id,
        total: 0,
        applied: 0,
        shortlisted: 0,
        interview: 0,
        accepted: 0,
        rejected: 0,
        selection_rate: 0,
    };
    for app in applications.iter().filter(|a| a.job_id == Some(job_id)) {
        stats.total += 1;
        match app.status {
            ApplicationStatus::Applied => stats.applied += 1,
            ApplicationStatus::Shortlisted => stats.shortlisted += 1,
            ApplicationStatus::Interview => stats.interview += 1,
            ApplicationStatus::Accepted => stats.accepted += 1,
            ApplicationStatus::Rejected => stats.rejected += 1,
        }
    }
    stats.selection_rate = percentage(stats.accepted, stats.total);
    stats
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationGroup {
    /// The job id, or `jobTitle|companyName` for applications without one
    pub key: String,
    #[serde(default)]
    pub job_id: Option<Uuid>,
    pub job_title: String,
    pub company_name: String,
    pub applications: Vec<Application>,
}

pub fn group_key(application: &Application) -> String {
    match application.job_id {
        Some(id) => id.to_string(),
        None => format!("{}|{}", application.job_title, application.company_name),
    }
}

/// Stable partition by job: groups appear in order of first occurrence and keep the input
/// order of their members. Title and company come from the first member of each group.
pub fn group_by_job(applications: &[Application]) -> Vec<ApplicationGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ApplicationGroup> = Vec::new();

    for app in applications {
        let key = group_key(app);
        match index.get(&key) {
            Some(&i) => groups[i].applications.push(app.clone()),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(ApplicationGroup {
                    key,
                    job_id: app.job_id,
                    job_title: app.job_title.clone(),
                    company_name: app.company_name.clone(),
                    applications: vec![app.clone()],
                });
            }
        }
    }
    groups
}
