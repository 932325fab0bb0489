use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::student::{Branch, Student};
use crate::error::AppError;
use crate::validation::Validator;

/// Audience of an announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnnouncementTarget {
    All,
    /// `targetValue` holds a branch code
    Branch,
    /// `targetValue` holds a year of study, 1 to 4
    Batch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub target: AnnouncementTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    pub fn is_visible_to(&self, student: &Student) -> bool {
        let value = self.target_value.as_deref().map(str::trim).unwrap_or("");
        match self.target {
            AnnouncementTarget::All => true,
            AnnouncementTarget::Branch => value.eq_ignore_ascii_case(student.branch.code()),
            AnnouncementTarget::Batch => value.parse::<u8>().map(|y| y == student.year).unwrap_or(false),
        }
    }
}

fn check_target(v: &mut Validator, target: AnnouncementTarget, value: Option<&str>) {
    let value = value.map(str::trim).unwrap_or("");
    match target {
        AnnouncementTarget::All => {}
        AnnouncementTarget::Branch => {
            if value.parse::<Branch>().is_err() {
                v.push("targetValue", "Select a branch (CSE, ECE, EEE, MECH or CIVIL)");
            }
        }
        AnnouncementTarget::Batch => {
            if !matches!(value.parse::<u8>(), Ok(1..=4)) {
                v.push("targetValue", "Select a year between 1 and 4");
            }
        }
    }
}

/// Branch codes are stored upper-cased; ALL drops any stray value.
fn normalize_target_value(target: AnnouncementTarget, value: Option<String>) -> Option<String> {
    match target {
        AnnouncementTarget::All => None,
        _ => value
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    pub target: AnnouncementTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<String>,
}

impl NewAnnouncement {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.min_len("title", &self.title, 2, "Title is required");
        v.min_len("content", &self.content, 10, "Content must be at least 10 characters");
        check_target(&mut v, self.target, self.target_value.as_deref());
        v.finish()
    }

    pub fn into_announcement(self, now: DateTime<Utc>) -> Announcement {
        Announcement {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            content: self.content,
            target: self.target,
            target_value: normalize_target_value(self.target, self.target_value),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<AnnouncementTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<String>,
}

impl AnnouncementPatch {
    /// The audience is checked against the record it will produce, so changing only
    /// `target` still requires a matching `targetValue`.
    pub fn validate(&self, current: &Announcement) -> Result<(), AppError> {
        let mut v = Validator::new();
        if let Some(title) = &self.title {
            v.min_len("title", title, 2, "Title is required");
        }
        if let Some(content) = &self.content {
            v.min_len("content", content, 10, "Content must be at least 10 characters");
        }
        let target = self.target.unwrap_or(current.target);
        let value = self.target_value.as_deref().or(current.target_value.as_deref());
        check_target(&mut v, target, value);
        v.finish()
    }

    pub fn apply(self, announcement: &mut Announcement, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            announcement.title = title.trim().to_string();
        }
        if let Some(content) = self.content {
            announcement.content = content;
        }
        let target = self.target.unwrap_or(announcement.target);
        let value = self.target_value.or_else(|| announcement.target_value.take());
        announcement.target = target;
        announcement.target_value = normalize_target_value(target, value);
        announcement.updated_at = now;
    }
}
