use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::Validator;

/// Academic department code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Branch {
    Cse,
    Ece,
    Eee,
    Mech,
    Civil,
}

impl Branch {
    pub const ALL: [Branch; 5] = [Branch::Cse, Branch::Ece, Branch::Eee, Branch::Mech, Branch::Civil];

    pub fn code(&self) -> &'static str {
        match self {
            Branch::Cse => "CSE",
            Branch::Ece => "ECE",
            Branch::Eee => "EEE",
            Branch::Mech => "MECH",
            Branch::Civil => "CIVIL",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Branch {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Branch::ALL
            .into_iter()
            .find(|b| b.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::InvalidRequest(format!("unknown branch: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    /// Unique across students, compared case-insensitively
    pub registration_number: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub branch: Branch,
    /// Year of study, 1 to 4
    #[serde(deserialize_with = "deserialize_year")]
    pub year: u8,
    /// Cumulative grade point average on a 0-10 scale
    pub cgpa: f64,
    pub profile_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload of the "add student" form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub registration_number: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub branch: Branch,
    #[serde(deserialize_with = "deserialize_year")]
    #[schema(minimum = 1, maximum = 4)]
    pub year: u8,
    #[schema(minimum = 0, maximum = 10)]
    pub cgpa: f64,
    #[serde(default)]
    pub profile_completed: bool,
}

impl NewStudent {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.registration_number("registrationNumber", &self.registration_number);
        v.person_name("name", &self.name);
        v.email("email", &self.email);
        v.phone("phone", self.phone.as_deref());
        v.year("year", self.year);
        v.range_f64("cgpa", self.cgpa, 0.0, 10.0, "CGPA must be between 0 and 10");
        v.finish()
    }

    pub fn into_student(self, now: DateTime<Utc>) -> Student {
        Student {
            id: Uuid::new_v4(),
            registration_number: self.registration_number,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            branch: self.branch,
            year: self.year,
            cgpa: self.cgpa,
            profile_completed: self.profile_completed,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload of the "edit student" form; absent fields are left untouched.
/// An empty `phone` clears the stored number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<Branch>,
    #[serde(default, deserialize_with = "deserialize_opt_year", skip_serializing_if = "Option::is_none")]
    pub year: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cgpa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_completed: Option<bool>,
}

impl StudentPatch {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        if let Some(reg) = &self.registration_number {
            v.registration_number("registrationNumber", reg);
        }
        if let Some(name) = &self.name {
            v.person_name("name", name);
        }
        if let Some(email) = &self.email {
            v.email("email", email);
        }
        v.phone("phone", self.phone.as_deref());
        if let Some(year) = self.year {
            v.year("year", year);
        }
        if let Some(cgpa) = self.cgpa {
            v.range_f64("cgpa", cgpa, 0.0, 10.0, "CGPA must be between 0 and 10");
        }
        v.finish()
    }

    /// Returns true when the student's name changed, so applications can be renamed.
    pub fn apply(self, student: &mut Student, now: DateTime<Utc>) -> bool {
        let mut renamed = false;
        if let Some(reg) = self.registration_number {
            student.registration_number = reg;
        }
        if let Some(name) = self.name {
            let name = name.trim().to_string();
            renamed = name != student.name;
            student.name = name;
        }
        if let Some(email) = self.email {
            student.email = email.trim().to_string();
        }
        if let Some(phone) = self.phone {
            let phone = phone.trim().to_string();
            student.phone = if phone.is_empty() { None } else { Some(phone) };
        }
        if let Some(branch) = self.branch {
            student.branch = branch;
        }
        if let Some(year) = self.year {
            student.year = year;
        }
        if let Some(cgpa) = self.cgpa {
            student.cgpa = cgpa;
        }
        if let Some(done) = self.profile_completed {
            student.profile_completed = done;
        }
        student.updated_at = now;
        renamed
    }
}

/// Older dashboard builds sent the year as a string ("1".."4"); both spellings are accepted.
/// Whole numbers outside `u8` are pinned to 0 or 255 so the range check reports them as a
/// field error rather than a malformed body.
#[derive(Deserialize)]
#[serde(untagged)]
enum YearRepr {
    Int(i64),
    Float(f64),
    Text(String),
}

impl YearRepr {
    fn into_year<E: serde::de::Error>(self) -> Result<u8, E> {
        let whole = match self {
            YearRepr::Int(n) => Some(n),
            YearRepr::Float(f) => whole_number(f),
            YearRepr::Text(ref s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
            }
        };
        match whole {
            Some(n) => Ok(u8::try_from(n).unwrap_or(if n < 0 { 0 } else { u8::MAX })),
            None => Err(E::custom(format!("invalid year: {}", self))),
        }
    }
}

fn whole_number(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 {
        Some(f.clamp(i64::MIN as f64, i64::MAX as f64) as i64)
    } else {
        None
    }
}

impl fmt::Display for YearRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearRepr::Int(n) => write!(f, "{}", n),
            YearRepr::Float(x) => write!(f, "{}", x),
            YearRepr::Text(s) => write!(f, "{:?}", s),
        }
    }
}

fn deserialize_year<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    YearRepr::deserialize(deserializer)?.into_year()
}

fn deserialize_opt_year<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<YearRepr>::deserialize(deserializer)? {
        Some(repr) => repr.into_year().map(Some),
        None => Ok(None),
    }
}
