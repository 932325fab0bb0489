//! Field-level checks shared by the entity payloads.
//!
//! Each `check_*` helper pushes at most one [`FieldError`] into the collector, so a form
//! gets one message per bad field.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::{AppError, FieldError};

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z .'\-]*$").expect("name pattern compiles"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("email pattern compiles")
});

/// Collects field errors while a payload is checked.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize, message: &str) {
        if value.trim().chars().count() < min {
            self.push(field, message);
        }
    }

    pub fn registration_number(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            self.push(field, "Registration number is required");
        } else if !is_registration_number(value) {
            self.push(
                field,
                "Registration number must be all digits or a mix of letters and numbers (no spaces)",
            );
        }
    }

    pub fn person_name(&mut self, field: &str, value: &str) {
        if value.chars().count() < 2 {
            self.push(field, "Name must be at least 2 characters");
        } else if !NAME_RE.is_match(value) {
            self.push(field, "Name can contain letters, spaces, .' and - only");
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.push(field, "Email is required");
        } else if !is_email(value) {
            self.push(field, "Enter a valid email address");
        }
    }

    /// Empty phones are accepted; the field is optional everywhere.
    pub fn phone(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value {
            if !value.trim().is_empty() && !is_phone(value) {
                self.push(field, "Phone number must contain 10-15 digits");
            }
        }
    }

    pub fn website(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value {
            if !value.is_empty() && !is_url(value) {
                self.push(field, "Invalid URL");
            }
        }
    }

    pub fn range_f64(&mut self, field: &str, value: f64, min: f64, max: f64, message: &str) {
        if !value.is_finite() || value < min || value > max {
            self.push(field, message);
        }
    }

    pub fn year(&mut self, field: &str, value: u8) {
        if !(1..=4).contains(&value) {
            self.push(field, "Year must be between 1 and 4");
        }
    }

    pub fn date(&mut self, field: &str, value: &str, message: &str) {
        if parse_date(value).is_none() {
            self.push(field, message);
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// All digits, or letters and digits with at least one of each.
pub fn is_registration_number(value: &str) -> bool {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_alpha = value.chars().any(|c| c.is_ascii_alphabetic());
    has_digit && (has_alpha || value.chars().all(|c| c.is_ascii_digit()))
}

pub fn is_email(value: &str) -> bool {
    !value.contains("..") && EMAIL_RE.is_match(value)
}

pub fn is_phone(value: &str) -> bool {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    (10..=15).contains(&digits)
}

pub fn is_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => url.has_host() && matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Deadlines arrive either as a bare date or as a full RFC 3339 timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        chrono::DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.date_naive())
    })
}
