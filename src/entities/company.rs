use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::Validator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub industry: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub industry: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

fn check_contact(
    v: &mut Validator,
    website: Option<&str>,
    email: Option<&str>,
    phone: Option<&str>,
    address: Option<&str>,
) {
    v.website("website", website);
    if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
        v.email("email", email);
    }
    v.phone("phone", phone);
    if let Some(address) = address.filter(|a| !a.trim().is_empty()) {
        v.min_len("address", address, 5, "Address is required");
    }
}

/// Blank optional strings are stored as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl NewCompany {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.min_len("name", &self.name, 2, "Company name is required");
        v.min_len("description", &self.description, 10, "Description must be at least 10 characters");
        v.min_len("industry", &self.industry, 2, "Industry is required");
        v.min_len("location", &self.location, 2, "Location is required");
        check_contact(
            &mut v,
            self.website.as_deref(),
            self.email.as_deref(),
            self.phone.as_deref(),
            self.address.as_deref(),
        );
        v.finish()
    }

    pub fn into_company(self, now: DateTime<Utc>) -> Company {
        Company {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            description: self.description,
            website: non_blank(self.website),
            industry: self.industry.trim().to_string(),
            location: self.location.trim().to_string(),
            email: non_blank(self.email),
            phone: non_blank(self.phone),
            address: non_blank(self.address),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl CompanyPatch {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.min_len("name", name, 2, "Company name is required");
        }
        if let Some(description) = &self.description {
            v.min_len("description", description, 10, "Description must be at least 10 characters");
        }
        if let Some(industry) = &self.industry {
            v.min_len("industry", industry, 2, "Industry is required");
        }
        if let Some(location) = &self.location {
            v.min_len("location", location, 2, "Location is required");
        }
        check_contact(
            &mut v,
            self.website.as_deref(),
            self.email.as_deref(),
            self.phone.as_deref(),
            self.address.as_deref(),
        );
        v.finish()
    }

    /// Returns true when the company name changed, so dependants can be renamed.
    pub fn apply(self, company: &mut Company, now: DateTime<Utc>) -> bool {
        let mut renamed = false;
        if let Some(name) = self.name {
            let name = name.trim().to_string();
            renamed = name != company.name;
            company.name = name;
        }
        if let Some(description) = self.description {
            company.description = description;
        }
        if self.website.is_some() {
            company.website = non_blank(self.website);
        }
        if let Some(industry) = self.industry {
            company.industry = industry.trim().to_string();
        }
        if let Some(location) = self.location {
            company.location = location.trim().to_string();
        }
        if self.email.is_some() {
            company.email = non_blank(self.email);
        }
        if self.phone.is_some() {
            company.phone = non_blank(self.phone);
        }
        if self.address.is_some() {
            company.address = non_blank(self.address);
        }
        company.updated_at = now;
        renamed
    }
}
