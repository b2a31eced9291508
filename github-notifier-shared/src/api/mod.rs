use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod endpoints;
#[cfg(feature = "rest-client")]
pub mod rest;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Username half of the Basic credentials. The API only looks at the token.
pub const DEFAULT_AUTH_USERNAME: &str = "ku";

// Notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDto {
    pub unread: bool,
    pub reason: String,
    pub updated_at: DateTime<Utc>, // RFC3339 UTC
    pub subject: SubjectDto,
    pub url: String,
    pub repository: RepositoryDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectDto {
    pub title: String,
    // null for some subject types (e.g. discussions)
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDto {
    pub name: String,
    pub full_name: String,
}
