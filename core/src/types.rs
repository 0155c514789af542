//! Domain DTOs for the directory API.
//!
//! # Design
//! These types mirror the GitHub user payloads but only declare the fields the
//! views use. Every field except `login` has a serde default so sparse
//! payloads (a listing entry with just `login` and `id`) still decode; an
//! entry without a usable `login` is rejected by the client, not here.

use serde::{Deserialize, Serialize};

/// A listing or search entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub login: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
}

/// A full profile as returned by `GET /users/{login}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDetail {
    #[serde(flatten)]
    pub summary: UserSummary,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
}

impl UserDetail {
    pub fn login(&self) -> &str {
        &self.summary.login
    }

    /// The profile's name, or its login when the name is unset or blank.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.summary.login,
        }
    }

    /// The blog link with a scheme, `None` when the profile has no blog.
    ///
    /// Profiles often store bare hosts (`example.com`); those get `https://`.
    pub fn blog_url(&self) -> Option<String> {
        let blog = self.blog.as_deref()?.trim();
        if blog.is_empty() {
            return None;
        }
        if blog.starts_with("http") {
            Some(blog.to_string())
        } else {
            Some(format!("https://{blog}"))
        }
    }
}

/// One element of a published listing.
///
/// Starts as a `Summary`; enrichment replaces it with a `Detail` when the
/// profile fetch succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEntry {
    Summary(UserSummary),
    Detail(Box<UserDetail>),
}

impl UserEntry {
    pub fn login(&self) -> &str {
        &self.summary().login
    }

    pub fn summary(&self) -> &UserSummary {
        match self {
            UserEntry::Summary(summary) => summary,
            UserEntry::Detail(detail) => &detail.summary,
        }
    }

    pub fn detail(&self) -> Option<&UserDetail> {
        match self {
            UserEntry::Summary(_) => None,
            UserEntry::Detail(detail) => Some(detail),
        }
    }
}

impl From<UserSummary> for UserEntry {
    fn from(summary: UserSummary) -> Self {
        UserEntry::Summary(summary)
    }
}

impl From<UserDetail> for UserEntry {
    fn from(detail: UserDetail) -> Self {
        UserEntry::Detail(Box::new(detail))
    }
}

/// Outcome of loading a single profile page.
///
/// Any failure to fetch the profile is reported as `NotFound`, the same way
/// for a missing user as for a network error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfilePage {
    Found(Box<UserDetail>),
    NotFound,
}
