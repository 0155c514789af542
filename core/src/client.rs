//! Stateless HTTP request builder and response parser for the directory API.
//!
//! # Design
//! `DirectoryClient` holds the base URL, the listing page size and the
//! optional bearer token, and carries no mutable state between calls. Each
//! endpoint is split into a `build_*` method that produces an `HttpRequest`
//! and a `parse_*` method that consumes an `HttpResponse`. The round-trip in
//! between belongs to a `Transport`.
//!
//! Listing and search answer with different shapes: the default listing is a
//! bare JSON array, search wraps the array in `items`. `parse_users` folds
//! both into one `Vec<UserSummary>` and drops entries that are `null`,
//! undecodable, or lack a login.

use std::fmt;

use serde_json::Value;
use tracing::debug;
use url::{form_urlencoded, Url};

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{UserDetail, UserSummary};

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

const ACCEPT: &str = "application/vnd.github+json";

/// The search term of `query`, or `None` when it selects the default listing.
pub fn search_term(query: &str) -> Option<&str> {
    let term = query.trim();
    (!term.is_empty()).then_some(term)
}

/// Synchronous, stateless client for the directory API.
#[derive(Clone)]
pub struct DirectoryClient {
    base_url: String,
    page_size: u32,
    token: Option<String>,
}

impl fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl DirectoryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            token: None,
        }
    }

    /// Attach a bearer token. Empty tokens count as no token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn build_list_users(&self) -> HttpRequest {
        self.request(format!("{}/users?per_page={}", self.base_url, self.page_size))
    }

    pub fn build_search_users(&self, term: &str) -> HttpRequest {
        self.request(format!("{}/search/users?q={}", self.base_url, escape(term)))
    }

    /// Listing request for an empty query, search request otherwise.
    pub fn build_users_request(&self, query: &str) -> HttpRequest {
        match search_term(query) {
            Some(term) => self.build_search_users(term),
            None => self.build_list_users(),
        }
    }

    pub fn build_get_user(&self, handle: &str) -> Result<HttpRequest, ApiError> {
        let handle = handle.trim();
        if handle.is_empty() {
            return Err(ApiError::InvalidHandle(handle.to_string()));
        }
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::NetworkError(format!("invalid base URL {:?}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::NetworkError(format!("base URL {:?} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(["users", handle]);
        Ok(self.request(url.into()))
    }

    /// Normalize a listing or search response for `query` into summaries.
    pub fn parse_users(&self, query: &str, response: HttpResponse) -> Result<Vec<UserSummary>, ApiError> {
        check_status(&response)?;
        let body: Value = serde_json::from_str(&response.body).map_err(|e| ApiError::FormatError(e.to_string()))?;
        let entries = match search_term(query) {
            Some(_) => search_items(body)?,
            None => listing_items(body)?,
        };
        Ok(collect_summaries(entries))
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<UserDetail, ApiError> {
        check_status(&response)?;
        let user: UserDetail =
            serde_json::from_str(&response.body).map_err(|e| ApiError::FormatError(e.to_string()))?;
        if user.login().trim().is_empty() {
            return Err(ApiError::FormatError("profile has an empty login".to_string()));
        }
        Ok(user)
    }

    fn request(&self, url: String) -> HttpRequest {
        let mut request = HttpRequest::get(url);
        request.headers.push(("accept".to_string(), ACCEPT.to_string()));
        if let Some(token) = &self.token {
            request
                .headers
                .push(("authorization".to_string(), format!("Bearer {token}")));
        }
        request
    }
}

fn escape(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Map non-success status codes to `ApiError::HttpError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        status_text: response.status_text(),
    })
}

fn search_items(body: Value) -> Result<Vec<Value>, ApiError> {
    let Value::Object(mut object) = body else {
        return Err(ApiError::FormatError("search response is not an object".to_string()));
    };
    match object.remove("items") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ApiError::FormatError("search `items` is not an array".to_string())),
    }
}

fn listing_items(body: Value) -> Result<Vec<Value>, ApiError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        _ => Err(ApiError::FormatError("listing response is not an array".to_string())),
    }
}

fn collect_summaries(entries: Vec<Value>) -> Vec<UserSummary> {
    entries
        .into_iter()
        .filter(|entry| !entry.is_null())
        .filter_map(|entry| match serde_json::from_value::<UserSummary>(entry) {
            Ok(user) if !user.login.trim().is_empty() => Some(user),
            Ok(user) => {
                debug!(id = user.id, "dropping listing entry without a login");
                None
            }
            Err(err) => {
                debug!(%err, "dropping malformed listing entry");
                None
            }
        })
        .collect()
}
