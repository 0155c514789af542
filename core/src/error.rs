//! Error types for the directory client.
//!
//! # Design
//! Every non-2xx response lands in `HttpError` with the status code and its
//! reason phrase; callers that need "not found" match on `status == 404`.
//! `FormatError` covers a successful response whose body does not have the
//! listing or profile shape. Transport failures (DNS, refused connection,
//! timeout) become `NetworkError`.

use thiserror::Error;

/// Errors returned by `DirectoryClient` parse methods and `Directory` calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("Error {status}: {status_text}")]
    HttpError { status: u16, status_text: String },

    /// The response body is not a listing, a search result or a profile.
    #[error("unexpected response format: {0}")]
    FormatError(String),

    /// The request never produced a response.
    #[error("network error: {0}")]
    NetworkError(String),

    /// A profile was requested for an empty handle; nothing was sent.
    #[error("invalid handle: {0:?}")]
    InvalidHandle(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::HttpError { status: 404, .. })
    }
}

/// Misuse of a `Session` scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("favorites accessed outside a session that provides a FavoritesStore")]
    FavoritesNotProvided,
}
