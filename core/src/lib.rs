//! Client core for a public user directory (GitHub's `/users` API shape).
//!
//! # Overview
//! `DirectoryClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network (host-does-IO pattern). A `Transport`
//! executes the round-trip; `ReqwestTransport` is the production one.
//! `Directory` strings the two together into listing, search, enrichment and
//! profile calls, and `SearchOrchestrator` drives it from a debounced query.
//!
//! # Design
//! - `DirectoryClient` is stateless: base URL, page size, optional token.
//! - Listing and search responses are normalized into `Vec<UserSummary>`;
//!   malformed entries are dropped, a malformed body is a `FormatError`.
//! - Enrichment is best effort and order-preserving.
//! - `FavoritesStore` is reachable only through a provisioned `Session`.

pub mod client;
pub mod directory;
pub mod error;
pub mod favorites;
pub mod http;
pub mod orchestrator;
pub mod transport;
pub mod types;

pub use client::{search_term, DirectoryClient, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
pub use directory::{Directory, DEFAULT_ENRICH_CONCURRENCY};
pub use error::{ApiError, SessionError};
pub use favorites::{FavoritesStore, Session};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use orchestrator::{FetchOptions, FetchPhase, FetchState, SearchOrchestrator, DEFAULT_DEBOUNCE};
pub use transport::{ReqwestTransport, Transport, DEFAULT_TIMEOUT};
pub use types::{ProfilePage, UserDetail, UserEntry, UserSummary};
