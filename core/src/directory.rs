//! Listing, search, enrichment and profile fetches over a `Transport`.
//!
//! # Design
//! `Directory` pairs a `DirectoryClient` with a shared transport and is cheap
//! to clone. Listing errors propagate to the caller. Enrichment is best
//! effort: a failed profile fetch leaves the summary in place. Profile pages
//! collapse every failure into `ProfilePage::NotFound`.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::client::{search_term, DirectoryClient};
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{ProfilePage, UserDetail, UserEntry, UserSummary};

pub const DEFAULT_ENRICH_CONCURRENCY: usize = 8;

#[derive(Clone)]
pub struct Directory {
    client: DirectoryClient,
    transport: Arc<dyn Transport>,
    enrich_concurrency: usize,
}

impl Directory {
    pub fn new(client: DirectoryClient, transport: Arc<dyn Transport>) -> Self {
        Self {
            client,
            transport,
            enrich_concurrency: DEFAULT_ENRICH_CONCURRENCY,
        }
    }

    /// Upper bound on profile fetches in flight during one enrichment.
    pub fn with_enrich_concurrency(mut self, limit: usize) -> Self {
        self.enrich_concurrency = limit.max(1);
        self
    }

    pub fn client(&self) -> &DirectoryClient {
        &self.client
    }

    /// Default listing for an empty query, search results otherwise.
    pub async fn list_users(&self, query: &str) -> Result<Vec<UserSummary>, ApiError> {
        let request = self.client.build_users_request(query);
        let response = self.transport.execute(request).await?;
        let users = self.client.parse_users(query, response)?;
        let mode = if search_term(query).is_some() { "search" } else { "listing" };
        debug!(mode, count = users.len(), "fetched users");
        Ok(users)
    }

    /// Replace each summary with its full profile where the fetch succeeds.
    ///
    /// Fetches run concurrently; the output keeps the input order.
    pub async fn enrich(&self, users: Vec<UserSummary>) -> Vec<UserEntry> {
        stream::iter(users.into_iter().filter(|user| !user.login.trim().is_empty()))
            .map(|summary| async move {
                match self.fetch_user(&summary.login).await {
                    Ok(detail) => UserEntry::from(detail),
                    Err(err) => {
                        debug!(login = %summary.login, %err, "enrichment failed, keeping summary");
                        UserEntry::from(summary)
                    }
                }
            })
            .buffered(self.enrich_concurrency)
            .collect()
            .await
    }

    /// `list_users`, followed by `enrich` when `enrich` is set.
    pub async fn fetch_users(&self, query: &str, enrich: bool) -> Result<Vec<UserEntry>, ApiError> {
        let users = self.list_users(query).await?;
        if enrich {
            Ok(self.enrich(users).await)
        } else {
            Ok(users.into_iter().map(UserEntry::from).collect())
        }
    }

    pub async fn fetch_user(&self, handle: &str) -> Result<UserDetail, ApiError> {
        let request = self.client.build_get_user(handle)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_get_user(response)
    }

    pub async fn load_profile(&self, handle: &str) -> ProfilePage {
        match self.fetch_user(handle).await {
            Ok(detail) => ProfilePage::Found(Box::new(detail)),
            Err(err) => {
                warn!(handle, %err, "profile unavailable");
                ProfilePage::NotFound
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::http::{HttpRequest, HttpResponse};

    /// Answers from a fixed URL table and records every URL it sees.
    #[derive(Default)]
    struct TableTransport {
        routes: HashMap<String, HttpResponse>,
        seen: Mutex<Vec<String>>,
    }

    impl TableTransport {
        fn route(mut self, url: &str, status: u16, body: &str) -> Self {
            self.routes.insert(url.to_string(), HttpResponse::new(status, body));
            self
        }
    }

    #[async_trait]
    impl Transport for TableTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request.url.clone());
            self.routes
                .get(&request.url)
                .cloned()
                .ok_or_else(|| ApiError::NetworkError("connection refused".to_string()))
        }
    }

    const BASE: &str = "http://dir.test";

    fn directory(transport: TableTransport) -> (Directory, Arc<TableTransport>) {
        let transport = Arc::new(transport);
        let dir = Directory::new(DirectoryClient::new(BASE), transport.clone());
        (dir, transport)
    }

    #[tokio::test]
    async fn enrich_keeps_order_and_falls_back() {
        let (dir, _) = directory(
            TableTransport::default()
                .route(
                    "http://dir.test/users/a",
                    200,
                    r#"{"login":"a","id":1,"name":"Alpha"}"#,
                )
                .route("http://dir.test/users/b", 404, r#"{"message":"Not Found"}"#)
                .route("http://dir.test/users/c", 200, r#"{"login":"c","id":3}"#),
        );
        let users = vec![
            UserSummary { login: "a".into(), id: 1, avatar_url: String::new(), html_url: String::new() },
            UserSummary { login: "b".into(), id: 2, avatar_url: String::new(), html_url: String::new() },
            UserSummary { login: "c".into(), id: 3, avatar_url: String::new(), html_url: String::new() },
            UserSummary { login: "d".into(), id: 4, avatar_url: String::new(), html_url: String::new() },
        ];

        let entries = dir.enrich(users).await;

        let logins: Vec<&str> = entries.iter().map(UserEntry::login).collect();
        assert_eq!(logins, vec!["a", "b", "c", "d"]);
        assert_eq!(entries[0].detail().and_then(|d| d.name.as_deref()), Some("Alpha"));
        assert!(entries[1].detail().is_none());
        assert!(entries[2].detail().is_some());
        assert!(entries[3].detail().is_none());
    }

    #[tokio::test]
    async fn enrich_skips_blank_logins() {
        let (dir, transport) = directory(TableTransport::default());
        let users = vec![UserSummary {
            login: " ".into(),
            id: 1,
            avatar_url: String::new(),
            html_url: String::new(),
        }];
        assert!(dir.enrich(users).await.is_empty());
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_users_without_enrichment_sends_one_request() {
        let (dir, transport) = directory(TableTransport::default().route(
            "http://dir.test/users?per_page=20",
            200,
            r#"[{"login":"a","id":1},{"login":"b","id":2}]"#,
        ));
        let entries = dir.fetch_users("", false).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(transport.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_users_propagates_http_error() {
        let (dir, _) = directory(TableTransport::default().route(
            "http://dir.test/search/users?q=oct",
            422,
            r#"{"message":"Validation Failed"}"#,
        ));
        let err = dir.list_users("oct").await.unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 422, .. }));
    }

    #[tokio::test]
    async fn load_profile_maps_failures_to_not_found() {
        let (dir, _) = directory(
            TableTransport::default()
                .route("http://dir.test/users/octocat", 200, r#"{"login":"octocat","id":1}"#)
                .route("http://dir.test/users/ghost", 404, r#"{"message":"Not Found"}"#),
        );
        assert!(matches!(dir.load_profile("octocat").await, ProfilePage::Found(_)));
        assert_eq!(dir.load_profile("ghost").await, ProfilePage::NotFound);
        assert_eq!(dir.load_profile("offline").await, ProfilePage::NotFound);
        assert_eq!(dir.load_profile("").await, ProfilePage::NotFound);
    }

    #[tokio::test]
    async fn fetch_user_propagates_errors() {
        let (dir, _) = directory(TableTransport::default());
        let err = dir.fetch_user("octocat").await.unwrap_err();
        assert!(matches!(err, ApiError::NetworkError(_)));
    }
}
