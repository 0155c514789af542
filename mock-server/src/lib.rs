use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

const DEFAULT_PER_PAGE: usize = 30;
const MAX_PER_PAGE: usize = 100;

/// Users served by the mock, as raw JSON so tests can plant malformed entries.
#[derive(Clone, Debug, Default)]
pub struct DirectoryData {
    /// Listing entries in `/users` order. May contain `null` or junk.
    pub users: Vec<Value>,
    /// Profiles by login; a login without one answers 404.
    pub details: HashMap<String, Value>,
    /// Returned verbatim by `/users` instead of the listing, when set.
    pub listing_body: Option<Value>,
    /// Returned verbatim by `/search/users` instead of matching, when set.
    pub search_body: Option<Value>,
}

impl DirectoryData {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A handful of well-known accounts, each with a profile.
    pub fn seeded() -> Self {
        [
            ("mojombo", 1, "Tom Preston-Werner", Some("@chatterbugapp"), Some("San Francisco"), Some("http://tom.preston-werner.com")),
            ("defunkt", 2, "Chris Wanstrath", None, None, Some("http://chriswanstrath.com/")),
            ("pjhyett", 3, "PJ Hyett", Some("GitHub, Inc."), Some("San Francisco"), Some("https://hyett.com")),
            ("wycats", 4, "Yehuda Katz", Some("Tilde, Inc."), Some("Portland, OR"), Some("http://yehudakatz.com")),
            ("ezmobius", 5, "Ezra Zygmuntowicz", None, Some("In the NW"), None),
            ("ivey", 6, "Michael D. Ivey", Some("Speakeasy"), Some("Bay Minette, AL"), Some("http://gweezlebur.com")),
            ("evanphx", 7, "Evan Phoenix", Some("Mirendo"), Some("Los Angeles, CA"), Some("http://blog.fallingsnow.net")),
            ("octocat", 583231, "The Octocat", Some("@github"), Some("San Francisco"), Some("github.blog")),
        ]
        .into_iter()
        .fold(Self::empty(), |data, (login, id, name, company, location, blog)| {
            data.with_user(login, id).with_detail(
                login,
                profile(login, id, name, company, location, blog),
            )
        })
    }

    /// Append a listing entry with the usual summary fields.
    pub fn with_user(mut self, login: &str, id: u64) -> Self {
        self.users.push(summary(login, id));
        self
    }

    /// Append a raw listing entry, e.g. `Value::Null`.
    pub fn with_raw_user(mut self, entry: Value) -> Self {
        self.users.push(entry);
        self
    }

    pub fn with_detail(mut self, login: &str, detail: Value) -> Self {
        self.details.insert(login.to_ascii_lowercase(), detail);
        self
    }

    pub fn with_listing_body(mut self, body: Value) -> Self {
        self.listing_body = Some(body);
        self
    }

    pub fn with_search_body(mut self, body: Value) -> Self {
        self.search_body = Some(body);
        self
    }
}

pub fn summary(login: &str, id: u64) -> Value {
    json!({
        "login": login,
        "id": id,
        "avatar_url": format!("https://avatars.githubusercontent.com/u/{id}?v=4"),
        "html_url": format!("https://github.com/{login}"),
        "type": "User",
    })
}

pub fn profile(
    login: &str,
    id: u64,
    name: &str,
    company: Option<&str>,
    location: Option<&str>,
    blog: Option<&str>,
) -> Value {
    let mut value = summary(login, id);
    if let Value::Object(fields) = &mut value {
        fields.insert("name".into(), json!(name));
        fields.insert("company".into(), json!(company));
        fields.insert("location".into(), json!(location));
        fields.insert("blog".into(), json!(blog.unwrap_or("")));
        fields.insert("bio".into(), Value::Null);
        fields.insert("public_repos".into(), json!(id % 97));
        fields.insert("followers".into(), json!(id % 1000 + 10));
        fields.insert("following".into(), json!(id % 13));
    }
    value
}

/// One request as seen by the mock.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

/// Every request the mock has answered, in arrival order.
#[derive(Clone, Debug, Default)]
pub struct RequestLog(Arc<Mutex<Vec<RecordedRequest>>>);

impl RequestLog {
    pub fn entries(&self) -> Vec<RecordedRequest> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Requests whose path starts with `prefix`.
    pub fn matching(&self, prefix: &str) -> Vec<RecordedRequest> {
        self.entries()
            .into_iter()
            .filter(|r| r.path.starts_with(prefix))
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn push(&self, request: RecordedRequest) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(request);
    }
}

pub type Db = Arc<RwLock<DirectoryData>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    log: RequestLog,
}

pub fn app() -> Router {
    app_with(DirectoryData::seeded()).0
}

/// Router over `data`, plus the log it records into.
pub fn app_with(data: DirectoryData) -> (Router, RequestLog) {
    let state = AppState {
        db: Arc::new(RwLock::new(data)),
        log: RequestLog::default(),
    };
    let log = state.log.clone();
    let router = Router::new()
        .route("/users", get(list_users))
        .route("/search/users", get(search_users))
        .route("/users/{login}", get(get_user))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state);
    (router, log)
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

async fn record(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.log.push(RecordedRequest {
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        authorization,
    });
    next.run(request).await
}

#[derive(Deserialize)]
struct ListParams {
    per_page: Option<usize>,
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Not Found", "status": "404" })),
    )
}

async fn list_users(State(state): State<AppState>, Query(params): Query<ListParams>) -> Json<Value> {
    let data = state.db.read().await;
    if let Some(body) = &data.listing_body {
        return Json(body.clone());
    }
    let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    Json(Value::Array(data.users.iter().take(per_page).cloned().collect()))
}

async fn search_users(State(state): State<AppState>, Query(params): Query<SearchParams>) -> ApiResult {
    let data = state.db.read().await;
    if let Some(body) = &data.search_body {
        return Ok(Json(body.clone()));
    }
    let term = params.q.unwrap_or_default().trim().to_ascii_lowercase();
    if term.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "Validation Failed" })),
        ));
    }
    let items: Vec<Value> = data
        .users
        .iter()
        .filter(|user| {
            user.get("login")
                .and_then(Value::as_str)
                .is_some_and(|login| login.to_ascii_lowercase().contains(&term))
        })
        .cloned()
        .collect();
    Ok(Json(json!({
        "total_count": items.len(),
        "incomplete_results": false,
        "items": items,
    })))
}

async fn get_user(State(state): State<AppState>, Path(login): Path<String>) -> ApiResult {
    let data = state.db.read().await;
    data.details
        .get(&login.to_ascii_lowercase())
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_has_profiles_for_every_listed_user() {
        let data = DirectoryData::seeded();
        assert_eq!(data.users.len(), 8);
        for user in &data.users {
            let login = user["login"].as_str().unwrap();
            assert!(data.details.contains_key(login), "{login}");
        }
    }

    #[test]
    fn profile_extends_summary() {
        let value = profile("octocat", 583231, "The Octocat", Some("@github"), None, Some("github.blog"));
        assert_eq!(value["login"], "octocat");
        assert_eq!(value["html_url"], "https://github.com/octocat");
        assert_eq!(value["name"], "The Octocat");
        assert_eq!(value["location"], Value::Null);
        assert_eq!(value["blog"], "github.blog");
    }

    #[test]
    fn details_are_keyed_case_insensitively() {
        let data = DirectoryData::empty().with_detail("OctoCat", json!({ "login": "OctoCat" }));
        assert!(data.details.contains_key("octocat"));
    }

    #[test]
    fn request_log_filters_by_prefix() {
        let log = RequestLog::default();
        log.push(RecordedRequest {
            path: "/search/users".into(),
            query: Some("q=oct".into()),
            authorization: None,
        });
        log.push(RecordedRequest {
            path: "/users".into(),
            query: Some("per_page=20".into()),
            authorization: None,
        });
        assert_eq!(log.matching("/search").len(), 1);
        log.clear();
        assert!(log.entries().is_empty());
    }
}
