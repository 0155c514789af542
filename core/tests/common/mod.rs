//! In-memory `Transport` with per-URL canned responses and delays.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use directory_core::{ApiError, HttpRequest, HttpResponse, Transport};

pub const BASE_URL: &str = "http://directory.test";

#[derive(Clone)]
struct Scripted {
    delay: Duration,
    outcome: Result<HttpResponse, ApiError>,
}

/// Unknown URLs answer 404 like the real API.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, Scripted>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, status: u16, body: &str) {
        self.respond_after(path, Duration::ZERO, status, body);
    }

    pub fn respond_after(&self, path: &str, delay: Duration, status: u16, body: &str) {
        self.routes.lock().unwrap().insert(
            format!("{BASE_URL}{path}"),
            Scripted {
                delay,
                outcome: Ok(HttpResponse::new(status, body)),
            },
        );
    }

    pub fn fail(&self, path: &str, message: &str) {
        self.routes.lock().unwrap().insert(
            format!("{BASE_URL}{path}"),
            Scripted {
                delay: Duration::ZERO,
                outcome: Err(ApiError::NetworkError(message.to_string())),
            },
        );
    }

    /// Paths (without the base URL) of every request executed so far.
    pub fn paths(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.trim_start_matches(BASE_URL).to_string())
            .collect()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn paths_starting_with(&self, prefix: &str) -> Vec<String> {
        self.paths().into_iter().filter(|p| p.starts_with(prefix)).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.log.lock().unwrap().push(request.clone());
        let scripted = self.routes.lock().unwrap().get(&request.url).cloned();
        match scripted {
            Some(scripted) => {
                if !scripted.delay.is_zero() {
                    tokio::time::sleep(scripted.delay).await;
                }
                scripted.outcome
            }
            None => Ok(HttpResponse::new(404, r#"{"message":"Not Found"}"#)),
        }
    }
}
