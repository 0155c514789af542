//! Process configuration: defaults, then `directory.toml`, then environment.
//!
//! Command-line flags are applied on top by `main`.

use std::{
    fs, io,
    path::Path,
    time::Duration,
};

use anyhow::Context;
use directory_core::{
    DEFAULT_BASE_URL, DEFAULT_DEBOUNCE, DEFAULT_ENRICH_CONCURRENCY, DEFAULT_PAGE_SIZE,
    DEFAULT_TIMEOUT,
};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "directory.toml";

#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub token: Option<String>,
    pub page_size: u32,
    pub debounce: Duration,
    pub enrich: bool,
    pub enrich_concurrency: usize,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("page_size", &self.page_size)
            .field("debounce", &self.debounce)
            .field("enrich", &self.enrich)
            .field("enrich_concurrency", &self.enrich_concurrency)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.into(),
            token: None,
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
            enrich: false,
            enrich_concurrency: DEFAULT_ENRICH_CONCURRENCY,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    token: Option<String>,
    page_size: Option<u32>,
    debounce_ms: Option<u64>,
    enrich: Option<bool>,
    enrich_concurrency: Option<usize>,
    timeout_secs: Option<u64>,
}

/// Load settings. A missing default config file is fine; a missing file that
/// was asked for explicitly is not.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, explicit) = match path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(path) {
        Ok(raw) => {
            let file: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            settings.apply_file(file);
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound && !explicit => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()));
        }
    }

    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}

impl Settings {
    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.api_url {
            self.api_url = v;
        }
        if let Some(v) = file.token {
            self.token = Some(v);
        }
        if let Some(v) = file.page_size {
            self.page_size = v;
        }
        if let Some(v) = file.debounce_ms {
            self.debounce = Duration::from_millis(v);
        }
        if let Some(v) = file.enrich {
            self.enrich = v;
        }
        if let Some(v) = file.enrich_concurrency {
            self.enrich_concurrency = v;
        }
        if let Some(v) = file.timeout_secs {
            self.request_timeout = Duration::from_secs(v);
        }
        self.normalize_token();
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("GITHUB_TOKEN") {
            self.token = Some(v);
        }
        if let Some(v) = lookup("DIRECTORY_API_URL") {
            self.api_url = v;
        }
        if let Some(v) = parsed(&lookup, "DIRECTORY_PAGE_SIZE") {
            self.page_size = v;
        }
        if let Some(v) = parsed(&lookup, "DIRECTORY_DEBOUNCE_MS") {
            self.debounce = Duration::from_millis(v);
        }
        if let Some(v) = parsed(&lookup, "DIRECTORY_ENRICH") {
            self.enrich = v;
        }
        if let Some(v) = parsed(&lookup, "DIRECTORY_TIMEOUT_SECS") {
            self.request_timeout = Duration::from_secs(v);
        }
        self.normalize_token();
    }

    fn normalize_token(&mut self) {
        if self.token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            self.token = None;
        }
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}
