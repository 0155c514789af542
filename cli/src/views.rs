//! Plain-text rendering of listings and profiles.

use directory_core::{FavoritesStore, FetchPhase, FetchState, UserDetail, UserEntry};

const STAR: &str = "★";
const NO_STAR: &str = "☆";

fn star(favorites: &FavoritesStore, login: &str) -> &'static str {
    if favorites.is_favorite(login) {
        STAR
    } else {
        NO_STAR
    }
}

pub fn render_list(entries: &[UserEntry], favorites: &FavoritesStore) -> String {
    if entries.is_empty() {
        return "No users found\n".to_string();
    }
    let mut out = String::new();
    for (index, entry) in entries.iter().enumerate() {
        let summary = entry.summary();
        out.push_str(&format!(
            "{:>3}. {} {:<24} {}",
            index + 1,
            star(favorites, &summary.login),
            summary.login,
            summary.html_url
        ));
        if let Some(detail) = entry.detail() {
            out.push_str(&format!(
                "  ({}, {} followers)",
                detail.display_name(),
                detail.followers
            ));
        }
        out.push('\n');
    }
    out
}

pub fn render_profile(user: &UserDetail, favorites: &FavoritesStore) -> String {
    let mut out = format!(
        "{} {}\n@{}\n",
        user.display_name(),
        star(favorites, user.login()),
        user.login()
    );
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        out.push_str(&format!("\n{bio}\n"));
    }
    out.push_str(&format!(
        "\n{} repositories · {} followers · {} following\n",
        user.public_repos, user.followers, user.following
    ));
    for (label, value) in [
        ("company", user.company.as_deref()),
        ("location", user.location.as_deref()),
    ] {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            out.push_str(&format!("{label:<9} {value}\n"));
        }
    }
    if let Some(blog) = user.blog_url() {
        out.push_str(&format!("{:<9} {blog}\n", "blog"));
    }
    if !user.summary.html_url.is_empty() {
        out.push_str(&format!("{:<9} {}\n", "profile", user.summary.html_url));
    }
    out
}

pub fn render_favorites(favorites: &FavoritesStore) -> String {
    let handles = favorites.favorites();
    if handles.is_empty() {
        return "No favorites yet\n".to_string();
    }
    handles
        .iter()
        .map(|handle| format!("{STAR} {handle}\n"))
        .collect()
}

/// Status line for a state change, or `None` when nothing should be shown.
pub fn render_status(state: &FetchState) -> Option<String> {
    match state.phase {
        FetchPhase::Idle | FetchPhase::Ready => None,
        FetchPhase::Loading if state.query.trim().is_empty() => Some("Loading users…".to_string()),
        FetchPhase::Loading => Some(format!("Searching for {:?}…", state.query.trim())),
        FetchPhase::Failed => state.error.as_ref().map(|err| format!("error: {err}")),
    }
}
