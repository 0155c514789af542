//! One-shot `list` and `show` commands.

use anyhow::{bail, Result};
use directory_core::{Directory, ProfilePage, Session};

use crate::views;

pub async fn list(directory: &Directory, session: &Session, query: &str, enrich: bool) -> Result<String> {
    let entries = directory.fetch_users(query, enrich).await?;
    Ok(views::render_list(&entries, session.favorites()?))
}

pub async fn show(directory: &Directory, session: &Session, handle: &str) -> Result<String> {
    match directory.load_profile(handle).await {
        ProfilePage::Found(user) => Ok(views::render_profile(&user, session.favorites()?)),
        ProfilePage::NotFound => bail!("user {handle:?} not found"),
    }
}
