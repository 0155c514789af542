//! Interactive session: each plain line becomes the search query; lines
//! starting with `:` are commands.

use anyhow::Result;
use directory_core::{
    Directory, FavoritesStore, FetchOptions, FetchPhase, FetchState, ProfilePage,
    SearchOrchestrator, Session,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::info;

use crate::views;

const HELP: &str = "\
Type to search, an empty line for the default listing.
  :fav <handle>   toggle a favorite
  :favs           list favorites
  :show <handle>  show a profile
  :list           print the current results again
  :help           this message
  :quit           leave
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Query(String),
    Favorite(String),
    Favorites,
    Show(String),
    List,
    Help,
    Quit,
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Input::Query(line.to_string());
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match (name, arg) {
        ("fav", handle) if !handle.is_empty() => Input::Favorite(handle.to_string()),
        ("favs", _) => Input::Favorites,
        ("show", handle) if !handle.is_empty() => Input::Show(handle.to_string()),
        ("list", _) => Input::List,
        ("q" | "quit", _) => Input::Quit,
        _ => Input::Help,
    }
}

pub async fn run(directory: Directory, options: FetchOptions, session: &Session) -> Result<()> {
    let favorites = session.favorites()?.clone();
    let orchestrator = SearchOrchestrator::start(directory.clone(), options);
    let printer = tokio::spawn(print_updates(orchestrator.subscribe(), favorites.clone()));
    print!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Query(query) => orchestrator.set_query(query),
            Input::Favorite(handle) => {
                let now = favorites.toggle_favorite(&handle);
                info!(handle = %handle, favorite = now, "toggled favorite");
                println!("{} {handle}", if now { "★ added" } else { "☆ removed" });
            }
            Input::Favorites => print!("{}", views::render_favorites(&favorites)),
            Input::Show(handle) => match directory.load_profile(&handle).await {
                ProfilePage::Found(user) => print!("{}", views::render_profile(&user, &favorites)),
                ProfilePage::NotFound => println!("user {handle:?} not found"),
            },
            Input::List => print!("{}", views::render_list(&orchestrator.results(), &favorites)),
            Input::Help => print!("{HELP}"),
            Input::Quit => break,
        }
    }

    printer.abort();
    Ok(())
}

/// Print results when a fetch settles and a status line while loading.
async fn print_updates(mut rx: watch::Receiver<FetchState>, favorites: FavoritesStore) {
    let mut last: Option<(FetchPhase, Option<String>)> = None;
    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        let key = (state.phase, state.settled_query.clone());
        if last.as_ref() == Some(&key) {
            continue;
        }
        last = Some(key);

        if let Some(status) = views::render_status(&state) {
            eprintln!("{status}");
        }
        if state.phase == FetchPhase::Ready {
            print!("{}", views::render_list(&state.results, &favorites));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_queries() {
        assert_eq!(parse_input("  octo  "), Input::Query("octo".to_string()));
        assert_eq!(parse_input(""), Input::Query(String::new()));
    }

    #[test]
    fn commands_take_handles() {
        assert_eq!(parse_input(":fav octocat"), Input::Favorite("octocat".to_string()));
        assert_eq!(parse_input(":show  mona "), Input::Show("mona".to_string()));
        assert_eq!(parse_input(":favs"), Input::Favorites);
        assert_eq!(parse_input(":list"), Input::List);
        assert_eq!(parse_input(":quit"), Input::Quit);
        assert_eq!(parse_input(":q"), Input::Quit);
    }

    #[test]
    fn malformed_commands_show_help() {
        assert_eq!(parse_input(":fav"), Input::Help);
        assert_eq!(parse_input(":show "), Input::Help);
        assert_eq!(parse_input(":nope"), Input::Help);
    }
}
