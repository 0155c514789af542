mod browse;
mod commands;
mod config;
mod views;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use directory_core::{Directory, DirectoryClient, FetchOptions, ReqwestTransport, Session};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::Settings;

#[derive(Parser, Debug)]
#[command(name = "directory", version, about = "Browse a public user directory")]
struct Args {
    /// Config file (default: ./directory.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory API base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Users per page in the default listing.
    #[arg(long, global = true)]
    page_size: Option<u32>,
    /// Fetch every listed profile before showing results.
    #[arg(long, global = true)]
    enrich: bool,
    /// Search debounce in milliseconds (browse only).
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the default listing, or search results for --query.
    List {
        #[arg(long, short, default_value = "")]
        query: String,
    },
    /// Print one profile.
    Show { handle: String },
    /// Search interactively and keep favorites for the session.
    Browse,
}

impl Args {
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(v) = &self.api_url {
            settings.api_url = v.clone();
        }
        if let Some(v) = self.page_size {
            settings.page_size = v;
        }
        if self.enrich {
            settings.enrich = true;
        }
        if let Some(v) = self.debounce_ms {
            settings.debounce = std::time::Duration::from_millis(v);
        }
        settings
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = args.apply(config::load_settings(args.config.as_deref())?);
    debug!(?settings, "loaded settings");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(args.command, settings))
}

async fn run(command: Command, settings: Settings) -> Result<()> {
    let transport = ReqwestTransport::new(settings.request_timeout)?;
    let client = DirectoryClient::new(&settings.api_url)
        .with_token(settings.token.clone())
        .with_page_size(settings.page_size);
    if !client.has_token() {
        debug!("no token configured, calling the directory unauthenticated");
    }
    let directory = Directory::new(client, Arc::new(transport))
        .with_enrich_concurrency(settings.enrich_concurrency);

    let mut session = Session::new();
    session.provide_favorites();

    match command {
        Command::List { query } => {
            print!("{}", commands::list(&directory, &session, &query, settings.enrich).await?);
        }
        Command::Show { handle } => {
            print!("{}", commands::show(&directory, &session, &handle).await?);
        }
        Command::Browse => {
            let options = FetchOptions {
                debounce: settings.debounce,
                enrich: settings.enrich,
                track_errors: true,
            };
            browse::run(directory, options, &session).await?;
        }
    }
    Ok(())
}
