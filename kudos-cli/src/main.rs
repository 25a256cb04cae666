use std::sync::Arc;
use std::time::Duration;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use kudos_common::models::Platform;
use kudos_core::stores::{HttpStreamerStore, MemoryStreamerStore};
use kudos_core::{KudosConfig, StreamerStore};

mod commands;

#[derive(Parser, Debug, Clone)]
#[command(name = "kudos")]
#[command(author, version, about = "Kudos - streamer roster with coalesced voting")]
struct Args {
    /// Base URL of the roster backend (overrides KUDOS_STORE_URL)
    #[arg(long)]
    store_url: Option<Url>,

    /// Use a throwaway in-memory roster seeded with demo streamers
    #[arg(long, default_value = "false")]
    memory: bool,

    /// Quiet time after the last vote before it is saved (overrides KUDOS_DEBOUNCE_MS)
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// What to do when a vote fails to save: silent, retry or alert
    #[arg(long)]
    save_policy: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// List every streamer with its score
    List,

    /// Show one streamer
    Show { streamer_id: i64 },

    /// Cast votes, e.g. `kudos vote 17 up up down`
    Vote {
        streamer_id: i64,
        #[arg(required = true, value_parser = commands::parse_vote)]
        votes: Vec<i64>,
    },

    /// Create a streamer
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// platform=url, repeatable
        #[arg(long = "link", value_parser = commands::parse_link)]
        links: Vec<(Platform, String)>,
    },

    /// Edit an existing streamer
    Edit {
        streamer_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// platform=url; replaces the link if the platform is already set
        #[arg(long = "link", value_parser = commands::parse_link)]
        links: Vec<(Platform, String)>,
        /// Platform link to delete, repeatable
        #[arg(long = "remove", value_parser = commands::parse_platform)]
        remove: Vec<Platform>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kudos=info,kudos_core=info"));
    let sub = fmt().with_env_filter(filter).finish();
    if tracing::subscriber::set_global_default(sub).is_err() {
        eprintln!("tracing subscriber already set");
    }
}

fn build_config(args: &Args) -> anyhow::Result<KudosConfig> {
    let mut cfg = KudosConfig::from_env()?;
    if let Some(url) = &args.store_url {
        cfg.store_url = url.clone();
    }
    if let Some(ms) = args.debounce_ms {
        cfg.votes.debounce = Duration::from_millis(ms);
    }
    if let Some(policy) = &args.save_policy {
        cfg.set_save_policy(policy)?;
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let cfg = build_config(&args)?;

    let store: Arc<dyn StreamerStore> = if args.memory {
        info!("Using in-memory roster");
        Arc::new(MemoryStreamerStore::with_streamers(commands::demo_roster()))
    } else {
        info!("Using roster backend at {}", cfg.store_url);
        Arc::new(HttpStreamerStore::new(cfg.store_url.clone()))
    };

    let result = match args.command {
        Command::List => commands::list(store).await,
        Command::Show { streamer_id } => commands::show(store, streamer_id).await,
        Command::Vote { streamer_id, votes } => {
            commands::vote(store, &cfg, streamer_id, &votes).await
        }
        Command::Create { name, description, links } => {
            commands::create(store, &cfg, &name, &description, &links).await
        }
        Command::Edit { streamer_id, name, description, links, remove } => {
            let edit = commands::EditRequest { name, description, links, remove };
            commands::edit(store, &cfg, streamer_id, edit).await
        }
    };

    if let Err(e) = &result {
        error!("kudos failed: {:#}", e);
    }
    result
}
