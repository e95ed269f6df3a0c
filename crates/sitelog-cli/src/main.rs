//! sitelog - construction procurement and vendor follow-up dashboard.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sitelog_core::InboxFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod config;
mod display;
mod session_file;

use commands::Env;
use config::Config;

/// sitelog - procurement tracking and vendor follow-up dashboard
#[derive(Parser, Debug)]
#[command(name = "sitelog")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "SITELOG_API_URL")]
    api_url: Option<String>,

    /// Path to the TOML configuration file
    #[arg(long, env = "SITELOG_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the persisted session file
    #[arg(long, env = "SITELOG_SESSION")]
    session_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides
    #[arg(long, env = "SITELOG_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    // === Session ===
    /// Sign in with an email from the user directory
    Login {
        /// Email address
        email: String,
    },

    /// Sign out and remove the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    // === Procurement ===
    /// List projects known to the backend
    Projects,

    /// Extract and show the risk-sorted procurement log for a project (project managers)
    Procurement {
        /// Project name (defaults to the first configured project)
        #[arg(short, long)]
        project: Option<String>,
    },

    // === Non-responsive threads ===
    /// List non-responsive vendor threads visible to your role
    Threads {
        /// Project name
        #[arg(short, long)]
        project: String,
    },

    /// Show one thread's details and conversation history
    Thread {
        /// Project name
        #[arg(short, long)]
        project: String,

        /// Row number from `sitelog threads`
        index: usize,
    },

    /// Draft an AI follow-up reply to a thread's vendor (project managers)
    Reply {
        /// Project name
        #[arg(short, long)]
        project: String,

        /// Row number from `sitelog threads`
        index: usize,

        /// Send the draft instead of only printing it
        #[arg(long)]
        send: bool,
    },

    /// Draft an escalation email for a thread
    Escalate {
        /// Project name
        #[arg(short, long)]
        project: String,

        /// Row number from `sitelog threads`
        index: usize,

        /// Send the draft instead of only printing it
        #[arg(long)]
        send: bool,
    },

    // === Inbox ===
    /// Show AI summaries of a project's inbox
    Inbox {
        /// Project name
        #[arg(short, long)]
        project: String,

        /// Only this category ("All" for every category)
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive text search
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Ask for suggested replies to an inbox email
    Suggest {
        /// Project name
        #[arg(short, long)]
        project: String,

        /// Row number from `sitelog inbox` with the same filters
        index: usize,

        /// Category filter used when listing the inbox
        #[arg(short, long)]
        category: Option<String>,

        /// Search filter used when listing the inbox
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Send an email through the backend
    Send {
        #[arg(long)]
        to: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        body: String,
    },

    // === Overview ===
    /// Load procurement and threads for every configured project
    Dashboard {
        /// Retry a failed source once before reporting it
        #[arg(long)]
        retry: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("sitelog={},warn", cli.log_level)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let config = Config::load(&config_path)?;
    let env = Env {
        api_url: config.resolve_api_url(cli.api_url.as_deref()),
        session_path: cli
            .session_file
            .unwrap_or_else(config::default_session_path),
        config,
    };
    tracing::debug!(api_url = %env.api_url, "sitelog v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Login { email } => commands::login(&env, &email),
        Commands::Logout => commands::logout(&env),
        Commands::Whoami => commands::whoami(&env),
        Commands::Projects => commands::projects(&env).await,
        Commands::Procurement { project } => commands::procurement(&env, project).await,
        Commands::Threads { project } => commands::threads(&env, &project).await,
        Commands::Thread { project, index } => commands::thread(&env, &project, index).await,
        Commands::Reply {
            project,
            index,
            send,
        } => commands::reply(&env, &project, index, send).await,
        Commands::Escalate {
            project,
            index,
            send,
        } => commands::escalate(&env, &project, index, send).await,
        Commands::Inbox {
            project,
            category,
            search,
        } => commands::inbox(&env, &project, InboxFilter { category, search }).await,
        Commands::Suggest {
            project,
            index,
            category,
            search,
        } => commands::suggest(&env, &project, index, InboxFilter { category, search }).await,
        Commands::Send { to, subject, body } => commands::send(&env, to, subject, body).await,
        Commands::Dashboard { retry } => commands::dashboard(&env, retry).await,
    }
}
