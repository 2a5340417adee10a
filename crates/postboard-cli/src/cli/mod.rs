//! CLI entry and dispatch.

use std::fs;
use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use postboard_core::FlowOutcome;
use postboard_core::config::{self, Config};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

mod commands;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "POSTBOARD_LOG";

#[derive(Parser)]
#[command(name = "postboard")]
#[command(version)]
#[command(about = "Post and read on a postboard service from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Mirror debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create an account
    Register {
        /// Display name
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(long, env = "POSTBOARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log in and keep the session for later commands
    Login {
        #[arg(long)]
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(long, env = "POSTBOARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// End the session
    Logout,

    /// Check the session with the server and show who is logged in
    Status,

    /// Read and publish posts
    Posts {
        #[command(subcommand)]
        command: PostsCommands,
    },

    /// Show the logged-in user's profile
    Profile,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Interactive session
    Shell,
}

#[derive(clap::Subcommand)]
enum PostsCommands {
    /// List every post, newest first
    List,
    /// Publish a new post
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

/// A flow or session check ended without success. The user has already
/// been told why through a notice, so `main` only sets the exit code.
#[derive(Debug, thiserror::Error)]
#[error("command did not complete: {0}")]
pub struct FlowFailed(pub String);

/// Maps a flow outcome onto the process result.
pub(crate) fn finish(outcome: FlowOutcome) -> Result<()> {
    if outcome.is_success() {
        Ok(())
    } else {
        Err(FlowFailed(format!("{outcome:?}")).into())
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose);

    // one current-thread runtime; every command is a single sequential flow
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(&config, &name, &email, password).await,
        Commands::Login { email, password } => {
            commands::auth::login(&config, &email, password).await
        }
        Commands::Logout => commands::auth::logout(&config).await,
        Commands::Status => commands::auth::status(&config).await,
        Commands::Posts { command } => match command {
            PostsCommands::List => commands::posts::list(&config).await,
            PostsCommands::Create { title, content } => {
                commands::posts::create(&config, &title, &content).await
            }
        },
        Commands::Profile => commands::profile::show(&config).await,
        Commands::Shell => commands::shell::run(&config).await,
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}

/// Logs go to `<home>/logs/postboard.log`, filtered by `POSTBOARD_LOG`
/// (default `warn`). `--verbose` adds a debug-level stderr layer.
///
/// Logging is never fatal: if the log directory cannot be created the file
/// layer is skipped.
fn init_logging(verbose: bool) -> Option<WorkerGuard> {
    let logs_dir = config::paths::logs_dir();
    let file_writer = fs::create_dir_all(&logs_dir)
        .ok()
        .and_then(|()| {
            RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix("postboard")
                .filename_suffix("log")
                .build(&logs_dir)
                .ok()
        })
        .map(tracing_appender::non_blocking);

    let (file_layer, guard) = match file_writer {
        Some((writer, guard)) => {
            let filter =
                EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_filter(EnvFilter::new("postboard=debug,postboard_core=debug"))
    });

    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init();

    guard
}
