use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use discord_time::config::{AppConfig, LoggingConfig};
use discord_time::internal::live::LiveTimestamp;
use discord_time::internal::markup::render_markup;
use discord_time::utils::datetime::now_ms;
use discord_time::{DiscordTimestamp, TimestampStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

/// Render Discord-style timestamps
#[derive(Parser)]
#[command(name = "discord-time")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a config.ron file (defaults to ./config.ron or one next to the binary)
    #[arg(short, long, global = true, env = "DISCORD_TIME_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single timestamp
    Render {
        /// Unix timestamp in seconds
        #[arg(allow_hyphen_values = true)]
        seconds: i64,

        /// One of t, T, d, D, f, F, R
        #[arg(short, long)]
        style: Option<TimestampStyle>,

        /// Reference time in epoch milliseconds (defaults to now)
        #[arg(long, allow_hyphen_values = true)]
        now: Option<i64>,

        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Keep a timestamp on screen, re-rendering whenever it changes
    Watch {
        /// Unix timestamp in seconds
        #[arg(allow_hyphen_values = true)]
        seconds: i64,

        /// One of t, T, d, D, f, F, R
        #[arg(short, long)]
        style: Option<TimestampStyle>,
    },

    /// Replace every <t:SECONDS[:STYLE]> token in a message
    Markup {
        text: String,

        /// Reference time in epoch milliseconds (defaults to now)
        #[arg(long, allow_hyphen_values = true)]
        now: Option<i64>,
    },

    /// Write a default config file
    InitConfig {
        /// Destination (defaults to ./config.ron)
        path: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct RenderOutput {
    markup: String,
    text: String,
    next_update_ms: Option<u128>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first to get logging settings. A config file that
    // exists but does not parse is an error, never a silent fallback.
    let config_path = cli.config.clone().or_else(AppConfig::discover);
    let config = match &config_path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::default(),
    };
    let _guard = init_tracing(&config.logging);

    match &config_path {
        Some(path) => tracing::info!("Loaded config from {}", path.display()),
        None => tracing::info!("No config file found, using defaults"),
    }

    match cli.command {
        Commands::Render {
            seconds,
            style,
            now,
            json,
        } => {
            let renderer = config.renderer()?;
            let timestamp =
                DiscordTimestamp::new(seconds, style.unwrap_or(config.default_style));
            let rendered = renderer
                .render(&timestamp, now.unwrap_or_else(now_ms))
                .with_context(|| format!("Failed to render {}", timestamp.markup()))?;

            if json {
                let output = RenderOutput {
                    markup: timestamp.markup(),
                    text: rendered.text,
                    next_update_ms: rendered.next_update.map(|d| d.as_millis()),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", rendered.text);
            }
        }
        Commands::Watch { seconds, style } => {
            let renderer = Arc::new(config.renderer()?);
            let timestamp =
                DiscordTimestamp::new(seconds, style.unwrap_or(config.default_style));
            watch(timestamp, renderer).await?;
        }
        Commands::Markup { text, now } => {
            let renderer = config.renderer()?;
            let rendered = render_markup(&text, &renderer, now.unwrap_or_else(now_ms));
            println!("{}", rendered.text);
        }
        Commands::InitConfig { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from("config.ron"));
            config.save_to(&path)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

async fn watch(
    timestamp: DiscordTimestamp,
    renderer: Arc<discord_time::TimestampRenderer>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let live = LiveTimestamp::spawn(timestamp, renderer, tx);

    loop {
        tokio::select! {
            text = rx.recv() => match text {
                Some(text) => println!("{text}"),
                // Absolute styles finish after their only render.
                None => break,
            },
            res = tokio::signal::ctrl_c() => {
                res.context("Failed to listen for Ctrl-C")?;
                live.stop();
                break;
            }
        }
    }

    live.join().await;
    Ok(())
}

/// Install the tracing subscriber. File logging keeps a worker guard that
/// must outlive `main` for buffered lines to be flushed.
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    // If RUST_LOG is set, it takes precedence.
    // Otherwise, build from config.
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::EnvFilter::from_default_env(),
        Err(_) => tracing_subscriber::EnvFilter::new(logging.filter_directives()),
    };

    match logging.log_directory.as_deref() {
        Some(log_dir) => {
            let file_appender = tracing_appender::rolling::daily(log_dir, "discord-time.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .compact()
                .init();
            Some(guard)
        }
        None => {
            // stdout carries rendered output, so logs stay on stderr.
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .compact()
                .init();
            None
        }
    }
}
