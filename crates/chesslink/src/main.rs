//! chesslink relay client, entry point.
//!
//! ```text
//! chesslink                      Connect with defaults
//! chesslink --config <path>      Use custom config TOML
//! chesslink --gen-config         Dump default config and exit
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chesslink::config::AppConfig;
use chesslink::{ChessLinkClientBuilder, ChessLinkError, LoggingHost, RunOutcome};

// CLI

#[derive(Parser, Debug)]
#[command(name = "chesslink", about = "Relay client for networked chess matches")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "chesslink.toml")]
    config: PathBuf,

    /// Relay server host (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Relay server port (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Room to join (overrides config).
    #[arg(short, long)]
    room: Option<String>,

    /// Display name announced to the opponent (overrides config).
    #[arg(short, long)]
    user: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), ChessLinkError> {
    let cli = Cli::parse();

    if cli.gen_config {
        println!("{}", AppConfig::default_toml()?);
        return Ok(());
    }

    let (mut config, source) = AppConfig::load(&cli.config);
    let server = &mut config.client.server;
    if let Some(host) = cli.host {
        server.host = host;
    }
    if let Some(port) = cli.port {
        server.port = port;
    }
    if let Some(room) = cli.room {
        server.room_id = room;
    }
    if let Some(user) = cli.user {
        config.client.profile.user_name = user;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    source.log(&cli.config);

    info!("chesslink v{}", env!("CARGO_PKG_VERSION"));
    info!(
        server = %format!("{}:{}", config.client.server.host, config.client.server.port),
        room = %config.client.server.room_id,
        user = %config.client.profile.user_name,
        "connecting"
    );

    let mut client = ChessLinkClientBuilder::new()
        .poll_interval(config.runner.poll_interval())
        .config(config.client)
        .build(LoggingHost::new());

    let outcome = client
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "could not listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    match outcome {
        RunOutcome::ServerClosed => info!("server closed the session"),
        RunOutcome::ConnectionLost => info!("connection to the relay was lost"),
        RunOutcome::Interrupted => info!("left the room"),
    }
    if let Some(result) = client.session().host().result() {
        info!(%result, "last match result");
    }
    Ok(())
}
