use anyhow::{Context, Result};
use clap::Parser;
use hireview::{create_router, AppState, Config};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "hireview", about = "Live interview recording service")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/hireview")]
    config: String,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut cfg = Config::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = cli.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!(
        "Audio source: {} ({} Hz, {} channels)",
        cfg.audio.source, cfg.audio.sample_rate, cfg.audio.channels
    );
    info!(
        "Speech engine: {}, transcriber: {}",
        cfg.speech.engine, cfg.transcriber.mode
    );

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let state = AppState::new(cfg);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
