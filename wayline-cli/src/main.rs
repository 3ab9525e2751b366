mod config;
mod dispatch;
mod transport;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wayline::{CardRenderer, compute, load_font_bytes};

use crate::config::Config;
use crate::transport::bridge::{BridgeClient, MessagingClient as _};

/// Period between scheduled updates.
const UPDATE_PERIOD: Duration = Duration::from_secs(30 * 60);
/// Upper bound on the one-time wait for the messaging session to pair.
const READY_TIMEOUT: Duration = Duration::from_secs(180);
/// Transient pairing-code artifacts the bridge writes next to the process.
const QR_ARTIFACTS: &[&str] = &["qr-code.png", "qr-code.txt"];

#[derive(Parser, Debug)]
#[command(
    name = "wayline",
    version,
    about = "Scheduled journey-progress cards over a messaging bridge"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the notifier: send one update now, then every 30 minutes.
    Run,
    /// Render the progress card to a PNG without sending anything.
    Frame(FrameArgs),
    /// Delete the stored messaging session and pairing artifacts.
    ResetSession,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Timestamp to render for, e.g. 2024-01-01T11:00 (defaults to now).
    #[arg(long)]
    at: Option<String>,

    /// Output PNG path.
    #[arg(long, default_value = "journey-progress.png")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run => cmd_run().await,
        Command::Frame(args) => cmd_frame(args),
        Command::ResetSession => cmd_reset_session(),
    }
}

async fn cmd_run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    info!(
        start = %config.interval.start(),
        end = %config.interval.end(),
        recipients = config.recipients.len(),
        "starting journey notifier"
    );

    let font = load_font_bytes(config.font_path.as_deref())?;
    let mut renderer = CardRenderer::new(font)?;

    let client = Arc::new(BridgeClient::spawn(&config.bridge_cmd, &config.session_path).await?);
    if let Err(e) = client.wait_ready(READY_TIMEOUT).await {
        warn!(error = %e, "messaging session not ready yet; updates are skipped until it is");
    }

    let mut timer = tokio::time::interval(UPDATE_PERIOD);
    loop {
        tokio::select! {
            _ = timer.tick() => {
                // A failed tick never takes the scheduler down; the next tick
                // is the only retry mechanism.
                if let Err(e) = run_tick(&config, &mut renderer, &client).await {
                    error!(error = %e, "update failed; waiting for next tick");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                client.destroy().await;
                return Ok(());
            }
        }
    }
}

async fn run_tick(
    config: &Config,
    renderer: &mut CardRenderer,
    client: &Arc<BridgeClient>,
) -> anyhow::Result<()> {
    if !client.is_ready() {
        warn!("messaging client not ready; skipping this update");
        return Ok(());
    }

    let record = compute(chrono::Local::now().naive_local(), &config.interval);
    info!(
        percent = record.percent,
        elapsed = %record.elapsed,
        remaining = %record.remaining,
        "progress computed"
    );

    let image = Arc::new(renderer.render(&record)?);
    let caption = dispatch::caption_for(&record);
    dispatch::dispatch(
        client,
        &config.recipients,
        image,
        &caption,
        dispatch::PACING_STEP,
    )
    .await;
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let at = match &args.at {
        Some(s) => wayline::parse_local_timestamp(s)?,
        None => chrono::Local::now().naive_local(),
    };

    let font = load_font_bytes(config.font_path.as_deref())?;
    let mut renderer = CardRenderer::new(font)?;
    let record = compute(at, &config.interval);
    let png = renderer.render(&record)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

/// Remove the stored session directory and pairing artifacts.
///
/// Absence is not an error and individual failures are reported, not
/// propagated: the command always exits 0.
fn cmd_reset_session() -> anyhow::Result<()> {
    let session_path = std::env::var("SESSION_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(config::DEFAULT_SESSION_PATH));

    if session_path.exists() {
        match std::fs::remove_dir_all(&session_path) {
            Ok(()) => info!(path = %session_path.display(), "session directory removed"),
            Err(e) => {
                error!(path = %session_path.display(), error = %e, "failed to remove session directory");
            }
        }
    } else {
        info!(path = %session_path.display(), "session directory already absent");
    }

    for name in QR_ARTIFACTS {
        let path = Path::new(name);
        if !path.exists() {
            continue;
        }
        match std::fs::remove_file(path) {
            Ok(()) => info!(path = name, "pairing artifact removed"),
            Err(e) => error!(path = name, error = %e, "failed to remove pairing artifact"),
        }
    }

    Ok(())
}
