// =============================================================================
// Reversion Engine — Main Entry Point
// =============================================================================
//
// Replay runner: screens a daily close history into a watchlist (or takes the
// configured symbols), then streams JSON-lines bar events from stdin through
// the per-symbol worker pool and prints signal events as JSON lines on
// stdout.  Logs go to stderr.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use reversion_engine::market_data;
use reversion_engine::pipeline::SymbolWorkerPool;
use reversion_engine::runtime_config::{next_daily_occurrence, EngineConfig};
use reversion_engine::screening;
use reversion_engine::types::SignalEvent;
use reversion_engine::watchlist::{apply_screening_cycle, InMemoryWatchlist, WatchlistStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Reversion Engine — Starting Up                   ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config_path =
        std::env::var("REVERSION_CONFIG").unwrap_or_else(|_| "engine_config.json".into());
    let mut config = EngineConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(path = %config_path, error = %format!("{e:#}"), "Failed to load config, using defaults");
        EngineConfig::default()
    });

    // Override symbols from env if available.
    if let Ok(syms) = std::env::var("REVERSION_SYMBOLS") {
        config.symbols = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }

    // ── 2. Screening cycle → watchlist ───────────────────────────────────
    let watchlist = InMemoryWatchlist::new();
    let screened = match &config.history_path {
        Some(path) => match market_data::load_history(path) {
            Ok(histories) => {
                let results = screening::screen_universe(histories, &config.screening).await;
                apply_screening_cycle(
                    &watchlist,
                    &results,
                    config.screening.max_watchlist,
                    Utc::now(),
                );
                true
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "Screening history unavailable, using configured symbols");
                false
            }
        },
        None => false,
    };
    if !screened {
        watchlist.replace(&config.symbols, Utc::now());
    }

    let symbols = watchlist.symbols();
    if symbols.is_empty() {
        warn!("Watchlist is empty; every bar will be skipped");
    }
    info!(symbols = ?symbols, warmup_bars = config.warmup_bars(), "Watchlist ready");

    // ── 3. Worker pool + signal printer ──────────────────────────────────
    let reset_at = config.daily_reset_time()?;
    let config = Arc::new(config);
    let (event_tx, mut event_rx) = mpsc::channel::<SignalEvent>(config.channel_capacity.max(1));

    let mut pool = SymbolWorkerPool::new(config.clone(), event_tx);
    pool.sync_watchlist(&symbols);

    let printer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        let mut printed = 0usize;
        while let Some(event) = event_rx.recv().await {
            let mut line = serde_json::to_string(&event).context("failed to encode signal event")?;
            line.push('\n');
            stdout
                .write_all(line.as_bytes())
                .await
                .context("failed to write signal event")?;
            stdout.flush().await.context("failed to flush stdout")?;
            printed += 1;
        }
        anyhow::Ok(printed)
    });

    // ── 4. Bar stream loop ───────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut next_reset = reset_at.map(|at| next_daily_occurrence(Utc::now(), at));
    if let Some(at) = next_reset {
        info!(next_reset = %at, "Daily cold reset scheduled");
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let (mut dispatched, mut skipped, mut malformed) = (0usize, 0usize, 0usize);
    info!("Reading bar events from stdin. Press Ctrl+C to stop.");

    loop {
        let deadline = next_reset;
        let reset_due = async move {
            match deadline {
                Some(at) => {
                    let wait = (at - Utc::now()).to_std().unwrap_or_default();
                    tokio::time::sleep(wait).await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match market_data::parse_bar_event(&line) {
                        Ok(bar) => {
                            if pool.dispatch(bar).await {
                                dispatched += 1;
                            } else {
                                skipped += 1;
                            }
                        }
                        Err(e) => {
                            malformed += 1;
                            warn!(error = %format!("{e:#}"), "Malformed bar event skipped");
                        }
                    }
                }
                Ok(None) => {
                    info!("End of bar stream");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Failed to read bar stream");
                    break;
                }
            },
            _ = reset_due => {
                pool.reset_all().await;
                next_reset = reset_at.map(|at| next_daily_occurrence(Utc::now(), at));
                info!(next_reset = ?next_reset, "Daily cold reset applied; symbols re-warming");
            }
            res = &mut ctrl_c => {
                res.context("failed to listen for Ctrl+C")?;
                warn!("Shutdown signal received — stopping gracefully");
                break;
            }
        }
    }

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    pool.shutdown().await;
    let printed = printer.await.context("signal printer panicked")??;

    info!(dispatched, skipped, malformed, signals = printed, "Reversion Engine shut down complete.");
    Ok(())
}
