use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod config;
mod db;
mod feed;
mod predictor;
mod server;

use config::Config;
use db::Database;
use feed::{start_ingest_job, FootballData, MatchFeed};
use predictor::PredictionPipeline;
use server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Open database
    let db = Database::open(&config.database_path)?;
    info!(
        "Database opened: {} ({} matches stored)",
        config.database_path,
        db.count_matches()?
    );

    // Build feed client
    let feed: Arc<dyn MatchFeed> = Arc::new(FootballData::new(
        &config.football_api_key,
        Some(&config.football_api_url),
    )?);

    // Shared prediction pipeline
    let pipeline = Arc::new(PredictionPipeline::new());

    // Initial training from stored matches. Failure is expected on a fresh
    // database; the retrain job retries once ingestion has caught up.
    match db.list_finished_matches() {
        Ok(matches) => match pipeline.train_and_evaluate(&matches) {
            Ok(report) => info!(
                "Initial model ready (accuracy {:.3} on {} matches)",
                report.accuracy, report.trained_rows
            ),
            Err(e) => warn!("Initial training skipped: {}", e),
        },
        Err(e) => warn!("Could not load matches for initial training: {}", e),
    }

    // Background ingestion
    start_ingest_job(
        Arc::clone(&feed),
        db.clone(),
        Duration::from_secs(config.ingest_interval_secs),
        config.ingest_days_back,
        config.competition.clone(),
    );

    // Periodic retraining against the full stored history
    {
        let db = db.clone();
        let pipeline = Arc::clone(&pipeline);
        let retrain_interval = Duration::from_secs(config.retrain_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(retrain_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick fires immediately; skip it since initial
            // training already ran.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let matches = match db.list_finished_matches() {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("Retrain skipped, could not load matches: {}", e);
                        continue;
                    }
                };
                match pipeline.train_and_evaluate(&matches) {
                    Ok(report) => info!(
                        "Retrained on {} matches, held-out accuracy {:.3}",
                        report.trained_rows, report.accuracy
                    ),
                    // A failed retrain leaves the previous model serving
                    Err(e) => warn!("Retrain failed: {}", e),
                }
            }
        });
    }

    // Serve the prediction API (blocks until shutdown)
    let state = AppState { db, pipeline };
    let app = server::router(state);
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Prediction API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
