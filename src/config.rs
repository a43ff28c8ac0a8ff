use clap::Parser;

/// Soccer match outcome prediction service
#[derive(Parser, Debug, Clone)]
#[command(name = "scorecast", version, about)]
pub struct Config {
    /// HTTP listen address for the prediction API
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: String,

    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "scorecast.db")]
    pub database_path: String,

    /// football-data.org API base URL
    #[arg(
        long,
        env = "FOOTBALL_API_URL",
        default_value = "https://api.football-data.org/v4"
    )]
    pub football_api_url: String,

    /// football-data.org API key
    #[arg(long, env = "FOOTBALL_API_KEY")]
    pub football_api_key: String,

    /// Restrict ingestion to one competition by name (e.g. "Premier League");
    /// all competitions are stored when unset
    #[arg(long, env = "COMPETITION_FILTER")]
    pub competition: Option<String>,

    /// How many days of results each ingest fetch covers
    #[arg(long, env = "INGEST_DAYS_BACK", default_value = "30")]
    pub ingest_days_back: u32,

    /// Ingest interval in seconds
    #[arg(long, env = "INGEST_INTERVAL_SECS", default_value = "3600")]
    pub ingest_interval_secs: u64,

    /// Retrain interval in seconds
    #[arg(long, env = "RETRAIN_INTERVAL_SECS", default_value = "86400")]
    pub retrain_interval_secs: u64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.football_api_key.trim().is_empty() {
            anyhow::bail!("FOOTBALL_API_KEY must not be empty");
        }
        if let Some(c) = &self.competition {
            if c.trim().is_empty() {
                anyhow::bail!("competition filter must not be blank when set");
            }
        }
        if self.ingest_days_back == 0 {
            anyhow::bail!("ingest_days_back must be at least 1");
        }
        if self.ingest_interval_secs == 0 {
            anyhow::bail!("ingest_interval_secs must be at least 1");
        }
        if self.retrain_interval_secs == 0 {
            anyhow::bail!("retrain_interval_secs must be at least 1");
        }
        Ok(())
    }
}
