use std::path::PathBuf;

use crate::InsightError;

pub const DEFAULT_API_BASE_URL: &str = "https://bluemutualfund.in/server/api/company.php";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:insights.db?mode=rwc";
pub const DEFAULT_DATA_FILE: &str = "data/companies.csv";
pub const DEFAULT_PORT: u16 = 5000;

/// Runtime settings shared by the loader and the API server.
///
/// Read from the environment (call `dotenvy::dotenv()` first so a local
/// `.env` file is honoured). Scoring thresholds are not part of this; they
/// live in the engine's `ScoringConfig`.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub database_url: String,
    pub data_file: PathBuf,
    pub port: u16,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, InsightError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, InsightError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = var("API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("API_KEY is not set; company data requests will be unauthenticated");
        }

        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| InsightError::ConfigError(format!("PORT must be a port number, got '{}'", raw)))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_base_url: var("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            api_key,
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            data_file: var("DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            port,
        })
    }
}
