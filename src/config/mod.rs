/// Application configuration module
use anyhow::{anyhow, Context};
use chrono::{NaiveDate, Utc};
use std::env;
use std::fmt;
use std::fs::read_to_string;
use std::path::PathBuf;
use tracing::{info, warn};

const DEFAULT_SECRET_FILE: &str = "/run/secrets/sky_api_key";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub upstream: UpstreamConfig,
    pub market: MarketConfig,
    pub default_date: NaiveDate,
}

/// Connection settings for the flight-data API
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub host: String,
    pub api_key: ApiKey,
    pub timeout_seconds: u64,
}

/// Constants sent with every flight search
#[derive(Clone, Debug, PartialEq)]
pub struct MarketConfig {
    pub currency: String,
    pub locale: String,
    pub market: String,
    pub cabin_class: String,
    pub country_code: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            locale: "en-US".to_string(),
            market: "en-US".to_string(),
            cabin_class: "economy".to_string(),
            country_code: "US".to_string(),
        }
    }
}

/// Upstream credential; never shows up in logs
#[derive(Clone, PartialEq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Source of named secrets
pub trait SecretProvider {
    fn secret(&self, name: &str) -> Option<String>;
}

/// Reads secrets from environment variables
pub struct EnvSecrets;

impl SecretProvider for EnvSecrets {
    fn secret(&self, name: &str) -> Option<String> {
        env::var(name)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Reads a single secret from a mounted file
pub struct FileSecret {
    path: PathBuf,
}

impl FileSecret {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SecretProvider for FileSecret {
    fn secret(&self, name: &str) -> Option<String> {
        read_to_string(&self.path)
            .map(|s| s.trim().to_string())
            .map_err(|e| {
                warn!("Failed to read {} from {}: {}", name, self.path.display(), e);
            })
            .ok()
            .filter(|s| !s.is_empty())
    }
}

/// First provider that knows the secret wins
pub fn resolve_api_key(providers: &[&dyn SecretProvider]) -> anyhow::Result<ApiKey> {
    providers
        .iter()
        .find_map(|p| p.secret("SKY_API_KEY"))
        .map(ApiKey::new)
        .ok_or_else(|| anyhow!("SKY_API_KEY is required (env var or secret file)"))
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let bind_addr = env_or("BIND_ADDR", "0.0.0.0:3000");

        let file_secret = FileSecret::new(
            env::var("SKY_API_KEY_FILE").unwrap_or_else(|_| DEFAULT_SECRET_FILE.to_string()),
        );
        let providers: [&dyn SecretProvider; 2] = [&EnvSecrets, &file_secret];
        let api_key = resolve_api_key(&providers)?;

        let upstream = UpstreamConfig {
            base_url: env_or(
                "SKY_API_BASE_URL",
                "https://sky-scrapper.p.rapidapi.com/api/v1/flights",
            ),
            host: env_or("SKY_API_HOST", "sky-scrapper.p.rapidapi.com"),
            api_key,
            timeout_seconds: env_u64("HTTP_TIMEOUT_SECONDS", 30),
        };

        let defaults = MarketConfig::default();
        let market = MarketConfig {
            currency: env_or("SEARCH_CURRENCY", &defaults.currency),
            locale: env_or("SEARCH_LOCALE", &defaults.locale),
            market: env_or("SEARCH_MARKET", &defaults.market),
            cabin_class: env_or("SEARCH_CABIN_CLASS", &defaults.cabin_class),
            country_code: env_or("SEARCH_COUNTRY_CODE", &defaults.country_code),
        };

        let today = Utc::now().date_naive();
        let default_date = match env::var("DEFAULT_DEPARTURE_DATE") {
            Ok(raw) => {
                let parsed = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .with_context(|| format!("DEFAULT_DEPARTURE_DATE is not an ISO date: {raw}"))?;
                clamp_to_min(parsed, today)
            }
            Err(_) => today,
        };

        Ok(Self {
            bind_addr,
            upstream,
            market,
            default_date,
        })
    }
}

/// The date picker never offers days before `min`
pub fn clamp_to_min(date: NaiveDate, min: NaiveDate) -> NaiveDate {
    if date < min {
        info!("Default date {} is in the past, using {}", date, min);
        min
    } else {
        date
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
