/// Configuration management for item-service
///
/// Loads configuration from environment variables with sane defaults.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Ranking policy (gravity, offset, trending floor)
    pub ranking: RankingConfig,
    /// Search index notification
    pub search: SearchConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Ranking policy. The exact constants are tunable; correctness only
/// requires that score grows with likes and decays with age.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Decay exponent applied to item age (> 1 so old items decay faster
    /// than they accumulate likes)
    pub gravity: f64,
    /// Hours added to the age before applying gravity, so brand-new
    /// items do not divide by a vanishing denominator
    pub age_offset_hours: f64,
    /// Items scoring below this floor are excluded from the trending
    /// feed and its total count
    pub trending_min_score: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        RankingConfig {
            gravity: 1.8,
            age_offset_hours: 2.0,
            trending_min_score: 0.001,
        }
    }
}

/// Search index notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the search index's document API; when unset the
    /// service skips index notifications entirely
    pub endpoint: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("ITEM_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("ITEM_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/items".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            ranking: RankingConfig {
                gravity: parse_env_or_default("RANKING_GRAVITY", 1.8)?,
                age_offset_hours: parse_env_or_default("RANKING_AGE_OFFSET_HOURS", 2.0)?,
                trending_min_score: parse_env_or_default("RANKING_TRENDING_MIN_SCORE", 0.001)?,
            },
            search: SearchConfig {
                endpoint: std::env::var("SEARCH_INDEX_ENDPOINT")
                    .ok()
                    .map(|s| s.trim_end_matches('/').to_string())
                    .filter(|s| !s.is_empty()),
            },
        })
    }
}

fn parse_env_or_default(key: &str, default: f64) -> Result<f64, String> {
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
