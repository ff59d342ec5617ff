//! Market API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! development defaults. The gateway secret key is the only value that MUST
//! be set in production.

use std::env;
use std::time::Duration;

/// Market API configuration.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// HTTP server port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Payment gateway API base URL (no trailing slash)
    pub gateway_base_url: String,

    /// Payment gateway secret key (bearer token)
    pub gateway_secret_key: String,

    /// Where the gateway redirects the buyer after settlement
    pub gateway_return_url: String,

    /// Bound on every outbound gateway request, in seconds
    pub gateway_timeout_secs: u64,

    /// Currency code sent with every gateway transaction
    pub currency: String,

    /// How often the stale-payment sweep runs, in seconds
    pub sweep_interval_secs: u64,

    /// Age after which a Pending payment is flagged for review, in seconds
    pub pending_payment_max_age_secs: i64,
}

impl MarketConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = MarketConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./bazaar.db".to_string()),

            gateway_base_url: env::var("GATEWAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.gateway.example/v1".to_string()),

            gateway_secret_key: env::var("GATEWAY_SECRET_KEY").unwrap_or_else(|_| {
                // Development placeholder; in production this MUST be set
                "bazaar-dev-secret-change-in-production".to_string()
            }),

            gateway_return_url: env::var("GATEWAY_RETURN_URL")
                .unwrap_or_else(|_| "http://localhost:5173/payment/return".to_string()),

            gateway_timeout_secs: env::var("GATEWAY_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("GATEWAY_TIMEOUT_SECS".to_string()))?,

            currency: env::var("MARKET_CURRENCY").unwrap_or_else(|_| "USD".to_string()),

            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".to_string()) // 5 minutes
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SWEEP_INTERVAL_SECS".to_string()))?,

            pending_payment_max_age_secs: env::var("PENDING_PAYMENT_MAX_AGE_SECS")
                .unwrap_or_else(|_| "1800".to_string()) // 30 minutes
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("PENDING_PAYMENT_MAX_AGE_SECS".to_string())
                })?,
        };

        Ok(config)
    }

    /// Gateway request timeout as a Duration.
    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }

    /// Sweep interval as a Duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
