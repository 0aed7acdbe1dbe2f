//! Runtime configuration for the matching pipeline.
//! Compiled defaults mirror the limits the ROR API tolerates; every knob can
//! be overridden through the environment (a `.env` file works too).

use log::info;
use std::env;
use std::time::Duration;

pub const DEFAULT_MAX_PARALLEL_REQUESTS: usize = 5;
pub const DEFAULT_RATE_LIMIT_CALLS: usize = 1000;
pub const DEFAULT_RATE_LIMIT_PERIOD_SECS: u64 = 300;
pub const DEFAULT_CHUNK_SIZE: usize = 100;
pub const DEFAULT_NAME_MATCH_THRESHOLD: u8 = 90;
pub const DEFAULT_ROR_API_BASE: &str = "https://api.ror.org/v2/organizations";

#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Maximum rows matched concurrently within a chunk.
    pub max_parallel_requests: usize,
    /// Global cap on registry calls within any trailing window.
    pub rate_limit_calls: usize,
    /// Length of the trailing rate-limit window.
    pub rate_limit_period: Duration,
    /// Rows per chunk; a chunk is fully drained before the next starts.
    pub chunk_size: usize,
    /// Minimum similarity ratio (0-100) for a name/alias/label match.
    pub name_match_threshold: u8,
    /// Base URL of the ROR organizations endpoint.
    pub ror_api_base: String,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_parallel_requests: DEFAULT_MAX_PARALLEL_REQUESTS,
            rate_limit_calls: DEFAULT_RATE_LIMIT_CALLS,
            rate_limit_period: Duration::from_secs(DEFAULT_RATE_LIMIT_PERIOD_SECS),
            chunk_size: DEFAULT_CHUNK_SIZE,
            name_match_threshold: DEFAULT_NAME_MATCH_THRESHOLD,
            ror_api_base: DEFAULT_ROR_API_BASE.to_string(),
        }
    }
}

impl MatcherConfig {
    /// Create configuration from environment variables, falling back to the
    /// compiled defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_parallel_requests = parse_env("MAX_PARALLEL_REQUESTS", defaults.max_parallel_requests);
        let rate_limit_calls = parse_env("RATE_LIMIT_CALLS", defaults.rate_limit_calls);
        let rate_limit_period_secs =
            parse_env("RATE_LIMIT_PERIOD", DEFAULT_RATE_LIMIT_PERIOD_SECS);
        let chunk_size = parse_env("CHUNK_SIZE", defaults.chunk_size);
        let name_match_threshold =
            parse_env("NAME_MATCH_THRESHOLD", defaults.name_match_threshold);
        let ror_api_base =
            env::var("ROR_API_BASE").unwrap_or_else(|_| defaults.ror_api_base.clone());

        Self {
            max_parallel_requests,
            rate_limit_calls,
            rate_limit_period: Duration::from_secs(rate_limit_period_secs),
            chunk_size,
            name_match_threshold,
            ror_api_base,
        }
    }

    /// Log the active configuration.
    pub fn log_config(&self) {
        info!("🔧 Matcher configuration:");
        info!("   • {} max parallel row workers", self.max_parallel_requests);
        info!(
            "   • {} registry calls per {:?} window (global)",
            self.rate_limit_calls, self.rate_limit_period
        );
        info!("   • {} rows per chunk", self.chunk_size);
        info!(
            "   • similarity acceptance threshold: {}",
            self.name_match_threshold
        );
        info!("   • registry endpoint: {}", self.ror_api_base);
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
