use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub debounce_ms: u64,
    pub stale_time_secs: u64,
    pub cache_ttl_secs: u64,
    pub fetch_timeout_secs: u64,
    pub retry_max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
            jwt_secret: env::var("JWT_SECRET")?,
            debounce_ms: parse_or("DEBOUNCE_MS", 300),
            stale_time_secs: parse_or("STALE_TIME_SECS", 300),
            cache_ttl_secs: parse_or("CACHE_TTL_SECS", 600),
            fetch_timeout_secs: parse_or("FETCH_TIMEOUT_SECS", 30),
            retry_max_attempts: parse_or("RETRY_MAX_ATTEMPTS", 2),
            retry_base_delay_ms: parse_or("RETRY_BASE_DELAY_MS", 1000),
            retry_max_delay_ms: parse_or("RETRY_MAX_DELAY_MS", 30_000),
        })
    }

    /// Controller tuning derived from this configuration.
    pub fn controller(&self) -> ControllerConfig {
        ControllerConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            stale_time: Duration::from_secs(self.stale_time_secs),
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            retry: RetryPolicy {
                max_retries: self.retry_max_attempts,
                base_delay: Duration::from_millis(self.retry_base_delay_ms),
                max_delay: Duration::from_millis(self.retry_max_delay_ms),
            },
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Bounded retry policy for transient fetch failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Timing knobs for the debounced query controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Quiescence window after the last filter change.
    pub debounce: Duration,
    /// Cached results younger than this are served without refetching.
    pub stale_time: Duration,
    /// Cached results older than this are evicted.
    pub cache_ttl: Duration,
    /// Upper bound on a single source call.
    pub fetch_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            stale_time: Duration::from_secs(5 * 60),
            cache_ttl: Duration::from_secs(10 * 60),
            fetch_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}
