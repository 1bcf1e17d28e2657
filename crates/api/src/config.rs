//! Application configuration loaded from environment variables.

/// Secret used to sign tokens when `TOKEN_SECRET` is unset.
pub const DEV_TOKEN_SECRET: &str = "pos-development-secret";

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `8080`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset runs on the in-memory store
/// - `DB_MAX_CONNECTIONS`: pool size (default: `10`)
/// - `TOKEN_SECRET`: HMAC key for access tokens
/// - `TOKEN_DURATION_SECS`: token lifetime (default: `86400`)
/// - `ALLOWED_ORIGINS`: comma-separated CORS origins, or `*` (default)
/// - `CACHE_MAX_ENTRIES`: in-process cache capacity (default: `10000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub token_secret: String,
    pub token_duration_secs: i64,
    pub allowed_origins: Vec<String>,
    pub cache_max_entries: u64,
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            token_secret: std::env::var("TOKEN_SECRET").unwrap_or(defaults.token_secret),
            token_duration_secs: parse_or("TOKEN_DURATION_SECS", defaults.token_duration_secs),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .map(|v| split_origins(&v))
                .unwrap_or(defaults.allowed_origins),
            cache_max_entries: parse_or("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns true if any origin may call the API.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }

    pub fn token_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.token_duration_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            database_url: None,
            db_max_connections: 10,
            token_secret: DEV_TOKEN_SECRET.to_string(),
            token_duration_secs: 86_400,
            allowed_origins: vec!["*".to_string()],
            cache_max_entries: store::cache::DEFAULT_MAX_ENTRIES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
        assert_eq!(config.token_duration(), chrono::Duration::days(1));
        assert!(config.allows_any_origin());
        assert_eq!(config.cache_max_entries, 10_000);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 9000,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_origin_list() {
        let config = Config {
            allowed_origins: split_origins("https://till.example.com, https://admin.example.com,"),
            ..Config::default()
        };
        assert_eq!(
            config.allowed_origins,
            vec!["https://till.example.com", "https://admin.example.com"]
        );
        assert!(!config.allows_any_origin());
    }
}
