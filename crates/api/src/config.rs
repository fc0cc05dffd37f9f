//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `8083`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL connection string
/// - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`: used to build
///   the connection string when `DATABASE_URL` is unset and `DB_HOST` is set
/// - `DB_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `BASE_URL`: allowed CORS origin (any origin when unset)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub base_url: Option<String>,
}

/// Discrete connection settings, as the service's docker setup provides them.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DbParts {
    host: String,
    port: u16,
    user: String,
    password: String,
    name: String,
}

impl DbParts {
    fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let database_url = var("DATABASE_URL").or_else(|| {
            var("DB_HOST").map(|host| {
                DbParts {
                    host,
                    port: var("DB_PORT").and_then(|p| p.parse().ok()).unwrap_or(5432),
                    user: var("DB_USER").unwrap_or_else(|| "postgres".to_string()),
                    password: var("DB_PASSWORD").unwrap_or_default(),
                    name: var("DB_NAME").unwrap_or_else(|| "postgres".to_string()),
                }
                .url()
            })
        });

        Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(8083),
            log_level: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            database_url,
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(5),
            base_url: var("BASE_URL").filter(|url| !url.is_empty()),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8083,
            log_level: "info".to_string(),
            database_url: None,
            db_max_connections: 5,
            base_url: None,
        }
    }
}
