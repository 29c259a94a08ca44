//! Environment-driven configuration.
//!
//! Settings are read from the process environment (optionally seeded from a
//! `.env` file by `main`). Each section uses its own variable prefix:
//! `POSTGRES_*`, `POOL_*`, `API_*`, plus top-level `LOGLEVEL`.

use figment::{Figment, providers::Env};
use serde::Deserialize;
use std::sync::LazyLock;

pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().unwrap_or_else(|e| {
        eprintln!("invalid configuration: {e}");
        std::process::exit(1);
    })
});

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub postgres: PostgresConfig,
    pub pool: PoolConfig,
    pub api: ApiConfig,
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            postgres: PostgresConfig::default(),
            pool: PoolConfig::default(),
            api: ApiConfig::default(),
            loglevel: default_loglevel(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub db_name: String,
    pub host: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub port: u16,
    pub sslmode: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub project_name: String,
    pub host: String,
    pub port: u16,
    /// Key required on mutating routes. An empty key rejects everything.
    pub admin_key: String,
    /// Comma-separated list of allowed CORS origins. Empty disables CORS.
    pub cors_origins: String,
    pub version_prefix: String,
}

fn default_loglevel() -> String {
    "info".to_string()
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            db_name: "co_optimal".to_string(),
            host: "localhost".to_string(),
            username: None,
            password: None,
            port: 5432,
            sslmode: "prefer".to_string(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 10,
            acquire_timeout_secs: 30,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            project_name: "co_optimal".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            admin_key: String::new(),
            cors_origins: String::new(),
            version_prefix: "/api/v1".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, figment::Error> {
        Ok(Self {
            postgres: Figment::new()
                .merge(Env::prefixed("POSTGRES_"))
                .extract()?,
            pool: Figment::new().merge(Env::prefixed("POOL_")).extract()?,
            api: Figment::new().merge(Env::prefixed("API_")).extract()?,
            loglevel: std::env::var("LOGLEVEL").unwrap_or_else(|_| default_loglevel()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

impl PostgresConfig {
    /// Hosted Azure PostgreSQL only accepts TLS connections, whatever the
    /// configured mode says.
    pub fn effective_sslmode(&self) -> &str {
        let host = self.host.to_lowercase();
        if host.contains("azure") || host.contains("postgres.database.azure.com") {
            "require"
        } else {
            self.sslmode.as_str()
        }
    }

    /// Connection URL with the password elided, for startup logging.
    pub fn redacted_url(&self) -> String {
        let user = match (&self.username, &self.password) {
            (Some(u), Some(_)) => format!("{u}:***@"),
            (Some(u), None) => format!("{u}@"),
            _ => String::new(),
        };
        format!(
            "postgres://{user}{}:{}/{}?sslmode={}",
            self.host,
            self.port,
            self.db_name,
            self.effective_sslmode()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.postgres.db_name, "co_optimal");
        assert_eq!(cfg.postgres.port, 5432);
        assert_eq!(cfg.postgres.sslmode, "prefer");
        assert_eq!(cfg.pool.min_connections, 1);
        assert_eq!(cfg.pool.max_connections, 10);
        assert_eq!(cfg.api.port, 8000);
        assert_eq!(cfg.api.version_prefix, "/api/v1");
    }

    #[test]
    fn azure_hosts_force_tls() {
        let mut pg = PostgresConfig::default();
        pg.host = "mydb.postgres.database.azure.com".to_string();
        assert_eq!(pg.effective_sslmode(), "require");

        pg.host = "db.internal".to_string();
        assert_eq!(pg.effective_sslmode(), "prefer");
    }

    #[test]
    fn redacted_url_hides_password() {
        let mut pg = PostgresConfig::default();
        pg.username = Some("svc".to_string());
        pg.password = Some("hunter2".to_string());
        let url = pg.redacted_url();
        assert!(url.contains("svc:***@"));
        assert!(!url.contains("hunter2"));
    }
}
