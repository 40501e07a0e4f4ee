//! Environment-driven configuration.
//!
//! | Variable      | Default                         |
//! |---------------|---------------------------------|
//! | `BIND_ADDR`   | `0.0.0.0:$PORT`                 |
//! | `PORT`        | `8080`                          |
//! | `DB_USER`     | `""`                            |
//! | `DB_PASSWORD` | `""`                            |
//! | `DB_NAME`     | `""`                            |
//! | `DB_HOST`     | `mysql`                         |
//!
//! An empty variable counts as unset for every key except the database
//! credentials, which are passed through as given.

use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DB_HOST: &str = "mysql";
pub const DB_PORT: u16 = 3306;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    pub addr: String,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let addr = non_empty("BIND_ADDR").unwrap_or_else(|| {
            let port = non_empty("PORT")
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT);
            format!("0.0.0.0:{port}")
        });

        let database = DatabaseConfig {
            user: lookup("DB_USER").unwrap_or_default(),
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            name: lookup("DB_NAME").unwrap_or_default(),
            host: non_empty("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_owned()),
            port: DB_PORT,
            connect_timeout: Duration::from_secs(10),
        };

        Self {
            server: ServerConfig { addr },
            database,
        }
    }
}
