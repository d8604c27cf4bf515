// Configuration module entry point
// Manages gateway configuration and shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, DatabaseConfig, LoggingConfig, MappingConfig, PerformanceConfig, ServerConfig,
};

/// Environment variables honored as overrides, with the config key each one
/// targets. These names match the deployment environment this gateway runs
/// in, so they are applied explicitly instead of through a prefix source.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("CONFIG_PATH", "mapping.path"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_NAME", "database.name"),
];

impl Config {
    /// Load configuration from the default "gateway" file (any supported
    /// extension), falling back to built-in defaults
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("gateway")
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest to highest: built-in defaults, the optional
    /// config file, the documented environment variables.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("mapping.path", "/config/mappings.yml")?
            .set_default("database.host", "postgres-service")?
            .set_default("database.port", 5432)?
            .set_default("database.user", "postgres")?
            .set_default("database.password", "password")?
            .set_default("database.name", "mydb")?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.query_timeout", 30)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?;

        for (var, key) in ENV_OVERRIDES {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(*key, value)?;
            }
        }

        builder.build()?.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
