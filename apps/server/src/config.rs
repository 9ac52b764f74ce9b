//! Layered configuration: built-in defaults, an optional `config` file, then
//! `FHIR__`-prefixed environment variables (double underscore nests, e.g.
//! `FHIR__SERVER__PORT`).

use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub fhir: FhirConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::host")]
    pub host: String,
    #[serde(default = "defaults::port")]
    pub port: u16,
    #[serde(default = "defaults::cors_origins")]
    pub cors_origins: Vec<String>,
    /// Upper bound on request body size in bytes.
    #[serde(default = "defaults::max_request_body_size")]
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FhirConfig {
    #[serde(default = "defaults::fhir_version")]
    pub version: String,
    /// Whether PUT may create a resource under a client-chosen id.
    /// When false such a PUT gets 405 Method Not Allowed.
    #[serde(default = "defaults::enabled")]
    pub allow_update_create: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error. `RUST_LOG` overrides this.
    #[serde(default = "defaults::log_level")]
    pub level: String,
    /// Emit JSON-formatted log lines.
    #[serde(default)]
    pub json: bool,
}

mod defaults {
    pub fn host() -> String {
        "0.0.0.0".to_string()
    }

    pub fn port() -> u16 {
        8080
    }

    pub fn cors_origins() -> Vec<String> {
        vec!["*".to_string()]
    }

    pub fn max_request_body_size() -> usize {
        10 * 1024 * 1024
    }

    pub fn fhir_version() -> String {
        "R4".to_string()
    }

    pub fn log_level() -> String {
        "info".to_string()
    }

    pub fn enabled() -> bool {
        true
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("server.host", defaults::host())?
            .set_default("server.port", defaults::port())?
            .set_default(
                "server.max_request_body_size",
                defaults::max_request_body_size() as i64,
            )?
            .set_default("fhir.version", defaults::fhir_version())?
            .set_default("fhir.allow_update_create", true)?
            .set_default("logging.level", defaults::log_level())?
            .set_default("logging.json", false)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("FHIR")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.server.host, self.server.port).parse()?)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.max_request_body_size == 0 {
            return Err("server.max_request_body_size must be > 0".to_string());
        }

        if !matches!(self.fhir.version.as_str(), "R4" | "R4B" | "R5") {
            return Err(format!(
                "fhir.version must be one of R4, R4B, R5 (got '{}')",
                self.fhir.version
            ));
        }

        if self
            .logging
            .level
            .parse::<tracing::level_filters::LevelFilter>()
            .is_err()
        {
            return Err(format!("logging.level '{}' is not valid", self.logging.level));
        }

        Ok(())
    }

    /// Fixed defaults for the integration test harness; skips env and file
    /// layering so tests stay hermetic.
    pub fn test_defaults() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: defaults::cors_origins(),
                max_request_body_size: defaults::max_request_body_size(),
            },
            fhir: FhirConfig {
                version: defaults::fhir_version(),
                allow_update_create: true,
            },
            logging: LoggingConfig {
                level: "warn".to_string(),
                json: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::test_defaults();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_fhir_version() {
        let mut config = Config::test_defaults();
        config.fhir.version = "DSTU2".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_body_limit() {
        let mut config = Config::test_defaults();
        config.server.max_request_body_size = 0;
        assert!(config.validate().is_err());
    }
}
