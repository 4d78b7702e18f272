//! Load and validate server configuration.
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::lib::errors::ConfigError;

pub mod greeting;
pub mod identity;
pub mod server;
pub mod telemetry;

pub use greeting::{parse_greeting_section, GreetingSection, RawGreetingSection};
pub use identity::{
    parse_identity_section, IdentitySection, RawIdentitySection, DEFAULT_SERVER_NAME,
    DEFAULT_SERVER_VERSION,
};
pub use server::{parse_server_section, RawServerSection, ServerSection, DEFAULT_HOST, DEFAULT_PORT};

/// Environment variables starting with this prefix override file values,
/// e.g. `MCP_SCAFFOLD__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "MCP_SCAFFOLD";
const ENV_SEPARATOR: &str = "__";

/// Top-level configuration container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub identity: IdentitySection,
    pub greeting: GreetingSection,
    pub source_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            identity: IdentitySection::default(),
            greeting: GreetingSection::default(),
            source_path: PathBuf::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawServerConfig {
    server: Option<RawServerSection>,
    identity: Option<RawIdentitySection>,
    greeting: Option<RawGreetingSection>,
}

impl ServerConfig {
    /// Load configuration from a specific path, layering `MCP_SCAFFOLD__*`
    /// environment overrides on top.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        info!(
            target: "mcp_scaffold::config",
            path = %path.display(),
            "Starting configuration load"
        );
        telemetry::log_sources(&path);

        let builder = config::Config::builder()
            .add_source(config::File::from(path.clone()))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("greeting.known_names"),
            );
        let document = builder.build().map_err(|err| {
            let error = ConfigError::from_read_error(path.clone(), err);
            error!(
                target: "mcp_scaffold::config",
                path = %path.display(),
                reason = %error,
                "Failed to read configuration file"
            );
            error
        })?;

        let raw: RawServerConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(path.clone(), err);
            error!(
                target: "mcp_scaffold::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse configuration file"
            );
            error
        })?;

        let config = Self::from_raw(raw, path.clone()).map_err(|err| {
            error!(
                target: "mcp_scaffold::config",
                path = %path.display(),
                reason = %err,
                "Failed to validate configuration file"
            );
            err
        })?;

        telemetry::log_loaded(&config);
        Ok(config)
    }

    fn from_raw(raw: RawServerConfig, path: PathBuf) -> Result<Self, ConfigError> {
        let server = parse_server_section(raw.server, &path)?;
        let identity = parse_identity_section(raw.identity, &path)?;
        let greeting = parse_greeting_section(raw.greeting, &path)?;

        Ok(Self {
            server,
            identity,
            greeting,
            source_path: path,
        })
    }
}
