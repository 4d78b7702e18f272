use std::path::Path;

use tracing::{debug, info};

use super::{ServerConfig, ENV_PREFIX};

pub fn log_sources(path: &Path) {
    debug!(
        target: "mcp_scaffold::config",
        path = %path.display(),
        env_prefix = ENV_PREFIX,
        "Layering environment overrides over configuration file"
    );
}

pub fn log_loaded(config: &ServerConfig) {
    info!(
        target: "mcp_scaffold::config",
        path = %config.source_path.display(),
        host = %config.server.host,
        port = config.server.port,
        server_name = %config.identity.name,
        server_version = %config.identity.version,
        known_names = config.greeting.known_names.len(),
        "Configuration file loaded successfully"
    );
}
