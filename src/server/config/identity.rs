use std::path::Path;

use serde::Deserialize;

use crate::lib::errors::ConfigError;

pub const DEFAULT_SERVER_NAME: &str = env!("CARGO_PKG_NAME");
pub const DEFAULT_SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name and version advertised to clients during initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySection {
    pub name: String,
    pub version: String,
}

impl Default for IdentitySection {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            version: DEFAULT_SERVER_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawIdentitySection {
    pub name: Option<String>,
    pub version: Option<String>,
}

pub fn parse_identity_section(
    raw: Option<RawIdentitySection>,
    path: &Path,
) -> Result<IdentitySection, ConfigError> {
    let raw = raw.unwrap_or_default();
    let name = non_blank(raw.name, DEFAULT_SERVER_NAME, "identity.name", path)?;
    let version = non_blank(raw.version, DEFAULT_SERVER_VERSION, "identity.version", path)?;
    Ok(IdentitySection { name, version })
}

fn non_blank(
    value: Option<String>,
    default: &str,
    field: &'static str,
    path: &Path,
) -> Result<String, ConfigError> {
    match value {
        None => Ok(default.to_string()),
        Some(value) if value.trim().is_empty() => Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field,
            message: "Value must not be blank".into(),
        }),
        Some(value) => Ok(value),
    }
}
