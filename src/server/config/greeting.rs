use std::path::Path;

use serde::Deserialize;

use crate::lib::errors::ConfigError;

pub const DEFAULT_KNOWN_NAMES: [&str; 2] = ["alice", "bob"];

/// Settings for the `greeting://{name}` resource family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreetingSection {
    /// Names enumerated by `resources/list` and offered as completions.
    pub known_names: Vec<String>,
}

impl Default for GreetingSection {
    fn default() -> Self {
        Self {
            known_names: DEFAULT_KNOWN_NAMES.iter().map(|name| name.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawGreetingSection {
    pub known_names: Option<Vec<String>>,
}

pub fn parse_greeting_section(
    raw: Option<RawGreetingSection>,
    path: &Path,
) -> Result<GreetingSection, ConfigError> {
    let Some(known_names) = raw.unwrap_or_default().known_names else {
        return Ok(GreetingSection::default());
    };

    let invalid = |message: &str| ConfigError::InvalidField {
        path: path.to_path_buf(),
        field: "greeting.known_names",
        message: message.into(),
    };
    if known_names.is_empty() {
        return Err(invalid("List at least one name"));
    }
    if known_names.iter().any(|name| name.trim().is_empty()) {
        return Err(invalid("Names must not be blank"));
    }
    if known_names.iter().any(|name| name.contains('/')) {
        return Err(invalid("Names must not contain `/`"));
    }
    Ok(GreetingSection { known_names })
}
