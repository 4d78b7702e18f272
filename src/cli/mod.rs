//! CLI entrypoint module structure.
use anyhow::Result;
use serde_json::{json, Value};

use crate::{
    capabilities,
    registry::{CapabilityMeta, Registry},
    server::config::ServerConfig,
};

pub mod args;
pub mod profile;

pub use args::{CliCommand, LaunchProfileArgs, ParsedCommand};
pub use profile::{build_launch_args, resolve_config_path, LaunchProfile, TransportMode};

/// Execute CLI command mode and return a user-facing result payload.
pub fn execute_cli_command(command: CliCommand, config: &ServerConfig) -> Result<String> {
    match command {
        CliCommand::Capabilities => {
            let registry = capabilities::build_registry(config)?;
            Ok(serde_json::to_string_pretty(&capability_catalog(&registry))?)
        }
    }
}

fn describe(meta: &CapabilityMeta) -> Value {
    json!({
        "name": meta.name,
        "title": meta.title,
        "description": meta.description,
    })
}

/// JSON summary of everything the registry serves.
fn capability_catalog(registry: &Registry) -> Value {
    let tools: Vec<Value> = registry
        .tools()
        .map(|tool| {
            let mut entry = describe(&tool.meta);
            entry["inputSchema"] = Value::Object(tool.input_schema.clone());
            if let Some(output_schema) = &tool.output_schema {
                entry["outputSchema"] = Value::Object(output_schema.clone());
            }
            entry
        })
        .collect();
    let templates: Vec<Value> = registry
        .resource_templates()
        .map(|record| {
            let mut entry = describe(&record.meta);
            entry["uriTemplate"] = json!(record.uri_template());
            entry
        })
        .collect();
    let prompts: Vec<Value> = registry
        .prompts()
        .map(|prompt| {
            let mut entry = describe(&prompt.meta);
            entry["arguments"] = json!(prompt.arguments);
            entry["completions"] = json!(prompt.has_completions());
            entry
        })
        .collect();

    json!({
        "tools": tools,
        "resources": registry.resource_uris(),
        "resourceTemplates": templates,
        "prompts": prompts,
    })
}
