use crate::{
    cli::LaunchProfile,
    registry::{CapabilityKind, Registry},
    server::config::ServerConfig,
};

/// Build the `ServerInfo.instructions` string shown to MCP clients.
pub fn build_instructions(
    profile: &LaunchProfile,
    config: &ServerConfig,
    registry: &Registry,
) -> String {
    let names = |kind| {
        registry
            .list(kind)
            .into_iter()
            .map(|meta| meta.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        concat!(
            "Loaded config {path}; serving in {transport} mode. ",
            "Tools: {tools}. Resources: {resources}. Prompts: {prompts}. ",
            "Use resources/templates/list to discover URI templates ",
            "and completion/complete for argument suggestions."
        ),
        path = config.source_path.display(),
        transport = profile.transport.as_str(),
        tools = names(CapabilityKind::Tool),
        resources = names(CapabilityKind::Resource),
        prompts = names(CapabilityKind::Prompt),
    )
}
