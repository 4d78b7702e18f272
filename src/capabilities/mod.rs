//! Demo capabilities served by the scaffold and the registry they populate.

pub mod bmi;
pub mod files;
pub mod prompts;
pub mod resources;

use crate::{
    lib::errors::RegistryError,
    registry::Registry,
    server::config::ServerConfig,
};

/// Register every demo capability, in the order clients will list them.
pub fn build_registry(config: &ServerConfig) -> Result<Registry, RegistryError> {
    let registry = Registry::builder()
        .structured_tool::<bmi::BmiInput, bmi::BmiOutput, _, _>(bmi::meta(), bmi::handle)?
        .tool(files::meta(), files::handle)?
        .fixed_resource(resources::config_resource(), resources::read_config)?
        .template_resource(
            resources::greeting_template(&config.greeting.known_names)?,
            resources::read_greeting,
        )?
        .prompt(prompts::review_code(), prompts::render_review_code)?
        .prompt(prompts::team_greeting(), prompts::render_team_greeting)?
        .build();
    Ok(registry)
}
