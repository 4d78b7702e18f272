//! `config://app` and the `greeting://{name}` family.
use schemars::JsonSchema;
use serde::Deserialize;

use crate::registry::{
    prefix_completer, Bindings, CapabilityMeta, FixedResource, ListedResource, ResourceResponse,
    ResourceTemplate, UriTemplate,
};
use crate::lib::errors::RegistryError;

pub const CONFIG_URI: &str = "config://app";
pub const CONFIG_TEXT: &str = "App configuration here";
pub const GREETING_TEMPLATE: &str = "greeting://{name}";

pub fn config_resource() -> FixedResource {
    FixedResource::new(
        CapabilityMeta::new("config")
            .title("Application Config")
            .description("Application configuration data"),
        CONFIG_URI,
    )
    .mime_type("text/plain")
}

pub async fn read_config(uri: String) -> anyhow::Result<ResourceResponse> {
    Ok(ResourceResponse::text(uri, CONFIG_TEXT))
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GreetingArgs {
    /// Who to greet.
    pub name: String,
}

/// The greeting family: enumerates `known_names` and completes `name` from
/// the same list, while reads accept any name.
pub fn greeting_template(known_names: &[String]) -> Result<ResourceTemplate, RegistryError> {
    let template = UriTemplate::parse(GREETING_TEMPLATE)?;
    let listed: Vec<ListedResource> = known_names
        .iter()
        .filter_map(|name| {
            let bindings = Bindings::from([("name".to_string(), name.clone())]);
            template.expand(&bindings).map(|uri| {
                ListedResource::new(uri, name.clone()).description(format!("Greeting for {name}"))
            })
        })
        .collect();

    Ok(ResourceTemplate::new(
        CapabilityMeta::new("greeting")
            .title("Dynamic Greeting")
            .description("Generate personalized greetings"),
        GREETING_TEMPLATE,
    )
    .with_list(move || listed.clone())
    .with_completion("name", prefix_completer(known_names.iter().cloned())))
}

pub async fn read_greeting(uri: String, args: GreetingArgs) -> anyhow::Result<ResourceResponse> {
    Ok(ResourceResponse::text(uri, format!("Hello, {}!", args.name)))
}
