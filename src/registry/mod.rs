//! Capability registry: named, schema-validated tools, resources, and prompts.
//!
//! Capabilities are registered once through [`RegistryBuilder`] and frozen into
//! an immutable [`Registry`]. Dispatch looks a capability up by kind and name,
//! validates the arguments against its input schema, runs the handler, and
//! checks the declared output schema before handing the envelope back.

pub mod completion;
pub mod envelope;
pub mod prompt;
pub mod resource;
pub mod tool;
pub mod uri_template;

use std::{collections::HashMap, fmt, future::Future, pin::Pin, sync::Arc};

use rmcp::model::JsonObject;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Instrument;

use crate::lib::{
    errors::{RegistryError, Violation},
    schema,
    telemetry::DispatchSpan,
};

pub use completion::{
    filter_prefix, prefix_completer, Completer, CompletionContext, CompletionTarget,
};
pub use envelope::{
    ContentBlock, PromptMessage, PromptResponse, PromptRole, ResourceResponse, ResourceText,
    ToolResponse,
};
pub use prompt::{PromptArgumentSpec, PromptDescriptor, PromptRecord};
pub use resource::{
    FixedResource, ListedResource, ResourceAddress, ResourceRecord, ResourceTemplate,
};
pub use tool::ToolRecord;
pub use uri_template::{Bindings, UriTemplate};

/// The three capability kinds a server can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    Tool,
    Resource,
    Prompt,
}

impl CapabilityKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::Tool => "tool",
            CapabilityKind::Resource => "resource",
            CapabilityKind::Prompt => "prompt",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name and human-readable metadata shared by every capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityMeta {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl CapabilityMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Why an erased handler did not produce a value.
pub(crate) enum HandlerFailure {
    /// Arguments passed the schema check but could not be decoded into the
    /// handler's input type.
    Decode(serde_json::Error),
    Failed(anyhow::Error),
}

impl HandlerFailure {
    fn into_registry_error(self, kind: CapabilityKind, name: &str) -> RegistryError {
        match self {
            HandlerFailure::Decode(err) => RegistryError::Validation {
                kind,
                name: name.to_string(),
                violations: vec![Violation::new("", err.to_string())],
            },
            HandlerFailure::Failed(source) => RegistryError::Handler {
                kind,
                name: name.to_string(),
                source,
            },
        }
    }
}

/// Type-erased handler: `(context, raw arguments) -> result`.
pub(crate) type ErasedHandler<C, T> =
    Arc<dyn Fn(C, JsonObject) -> BoxFuture<'static, Result<T, HandlerFailure>> + Send + Sync>;

/// Wrap a typed handler so it decodes its input from raw arguments first.
pub(crate) fn erase<C, I, T, F, Fut>(handler: F) -> ErasedHandler<C, T>
where
    C: Send + 'static,
    I: DeserializeOwned + Send + 'static,
    T: Send + 'static,
    F: Fn(C, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    Arc::new(
        move |context: C, arguments: JsonObject| -> BoxFuture<'static, Result<T, HandlerFailure>> {
            let input = match serde_json::from_value::<I>(Value::Object(arguments)) {
                Ok(input) => input,
                Err(err) => return Box::pin(async move { Err(HandlerFailure::Decode(err)) }),
            };
            let pending = handler(context, input);
            Box::pin(async move { pending.await.map_err(HandlerFailure::Failed) })
        },
    )
}

fn validate_arguments(
    kind: CapabilityKind,
    name: &str,
    schema: &JsonObject,
    arguments: &JsonObject,
) -> Result<(), RegistryError> {
    schema::validate(schema, &Value::Object(arguments.clone())).map_err(|violations| {
        RegistryError::Validation {
            kind,
            name: name.to_string(),
            violations,
        }
    })
}

pub(crate) trait Named {
    fn meta(&self) -> &CapabilityMeta;
}

/// Registration-ordered table with unique names.
pub(crate) struct CapabilityTable<R> {
    kind: CapabilityKind,
    records: Vec<R>,
    index: HashMap<String, usize>,
}

impl<R: Named> CapabilityTable<R> {
    fn new(kind: CapabilityKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn insert(&mut self, record: R) -> Result<(), RegistryError> {
        let name = record.meta().name.clone();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateName {
                kind: self.kind,
                name,
            });
        }
        self.index.insert(name, self.records.len());
        self.records.push(record);
        Ok(())
    }

    fn get(&self, name: &str) -> Result<&R, RegistryError> {
        self.index
            .get(name)
            .map(|&position| &self.records[position])
            .ok_or_else(|| RegistryError::NotFound {
                kind: self.kind,
                name: name.to_string(),
            })
    }

    fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// Build phase: collects registrations, then freezes into a [`Registry`].
pub struct RegistryBuilder {
    tools: CapabilityTable<ToolRecord>,
    resources: CapabilityTable<ResourceRecord>,
    prompts: CapabilityTable<PromptRecord>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            tools: CapabilityTable::new(CapabilityKind::Tool),
            resources: CapabilityTable::new(CapabilityKind::Resource),
            prompts: CapabilityTable::new(CapabilityKind::Prompt),
        }
    }
}

impl RegistryBuilder {
    pub fn build(self) -> Registry {
        Registry {
            tools: self.tools,
            resources: self.resources,
            prompts: self.prompts,
        }
    }
}

/// A decoded inbound call. For resources, `name` is the concrete URI to read.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    pub kind: CapabilityKind,
    pub name: String,
    pub arguments: JsonObject,
}

impl DispatchRequest {
    pub fn new(kind: CapabilityKind, name: impl Into<String>, arguments: JsonObject) -> Self {
        Self {
            kind,
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchResponse {
    Tool(ToolResponse),
    Resource(ResourceResponse),
    Prompt(PromptResponse),
}

/// Immutable capability registry shared by every request.
pub struct Registry {
    tools: CapabilityTable<ToolRecord>,
    resources: CapabilityTable<ResourceRecord>,
    prompts: CapabilityTable<PromptRecord>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registered capabilities of `kind`, in registration order.
    pub fn list(&self, kind: CapabilityKind) -> Vec<&CapabilityMeta> {
        match kind {
            CapabilityKind::Tool => self.tools.iter().map(Named::meta).collect(),
            CapabilityKind::Resource => self.resources.iter().map(Named::meta).collect(),
            CapabilityKind::Prompt => self.prompts.iter().map(Named::meta).collect(),
        }
    }

    pub fn count(&self, kind: CapabilityKind) -> usize {
        match kind {
            CapabilityKind::Tool => self.tools.len(),
            CapabilityKind::Resource => self.resources.len(),
            CapabilityKind::Prompt => self.prompts.len(),
        }
    }

    pub fn tools(&self) -> impl Iterator<Item = &ToolRecord> {
        self.tools.iter()
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.resources.iter()
    }

    /// Resource records addressed by a URI template.
    pub fn resource_templates(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.resources
            .iter()
            .filter(|record| record.uri_template().is_some())
    }

    pub fn prompts(&self) -> impl Iterator<Item = &PromptRecord> {
        self.prompts.iter()
    }

    pub async fn dispatch(
        &self,
        request: DispatchRequest,
    ) -> Result<DispatchResponse, RegistryError> {
        match request.kind {
            CapabilityKind::Tool => self
                .call_tool(&request.name, request.arguments)
                .await
                .map(DispatchResponse::Tool),
            CapabilityKind::Resource => self
                .read_resource(&request.name)
                .await
                .map(DispatchResponse::Resource),
            CapabilityKind::Prompt => self
                .get_prompt(&request.name, request.arguments)
                .await
                .map(DispatchResponse::Prompt),
        }
    }

    pub async fn call_tool(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<ToolResponse, RegistryError> {
        traced(CapabilityKind::Tool, name, async {
            let record = self.tools.get(name)?;
            validate_arguments(CapabilityKind::Tool, name, &record.input_schema, &arguments)?;
            let response = (record.handler)((), arguments)
                .await
                .map_err(|failure| failure.into_registry_error(CapabilityKind::Tool, name))?;
            record.check_output(&response)?;
            Ok(response)
        })
        .await
    }

    pub async fn read_resource(&self, uri: &str) -> Result<ResourceResponse, RegistryError> {
        traced(CapabilityKind::Resource, uri, async {
            let (record, bindings) = self.resolve_resource(uri)?;
            let name = record.meta.name.as_str();
            let mut arguments: JsonObject = bindings
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            if let Some(schema) = &record.input_schema {
                schema::coerce_strings(schema, &mut arguments);
                validate_arguments(CapabilityKind::Resource, name, schema, &arguments)?;
            }
            let mut response = (record.handler)(uri.to_string(), arguments)
                .await
                .map_err(|failure| failure.into_registry_error(CapabilityKind::Resource, name))?;
            record.fill_mime_type(&mut response);
            Ok(response)
        })
        .await
    }

    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<PromptResponse, RegistryError> {
        traced(CapabilityKind::Prompt, name, async {
            let record = self.prompts.get(name)?;
            validate_arguments(CapabilityKind::Prompt, name, &record.input_schema, &arguments)?;
            let mut response = (record.handler)((), arguments)
                .await
                .map_err(|failure| failure.into_registry_error(CapabilityKind::Prompt, name))?;
            if response.description.is_none() {
                response.description = record.meta.description.clone();
            }
            Ok(response)
        })
        .await
    }

    /// Find the resource addressed by `uri`: fixed URIs first, then templates
    /// in registration order.
    pub fn resolve_resource(
        &self,
        uri: &str,
    ) -> Result<(&ResourceRecord, Bindings), RegistryError> {
        let fixed = self.resources.iter().find(|record| match &record.address {
            ResourceAddress::Fixed(fixed) => fixed == uri,
            ResourceAddress::Template(_) => false,
        });
        if let Some(record) = fixed {
            return Ok((record, Bindings::new()));
        }

        self.resources
            .iter()
            .find_map(|record| match &record.address {
                ResourceAddress::Template(template) => {
                    template.matches(uri).map(|bindings| (record, bindings))
                }
                ResourceAddress::Fixed(_) => None,
            })
            .ok_or_else(|| RegistryError::NoMatch {
                uri: uri.to_string(),
            })
    }

    /// Concrete resources currently available for discovery: every fixed
    /// resource plus whatever each template's list callback yields.
    pub fn resource_uris(&self) -> Vec<ListedResource> {
        self.resources
            .iter()
            .flat_map(ResourceRecord::listed)
            .collect()
    }

    pub fn complete(
        &self,
        target: &CompletionTarget,
        argument: &str,
        value: &str,
        context: &CompletionContext,
    ) -> Result<Vec<String>, RegistryError> {
        let completer = match target {
            CompletionTarget::Prompt(name) => self.prompts.get(name)?.completer(argument),
            CompletionTarget::ResourceTemplate(template) => self
                .resources
                .iter()
                .find(|record| record.uri_template() == Some(template.as_str()))
                .ok_or_else(|| RegistryError::NotFound {
                    kind: CapabilityKind::Resource,
                    name: template.clone(),
                })?
                .completer(argument),
        };
        Ok(completer
            .map(|complete| complete(value, context))
            .unwrap_or_default())
    }
}

async fn traced<T, Fut>(kind: CapabilityKind, name: &str, work: Fut) -> Result<T, RegistryError>
where
    Fut: Future<Output = Result<T, RegistryError>>,
{
    let span = DispatchSpan::start(kind, name);
    let result = work.instrument(span.span().clone()).await;
    span.finish(match &result {
        Ok(_) => "ok",
        Err(err) => err.code(),
    });
    result
}
