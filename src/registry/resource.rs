//! Fixed resources and URI-templated resource families.
use std::{collections::HashMap, future::Future, sync::Arc};

use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Serialize};

use super::{
    erase, CapabilityKind, CapabilityMeta, Completer, ErasedHandler, Named, RegistryBuilder,
    ResourceResponse, UriTemplate,
};
use crate::lib::{errors::RegistryError, schema};

/// A concrete resource offered for discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedResource {
    pub uri: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ListedResource {
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            title: None,
            description: None,
            mime_type: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Enumerates the concrete members of a template family.
pub type ListCallback = Arc<dyn Fn() -> Vec<ListedResource> + Send + Sync>;

/// Descriptor for a resource at a single fixed URI.
#[derive(Debug, Clone)]
pub struct FixedResource {
    pub meta: CapabilityMeta,
    pub uri: String,
    pub mime_type: Option<String>,
}

impl FixedResource {
    pub fn new(meta: CapabilityMeta, uri: impl Into<String>) -> Self {
        Self {
            meta,
            uri: uri.into(),
            mime_type: None,
        }
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Descriptor for a family of resources addressed by a URI template.
pub struct ResourceTemplate {
    pub meta: CapabilityMeta,
    pub template: String,
    pub mime_type: Option<String>,
    list: Option<ListCallback>,
    completions: Vec<(String, Completer)>,
}

impl ResourceTemplate {
    pub fn new(meta: CapabilityMeta, template: impl Into<String>) -> Self {
        Self {
            meta,
            template: template.into(),
            mime_type: None,
            list: None,
            completions: Vec::new(),
        }
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Attach a callback that enumerates the family's current members.
    pub fn with_list<F>(mut self, list: F) -> Self
    where
        F: Fn() -> Vec<ListedResource> + Send + Sync + 'static,
    {
        self.list = Some(Arc::new(list));
        self
    }

    /// Attach a completer to one of the template's placeholders.
    pub fn with_completion(mut self, variable: impl Into<String>, completer: Completer) -> Self {
        self.completions.push((variable.into(), completer));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceAddress {
    Fixed(String),
    Template(UriTemplate),
}

/// A registered resource or resource template.
pub struct ResourceRecord {
    pub meta: CapabilityMeta,
    pub address: ResourceAddress,
    pub mime_type: Option<String>,
    /// Schema the template bindings are validated against. Fixed resources
    /// take no arguments.
    pub input_schema: Option<JsonObject>,
    list: Option<ListCallback>,
    completions: HashMap<String, Completer>,
    pub(crate) handler: ErasedHandler<String, ResourceResponse>,
}

impl Named for ResourceRecord {
    fn meta(&self) -> &CapabilityMeta {
        &self.meta
    }
}

impl std::fmt::Debug for ResourceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRecord")
            .field("meta", &self.meta)
            .field("address", &self.address)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

impl ResourceRecord {
    /// The template string, when this record is a template family.
    pub fn uri_template(&self) -> Option<&str> {
        match &self.address {
            ResourceAddress::Template(template) => Some(template.as_str()),
            ResourceAddress::Fixed(_) => None,
        }
    }

    /// Concrete resources this record contributes to discovery.
    pub fn listed(&self) -> Vec<ListedResource> {
        match &self.address {
            ResourceAddress::Fixed(uri) => vec![ListedResource {
                uri: uri.clone(),
                name: self.meta.name.clone(),
                title: self.meta.title.clone(),
                description: self.meta.description.clone(),
                mime_type: self.mime_type.clone(),
            }],
            ResourceAddress::Template(_) => self
                .list
                .as_ref()
                .map(|list| {
                    list()
                        .into_iter()
                        .map(|mut listed| {
                            if listed.mime_type.is_none() {
                                listed.mime_type = self.mime_type.clone();
                            }
                            listed
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    pub(crate) fn completer(&self, variable: &str) -> Option<Completer> {
        self.completions.get(variable).cloned()
    }

    pub(crate) fn fill_mime_type(&self, response: &mut ResourceResponse) {
        let Some(mime_type) = &self.mime_type else {
            return;
        };
        for contents in &mut response.contents {
            if contents.mime_type.is_none() {
                contents.mime_type = Some(mime_type.clone());
            }
        }
    }
}

impl RegistryBuilder {
    /// Register a resource served at one fixed URI.
    pub fn fixed_resource<F, Fut>(
        self,
        descriptor: FixedResource,
        handler: F,
    ) -> Result<Self, RegistryError>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<ResourceResponse>> + Send + 'static,
    {
        let FixedResource {
            meta,
            uri,
            mime_type,
        } = descriptor;
        self.insert_resource(ResourceRecord {
            meta,
            address: ResourceAddress::Fixed(uri),
            mime_type,
            input_schema: None,
            list: None,
            completions: HashMap::new(),
            handler: erase(move |uri: String, _: JsonObject| handler(uri)),
        })
    }

    /// Register a template family. Placeholder bindings are validated against
    /// the schema of `A` and decoded into it before `handler` runs.
    pub fn template_resource<A, F, Fut>(
        self,
        descriptor: ResourceTemplate,
        handler: F,
    ) -> Result<Self, RegistryError>
    where
        A: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(String, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<ResourceResponse>> + Send + 'static,
    {
        let ResourceTemplate {
            meta,
            template,
            mime_type,
            list,
            completions,
        } = descriptor;
        let template = UriTemplate::parse(&template)?;

        let variables = template.variables();
        let mut completers = HashMap::new();
        for (variable, completer) in completions {
            if !variables.contains(&variable.as_str()) {
                return Err(RegistryError::UnknownArgument {
                    kind: CapabilityKind::Resource,
                    name: meta.name,
                    argument: variable,
                });
            }
            completers.insert(variable, completer);
        }

        self.insert_resource(ResourceRecord {
            meta,
            address: ResourceAddress::Template(template),
            mime_type,
            input_schema: Some(schema::schema_for::<A>()),
            list,
            completions: completers,
            handler: erase(handler),
        })
    }

    fn insert_resource(mut self, record: ResourceRecord) -> Result<Self, RegistryError> {
        let address_taken = self
            .resources
            .iter()
            .any(|existing| existing.address == record.address);
        if address_taken {
            let name = match &record.address {
                ResourceAddress::Fixed(uri) => uri.clone(),
                ResourceAddress::Template(template) => template.to_string(),
            };
            return Err(RegistryError::DuplicateName {
                kind: CapabilityKind::Resource,
                name,
            });
        }
        tracing::debug!(
            target: "mcp_scaffold::registry",
            kind = CapabilityKind::Resource.as_str(),
            capability = %record.meta.name,
            "registering capability"
        );
        self.resources.insert(record)?;
        Ok(self)
    }
}
