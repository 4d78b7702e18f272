use std::{collections::HashMap, future::Future};

use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Serialize};

use super::{
    erase, CapabilityKind, CapabilityMeta, Completer, ErasedHandler, Named, PromptResponse,
    RegistryBuilder,
};
use crate::lib::{errors::RegistryError, schema};

/// One declared prompt argument, as advertised in `prompts/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptArgumentSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
}

pub struct PromptDescriptor {
    pub meta: CapabilityMeta,
    completions: Vec<(String, Completer)>,
}

impl PromptDescriptor {
    pub fn new(meta: CapabilityMeta) -> Self {
        Self {
            meta,
            completions: Vec::new(),
        }
    }

    /// Attach a completer to a declared argument.
    pub fn with_completion(mut self, argument: impl Into<String>, completer: Completer) -> Self {
        self.completions.push((argument.into(), completer));
        self
    }
}

pub struct PromptRecord {
    pub meta: CapabilityMeta,
    pub input_schema: JsonObject,
    /// Arguments in the order the schema declares its properties.
    pub arguments: Vec<PromptArgumentSpec>,
    completions: HashMap<String, Completer>,
    pub(crate) handler: ErasedHandler<(), PromptResponse>,
}

impl Named for PromptRecord {
    fn meta(&self) -> &CapabilityMeta {
        &self.meta
    }
}

impl std::fmt::Debug for PromptRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptRecord")
            .field("meta", &self.meta)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

impl PromptRecord {
    pub(crate) fn completer(&self, argument: &str) -> Option<Completer> {
        self.completions.get(argument).cloned()
    }

    pub fn has_completions(&self) -> bool {
        !self.completions.is_empty()
    }
}

impl RegistryBuilder {
    /// Register a prompt whose arguments are the properties of `A`.
    pub fn prompt<A, F, Fut>(
        mut self,
        descriptor: PromptDescriptor,
        handler: F,
    ) -> Result<Self, RegistryError>
    where
        A: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<PromptResponse>> + Send + 'static,
    {
        let PromptDescriptor { meta, completions } = descriptor;
        let input_schema = schema::schema_for::<A>();
        let arguments: Vec<PromptArgumentSpec> = schema::properties(&input_schema)
            .into_iter()
            .map(|(name, required, description)| PromptArgumentSpec {
                name,
                description,
                required,
            })
            .collect();

        let mut completers = HashMap::new();
        for (argument, completer) in completions {
            if !arguments.iter().any(|spec| spec.name == argument) {
                return Err(RegistryError::UnknownArgument {
                    kind: CapabilityKind::Prompt,
                    name: meta.name,
                    argument,
                });
            }
            completers.insert(argument, completer);
        }

        tracing::debug!(
            target: "mcp_scaffold::registry",
            kind = CapabilityKind::Prompt.as_str(),
            capability = %meta.name,
            arguments = arguments.len(),
            "registering capability"
        );
        self.prompts.insert(PromptRecord {
            meta,
            input_schema,
            arguments,
            completions: completers,
            handler: erase(move |(): (), args: A| handler(args)),
        })?;
        Ok(self)
    }
}
