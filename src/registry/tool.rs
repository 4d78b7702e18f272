use std::future::Future;

use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Serialize};

use super::{
    erase, CapabilityKind, CapabilityMeta, ErasedHandler, Named, RegistryBuilder, ToolResponse,
};
use crate::lib::{
    errors::{RegistryError, Violation},
    schema,
};

/// A registered tool: metadata, schemas, and the erased handler.
pub struct ToolRecord {
    pub meta: CapabilityMeta,
    pub input_schema: JsonObject,
    /// When declared, every successful response must carry conforming
    /// `structuredContent`.
    pub output_schema: Option<JsonObject>,
    pub(crate) handler: ErasedHandler<(), ToolResponse>,
}

impl Named for ToolRecord {
    fn meta(&self) -> &CapabilityMeta {
        &self.meta
    }
}

impl ToolRecord {
    pub(crate) fn check_output(&self, response: &ToolResponse) -> Result<(), RegistryError> {
        let Some(output_schema) = &self.output_schema else {
            return Ok(());
        };
        let violations = match &response.structured_content {
            Some(value) => match schema::validate(output_schema, value) {
                Ok(()) => return Ok(()),
                Err(violations) => violations,
            },
            None => vec![Violation::new(
                "/structuredContent",
                "structured content is required by the output schema",
            )],
        };
        Err(RegistryError::OutputValidation {
            name: self.meta.name.clone(),
            violations,
        })
    }
}

impl std::fmt::Debug for ToolRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRecord")
            .field("meta", &self.meta)
            .field("has_output_schema", &self.output_schema.is_some())
            .finish_non_exhaustive()
    }
}

impl RegistryBuilder {
    /// Register a tool whose input schema is derived from `I`.
    pub fn tool<I, F, Fut>(self, meta: CapabilityMeta, handler: F) -> Result<Self, RegistryError>
    where
        I: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<ToolResponse>> + Send + 'static,
    {
        self.insert_tool(meta, schema::schema_for::<I>(), None, handler)
    }

    /// Register a tool that also declares an output schema derived from `O`.
    pub fn structured_tool<I, O, F, Fut>(
        self,
        meta: CapabilityMeta,
        handler: F,
    ) -> Result<Self, RegistryError>
    where
        I: DeserializeOwned + JsonSchema + Send + 'static,
        O: Serialize + JsonSchema,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<ToolResponse>> + Send + 'static,
    {
        self.insert_tool(
            meta,
            schema::schema_for::<I>(),
            Some(schema::schema_for::<O>()),
            handler,
        )
    }

    fn insert_tool<I, F, Fut>(
        mut self,
        meta: CapabilityMeta,
        input_schema: JsonObject,
        output_schema: Option<JsonObject>,
        handler: F,
    ) -> Result<Self, RegistryError>
    where
        I: DeserializeOwned + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<ToolResponse>> + Send + 'static,
    {
        tracing::debug!(
            target: "mcp_scaffold::registry",
            kind = CapabilityKind::Tool.as_str(),
            capability = %meta.name,
            "registering capability"
        );
        self.tools.insert(ToolRecord {
            meta,
            input_schema,
            output_schema,
            handler: erase(move |(): (), input: I| handler(input)),
        })?;
        Ok(self)
    }
}
