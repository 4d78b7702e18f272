use std::sync::Arc;

use rmcp::{
    handler::server::ServerHandler,
    model::{
        AnnotateAble, CallToolRequestParam, CallToolResult, CompleteRequestParam, CompleteResult,
        CompletionInfo, Content, ErrorData, GetPromptRequestParam, GetPromptResult,
        Implementation, ListPromptsResult, ListResourceTemplatesResult, ListResourcesResult,
        ListToolsResult, PaginatedRequestParam, Prompt, PromptArgument, PromptMessage,
        PromptMessageRole, RawResource, RawResourceTemplate, ReadResourceRequestParam,
        ReadResourceResult, Reference, ResourceContents, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    RoleServer,
};

use crate::{
    lib::errors::RegistryError,
    registry::{
        self, CompletionContext, CompletionTarget, ContentBlock, ListedResource, PromptRecord,
        PromptRole, Registry, ResourceRecord, ResourceResponse, ToolRecord, ToolResponse,
    },
    server::config::IdentitySection,
};

/// MCP front end over an immutable [`Registry`]. Cloned per connection.
#[derive(Clone)]
pub struct ScaffoldServer {
    registry: Arc<Registry>,
    identity: Arc<IdentitySection>,
    instructions: Arc<String>,
}

impl ScaffoldServer {
    pub fn new(registry: Registry, identity: IdentitySection, instructions: String) -> Self {
        Self {
            registry: Arc::new(registry),
            identity: Arc::new(identity),
            instructions: Arc::new(instructions),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl ServerHandler for ScaffoldServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .enable_completions()
                .build(),
            server_info: Implementation {
                name: self.identity.name.clone(),
                version: self.identity.version.clone(),
                ..Default::default()
            },
            instructions: Some((*self.instructions).clone()),
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(
            self.registry.tools().map(to_tool).collect(),
        ))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = request.arguments.unwrap_or_default();
        match self.registry.call_tool(&request.name, arguments).await {
            Ok(response) => Ok(to_call_tool_result(response)),
            // Handler failures are reported in-band so the model can see them.
            Err(err @ RegistryError::Handler { .. }) => {
                Ok(CallToolResult::error(vec![Content::text(err.to_string())]))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult::with_all_items(
            self.registry
                .resource_uris()
                .into_iter()
                .map(|listed| to_raw_resource(listed).no_annotation())
                .collect(),
        ))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        Ok(ListResourceTemplatesResult::with_all_items(
            self.registry
                .resource_templates()
                .filter_map(to_resource_template)
                .map(AnnotateAble::no_annotation)
                .collect(),
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let response = self.registry.read_resource(&request.uri).await?;
        Ok(to_read_resource_result(response))
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        Ok(ListPromptsResult::with_all_items(
            self.registry.prompts().map(to_prompt).collect(),
        ))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        let arguments = request.arguments.unwrap_or_default();
        let response = self.registry.get_prompt(&request.name, arguments).await?;
        Ok(GetPromptResult {
            description: response.description,
            messages: response.messages.into_iter().map(to_prompt_message).collect(),
        })
    }

    async fn complete(
        &self,
        request: CompleteRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CompleteResult, ErrorData> {
        let target = match &request.r#ref {
            Reference::Prompt(prompt) => CompletionTarget::Prompt(prompt.name.clone()),
            Reference::Resource(resource) => {
                CompletionTarget::ResourceTemplate(resource.uri.clone())
            }
        };
        let context = request
            .context
            .as_ref()
            .map(|context| {
                context
                    .argument_names()
                    .into_iter()
                    .filter_map(|name| {
                        context
                            .get_argument(name)
                            .map(|value| (name.to_string(), value.clone()))
                    })
                    .collect()
            })
            .map(CompletionContext::with_arguments)
            .unwrap_or_default();

        let mut values = self.registry.complete(
            &target,
            &request.argument.name,
            &request.argument.value,
            &context,
        )?;
        let total = values.len();
        values.truncate(CompletionInfo::MAX_VALUES);
        let has_more = total > values.len();

        Ok(CompleteResult {
            completion: CompletionInfo {
                values,
                total: u32::try_from(total).ok(),
                has_more: Some(has_more),
            },
        })
    }
}

fn to_tool(record: &ToolRecord) -> Tool {
    let mut tool = Tool::new(
        record.meta.name.clone(),
        record.meta.description.clone().unwrap_or_default(),
        Arc::new(record.input_schema.clone()),
    );
    tool.title = record.meta.title.clone();
    tool.output_schema = record.output_schema.clone().map(Arc::new);
    tool
}

fn to_content(block: ContentBlock) -> Content {
    match block {
        ContentBlock::Text { text } => Content::text(text),
        ContentBlock::ResourceLink {
            uri,
            name,
            description,
            mime_type,
        } => {
            let mut resource = RawResource::new(uri, name);
            resource.description = Some(description);
            resource.mime_type = mime_type;
            Content::resource_link(resource)
        }
    }
}

fn to_call_tool_result(response: ToolResponse) -> CallToolResult {
    let ToolResponse {
        content,
        structured_content,
    } = response;
    let mut result = CallToolResult::success(content.into_iter().map(to_content).collect());
    result.structured_content = structured_content;
    result
}

fn to_raw_resource(listed: ListedResource) -> RawResource {
    let mut resource = RawResource::new(listed.uri, listed.name);
    resource.title = listed.title;
    resource.description = listed.description;
    resource.mime_type = listed.mime_type;
    resource
}

fn to_resource_template(record: &ResourceRecord) -> Option<RawResourceTemplate> {
    Some(RawResourceTemplate {
        uri_template: record.uri_template()?.to_string(),
        name: record.meta.name.clone(),
        title: record.meta.title.clone(),
        description: record.meta.description.clone(),
        mime_type: record.mime_type.clone(),
    })
}

fn to_read_resource_result(response: ResourceResponse) -> ReadResourceResult {
    let contents = response
        .contents
        .into_iter()
        .map(|entry| {
            let mut contents = ResourceContents::text(entry.text, entry.uri);
            if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
                *mime_type = entry.mime_type;
            }
            contents
        })
        .collect();
    ReadResourceResult { contents }
}

fn to_prompt(record: &PromptRecord) -> Prompt {
    let arguments = record
        .arguments
        .iter()
        .map(|spec| PromptArgument {
            name: spec.name.clone(),
            title: None,
            description: spec.description.clone(),
            required: Some(spec.required),
        })
        .collect::<Vec<_>>();
    let mut prompt = Prompt::new(
        record.meta.name.clone(),
        record.meta.description.clone(),
        (!arguments.is_empty()).then_some(arguments),
    );
    prompt.title = record.meta.title.clone();
    prompt
}

fn to_prompt_message(message: registry::PromptMessage) -> PromptMessage {
    let role = match message.role {
        PromptRole::User => PromptMessageRole::User,
        PromptRole::Assistant => PromptMessageRole::Assistant,
    };
    match message.content {
        ContentBlock::Text { text } => PromptMessage::new_text(role, text),
        // Prompt messages carry links by reference only.
        ContentBlock::ResourceLink { uri, .. } => PromptMessage::new_text(role, uri),
    }
}
