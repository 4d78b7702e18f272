//! `list-files`: answers with resource links instead of inline contents.
use schemars::JsonSchema;
use serde::Deserialize;

use crate::registry::{CapabilityMeta, ContentBlock, ToolResponse};

pub const NAME: &str = "list-files";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListFilesInput {
    /// Glob-style pattern the caller is interested in.
    pub pattern: String,
}

struct ProjectFile {
    uri: &'static str,
    name: &'static str,
    description: &'static str,
    mime_type: &'static str,
}

const PROJECT_FILES: [ProjectFile; 2] = [
    ProjectFile {
        uri: "file:///project/README.md",
        name: "README.md",
        description: "A README file",
        mime_type: "text/markdown",
    },
    ProjectFile {
        uri: "file:///project/src/index.ts",
        name: "index.ts",
        description: "An index file",
        mime_type: "text/typescript",
    },
];

pub fn meta() -> CapabilityMeta {
    CapabilityMeta::new(NAME)
        .title("List Files")
        .description("List project files")
}

pub async fn handle(input: ListFilesInput) -> anyhow::Result<ToolResponse> {
    let mut content = vec![ContentBlock::text(format!(
        "Found files matching \"{}\":",
        input.pattern
    ))];
    content.extend(PROJECT_FILES.iter().map(|file| {
        ContentBlock::resource_link(file.uri, file.name, file.description, Some(file.mime_type))
    }));
    Ok(ToolResponse::new(content))
}
