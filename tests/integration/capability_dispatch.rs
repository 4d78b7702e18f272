use anyhow::Result;
use rmcp::{
    model::{
        ArgumentInfo, CallToolRequestParam, CompleteRequestParam, CompletionContext, ErrorCode,
        ErrorData, GetPromptRequestParam, ReadResourceRequestParam, Reference,
    },
    service::ServiceError,
};
use serde_json::{json, Map, Value};

use mcp_scaffold::server::config::ServerConfig;

use crate::common::connect_in_process;

fn arguments(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object arguments")
}

fn mcp_error(err: ServiceError) -> ErrorData {
    match err {
        ServiceError::McpError(inner) => inner,
        other => panic!("unexpected error: {other:?}"),
    }
}

fn data_code(error: &ErrorData) -> Option<&str> {
    error
        .data
        .as_ref()
        .and_then(|data| data.get("code"))
        .and_then(Value::as_str)
}

#[tokio::test]
async fn bmi_tool_round_trips_structured_content() -> Result<()> {
    let (client, server_task) = connect_in_process(ServerConfig::default()).await?;

    let tools = client.list_all_tools().await?;
    let bmi = tools
        .iter()
        .find(|tool| tool.name == "calculate-bmi")
        .expect("bmi tool listed");
    assert!(bmi.output_schema.is_some(), "bmi declares an output schema");

    let response = client
        .call_tool(CallToolRequestParam {
            name: "calculate-bmi".into(),
            arguments: Some(arguments(json!({ "weightKg": 70, "heightM": 1.75 }))),
        })
        .await?;
    assert_ne!(response.is_error, Some(true));

    let structured = response.structured_content.clone().expect("structured_content");
    let bmi = structured["bmi"].as_f64().expect("numeric bmi");
    assert!((bmi - 22.857142857142858).abs() < 1e-12);

    let block = serde_json::to_value(&response.content[0])?;
    assert_eq!(block["type"], "text");
    let echoed: Value = serde_json::from_str(block["text"].as_str().expect("text"))?;
    assert_eq!(echoed, structured);

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn invalid_and_unknown_tool_calls_are_protocol_errors() -> Result<()> {
    let (client, server_task) = connect_in_process(ServerConfig::default()).await?;

    let invalid = client
        .call_tool(CallToolRequestParam {
            name: "calculate-bmi".into(),
            arguments: Some(arguments(json!({ "weightKg": 70, "heightM": "tall" }))),
        })
        .await
        .map(|_| ())
        .map_err(mcp_error)
        .expect_err("string height must be rejected");
    assert_eq!(invalid.code, ErrorCode::INVALID_PARAMS);
    assert_eq!(data_code(&invalid), Some("INVALID_ARGUMENTS"));
    let violations = invalid
        .data
        .as_ref()
        .map(|data| data["details"]["violations"].clone())
        .expect("violations");
    assert_eq!(violations[0]["path"], "/heightM");

    let unknown = client
        .call_tool(CallToolRequestParam {
            name: "calculate-bmr".into(),
            arguments: None,
        })
        .await
        .map(|_| ())
        .map_err(mcp_error)
        .expect_err("unknown tool");
    assert_eq!(data_code(&unknown), Some("CAPABILITY_NOT_FOUND"));

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn handler_failure_is_reported_in_band() -> Result<()> {
    let (client, server_task) = connect_in_process(ServerConfig::default()).await?;

    let response = client
        .call_tool(CallToolRequestParam {
            name: "calculate-bmi".into(),
            arguments: Some(arguments(json!({ "weightKg": 70, "heightM": 0 }))),
        })
        .await?;
    assert_eq!(response.is_error, Some(true));
    let block = serde_json::to_value(&response.content[0])?;
    assert!(
        block["text"]
            .as_str()
            .is_some_and(|text| text.contains("heightM must be positive")),
        "block: {block}"
    );

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn list_files_returns_resource_links() -> Result<()> {
    let (client, server_task) = connect_in_process(ServerConfig::default()).await?;

    let response = client
        .call_tool(CallToolRequestParam {
            name: "list-files".into(),
            arguments: Some(arguments(json!({ "pattern": "*" }))),
        })
        .await?;
    let content = serde_json::to_value(&response.content)?;
    assert_eq!(content[0]["text"], "Found files matching \"*\":");
    assert_eq!(content[1]["type"], "resource_link");
    assert_eq!(content[1]["uri"], "file:///project/README.md");
    assert_eq!(content[1]["description"], "A README file");
    assert_eq!(content[2]["name"], "index.ts");
    assert_eq!(content[2]["mimeType"], "text/typescript");
    assert!(response.structured_content.is_none());

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn listed_resources_and_templates_resolve() -> Result<()> {
    let (client, server_task) = connect_in_process(ServerConfig::default()).await?;

    let resources = client.list_all_resources().await?;
    let uris: Vec<String> = resources.iter().map(|resource| resource.uri.clone()).collect();
    assert_eq!(uris, vec!["config://app", "greeting://alice", "greeting://bob"]);

    for uri in &uris {
        let result = client
            .read_resource(ReadResourceRequestParam { uri: uri.clone() })
            .await?;
        assert_eq!(result.contents.len(), 1, "{uri}");
    }

    let config = client
        .read_resource(ReadResourceRequestParam {
            uri: "config://app".into(),
        })
        .await?;
    let config = serde_json::to_value(&config)?;
    assert_eq!(config["contents"][0]["text"], "App configuration here");
    assert_eq!(config["contents"][0]["mimeType"], "text/plain");

    let carol = client
        .read_resource(ReadResourceRequestParam {
            uri: "greeting://carol".into(),
        })
        .await?;
    let carol = serde_json::to_value(&carol)?;
    assert_eq!(carol["contents"][0]["text"], "Hello, carol!");
    assert_eq!(carol["contents"][0]["uri"], "greeting://carol");

    let templates = client.list_all_resource_templates().await?;
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].uri_template, "greeting://{name}");

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn unmatched_resource_uri_is_not_found() -> Result<()> {
    let (client, server_task) = connect_in_process(ServerConfig::default()).await?;

    for uri in ["greetings://alice", "greeting://alice/extra"] {
        let error = client
            .read_resource(ReadResourceRequestParam { uri: uri.into() })
            .await
            .map(|_| ())
            .map_err(mcp_error)
            .expect_err(uri);
        assert_eq!(error.code, ErrorCode::RESOURCE_NOT_FOUND, "{uri}");
        assert_eq!(data_code(&error), Some("RESOURCE_NO_MATCH"));
    }

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn prompts_render_with_arguments() -> Result<()> {
    let (client, server_task) = connect_in_process(ServerConfig::default()).await?;

    let prompts = client.list_all_prompts().await?;
    let names: Vec<&str> = prompts.iter().map(|prompt| prompt.name.as_str()).collect();
    assert_eq!(names, vec!["review-code", "team-greeting"]);

    let review = client
        .get_prompt(GetPromptRequestParam {
            name: "review-code".into(),
            arguments: Some(arguments(json!({ "code": "fn main() {}" }))),
        })
        .await?;
    let review = serde_json::to_value(&review)?;
    assert_eq!(review["messages"][0]["role"], "user");
    assert_eq!(
        review["messages"][0]["content"]["text"],
        "Please review this code:\n\nfn main() {}"
    );

    let team = client
        .get_prompt(GetPromptRequestParam {
            name: "team-greeting".into(),
            arguments: Some(arguments(
                json!({ "department": "engineering", "name": "Alice" }),
            )),
        })
        .await?;
    let team = serde_json::to_value(&team)?;
    assert_eq!(
        team["messages"][0]["content"]["text"],
        "Hello Alice, welcome to the engineering team!"
    );

    let missing = client
        .get_prompt(GetPromptRequestParam {
            name: "team-greeting".into(),
            arguments: Some(arguments(json!({ "department": "sales" }))),
        })
        .await
        .map(|_| ())
        .map_err(mcp_error)
        .expect_err("name is required");
    assert_eq!(missing.code, ErrorCode::INVALID_PARAMS);

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn completion_uses_prefix_and_context() -> Result<()> {
    let (client, server_task) = connect_in_process(ServerConfig::default()).await?;

    let departments = client
        .complete(CompleteRequestParam {
            r#ref: Reference::for_prompt("team-greeting"),
            argument: ArgumentInfo {
                name: "department".into(),
                value: "s".into(),
            },
            context: None,
        })
        .await?;
    assert_eq!(departments.completion.values, vec!["sales".to_string()]);

    let members = client
        .complete(CompleteRequestParam {
            r#ref: Reference::for_prompt("team-greeting"),
            argument: ArgumentInfo {
                name: "name".into(),
                value: String::new(),
            },
            context: Some(CompletionContext::with_arguments(
                [("department".to_string(), "sales".to_string())]
                    .into_iter()
                    .collect(),
            )),
        })
        .await?;
    assert_eq!(
        members.completion.values,
        vec!["David".to_string(), "Eve".to_string(), "Frank".to_string()]
    );

    let greeting_names = client
        .complete(CompleteRequestParam {
            r#ref: Reference::for_resource("greeting://{name}"),
            argument: ArgumentInfo {
                name: "name".into(),
                value: "b".into(),
            },
            context: None,
        })
        .await?;
    assert_eq!(greeting_names.completion.values, vec!["bob".to_string()]);
    assert_eq!(greeting_names.completion.has_more, Some(false));

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}
