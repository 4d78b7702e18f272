use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use mcp_scaffold::{
    capabilities,
    lib::errors::RegistryError,
    registry::{
        CapabilityKind, CapabilityMeta, ContentBlock, DispatchRequest, PromptDescriptor,
        PromptMessage, PromptResponse, Registry, ResourceResponse, ResourceTemplate,
        ToolResponse,
    },
    server::config::ServerConfig,
};

fn demo_registry() -> Registry {
    capabilities::build_registry(&ServerConfig::default()).expect("demo registry builds")
}

fn names(registry: &Registry, kind: CapabilityKind) -> Vec<String> {
    registry
        .list(kind)
        .into_iter()
        .map(|meta| meta.name.clone())
        .collect()
}

#[tokio::test]
async fn every_listed_name_dispatches() {
    let registry = demo_registry();

    for kind in [CapabilityKind::Tool, CapabilityKind::Prompt] {
        for name in names(&registry, kind) {
            let outcome = registry
                .dispatch(DispatchRequest::new(kind, name.clone(), JsonObject::new()))
                .await;
            assert!(
                !matches!(outcome, Err(RegistryError::NotFound { .. })),
                "{kind} `{name}` was listed but not found"
            );
        }
    }

    for listed in registry.resource_uris() {
        let response = registry
            .read_resource(&listed.uri)
            .await
            .unwrap_or_else(|err| panic!("listed URI {} failed: {err}", listed.uri));
        assert_eq!(response.contents[0].uri, listed.uri);
    }
}

#[test]
fn listing_is_stable_across_calls() {
    let registry = demo_registry();
    for kind in [
        CapabilityKind::Tool,
        CapabilityKind::Resource,
        CapabilityKind::Prompt,
    ] {
        assert_eq!(names(&registry, kind), names(&registry, kind));
    }
    assert_eq!(
        names(&registry, CapabilityKind::Tool),
        vec!["calculate-bmi".to_string(), "list-files".to_string()]
    );
    assert_eq!(registry.count(CapabilityKind::Resource), 2);
}

#[derive(Debug, Deserialize, JsonSchema)]
struct Topic {
    topic: String,
}

#[tokio::test]
async fn invalid_input_never_reaches_any_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let tool_calls = calls.clone();
    let prompt_calls = calls.clone();
    let resource_calls = calls.clone();

    let registry = Registry::builder()
        .tool(CapabilityMeta::new("shout"), move |input: Topic| {
            let calls = tool_calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(ToolResponse::new(vec![ContentBlock::text(
                    input.topic.to_uppercase(),
                )]))
            }
        })
        .expect("tool registers")
        .prompt(
            PromptDescriptor::new(CapabilityMeta::new("brainstorm")),
            move |input: Topic| {
                let calls = prompt_calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(PromptResponse::new(vec![PromptMessage::user(input.topic)]))
                }
            },
        )
        .expect("prompt registers")
        .template_resource(
            ResourceTemplate::new(CapabilityMeta::new("topic"), "topic://{topic}"),
            move |uri: String, input: Topic| {
                let calls = resource_calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(ResourceResponse::text(uri, input.topic))
                }
            },
        )
        .expect("template registers")
        .build();

    let bad = json!({ "topic": 7 }).as_object().cloned().expect("object");
    for kind in [CapabilityKind::Tool, CapabilityKind::Prompt] {
        let name = names(&registry, kind).remove(0);
        let err = registry
            .dispatch(DispatchRequest::new(kind, name, bad.clone()))
            .await
            .expect_err("numeric topic is rejected");
        assert!(matches!(err, RegistryError::Validation { .. }), "{err:?}");
    }
    let err = registry
        .read_resource("topic://a/b")
        .await
        .expect_err("extra segment does not match");
    assert!(matches!(err, RegistryError::NoMatch { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    registry
        .read_resource("topic://rust")
        .await
        .expect("well-formed URI reads");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
