use std::{process::Command as StdCommand, time::Duration};

use anyhow::Result;
use rmcp::{model::ClientInfo, serve_client};
use serde_json::Value;
use tokio::time::timeout;

use crate::common::{fixture, spawn_server_process, BINARY_PATH};

#[tokio::test]
async fn inspector_style_spawn_lists_capabilities() -> Result<()> {
    let (mut child, transport, stderr_task) = spawn_server_process(&[]).await?;

    let client = serve_client(ClientInfo::default(), transport).await?;
    let tools = client.list_all_tools().await?;
    assert!(
        tools.iter().any(|tool| tool.name == "calculate-bmi"),
        "list_tools should include calculate-bmi: {tools:?}"
    );
    let prompts = client.list_all_prompts().await?;
    assert_eq!(prompts.len(), 2, "prompts: {prompts:?}");

    let info = client.peer_info().expect("server info after handshake");
    assert_eq!(info.server_info.name, "my-server-name");
    assert_eq!(info.server_info.version, "1.0.0");

    client.cancel().await?;
    let status = timeout(Duration::from_secs(5), child.wait()).await??;
    assert!(
        status.success(),
        "server should exit cleanly but exit status was {status:?}"
    );
    if let Some(handle) = stderr_task {
        let _ = handle.await;
    }
    Ok(())
}

#[tokio::test]
async fn environment_overrides_config_file() -> Result<()> {
    let (mut child, transport, stderr_task) =
        spawn_server_process(&[("MCP_SCAFFOLD__IDENTITY__NAME", "env-named-server")]).await?;

    let client = serve_client(ClientInfo::default(), transport).await?;
    let info = client.peer_info().expect("server info after handshake");
    assert_eq!(info.server_info.name, "env-named-server");
    assert_eq!(info.server_info.version, "1.0.0");

    client.cancel().await?;
    let _ = timeout(Duration::from_secs(5), child.wait()).await??;
    if let Some(handle) = stderr_task {
        let _ = handle.await;
    }
    Ok(())
}

#[test]
fn capabilities_command_prints_catalog() -> Result<()> {
    let output = StdCommand::new(BINARY_PATH)
        .args(["--config", &fixture("tests/fixtures/config_valid.toml")])
        .arg("capabilities")
        .output()?;
    assert!(output.status.success(), "status: {:?}", output.status);

    let catalog: Value = serde_json::from_slice(&output.stdout)?;
    let tool_names: Vec<&str> = catalog["tools"]
        .as_array()
        .map(|tools| tools.iter().filter_map(|tool| tool["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(tool_names, vec!["calculate-bmi", "list-files"]);
    assert_eq!(catalog["resources"][1]["uri"], "greeting://alice");
    Ok(())
}

#[test]
fn environment_overrides_known_names_list() -> Result<()> {
    let output = StdCommand::new(BINARY_PATH)
        .args(["--config", &fixture("tests/fixtures/config_valid.toml")])
        .arg("capabilities")
        .env("MCP_SCAFFOLD__GREETING__KNOWN_NAMES", "carol,dave")
        .output()?;
    assert!(output.status.success(), "status: {:?}", output.status);

    let catalog: Value = serde_json::from_slice(&output.stdout)?;
    let uris: Vec<&str> = catalog["resources"]
        .as_array()
        .map(|resources| {
            resources
                .iter()
                .filter_map(|resource| resource["uri"].as_str())
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(uris, vec!["config://app", "greeting://carol", "greeting://dave"]);
    Ok(())
}

#[test]
fn missing_config_file_fails_startup() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("absent.toml");
    let output = StdCommand::new(BINARY_PATH)
        .arg("--config")
        .arg(&missing)
        .output()?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to read configuration file"),
        "stderr: {stderr}"
    );
    Ok(())
}
