use std::process::ExitCode;

use anyhow::{Context, Error};
use rmcp::ServiceExt;
use tokio::net::TcpListener;

use crate::{
    capabilities,
    cli::{LaunchProfile, TransportMode},
    lib::telemetry::{emit_runtime_mode, RuntimeModeTelemetry},
    registry::CapabilityKind,
    server::{
        config::ServerConfig,
        runtime::{build_instructions, ScaffoldServer},
    },
};

/// Bundles a runtime error message with an exit code and optional structured error data.
#[derive(Debug)]
pub struct RuntimeExit {
    message: String,
    exit_code: ExitCode,
    error_data: Option<rmcp::model::ErrorData>,
}

impl RuntimeExit {
    pub fn structured(error: rmcp::model::ErrorData, exit_code: ExitCode) -> Self {
        Self {
            message: error.message.to_string(),
            exit_code,
            error_data: Some(error),
        }
    }

    pub fn from_error(err: impl Into<Error>) -> Self {
        let err = err.into();
        Self {
            message: format!("{err:?}"),
            exit_code: ExitCode::FAILURE,
            error_data: None,
        }
    }

    pub fn report(self) -> ExitCode {
        if let Some(data) = self.error_data {
            if let Ok(serialized) = serde_json::to_string(&data) {
                eprintln!("{serialized}");
            } else {
                eprintln!("{}", data.message);
            }
        } else {
            eprintln!("{}", self.message);
        }
        self.exit_code
    }
}

/// Build the demo registry and wrap it in an MCP handler.
///
/// Registration failures carry structured error data and exit with code 2.
pub fn build_server(
    profile: &LaunchProfile,
    config: &ServerConfig,
) -> Result<ScaffoldServer, RuntimeExit> {
    let registry = capabilities::build_registry(config).map_err(|err| {
        tracing::error!(
            target: "mcp_scaffold::runtime",
            code = err.code(),
            reason = %err,
            "Failed to register capabilities"
        );
        RuntimeExit::structured(err.to_error_data(), ExitCode::from(2))
    })?;
    let instructions = build_instructions(profile, config, &registry);
    Ok(ScaffoldServer::new(
        registry,
        config.identity.clone(),
        instructions,
    ))
}

/// Start the MCP server and select stdio/TCP based on the launch profile.
pub async fn run_server(profile: LaunchProfile, config: ServerConfig) -> Result<(), RuntimeExit> {
    let server = build_server(&profile, &config)?;

    let registry = server.registry();
    let config_path = config.source_path.to_string_lossy();
    let tcp = profile.transport == TransportMode::Tcp;
    emit_runtime_mode(&RuntimeModeTelemetry {
        transport: profile.transport.as_str(),
        host: tcp.then_some(config.server.host.as_str()),
        port: tcp.then_some(config.server.port),
        config_path: config_path.as_ref(),
        tools: registry.count(CapabilityKind::Tool),
        resources: registry.count(CapabilityKind::Resource),
        prompts: registry.count(CapabilityKind::Prompt),
        launch_args: &profile.launch_args,
    });

    match profile.transport {
        TransportMode::Stdio => run_stdio(server).await,
        TransportMode::Tcp => run_tcp(server, &config).await,
    }
}

async fn run_stdio(server: ScaffoldServer) -> Result<(), RuntimeExit> {
    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(RuntimeExit::from_error)?;
    running.waiting().await.map_err(RuntimeExit::from_error)?;
    Ok(())
}

async fn run_tcp(server: ScaffoldServer, config: &ServerConfig) -> Result<(), RuntimeExit> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind TCP port {addr}"))
        .map_err(RuntimeExit::from_error)?;
    tracing::info!(
        target: "mcp_scaffold::runtime",
        transport = "tcp",
        bind_addr = %addr,
        "Started listening in TCP mode"
    );

    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .with_context(|| format!("failed to accept TCP connection ({addr})"))
            .map_err(RuntimeExit::from_error)?;
        tracing::info!(
            target: "mcp_scaffold::runtime",
            peer = %peer,
            "Accepted connection from MCP client"
        );
        let connection = server.clone();
        tokio::spawn(async move {
            match connection.serve(stream).await {
                Ok(running) => {
                    if let Err(err) = running.waiting().await {
                        tracing::warn!(
                            target: "mcp_scaffold::runtime",
                            peer = %peer,
                            error = %err,
                            "MCP session ended with an error"
                        );
                    }
                }
                Err(err) => tracing::warn!(
                    target: "mcp_scaffold::runtime",
                    peer = %peer,
                    error = %err,
                    "MCP handshake failed"
                ),
            }
        });
    }
}
