//! Telemetry initialization and dispatch span helpers.

use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, info_span, warn, Span};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use crate::registry::CapabilityKind;

/// Initialize `tracing` and format developer logs.
///
/// Logs go to stderr; stdout belongs to the stdio transport.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Span helper recording the start and outcome of one dispatch.
pub struct DispatchSpan {
    span: Span,
    started_at: Instant,
    dispatch_id: Uuid,
    kind: CapabilityKind,
}

impl DispatchSpan {
    pub fn start(kind: CapabilityKind, name: &str) -> Self {
        let dispatch_id = Uuid::new_v4();
        let span = info_span!(
            target: "mcp_scaffold::dispatch",
            "dispatch",
            %dispatch_id,
            kind = kind.as_str(),
            capability = name
        );
        Self {
            span,
            started_at: Instant::now(),
            dispatch_id,
            kind,
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Close the span, logging the outcome code (`"ok"` or an error code).
    pub fn finish(self, outcome: &'static str) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        if outcome == "ok" {
            info!(
                target: "mcp_scaffold::dispatch",
                dispatch_id = %self.dispatch_id,
                kind = self.kind.as_str(),
                outcome,
                elapsed_ms,
                "Dispatch completed"
            );
        } else {
            warn!(
                target: "mcp_scaffold::dispatch",
                dispatch_id = %self.dispatch_id,
                kind = self.kind.as_str(),
                outcome,
                elapsed_ms,
                "Dispatch failed"
            );
        }
    }
}

/// Payload for logging MCP runtime state as structured telemetry.
#[derive(Debug, Serialize)]
pub struct RuntimeModeTelemetry<'a> {
    pub transport: &'a str,
    pub host: Option<&'a str>,
    pub port: Option<u16>,
    pub config_path: &'a str,
    pub tools: usize,
    pub resources: usize,
    pub prompts: usize,
    pub launch_args: &'a [String],
}

/// Emit runtime mode to `tracing`.
pub fn emit_runtime_mode(telemetry: &RuntimeModeTelemetry<'_>) {
    info!(
        target: "mcp_scaffold::runtime",
        transport = telemetry.transport,
        host = telemetry.host.unwrap_or(""),
        port = telemetry.port.unwrap_or_default(),
        config_path = telemetry.config_path,
        tools = telemetry.tools,
        resources = telemetry.resources,
        prompts = telemetry.prompts,
        launch_args = ?telemetry.launch_args,
        "Started MCP server"
    );
}
