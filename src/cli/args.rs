//! CLI argument definitions and `LaunchProfile` construction.
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::{build_launch_args, resolve_config_path, LaunchProfile, TransportMode};

/// Parsed command intent from CLI.
#[derive(Debug, Clone)]
pub enum ParsedCommand {
    RunServer(LaunchProfile),
    Cli {
        command: CliCommand,
        config_path: PathBuf,
    },
}

/// Top-level optional CLI commands.
#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Print the registered tools, resources, and prompts as JSON.
    #[command(about = "Print the capability catalog as JSON and exit")]
    Capabilities,
}

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "MCP scaffold server exposing demo tools, resources, and prompts",
    long_about = None
)]
pub struct LaunchProfileArgs {
    /// Select stdio (default) or tcp.
    #[arg(long, value_enum, default_value_t = TransportMode::Stdio)]
    pub transport: TransportMode,
    /// Path to config.toml (overrides MCP_CONFIG_PATH).
    #[arg(long = "config")]
    pub config_override: Option<PathBuf>,
    /// Optional CLI command mode.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

impl LaunchProfileArgs {
    /// Build a `LaunchProfile` from CLI args and environment variables.
    pub fn build(self) -> Result<LaunchProfile> {
        let config_path = resolve_config_path(self.config_override)?;
        let launch_args = build_launch_args(self.transport, &config_path);

        Ok(LaunchProfile {
            config_path,
            transport: self.transport,
            launch_args,
        })
    }

    /// Parse CLI args into either server launch mode or utility command mode.
    pub fn into_command(self) -> Result<ParsedCommand> {
        match self.command.clone() {
            Some(command) => Ok(ParsedCommand::Cli {
                command,
                config_path: resolve_config_path(self.config_override)?,
            }),
            None => Ok(ParsedCommand::RunServer(self.build()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_stdio_server() {
        let args = LaunchProfileArgs::try_parse_from(["mcp-scaffold"]).expect("parses");
        match args.into_command().expect("builds") {
            ParsedCommand::RunServer(profile) => {
                assert_eq!(profile.transport, TransportMode::Stdio);
                assert_eq!(profile.launch_args[0], "--transport=stdio");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn capabilities_subcommand_selects_cli_mode() {
        let args = LaunchProfileArgs::try_parse_from([
            "mcp-scaffold",
            "--config",
            "/tmp/scaffold.toml",
            "capabilities",
        ])
        .expect("parses");
        match args.into_command().expect("builds") {
            ParsedCommand::Cli {
                command: CliCommand::Capabilities,
                config_path,
            } => assert_eq!(config_path, PathBuf::from("/tmp/scaffold.toml")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_transport_is_rejected() {
        assert!(
            LaunchProfileArgs::try_parse_from(["mcp-scaffold", "--transport", "http"]).is_err()
        );
    }
}
