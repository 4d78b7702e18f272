//! MCP server startup and the registry-backed request handler.
mod capability_handler;
mod server_info;
mod startup;

pub use capability_handler::ScaffoldServer;
pub use server_info::build_instructions;
pub use startup::{build_server, run_server, RuntimeExit};
