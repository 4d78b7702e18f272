//! Library crate root: capability registry, demo capabilities, and the MCP server.

#[path = "lib/mod.rs"]
pub mod lib_mod;
pub use lib_mod as lib;
pub mod capabilities;
pub mod cli;
pub mod registry;
pub mod server;
