//! Shared helpers reused across modules (errors, schema validation, telemetry).

pub mod errors;
pub mod schema;
pub mod telemetry;
