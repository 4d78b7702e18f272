use std::path::PathBuf;

use config::ConfigError as ConfigLoaderError;
use rmcp::model::ErrorData;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::registry::CapabilityKind;

/// Errors that can occur while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to build (read) the configuration file.
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize TOML into a struct.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Field failed validation.
    #[error("Configuration file {path} has invalid `{field}`: {message}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::FileRead { path, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::Parse { path, source }
    }
}

/// A single field-level schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON pointer to the offending value (`""` for the root).
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

fn describe_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| {
            if v.path.is_empty() {
                v.message.clone()
            } else {
                format!("{}: {}", v.path, v.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failures raised while registering or dispatching capabilities.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{kind} `{name}` is not registered")]
    NotFound { kind: CapabilityKind, name: String },
    #[error("invalid arguments for {kind} `{name}`: {}", describe_violations(.violations))]
    Validation {
        kind: CapabilityKind,
        name: String,
        violations: Vec<Violation>,
    },
    #[error("tool `{name}` output violates its schema: {}", describe_violations(.violations))]
    OutputValidation {
        name: String,
        violations: Vec<Violation>,
    },
    #[error("no resource matches URI `{uri}`")]
    NoMatch { uri: String },
    #[error("{kind} `{name}` failed: {source:#}")]
    Handler {
        kind: CapabilityKind,
        name: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("{kind} `{name}` is already registered")]
    DuplicateName { kind: CapabilityKind, name: String },
    #[error("invalid URI template `{template}`: {reason}")]
    InvalidTemplate { template: String, reason: String },
    #[error("{kind} `{name}` has no argument `{argument}`")]
    UnknownArgument {
        kind: CapabilityKind,
        name: String,
        argument: String,
    },
}

impl RegistryError {
    /// Stable machine-readable code for this failure.
    pub fn code(&self) -> &'static str {
        self.descriptor().code
    }

    fn descriptor(&self) -> &'static ErrorDescriptor {
        match self {
            RegistryError::NotFound { .. } => &CAPABILITY_NOT_FOUND_ERROR,
            RegistryError::Validation { .. } => &INVALID_ARGUMENTS_ERROR,
            RegistryError::OutputValidation { .. } => &OUTPUT_CONTRACT_ERROR,
            RegistryError::NoMatch { .. } => &RESOURCE_NO_MATCH_ERROR,
            RegistryError::Handler { .. } => &HANDLER_FAILED_ERROR,
            RegistryError::DuplicateName { .. } => &DUPLICATE_NAME_ERROR,
            RegistryError::InvalidTemplate { .. } => &INVALID_TEMPLATE_ERROR,
            RegistryError::UnknownArgument { .. } => &UNKNOWN_ARGUMENT_ERROR,
        }
    }

    fn details(&self) -> Value {
        match self {
            RegistryError::NotFound { kind, name }
            | RegistryError::DuplicateName { kind, name } => {
                json!({ "kind": kind.as_str(), "name": name })
            }
            RegistryError::Validation {
                kind,
                name,
                violations,
            } => json!({ "kind": kind.as_str(), "name": name, "violations": violations }),
            RegistryError::OutputValidation { name, violations } => {
                json!({
                    "kind": CapabilityKind::Tool.as_str(),
                    "name": name,
                    "violations": violations,
                })
            }
            RegistryError::NoMatch { uri } => json!({ "uri": uri }),
            RegistryError::Handler { kind, name, source } => {
                json!({ "kind": kind.as_str(), "name": name, "reason": format!("{source:#}") })
            }
            RegistryError::InvalidTemplate { template, reason } => {
                json!({ "template": template, "reason": reason })
            }
            RegistryError::UnknownArgument {
                kind,
                name,
                argument,
            } => json!({ "kind": kind.as_str(), "name": name, "argument": argument }),
        }
    }

    /// Convert into the MCP error payload returned to the client.
    pub fn to_error_data(&self) -> ErrorData {
        let descriptor = self.descriptor();
        descriptor
            .builder()
            .message(self.to_string())
            .retryable(matches!(self, RegistryError::Handler { .. }))
            .details(self.details())
            .build()
            .unwrap_or_else(|err| ErrorData::internal_error(err.to_string(), None))
    }
}

impl From<RegistryError> for ErrorData {
    fn from(value: RegistryError) -> Self {
        value.to_error_data()
    }
}

/// JSON-RPC error class an [`ErrorDescriptor`] maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InvalidParams,
    ResourceNotFound,
    Internal,
}

/// Structured error metadata returned to MCP clients.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDescriptor {
    /// Error code.
    pub code: &'static str,
    /// User-facing message.
    pub message: &'static str,
    /// Recommended remediation.
    pub remediation: &'static str,
    #[serde(skip)]
    pub class: ErrorClass,
}

impl ErrorDescriptor {
    /// Simple constructor.
    pub const fn new(
        code: &'static str,
        message: &'static str,
        remediation: &'static str,
        class: ErrorClass,
    ) -> Self {
        Self {
            code,
            message,
            remediation,
            class,
        }
    }

    /// Create a builder.
    pub fn builder(&self) -> ErrorDescriptorBuilder<'_> {
        ErrorDescriptorBuilder::new(self)
    }
}

/// Builder for error data that fails if required fields are missing.
pub struct ErrorDescriptorBuilder<'a> {
    descriptor: &'a ErrorDescriptor,
    message: Option<String>,
    retryable: Option<bool>,
    details: Option<Value>,
}

impl<'a> ErrorDescriptorBuilder<'a> {
    pub fn new(descriptor: &'a ErrorDescriptor) -> Self {
        Self {
            descriptor,
            message: None,
            retryable: None,
            details: None,
        }
    }

    /// Replace the descriptor's static message with a specific one.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn build(self) -> Result<ErrorData, ErrorBuilderError> {
        if self.descriptor.remediation.trim().is_empty() {
            return Err(ErrorBuilderError::MissingRemediation {
                code: self.descriptor.code,
            });
        }
        let retryable = self.retryable.ok_or(ErrorBuilderError::MissingRetryable {
            code: self.descriptor.code,
        })?;

        let mut data = Map::new();
        data.insert("code".into(), Value::String(self.descriptor.code.into()));
        data.insert(
            "remediation".into(),
            Value::String(self.descriptor.remediation.into()),
        );
        data.insert("retryable".into(), Value::Bool(retryable));
        if let Some(details) = self.details {
            data.insert("details".into(), details);
        }

        let message = self
            .message
            .unwrap_or_else(|| self.descriptor.message.to_string());
        let data = Some(Value::Object(data));
        Ok(match self.descriptor.class {
            ErrorClass::InvalidParams => ErrorData::invalid_params(message, data),
            ErrorClass::ResourceNotFound => ErrorData::resource_not_found(message, data),
            ErrorClass::Internal => ErrorData::internal_error(message, data),
        })
    }
}

/// Errors when required builder fields are missing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ErrorBuilderError {
    #[error("retryable is missing (code={code})")]
    MissingRetryable { code: &'static str },
    #[error("remediation is empty (code={code})")]
    MissingRemediation { code: &'static str },
}

pub const CAPABILITY_NOT_FOUND_ERROR: ErrorDescriptor = ErrorDescriptor::new(
    "CAPABILITY_NOT_FOUND",
    "The requested capability is not registered",
    "List the server's tools, resources, or prompts and retry with a registered name.",
    ErrorClass::InvalidParams,
);

pub const INVALID_ARGUMENTS_ERROR: ErrorDescriptor = ErrorDescriptor::new(
    "INVALID_ARGUMENTS",
    "Arguments do not satisfy the capability's input schema",
    "Fix the fields listed in details.violations and retry.",
    ErrorClass::InvalidParams,
);

pub const OUTPUT_CONTRACT_ERROR: ErrorDescriptor = ErrorDescriptor::new(
    "OUTPUT_CONTRACT_VIOLATED",
    "The tool returned output that does not match its declared output schema",
    "Report this to the server maintainer; the handler drifted from its contract.",
    ErrorClass::Internal,
);

pub const RESOURCE_NO_MATCH_ERROR: ErrorDescriptor = ErrorDescriptor::new(
    "RESOURCE_NO_MATCH",
    "No resource or resource template matches the URI",
    "Use resources/list or resources/templates/list to discover valid URIs.",
    ErrorClass::ResourceNotFound,
);

pub const HANDLER_FAILED_ERROR: ErrorDescriptor = ErrorDescriptor::new(
    "HANDLER_FAILED",
    "The capability handler failed",
    "Inspect details.reason; retry once the underlying cause is resolved.",
    ErrorClass::Internal,
);

pub const DUPLICATE_NAME_ERROR: ErrorDescriptor = ErrorDescriptor::new(
    "DUPLICATE_NAME",
    "A capability with this name is already registered",
    "Give each tool, resource, and prompt a unique name within its kind.",
    ErrorClass::Internal,
);

pub const INVALID_TEMPLATE_ERROR: ErrorDescriptor = ErrorDescriptor::new(
    "INVALID_TEMPLATE",
    "The resource URI template is malformed",
    "Use `{name}` placeholders with non-empty, unique names and balanced braces.",
    ErrorClass::Internal,
);

pub const UNKNOWN_ARGUMENT_ERROR: ErrorDescriptor = ErrorDescriptor::new(
    "UNKNOWN_ARGUMENT",
    "The capability does not declare this argument",
    "Attach completions only to arguments or placeholders the capability declares.",
    ErrorClass::InvalidParams,
);
