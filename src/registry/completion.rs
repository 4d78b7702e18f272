//! Argument completion for prompts and resource templates.
use std::{collections::BTreeMap, sync::Arc};

/// Values of the other arguments already resolved in the same request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionContext {
    arguments: BTreeMap<String, String>,
}

impl CompletionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arguments(arguments: BTreeMap<String, String>) -> Self {
        Self { arguments }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).map(String::as_str)
    }
}

/// Suggestion function: `(partial value, context) -> candidates`.
pub type Completer = Arc<dyn Fn(&str, &CompletionContext) -> Vec<String> + Send + Sync>;

/// What a completion request refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionTarget {
    Prompt(String),
    /// A resource template, addressed by its template string.
    ResourceTemplate(String),
}

/// Keep the candidates that start with `prefix`, in their given order.
pub fn filter_prefix<S: AsRef<str>>(candidates: &[S], prefix: &str) -> Vec<String> {
    candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|candidate| candidate.starts_with(prefix))
        .map(str::to_string)
        .collect()
}

/// Completer over a fixed candidate list.
pub fn prefix_completer<I, S>(candidates: I) -> Completer
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let candidates: Vec<String> = candidates.into_iter().map(Into::into).collect();
    Arc::new(move |value: &str, _context: &CompletionContext| filter_prefix(&candidates, value))
}
