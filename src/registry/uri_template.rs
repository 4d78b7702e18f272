//! URI templates with `{name}` placeholders.
//!
//! Matching works per `/`-separated segment: a URI matches when it has the
//! same number of segments as the template, every literal matches exactly, and
//! every placeholder binds a non-empty run of characters inside its segment.

use std::{collections::BTreeMap, fmt};

use crate::lib::errors::RegistryError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Variable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    raw: String,
    segments: Vec<Vec<Part>>,
}

/// Variable bindings extracted from a matched URI.
pub type Bindings = BTreeMap<String, String>;

impl UriTemplate {
    pub fn parse(template: &str) -> Result<Self, RegistryError> {
        let invalid = |reason: &str| RegistryError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut seen = Vec::new();
        let mut segments = Vec::new();
        for raw_segment in template.split('/') {
            let mut parts = Vec::new();
            let mut rest = raw_segment;
            while !rest.is_empty() {
                if let Some(body) = rest.strip_prefix('{') {
                    let end = body.find('}').ok_or_else(|| invalid("unclosed `{`"))?;
                    let name = &body[..end];
                    if name.is_empty() {
                        return Err(invalid("empty placeholder name"));
                    }
                    if name.contains('{') {
                        return Err(invalid("nested `{` in placeholder"));
                    }
                    if seen.contains(&name) {
                        return Err(invalid("placeholder names must be unique"));
                    }
                    if matches!(parts.last(), Some(Part::Variable(_))) {
                        return Err(invalid("adjacent placeholders are ambiguous"));
                    }
                    seen.push(name);
                    parts.push(Part::Variable(name.to_string()));
                    rest = &body[end + 1..];
                } else {
                    let end = rest.find('{').unwrap_or(rest.len());
                    let literal = &rest[..end];
                    if literal.contains('}') {
                        return Err(invalid("unmatched `}`"));
                    }
                    parts.push(Part::Literal(literal.to_string()));
                    rest = &rest[end..];
                }
            }
            segments.push(parts);
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in template order.
    pub fn variables(&self) -> Vec<&str> {
        self.segments
            .iter()
            .flatten()
            .filter_map(|part| match part {
                Part::Variable(name) => Some(name.as_str()),
                Part::Literal(_) => None,
            })
            .collect()
    }

    /// Match a concrete URI, returning the placeholder bindings.
    pub fn matches(&self, uri: &str) -> Option<Bindings> {
        let uri_segments: Vec<&str> = uri.split('/').collect();
        if uri_segments.len() != self.segments.len() {
            return None;
        }

        let mut bindings = Bindings::new();
        for (parts, segment) in self.segments.iter().zip(uri_segments) {
            match_segment(parts, segment, &mut bindings)?;
        }
        Some(bindings)
    }

    /// Substitute bindings into the template. Every placeholder must be bound
    /// to a value without `/`.
    pub fn expand(&self, bindings: &Bindings) -> Option<String> {
        let mut segments = Vec::with_capacity(self.segments.len());
        for parts in &self.segments {
            let mut segment = String::new();
            for part in parts {
                match part {
                    Part::Literal(text) => segment.push_str(text),
                    Part::Variable(name) => {
                        let value = bindings.get(name)?;
                        if value.is_empty() || value.contains('/') {
                            return None;
                        }
                        segment.push_str(value);
                    }
                }
            }
            segments.push(segment);
        }
        Some(segments.join("/"))
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn match_segment(parts: &[Part], segment: &str, bindings: &mut Bindings) -> Option<()> {
    let mut rest = segment;
    let mut iter = parts.iter().peekable();
    while let Some(part) = iter.next() {
        match part {
            Part::Literal(text) => rest = rest.strip_prefix(text.as_str())?,
            Part::Variable(name) => {
                // A variable runs up to the next literal in this segment, or to its end.
                let end = match iter.peek() {
                    Some(Part::Literal(next)) => rest.find(next.as_str())?,
                    _ => rest.len(),
                };
                if end == 0 {
                    return None;
                }
                bindings.insert(name.clone(), rest[..end].to_string());
                rest = &rest[end..];
            }
        }
    }
    rest.is_empty().then_some(())
}
