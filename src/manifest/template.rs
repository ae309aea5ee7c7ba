//! String templates used as manifest factories.
//!
//! A template is literal text with placeholders: `{name}` is replaced by the
//! value of the dependency called `name`, `{N}` by the value of the N-th
//! dependency. Text in braces that is neither stays as written.

use std::sync::OnceLock;

use regex::Regex;

use crate::core::{ContainerError, Dependencies};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Named(String),
    Positional(usize),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Self {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER.get_or_init(|| {
            Regex::new(r"\{([A-Za-z_][A-Za-z0-9_.\-]*|[0-9]+)\}").expect("placeholder pattern is valid")
        });

        let mut segments = Vec::new();
        let mut last = 0;
        for caps in re.captures_iter(source) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            let segment = match inner.as_str().parse::<usize>() {
                Ok(index) => Segment::Positional(index),
                Err(_) => Segment::Named(inner.as_str().to_string()),
            };
            segments.push(segment);
            last = whole.end();
        }
        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }

        Self { segments }
    }

    /// Named placeholders in order of first appearance, without repeats.
    ///
    /// This is the dependency list of a manifest module that does not declare
    /// one explicitly.
    pub fn placeholder_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for segment in &self.segments {
            if let Segment::Named(name) = segment
                && !names.contains(name)
            {
                names.push(name.clone());
            }
        }
        names
    }

    /// Substitute resolved dependency values, which must all be strings.
    pub fn render(&self, deps: &Dependencies) -> Result<String, ContainerError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Named(name) => out.push_str(&deps.by_name::<String>(name)?),
                Segment::Positional(index) => out.push_str(&deps.get::<String>(*index)?),
            }
        }
        Ok(out)
    }
}
