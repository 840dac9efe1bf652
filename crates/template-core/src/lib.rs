//! Core abstractions for template parsing and rendering
//!
//! This crate provides the foundational traits and types shared between the
//! Motemplate engine and the code that drives it. It defines the contract
//! between a template parser and whoever executes the compiled result.
//!
//! ## Key Abstractions
//!
//! - **`TemplateParser`**: Trait for parsing template source into compiled artifacts
//! - **`CompiledTemplate`**: Trait for executable template artifacts
//! - **`RenderOutput`**: Rendered text plus the non-fatal errors collected on the way
//! - **`TemplateFlags`**: Feature flags detected during compilation
//! - **`ExecutionConfig`**: Configuration for template execution

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during template processing
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template parsing failed: {0}")]
    ParseError(String),

    #[error("Template execution failed: {0}")]
    ExecutionError(String),

    #[error("Invalid template configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Configuration for an execution run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionConfig {
    /// If true, a render that collected resolution errors fails instead of
    /// returning partial output.
    pub strict: bool,
}

/// A struct to report features found in a single compiled template.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TemplateFlags {
    /// True if the template includes at least one partial (`{{+...}}`).
    pub includes_partials: bool,
    /// True if the template contains an assertion (`{{!...}}`).
    pub has_assertions: bool,
    /// True if the template dumps a value as JSON (`{{*...}}`).
    pub emits_json: bool,
}

impl TemplateFlags {
    /// Combines the flags of two template fragments.
    pub fn union(self, other: TemplateFlags) -> TemplateFlags {
        TemplateFlags {
            includes_partials: self.includes_partials || other.includes_partials,
            has_assertions: self.has_assertions || other.has_assertions,
            emits_json: self.emits_json || other.emits_json,
        }
    }
}

/// The result of a successful execution: the rendered text and every
/// resolution error recorded while producing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutput {
    pub text: String,
    pub errors: Vec<String>,
}

impl RenderOutput {
    /// True if no resolution errors were recorded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for RenderOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A reusable, data-agnostic, compiled template artifact.
pub trait CompiledTemplate: Send + Sync {
    /// Executes the template against a JSON data source.
    fn execute(
        &self,
        data_source: &str,
        config: ExecutionConfig,
    ) -> Result<RenderOutput, TemplateError>;

    /// The name used in error messages, if the template was given one.
    fn name(&self) -> Option<&str>;

    /// Returns a summary of features detected in this template.
    fn features(&self) -> TemplateFlags;
}

impl fmt::Debug for dyn CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("name", &self.name())
            .field("features", &self.features())
            .finish()
    }
}

/// A parser responsible for compiling a template string into a `CompiledTemplate`.
pub trait TemplateParser {
    /// Parses a template source string.
    fn parse(
        &self,
        template_source: &str,
        name: Option<&str>,
    ) -> Result<Arc<dyn CompiledTemplate>, TemplateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_union() {
        let a = TemplateFlags { includes_partials: true, ..Default::default() };
        let b = TemplateFlags { emits_json: true, ..Default::default() };
        let merged = a.union(b);
        assert!(merged.includes_partials);
        assert!(merged.emits_json);
        assert!(!merged.has_assertions);
    }

    #[test]
    fn test_render_output_display() {
        let output = RenderOutput { text: "hello".to_string(), errors: vec![] };
        assert!(output.is_clean());
        assert_eq!(output.to_string(), "hello");
    }
}
