//! Parse-time errors. Render-time resolution failures are not errors in this
//! sense: they are collected as messages on the render result.
use motemplate_template_core::TemplateError;
use std::fmt;
use thiserror::Error;

/// A struct to hold precise error location information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl From<(usize, usize)> for Location {
    fn from((line, column): (usize, usize)) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty identifier at {location}")]
    EmptyIdentifier { location: Location },

    #[error("Invalid identifier '{name}' at {location}")]
    InvalidIdentifier { name: String, location: Location },

    #[error("Reached EOF but expected {expected}{}", context_suffix(.context))]
    UnexpectedEof {
        expected: &'static str,
        context: Option<String>,
    },

    #[error("Expecting token {expected} but got {found} at line {line}{}", context_suffix(.context))]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
        line: usize,
        context: Option<String>,
    },

    #[error("Expected '{expected}', got {found} at line {line}{}", context_suffix(.context))]
    ExpectedSeparator {
        expected: char,
        found: String,
        line: usize,
        context: Option<String>,
    },

    #[error("Orphaned {token} at line {line}")]
    Orphaned { token: &'static str, line: usize },

    #[error("Start section {start} doesn't match end section {end}")]
    MismatchedSection { start: String, end: String },

    #[error("Else clause {found} doesn't match section {start}")]
    MismatchedElse { start: String, found: String },

    #[error("{{{{^{bind_to}:{id}}}}} does not support variable binding")]
    InvertedBinding { bind_to: String, id: String },

    #[error("Invalid partial argument name '{name}' at {location}")]
    InvalidArgument { name: String, location: Location },

    #[error("Unterminated comment starting at line {line}")]
    UnterminatedComment { line: usize },

    #[error("Template is empty")]
    EmptyTemplate,

    #[error(
        "There are still tokens remaining at line {line}, was there an end-section without a start-section?"
    )]
    TrailingTokens { line: usize },
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(description) => format!(" ({})", description),
        None => String::new(),
    }
}

impl From<ParseError> for TemplateError {
    fn from(err: ParseError) -> Self {
        TemplateError::ParseError(err.to_string())
    }
}
