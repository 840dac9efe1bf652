//! Dotted variable paths as they appear inside tags, e.g. `foo.bar-baz`.
use crate::error::{Location, ParseError};
use crate::render::IncludeFrame;
use nom::{
    Parser,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::all_consuming,
    multi::separated_list1,
};
use std::fmt;

/// The name that refers to the innermost local context.
pub const CURRENT_CONTEXT: &str = ".";

/// A validated identifier together with where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    name: String,
    line: usize,
    column: usize,
}

impl Identifier {
    pub fn new(name: impl Into<String>, line: usize, column: usize) -> Result<Self, ParseError> {
        let name = name.into();
        let location = Location { line, column };
        if name.is_empty() {
            return Err(ParseError::EmptyIdentifier { location });
        }
        if name != CURRENT_CONTEXT && !is_valid_path(&name) {
            return Err(ParseError::InvalidIdentifier { name, location });
        }
        Ok(Self { name, line, column })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn is_current_context(&self) -> bool {
        self.name == CURRENT_CONTEXT
    }

    /// `'name' at line L column C`
    pub fn description(&self) -> String {
        format!("'{}' at line {} column {}", self.name, self.line, self.column)
    }

    /// Builds the message recorded when this identifier fails to resolve.
    /// The most recently included partial is listed first.
    pub fn resolution_error_message(&self, template_name: &str, stack: &[IncludeFrame]) -> String {
        let mut message = format!("Failed to resolve {} in {}", self.description(), template_name);
        for frame in stack.iter().rev() {
            message.push_str(&format!(
                "\n  included as {} in {}",
                frame.id.description(),
                frame.name
            ));
        }
        message
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// True if `name` is a single path segment, i.e. `[a-zA-Z0-9@_/-]+`.
pub fn is_valid_segment(name: &str) -> bool {
    all_consuming(segment).parse(name).is_ok()
}

fn is_valid_path(name: &str) -> bool {
    all_consuming(separated_list1(char('.'), segment))
        .parse(name)
        .is_ok()
}

fn segment(input: &str) -> nom::IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '@' | '_' | '/' | '-'))
        .parse(input)
}
