//! The public face of the engine: parse once, render many times.
use crate::context::ContextStack;
use crate::error::ParseError;
use crate::node::Node;
use crate::parser;
use crate::render::{ROOT_NAME, RenderState};
use crate::value::Value;
use motemplate_template_core::RenderOutput;
use std::fmt;

/// A parsed template.
///
/// Parsing happens in [`Motemplate::new`]; the result is immutable and can be
/// shared between threads and rendered concurrently.
pub struct Motemplate {
    root: Node,
    name: Option<String>,
}

impl Motemplate {
    /// Parses `source`. `name` identifies the template in resolution errors
    /// and defaults to `<root>`.
    pub fn new(source: &str, name: Option<&str>) -> Result<Self, ParseError> {
        let root = parser::parse(source)?;
        let top_level = match &root {
            Node::Collection(nodes) => nodes.len(),
            _ => 1,
        };
        log::debug!(
            "Parsed template {} ({} top-level nodes)",
            name.unwrap_or(ROOT_NAME),
            top_level
        );
        Ok(Self { root, name: name.map(str::to_string) })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn root(&self) -> &Node {
        &self.root
    }

    /// Renders against `contexts`, the first of which takes precedence.
    /// Resolution failures never abort the render; they are collected in
    /// the returned errors.
    pub fn render(&self, contexts: impl IntoIterator<Item = Value>) -> RenderOutput {
        let name = self.name().unwrap_or(ROOT_NAME);
        let mut state = RenderState::new(name, ContextStack::with_globals(contexts));
        state.render_node(&self.root);
        if !state.errors.is_empty() {
            log::debug!("Rendered {} with {} resolution errors", name, state.errors.len());
        }
        RenderOutput { text: state.text, errors: state.errors }
    }
}

impl fmt::Debug for Motemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Motemplate").field("name", &self.name).finish_non_exhaustive()
    }
}
