//! Walks a node tree against a context stack, collecting text and
//! resolution errors.
use crate::context::ContextStack;
use crate::identifier::Identifier;
use crate::node::{Argument, Node, PartialNode, Section};
use crate::value::{ContentBlock, Context, Partial, Value};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::mem;
use std::sync::Arc;

/// Name used in error messages for templates constructed without one.
pub const ROOT_NAME: &str = "<root>";

/// One partial inclusion: the template that did the including, and the
/// identifier it included through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeFrame {
    pub name: String,
    pub id: Identifier,
}

/// Answers `true`, `false`, and `_.errors`.
struct Builtins<'a> {
    inherited: &'a [String],
    own: &'a [String],
}

impl Context for Builtins<'_> {
    fn get(&self, key: &str) -> Option<Value> {
        match key {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            "_" => {
                let errors = if self.inherited.is_empty() && self.own.is_empty() {
                    Value::Null
                } else {
                    Value::from(self.inherited.iter().chain(self.own).join("\n"))
                };
                Some(Value::map([("errors", errors)]))
            }
            _ => None,
        }
    }
}

pub(crate) struct RenderState {
    pub(crate) text: String,
    contexts: ContextStack,
    pub(crate) errors: Vec<String>,
    name: String,
    stack: Vec<IncludeFrame>,
    /// Errors the including templates had recorded when this state was
    /// forked; `_.errors` shows them ahead of this state's own.
    inherited_errors: Vec<String>,
}

impl RenderState {
    pub(crate) fn new(name: &str, contexts: ContextStack) -> Self {
        Self {
            text: String::new(),
            contexts,
            errors: Vec::new(),
            name: name.to_string(),
            stack: Vec::new(),
            inherited_errors: Vec::new(),
        }
    }

    /// A state for rendering a partial: globals only, one frame deeper.
    fn fork(&self, partial: &Partial, id: &Identifier) -> Self {
        let mut stack = self.stack.clone();
        stack.push(IncludeFrame { name: self.name.clone(), id: id.clone() });
        Self {
            text: String::new(),
            contexts: self.contexts.from_globals(),
            errors: Vec::new(),
            name: partial.name().unwrap_or(id.name()).to_string(),
            stack,
            inherited_errors: self.inherited_errors.iter().chain(&self.errors).cloned().collect(),
        }
    }

    /// Appends a forked state's output, dropping one trailing newline.
    fn merge(&mut self, mut fork: RenderState) {
        if fork.text.ends_with('\n') {
            fork.text.pop();
        }
        self.text.push_str(&fork.text);
        self.errors.append(&mut fork.errors);
    }

    fn resolve(&mut self, id: &Identifier) -> Option<Value> {
        let builtins = Builtins { inherited: &self.inherited_errors, own: &self.errors };
        self.contexts.resolve(id.name(), &builtins)
    }

    pub(crate) fn add_resolution_error(&mut self, id: &Identifier, description: Option<&str>) {
        let mut message = id.resolution_error_message(&self.name, &self.stack);
        if let Some(description) = description {
            let at = message.find('\n').unwrap_or(message.len());
            message.insert_str(at, &format!(" ({})", description));
        }
        self.errors.push(message);
    }

    pub(crate) fn render_node(&mut self, node: &Node) {
        match node {
            Node::Text(text) => self.text.push_str(&text.text),
            Node::EscapedVariable(id) => self.render_variable(id, true),
            Node::UnescapedVariable(id) => self.render_variable(id, false),
            Node::Comment { .. } => {}
            Node::Assertion { id, description } => {
                if self.resolve(id).is_none() {
                    self.add_resolution_error(id, description.as_deref());
                }
            }
            Node::Json(id) => self.render_json(id),
            Node::Section(section) => self.render_section(section),
            Node::VertedSection(section) => {
                let Some(value) = self.resolve(&section.id).filter(Value::should_render) else {
                    return;
                };
                match &section.bind_to {
                    Some(bind_to) => {
                        self.contexts.push(bound_scope(bind_to, value));
                        self.render_node(&section.content);
                        self.contexts.pop();
                    }
                    None => self.render_node(&section.content),
                }
            }
            Node::InvertedSection(section) => {
                if !self.resolve(&section.id).is_some_and(|value| value.should_render()) {
                    self.render_node(&section.content);
                }
            }
            Node::Partial(partial) => self.render_partial(partial),
            Node::Inline(content) => {
                let start = self.text.len();
                self.render_node(content);
                let rendered = self.text.split_off(start);
                self.text.extend(rendered.chars().filter(|c| *c != '\n'));
            }
            Node::Indented { content, indentation } => self.render_indented(content, *indentation),
            Node::Block(content) => self.render_node(content),
            Node::Collection(nodes) => {
                for node in nodes {
                    self.render_node(node);
                }
            }
        }
    }

    fn render_variable(&mut self, id: &Identifier, escape: bool) {
        let Some(value) = self.resolve(id) else {
            return self.add_resolution_error(id, None);
        };
        match value.to_text() {
            Some(text) if escape => self.text.push_str(&escape_html(&text)),
            Some(text) => self.text.push_str(&text),
            None => self.add_resolution_error(id, Some("value has no text form")),
        }
    }

    fn render_json(&mut self, id: &Identifier) {
        let Some(value) = self.resolve(id) else {
            return self.add_resolution_error(id, None);
        };
        match value.to_json() {
            Some(json) => self.text.push_str(&json.to_string()),
            None => self.add_resolution_error(id, Some("not serializable as JSON")),
        }
    }

    fn render_section(&mut self, section: &Section) {
        let Some(value) = self.resolve(&section.id) else {
            return self.add_resolution_error(&section.id, None);
        };
        match value {
            Value::List(items) => {
                log::trace!("Iterating {} over {} items", section.id.description(), items.len());
                for item in items.iter() {
                    let scope = match &section.bind_to {
                        Some(bind_to) => bound_scope(bind_to, item.clone()),
                        None => item.clone(),
                    };
                    self.contexts.push(scope);
                    self.render_node(&section.content);
                    self.contexts.pop();
                }
            }
            value if value.supports_lookup() => {
                let scope = match &section.bind_to {
                    Some(bind_to) => bound_scope(bind_to, value),
                    None => value,
                };
                self.contexts.push(scope);
                self.render_node(&section.content);
                self.contexts.pop();
            }
            _ => self.add_resolution_error(&section.id, Some("not a list or a context")),
        }
    }

    /// Every line gets the indentation except empty ones; the output always
    /// ends with a newline.
    fn render_indented(&mut self, content: &Node, indentation: usize) {
        if content.is_comment() {
            return;
        }
        let start = self.text.len();
        self.render_node(content);
        let rendered = self.text.split_off(start);
        if rendered.is_empty() {
            return;
        }
        let indent = " ".repeat(indentation);
        let indented = rendered
            .split('\n')
            .map(|line| if line.is_empty() { String::new() } else { format!("{}{}", indent, line) })
            .join("\n");
        self.text.push_str(&indented);
        if !rendered.ends_with('\n') {
            self.text.push('\n');
        }
    }

    fn render_partial(&mut self, node: &PartialNode) {
        let partial = match self.resolve(&node.id) {
            Some(Value::Partial(partial)) => partial,
            Some(_) => return self.add_resolution_error(&node.id, Some("not a partial")),
            None => return self.add_resolution_error(&node.id, None),
        };
        log::trace!("Including {} into {}", node.id.description(), self.name);

        let mut args = BTreeMap::new();
        if let Some(pass_through) = &node.pass_through {
            match self.resolve(pass_through) {
                Some(value) => {
                    args.insert(pass_through.name().to_string(), value);
                }
                None => self.add_resolution_error(pass_through, None),
            }
        }
        for (key, argument) in &node.args {
            if let Some(value) = self.resolve_argument(argument) {
                args.insert(key.clone(), value);
            }
        }
        if let (Some(bind_to), Some(content)) = (&node.bind_to, &node.content) {
            let block = ContentBlock { node: Arc::clone(content), scope: self.contexts.snapshot() };
            args.insert(bind_to.name().to_string(), Value::Partial(Partial::Content(Arc::new(block))));
        }

        let mut fork = self.fork(&partial, &node.id);
        if !args.is_empty() {
            fork.contexts.push(Value::from(args));
        }
        fork.render_partial_target(&partial);
        self.merge(fork);
    }

    fn resolve_argument(&mut self, argument: &Argument) -> Option<Value> {
        match argument {
            Argument::Context(id) => {
                let value = self.resolve(id);
                if value.is_none() {
                    self.add_resolution_error(id, None);
                }
                value
            }
            Argument::Partial { id, args } => {
                let target = match self.resolve(id) {
                    Some(Value::Partial(partial)) => partial,
                    Some(_) => {
                        self.add_resolution_error(id, Some("not a partial"));
                        return None;
                    }
                    None => {
                        self.add_resolution_error(id, None);
                        return None;
                    }
                };
                let mut resolved = BTreeMap::new();
                for (key, argument) in args {
                    if let Some(value) = self.resolve_argument(argument) {
                        resolved.insert(key.clone(), value);
                    }
                }
                Some(Value::Partial(Partial::Applied {
                    target: Box::new(target),
                    args: Arc::new(resolved),
                }))
            }
        }
    }

    fn render_partial_target(&mut self, partial: &Partial) {
        match partial {
            Partial::Template(template) => self.render_node(template.root()),
            Partial::Content(block) => {
                // The block renders in the scope it was written in, with the
                // arguments it was included with on top.
                let arguments = self
                    .contexts
                    .first_local()
                    .unwrap_or_else(|| Value::from(BTreeMap::new()));
                let mut scope = block.scope.snapshot();
                scope.push(arguments);
                let outer = mem::replace(&mut self.contexts, scope);
                self.render_node(&block.node);
                self.contexts = outer;
            }
            Partial::Applied { target, args } => {
                self.contexts.push(Value::Map(Arc::clone(args)));
                self.render_partial_target(target);
                self.contexts.pop();
            }
        }
    }
}

fn bound_scope(bind_to: &Identifier, value: Value) -> Value {
    Value::map([(bind_to.name(), value)])
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
