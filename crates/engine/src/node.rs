//! The parsed representation of a template.
//!
//! Trees are built once by the parser, never change afterwards, and can be
//! rendered any number of times. The `trim_*` operations exist only for the
//! parser's whitespace pass, which runs while a sibling list is still owned
//! by the parser.
use crate::identifier::Identifier;
use std::sync::Arc;

pub(crate) enum Node {
    Text(TextNode),
    /// `{{id}}`
    EscapedVariable(Identifier),
    /// `{{{id}}}`
    UnescapedVariable(Identifier),
    /// `{{- ... -}}`, and the body of sections written without one.
    Comment { start_line: usize, end_line: usize },
    /// `{{!id description}}`
    Assertion {
        id: Identifier,
        description: Option<String>,
    },
    /// `{{*id}}`
    Json(Identifier),
    /// `{{#id}}`
    Section(Section),
    /// `{{?id}}`
    VertedSection(Section),
    /// `{{^id}}`; never has a bound name.
    InvertedSection(Section),
    /// `{{+id}}`
    Partial(PartialNode),
    /// Rendered with its newlines removed.
    Inline(Box<Node>),
    /// Rendered with every line prefixed by `indentation` spaces.
    Indented {
        content: Box<Node>,
        indentation: usize,
    },
    /// Spans several lines; its edges were trimmed once at parse time.
    Block(Box<Node>),
    Collection(Vec<Node>),
}

pub(crate) struct TextNode {
    pub(crate) text: String,
    pub(crate) start_line: usize,
    pub(crate) end_line: usize,
}

pub(crate) struct Section {
    pub(crate) bind_to: Option<Identifier>,
    pub(crate) id: Identifier,
    pub(crate) content: Box<Node>,
}

pub(crate) struct PartialNode {
    pub(crate) bind_to: Option<Identifier>,
    pub(crate) id: Identifier,
    pub(crate) args: Vec<(String, Argument)>,
    /// The block between `{{+b:id}}` and `{{/id}}`, exposed to the partial as `b`.
    pub(crate) content: Option<Arc<Node>>,
    /// Set by `{{+b:id /}}`: `b` is resolved in the including template and
    /// handed to the partial under the same name.
    pub(crate) pass_through: Option<Identifier>,
    /// Line of the closing tag.
    pub(crate) end_line: usize,
}

pub(crate) enum Argument {
    /// `key:id`
    Context(Identifier),
    /// `key:id(args...)`
    Partial {
        id: Identifier,
        args: Vec<(String, Argument)>,
    },
}

impl Node {
    /// Wraps a sibling list; `None` if it is empty.
    pub(crate) fn collection(mut nodes: Vec<Node>) -> Option<Node> {
        match nodes.len() {
            0 => None,
            1 => nodes.pop(),
            _ => Some(Node::Collection(nodes)),
        }
    }

    /// The decorated node of a section, decorator, or block wrapper.
    fn content(&self) -> Option<&Node> {
        match self {
            Node::Section(section) | Node::VertedSection(section) | Node::InvertedSection(section) => {
                Some(&section.content)
            }
            Node::Inline(content) | Node::Block(content) | Node::Indented { content, .. } => {
                Some(content)
            }
            _ => None,
        }
    }

    fn content_mut(&mut self) -> Option<&mut Node> {
        match self {
            Node::Section(section) | Node::VertedSection(section) | Node::InvertedSection(section) => {
                Some(&mut section.content)
            }
            Node::Inline(content) | Node::Block(content) | Node::Indented { content, .. } => {
                Some(content)
            }
            _ => None,
        }
    }

    pub(crate) fn is_comment(&self) -> bool {
        matches!(self, Node::Comment { .. })
    }

    pub(crate) fn starts_with_new_line(&self) -> bool {
        match self {
            Node::Text(text) => text.text.starts_with('\n'),
            Node::Collection(nodes) => nodes.first().is_some_and(Node::starts_with_new_line),
            _ => self.content().is_some_and(Node::starts_with_new_line),
        }
    }

    pub(crate) fn trim_starting_new_line(&mut self) {
        match self {
            Node::Text(text) => {
                if text.text.starts_with('\n') {
                    text.text.remove(0);
                }
            }
            Node::Collection(nodes) => {
                if let Some(first) = nodes.first_mut() {
                    first.trim_starting_new_line();
                }
            }
            _ => {
                if let Some(content) = self.content_mut() {
                    content.trim_starting_new_line();
                }
            }
        }
    }

    /// Removes trailing spaces and returns how many there were.
    pub(crate) fn trim_ending_spaces(&mut self) -> usize {
        match self {
            Node::Text(text) => {
                let kept = text.last_index_of_spaces();
                let trimmed = text.text.len() - kept;
                text.text.truncate(kept);
                trimmed
            }
            Node::Collection(nodes) => nodes.last_mut().map_or(0, Node::trim_ending_spaces),
            _ => self.content_mut().map_or(0, Node::trim_ending_spaces),
        }
    }

    pub(crate) fn trim_ending_new_line(&mut self) {
        match self {
            Node::Text(text) => {
                if text.text.ends_with('\n') {
                    text.text.pop();
                }
            }
            Node::Collection(nodes) => {
                if let Some(last) = nodes.last_mut() {
                    last.trim_ending_new_line();
                }
            }
            _ => {
                if let Some(content) = self.content_mut() {
                    content.trim_ending_new_line();
                }
            }
        }
    }

    /// True if, ignoring trailing spaces, the node is empty or ends in a newline.
    pub(crate) fn ends_with_empty_line(&self) -> bool {
        match self {
            Node::Text(text) => {
                let index = text.last_index_of_spaces();
                index == 0 || text.text.as_bytes()[index - 1] == b'\n'
            }
            Node::Collection(nodes) => nodes.last().is_some_and(Node::ends_with_empty_line),
            _ => self.content().is_some_and(Node::ends_with_empty_line),
        }
    }

    pub(crate) fn start_line(&self) -> usize {
        match self {
            Node::Text(text) => text.start_line,
            Node::Comment { start_line, .. } => *start_line,
            Node::EscapedVariable(id) | Node::UnescapedVariable(id) | Node::Json(id) => id.line(),
            Node::Assertion { id, .. } => id.line(),
            Node::Partial(partial) => partial.id.line(),
            Node::Collection(nodes) => nodes.first().map_or(0, Node::start_line),
            _ => self.content().map_or(0, Node::start_line),
        }
    }

    pub(crate) fn end_line(&self) -> usize {
        match self {
            Node::Text(text) => text.end_line,
            Node::Comment { end_line, .. } => *end_line,
            Node::EscapedVariable(id) | Node::UnescapedVariable(id) | Node::Json(id) => id.line(),
            Node::Assertion { id, .. } => id.line(),
            Node::Partial(partial) => partial.end_line,
            Node::Collection(nodes) => nodes.last().map_or(0, Node::end_line),
            _ => self.content().map_or(0, Node::end_line),
        }
    }
}

impl TextNode {
    /// Byte length of the text without its trailing spaces.
    fn last_index_of_spaces(&self) -> usize {
        self.text.trim_end_matches(' ').len()
    }
}
