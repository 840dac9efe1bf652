//! Decides how each tag in a sibling list treats the whitespace around it.
//!
//! - A tag spanning several source lines becomes a block: its own leading
//!   newline and trailing spaces are trimmed, as are the spaces before it and
//!   the newline after it.
//! - A single-line tag alone on its line becomes indented: the spaces before
//!   it become the indentation of every line it renders, and the newline
//!   after it is dropped.
//! - Any other tag is inline: newlines in its output are removed.
//!
//! Text nodes are never wrapped. A tag with no siblings at all is inline.
use crate::node::Node;
use std::mem;

pub(crate) fn normalize(mut nodes: Vec<Node>) -> Vec<Node> {
    let sole = nodes.len() == 1;
    for i in 0..nodes.len() {
        if matches!(nodes[i], Node::Text(_)) {
            continue;
        }
        let (before, rest) = nodes.split_at_mut(i);
        let Some((current, after)) = rest.split_first_mut() else {
            continue;
        };
        let mut previous = before.last_mut();
        let mut next = after.first_mut();

        let mut content = mem::replace(current, Node::Comment { start_line: 0, end_line: 0 });
        *current = if content.start_line() != content.end_line() {
            content.trim_starting_new_line();
            content.trim_ending_spaces();
            if let Some(previous) = previous {
                previous.trim_ending_spaces();
            }
            if let Some(next) = next {
                next.trim_starting_new_line();
            }
            Node::Block(Box::new(content))
        } else if !sole
            && previous.as_deref().is_none_or(Node::ends_with_empty_line)
            && next.as_deref().is_none_or(Node::starts_with_new_line)
        {
            let indentation = previous.as_mut().map_or(0, |node| node.trim_ending_spaces());
            if let Some(next) = next.as_mut() {
                next.trim_starting_new_line();
            }
            Node::Indented { content: Box::new(content), indentation }
        } else {
            Node::Inline(Box::new(content))
        };
    }
    nodes
}
