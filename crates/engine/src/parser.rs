//! Recursive-descent parser from template source to a [`Node`] tree.
use crate::error::{Location, ParseError};
use crate::identifier::{Identifier, is_valid_segment};
use crate::node::{Argument, Node, PartialNode, Section, TextNode};
use crate::token::{Token, TokenStream, WHITESPACE};
use crate::whitespace;
use std::sync::Arc;

/// Characters that end an identifier inside a tag.
const IDENTIFIER_TERMINATORS: &str = " \n\r\t:(),";

pub(crate) fn parse(source: &str) -> Result<Node, ParseError> {
    let mut parser = Parser { tokens: TokenStream::new(source) };
    let root = parser.parse_section()?.ok_or(ParseError::EmptyTemplate)?;
    if parser.tokens.has_next() {
        return Err(ParseError::TrailingTokens { line: parser.tokens.next_line });
    }
    Ok(root)
}

struct Parser<'a> {
    tokens: TokenStream<'a>,
}

#[derive(Clone, Copy)]
enum SectionKind {
    Section,
    Verted,
    Inverted,
}

impl SectionKind {
    fn node(self, section: Section) -> Node {
        match self {
            SectionKind::Section => Node::Section(section),
            SectionKind::Verted => Node::VertedSection(section),
            SectionKind::Inverted => Node::InvertedSection(section),
        }
    }

    /// The kind of the `{{:id}}` clause's node.
    fn inverse(self) -> SectionKind {
        match self {
            SectionKind::Section | SectionKind::Verted => SectionKind::Inverted,
            SectionKind::Inverted => SectionKind::Verted,
        }
    }
}

impl<'a> Parser<'a> {
    /// Parses siblings until EOF, `{{/`, or `{{:`, leaving the terminating
    /// token unconsumed. Returns `None` if there were none.
    fn parse_section(&mut self) -> Result<Option<Node>, ParseError> {
        let mut nodes = Vec::new();
        while let Some(token) = self.tokens.next_token() {
            match token {
                Token::OpenEndSection | Token::OpenElse => break,
                Token::Character => {
                    let start_line = self.tokens.next_line;
                    let text = self.tokens.advance_over_next_string("").to_string();
                    nodes.push(Node::Text(TextNode {
                        text,
                        start_line,
                        end_line: self.tokens.next_line,
                    }));
                }
                Token::OpenVariable => {
                    let id = self.parse_tag_identifier(Token::CloseMustache)?;
                    nodes.push(Node::EscapedVariable(id));
                }
                Token::OpenUnescapedVariable => {
                    let id = self.parse_tag_identifier(Token::CloseMustache3)?;
                    nodes.push(Node::UnescapedVariable(id));
                }
                Token::OpenJson => {
                    let id = self.parse_tag_identifier(Token::CloseMustache)?;
                    nodes.push(Node::Json(id));
                }
                Token::OpenAssertion => nodes.push(self.parse_assertion()?),
                Token::OpenComment => nodes.push(self.parse_comment()?),
                Token::OpenStartSection => nodes.extend(self.parse_section_tag(SectionKind::Section)?),
                Token::OpenStartVertedSection => {
                    nodes.extend(self.parse_section_tag(SectionKind::Verted)?)
                }
                Token::OpenStartInvertedSection => {
                    nodes.extend(self.parse_section_tag(SectionKind::Inverted)?)
                }
                Token::OpenPartial => nodes.push(self.parse_partial()?),
                Token::CloseMustache
                | Token::CloseMustache3
                | Token::CloseComment
                | Token::InlineEndSection => {
                    return Err(ParseError::Orphaned {
                        token: token.name(),
                        line: self.tokens.next_line,
                    });
                }
            }
        }
        Ok(Node::collection(whitespace::normalize(nodes)))
    }

    fn parse_identifier(&mut self) -> Result<Identifier, ParseError> {
        self.tokens.skip_whitespace();
        let line = self.tokens.next_line;
        let column = self.tokens.next_column + 1;
        let name = self.tokens.advance_over_next_string(IDENTIFIER_TERMINATORS);
        self.tokens.skip_whitespace();
        Identifier::new(name, line, column)
    }

    /// `[bind:]id`
    fn parse_binding(&mut self) -> Result<(Option<Identifier>, Identifier), ParseError> {
        let first = self.parse_identifier()?;
        if self.tokens.next_char() == Some(':') {
            self.tokens.advance();
            let id = self.parse_identifier()?;
            return Ok((Some(first), id));
        }
        Ok((None, first))
    }

    /// Consumes the opening token, an identifier, and `close`.
    fn parse_tag_identifier(&mut self, close: Token) -> Result<Identifier, ParseError> {
        self.tokens.advance();
        let id = self.parse_identifier()?;
        self.tokens.advance_over(close, Some(&format!("to close {}", id.description())))?;
        Ok(id)
    }

    fn parse_assertion(&mut self) -> Result<Node, ParseError> {
        self.tokens.advance();
        let id = self.parse_identifier()?;
        let description = self.tokens.advance_over_next_string("").trim();
        let description = (!description.is_empty()).then(|| description.to_string());
        self.tokens
            .advance_over(Token::CloseMustache, Some(&format!("to close assertion {}", id.description())))?;
        Ok(Node::Assertion { id, description })
    }

    /// Comments nest: every `{{-` inside needs its own `-}}`.
    fn parse_comment(&mut self) -> Result<Node, ParseError> {
        let start_line = self.tokens.next_line;
        self.tokens.advance();
        let mut depth = 1;
        while depth > 0 {
            match self.tokens.next_token() {
                None => return Err(ParseError::UnterminatedComment { line: start_line }),
                Some(Token::OpenComment) => depth += 1,
                Some(Token::CloseComment) => depth -= 1,
                Some(_) => {}
            }
            self.tokens.advance();
        }
        Ok(Node::Comment { start_line, end_line: self.tokens.next_line })
    }

    /// A section and, if it has an `{{:id}}` clause, the clause's node.
    fn parse_section_tag(&mut self, kind: SectionKind) -> Result<Vec<Node>, ParseError> {
        let start_line = self.tokens.next_line;
        self.tokens.advance();
        let (bind_to, id) = self.parse_binding()?;
        if let (SectionKind::Inverted, Some(bind_to)) = (kind, &bind_to) {
            return Err(ParseError::InvertedBinding {
                bind_to: bind_to.name().to_string(),
                id: id.name().to_string(),
            });
        }

        if self.tokens.next_token() == Some(Token::InlineEndSection) {
            self.tokens.advance();
            let content = Box::new(self.placeholder(start_line));
            return Ok(vec![kind.node(Section { bind_to, id, content })]);
        }

        let context = format!("to open section {}", id.description());
        self.tokens.advance_over(Token::CloseMustache, Some(&context))?;
        let content = self.parse_content(start_line)?;

        let mut else_node = None;
        if self.tokens.next_token() == Some(Token::OpenElse) {
            let else_line = self.tokens.next_line;
            self.tokens.advance();
            let name = self.parse_closing_name();
            if !name.is_empty() && name != id.name() {
                return Err(ParseError::MismatchedElse { start: id.name().to_string(), found: name });
            }
            let context = format!("to open else clause of {}", id.description());
            self.tokens.advance_over(Token::CloseMustache, Some(&context))?;
            let content = self.parse_content(else_line)?;
            else_node = Some(kind.inverse().node(Section { bind_to: None, id: id.clone(), content }));
        }

        self.close_section(&id)?;
        let mut nodes = vec![kind.node(Section { bind_to, id, content })];
        nodes.extend(else_node);
        Ok(nodes)
    }

    /// A section body; an empty one becomes a placeholder comment so that
    /// whitespace around the tags is still handled.
    fn parse_content(&mut self, start_line: usize) -> Result<Box<Node>, ParseError> {
        let content = self.parse_section()?;
        Ok(Box::new(content.unwrap_or_else(|| self.placeholder(start_line))))
    }

    fn placeholder(&self, start_line: usize) -> Node {
        Node::Comment { start_line, end_line: self.tokens.next_line }
    }

    fn parse_closing_name(&mut self) -> String {
        self.tokens.skip_whitespace();
        let name = self.tokens.advance_over_next_string(WHITESPACE).to_string();
        self.tokens.skip_whitespace();
        name
    }

    /// `{{/id}}` or `{{/}}`
    fn close_section(&mut self, id: &Identifier) -> Result<(), ParseError> {
        let context = format!("to close {}", id.description());
        self.tokens.advance_over(Token::OpenEndSection, Some(&context))?;
        let name = self.parse_closing_name();
        if !name.is_empty() && name != id.name() {
            return Err(ParseError::MismatchedSection { start: id.name().to_string(), end: name });
        }
        self.tokens.advance_over(Token::CloseMustache, Some(&context))
    }

    /// `{{+[b:]id(args) /}}` or `{{+[b:]id(args)}}content{{/id}}`
    fn parse_partial(&mut self) -> Result<Node, ParseError> {
        self.tokens.advance();
        let (bind_to, id) = self.parse_binding()?;
        let args = if self.tokens.next_char() == Some('(') {
            self.parse_arguments()?
        } else {
            Vec::new()
        };

        if self.tokens.next_token() == Some(Token::InlineEndSection) {
            self.tokens.advance();
            return Ok(Node::Partial(PartialNode {
                bind_to: None,
                id,
                args,
                content: None,
                pass_through: bind_to,
                end_line: self.tokens.next_line,
            }));
        }

        let context = format!("to open partial {}", id.description());
        self.tokens.advance_over(Token::CloseMustache, Some(&context))?;
        let content = self.parse_section()?.map(|mut content| {
            content.trim_starting_new_line();
            content.trim_ending_spaces();
            content.trim_ending_new_line();
            Arc::new(content)
        });
        self.close_section(&id)?;
        if content.is_some() && bind_to.is_none() {
            log::debug!("Content of partial {} is not bound to a name and will not be used", id.description());
        }
        Ok(Node::Partial(PartialNode {
            bind_to,
            id,
            args,
            content,
            pass_through: None,
            end_line: self.tokens.next_line,
        }))
    }

    /// `(key:id, key:partial(args...), ...)`
    fn parse_arguments(&mut self) -> Result<Vec<(String, Argument)>, ParseError> {
        self.tokens.advance_over_separator('(', Some("to open partial arguments"))?;
        let mut args = Vec::new();
        while self.tokens.next_char() != Some(')') {
            let location = Location {
                line: self.tokens.next_line,
                column: self.tokens.next_column + 1,
            };
            let key = self.tokens.advance_over_next_string(IDENTIFIER_TERMINATORS);
            if !is_valid_segment(key) {
                return Err(ParseError::InvalidArgument { name: key.to_string(), location });
            }
            let key = key.to_string();
            let context = format!("after partial argument '{}'", key);
            self.tokens.advance_over_separator(':', Some(&context))?;
            let id = self.parse_identifier()?;
            let argument = if self.tokens.next_char() == Some('(') {
                Argument::Partial { id, args: self.parse_arguments()? }
            } else {
                Argument::Context(id)
            };
            args.push((key, argument));

            self.tokens.skip_whitespace();
            if self.tokens.next_char() != Some(',') {
                break;
            }
            self.tokens.advance_over_separator(',', None)?;
        }
        self.tokens.advance_over_separator(')', Some("to close partial arguments"))?;
        Ok(args)
    }
}
