//! A cursor over template source that tells delimiters apart from plain text.
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    OpenStartSection,
    OpenStartVertedSection,
    OpenStartInvertedSection,
    OpenAssertion,
    OpenJson,
    OpenPartial,
    OpenElse,
    OpenEndSection,
    InlineEndSection,
    OpenUnescapedVariable,
    CloseMustache3,
    OpenComment,
    CloseComment,
    OpenVariable,
    CloseMustache,
    /// Any single character that doesn't start a delimiter.
    Character,
}

/// Delimiters, longest first so that `{{{` wins over `{{`.
const DELIMITERS: &[(&str, Token)] = &[
    ("{{{", Token::OpenUnescapedVariable),
    ("}}}", Token::CloseMustache3),
    ("{{#", Token::OpenStartSection),
    ("{{?", Token::OpenStartVertedSection),
    ("{{^", Token::OpenStartInvertedSection),
    ("{{!", Token::OpenAssertion),
    ("{{*", Token::OpenJson),
    ("{{+", Token::OpenPartial),
    ("{{:", Token::OpenElse),
    ("{{/", Token::OpenEndSection),
    ("/}}", Token::InlineEndSection),
    ("{{-", Token::OpenComment),
    ("-}}", Token::CloseComment),
    ("{{", Token::OpenVariable),
    ("}}", Token::CloseMustache),
];

pub(crate) const WHITESPACE: &str = " \n\r\t";

impl Token {
    /// The name used in parse error messages.
    pub(crate) fn name(self) -> &'static str {
        if self == Token::Character {
            return "character";
        }
        DELIMITERS
            .iter()
            .find(|(_, token)| *token == self)
            .map(|(text, _)| *text)
            .unwrap_or("unknown")
    }
}

pub(crate) struct TokenStream<'a> {
    source: &'a str,
    /// Byte offset of the next token.
    position: usize,
    next_token: Option<Token>,
    next_len: usize,
    pub(crate) next_line: usize,
    /// Characters consumed on the current line before the next token.
    pub(crate) next_column: usize,
}

impl<'a> TokenStream<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let mut stream = Self {
            source,
            position: 0,
            next_token: None,
            next_len: 0,
            next_line: 1,
            next_column: 0,
        };
        stream.recognize();
        stream
    }

    pub(crate) fn has_next(&self) -> bool {
        self.next_token.is_some()
    }

    pub(crate) fn next_token(&self) -> Option<Token> {
        self.next_token
    }

    pub(crate) fn next_contents(&self) -> &'a str {
        &self.source[self.position..self.position + self.next_len]
    }

    /// The next raw character, if the next token is plain text.
    pub(crate) fn next_char(&self) -> Option<char> {
        match self.next_token {
            Some(Token::Character) => self.next_contents().chars().next(),
            _ => None,
        }
    }

    pub(crate) fn advance(&mut self) {
        match self.next_token {
            None => return,
            Some(_) if self.next_contents() == "\n" => {
                self.next_line += 1;
                self.next_column = 0;
            }
            Some(_) => self.next_column += self.next_contents().chars().count(),
        }
        self.position += self.next_len;
        self.recognize();
    }

    fn recognize(&mut self) {
        let remainder = &self.source[self.position..];
        let Some(first) = remainder.chars().next() else {
            self.next_token = None;
            self.next_len = 0;
            return;
        };
        let (token, len) = DELIMITERS
            .iter()
            .find(|(text, _)| remainder.starts_with(text))
            .map(|(text, token)| (*token, text.len()))
            .unwrap_or((Token::Character, first.len_utf8()));
        self.next_token = Some(token);
        self.next_len = len;
    }

    pub(crate) fn advance_over(
        &mut self,
        expected: Token,
        context: Option<&str>,
    ) -> Result<(), ParseError> {
        match self.next_token {
            None => Err(ParseError::UnexpectedEof {
                expected: expected.name(),
                context: context.map(str::to_string),
            }),
            Some(found) if found != expected => Err(ParseError::UnexpectedToken {
                expected: expected.name(),
                found: found.name(),
                line: self.next_line,
                context: context.map(str::to_string),
            }),
            Some(_) => {
                self.advance();
                Ok(())
            }
        }
    }

    /// Requires `separator` (surrounding whitespace allowed) and moves past it.
    pub(crate) fn advance_over_separator(
        &mut self,
        separator: char,
        context: Option<&str>,
    ) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.next_char() {
            Some(c) if c == separator => {
                self.advance();
                self.skip_whitespace();
                Ok(())
            }
            other => Err(ParseError::ExpectedSeparator {
                expected: separator,
                found: match other {
                    Some(c) => format!("'{}'", c),
                    None => self.next_token.map_or("EOF", Token::name).to_string(),
                },
                line: self.next_line,
                context: context.map(str::to_string),
            }),
        }
    }

    /// Consumes plain characters up to the next delimiter or excluded character.
    pub(crate) fn advance_over_next_string(&mut self, excluded: &str) -> &'a str {
        let start = self.position;
        while let Some(c) = self.next_char() {
            if excluded.contains(c) {
                break;
            }
            self.advance();
        }
        &self.source[start..self.position]
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.next_char().is_some_and(|c| WHITESPACE.contains(c)) {
            self.advance();
        }
    }
}
