use std::fmt;

use winnow::stream::Location;

use crate::span::Span;

/// Token types for the diagram language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    /// `#key: value` at the start of a top-level line.
    Directive { key: &'src str, value: &'src str },
    /// `// ...` at the start of a line.
    LineComment(&'src str),
    /// `<name>` directly after `[`.
    Classifier(&'src str),
    /// One of the relation operators such as `->` or `<:-`.
    Relation(&'src str),
    /// Any other run of non-blank characters.
    Text(&'src str),

    LeftBracket,  // [
    RightBracket, // ]
    Pipe,         // |
    Semicolon,    // ;

    Whitespace(&'src str),
    Newline,
}

impl<'src> Token<'src> {
    /// Source text the token stands for, used to rebuild free text.
    pub fn text(&self) -> &'src str {
        match self {
            Token::Relation(text) | Token::Text(text) | Token::Whitespace(text) => text,
            Token::LeftBracket => "[",
            Token::RightBracket => "]",
            Token::Pipe => "|",
            Token::Semicolon => ";",
            Token::Newline => "\n",
            Token::Directive { .. } | Token::LineComment(_) | Token::Classifier(_) => "",
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Token::Whitespace(_))
    }
}

/// A token with position information for winnow integration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl<'src> fmt::Display for PositionedToken<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl<'src> Location for PositionedToken<'src> {
    fn previous_token_end(&self) -> usize {
        self.span.start()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Directive { key, value } => write!(f, "#{key}: {value}"),
            Token::LineComment(comment) => write!(f, "//{comment}"),
            Token::Classifier(name) => write!(f, "<{name}>"),
            Token::Relation(text) | Token::Text(text) => write!(f, "{text}"),
            Token::Whitespace(_) => write!(f, " "),
            Token::Newline => write!(f, "\\n"),
            other => write!(f, "{}", other.text()),
        }
    }
}
