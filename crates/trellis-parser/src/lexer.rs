//! Lexical analyzer for diagram source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! It is context sensitive in three places:
//!
//! - `#key: value` is a directive only at the start of a top-level line,
//! - `//` starts a comment only at the start of a line,
//! - `<name>` is a classifier only directly after `[`.
//!
//! Relation operators are matched longest first. Operators beginning with
//! `o` need a token boundary before them and operators ending in `o` must not
//! run into a word, so `foo->` and `-object` stay readable as text.
//!
//! The public entry point is [`tokenize`], which recovers from errors and
//! reports every diagnostic found in a single pass.

use winnow::{
    Parser as _,
    combinator::{alt, delimited, not, peek, preceded, repeat, terminated},
    error::{ContextError, ErrMode},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, one_of, take_till, take_while},
};

use trellis_core::model::Relation;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError>>;

/// Deepest accepted node nesting. The parser and the layout recurse once per
/// level, so the limit keeps pasted input from exhausting the stack.
pub(crate) const MAX_NESTING: usize = 64;

fn is_text_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '[' | ']' | '|' | ';')
}

/// Parse a `#key: value` directive line.
fn directive<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded('#', take_till(0.., '\n'))
        .verify_map(|body: &'a str| {
            let (key, value) = body.split_once(':')?;
            let key = key.trim();
            (!key.is_empty()).then(|| Token::Directive {
                key,
                value: value.trim(),
            })
        })
        .parse_next(input)
}

/// Parse line comment starting with '//'
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded("//", take_till(0.., '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

fn classifier_name<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '-').parse_next(input)
}

/// Parse a `<name>` classifier.
fn classifier<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    delimited('<', classifier_name, '>')
        .map(Token::Classifier)
        .parse_next(input)
}

/// Parse the longest relation operator at the current position.
///
/// `at_boundary` tells whether the previous character ends a word, which
/// operators starting with `o` require.
fn relation<'a>(input: &mut Input<'a>, at_boundary: bool) -> IResult<Token<'a>> {
    for operator in Relation::tokens() {
        if operator.starts_with('o') && !at_boundary {
            continue;
        }
        let checkpoint = input.checkpoint();
        let matched: IResult<&'a str> = if operator.ends_with('o') {
            terminated(
                literal(operator),
                peek(not(one_of(|c: char| c.is_alphanumeric()))),
            )
            .parse_next(input)
        } else {
            literal(operator).parse_next(input)
        };
        match matched {
            Ok(text) => return Ok(Token::Relation(text)),
            Err(_) => input.reset(&checkpoint),
        }
    }
    Err(ErrMode::Backtrack(ContextError::new()))
}

fn relation_inside_word<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    relation(input, false)
}

fn text_tail<'a>(input: &mut Input<'a>) -> IResult<()> {
    repeat(
        0..,
        preceded(not(relation_inside_word), one_of(is_text_char)),
    )
    .parse_next(input)
}

/// Parse a run of text up to the next blank, bracket, separator or relation.
fn text<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (one_of(is_text_char), text_tail)
        .take()
        .map(Token::Text)
        .parse_next(input)
}

fn punctuation<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        '|'.value(Token::Pipe),
        ';'.value(Token::Semicolon),
    ))
    .parse_next(input)
}

/// Parse whitespace (spaces, tabs, etc. but not newlines)
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .map(Token::Whitespace)
        .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
    /// Spans of `[` not closed yet, innermost last.
    open_brackets: Vec<Span>,
    at_line_start: bool,
    expect_classifier: bool,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
            open_brackets: Vec::new(),
            at_line_start: true,
            expect_classifier: false,
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while input.eof_offset() > 0 {
            let start = input.current_token_start();
            match self.next_token(&mut input) {
                Ok(token) => {
                    let span = Span::new(start..input.current_token_start());
                    self.accept(token, span);
                }
                Err(diagnostic) => {
                    self.diagnostics.emit(diagnostic);
                    if input.current_token_start() == start {
                        input.next_token();
                    }
                }
            }
        }

        for open in self.open_brackets.drain(..).rev() {
            self.diagnostics
                .emit(Diagnostic::new(ErrorCode::E001, open, "unclosed node"));
        }
    }

    /// Lex one token, or consume the offending input and describe it.
    fn next_token(&mut self, input: &mut Input<'a>) -> Result<Token<'a>, Diagnostic> {
        let start = input.current_token_start();

        if self.at_line_start {
            if self.open_brackets.is_empty() && input.starts_with('#') {
                let checkpoint = input.checkpoint();
                return directive.parse_next(input).map_err(|_| {
                    input.reset(&checkpoint);
                    let _: IResult<&str> = take_till(0.., '\n').parse_next(input);
                    Diagnostic::new(
                        ErrorCode::E003,
                        Span::new(start..input.current_token_start()),
                        "directive is missing `:`",
                    )
                });
            }
            if input.starts_with("//") {
                return line_comment
                    .parse_next(input)
                    .map_err(|_| Self::unexpected(start));
            }
        }

        if self.expect_classifier && Self::starts_classifier(input) {
            let checkpoint = input.checkpoint();
            return classifier.parse_next(input).map_err(|_| {
                input.reset(&checkpoint);
                let _: IResult<&str> = preceded('<', take_while(0.., |c: char| {
                    c.is_alphanumeric() || c == '_' || c == '-'
                }))
                .parse_next(input);
                Diagnostic::new(
                    ErrorCode::E004,
                    Span::new(start..input.current_token_start()),
                    "classifier is missing `>`",
                )
            });
        }

        let at_boundary = self.at_boundary();
        alt((
            newline,
            whitespace,
            punctuation,
            |input: &mut Input<'a>| relation(input, at_boundary),
            text,
        ))
        .parse_next(input)
        .map_err(|_| Self::unexpected(start))
    }

    fn starts_classifier(input: &Input<'a>) -> bool {
        let mut chars = input.chars();
        chars.next() == Some('<') && chars.next().is_some_and(char::is_alphabetic)
    }

    /// Whether the previous token ends a word.
    fn at_boundary(&self) -> bool {
        self.tokens.last().is_none_or(|last| {
            !matches!(last.token, Token::Text(_) | Token::Relation(_))
        })
    }

    fn accept(&mut self, token: Token<'a>, span: Span) {
        match token {
            Token::LeftBracket => {
                if self.open_brackets.len() == MAX_NESTING {
                    self.diagnostics.emit(Diagnostic::new(
                        ErrorCode::E005,
                        span,
                        format!("nodes nest more than {MAX_NESTING} levels deep"),
                    ));
                }
                self.open_brackets.push(span);
                self.at_line_start = false;
                self.expect_classifier = true;
            }
            Token::RightBracket => {
                if self.open_brackets.pop().is_none() {
                    self.diagnostics.emit(Diagnostic::new(
                        ErrorCode::E002,
                        span,
                        "stray `]` outside of a node",
                    ));
                    return;
                }
                self.at_line_start = false;
                self.expect_classifier = false;
            }
            Token::Whitespace(_) => {}
            Token::Newline => {
                self.at_line_start = true;
                self.expect_classifier = false;
            }
            _ => {
                self.at_line_start = false;
                self.expect_classifier = false;
            }
        }
        self.tokens.push(PositionedToken::new(token, span));
    }

    fn unexpected(start: usize) -> Diagnostic {
        Diagnostic::new(ErrorCode::E100, Span::new(start..start + 1), "unexpected character")
    }

    /// Finish lexing and return tokens or collected errors.
    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }
}

/// Split source text into positioned tokens, collecting every lexical error.
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}
