//! Parser for diagram source tokens.
//!
//! This module transforms the token stream from the [`lexer`](super::lexer)
//! into the syntax tree defined in [`ast`](super::ast). The public entry
//! point is [`build_document`].
//!
//! Parts (lines of a compartment or of the document) are collected as a flat
//! run of text, relation and node tokens and then split at the node literals.
//! Between two nodes the relation is the operator standing free of text on
//! both sides, falling back to the first operator; the text before and after
//! it become the start and end labels.

use winnow::{
    Parser as _,
    combinator::{opt, repeat},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    ast::{Chain, CompartmentLiteral, Document, Link, NodeLiteral, Part, Statement},
    error::{self, Diagnostic, ErrorCode},
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) at error start position
    StartOffset(usize),
}

type Input<'src> = TokenSlice<'src, PositionedToken<'src>>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;

/// Runs `f`, turning any failure into a cut error remembering where it started.
fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

/// Cut error at the current position, described by `label`.
fn cut_error_here(input: &Input<'_>, label: &'static str) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Label(label));
    e.push(Context::StartOffset(input.eof_offset()));
    ErrMode::Cut(e)
}

fn advance<'src>(input: &mut Input<'src>) -> IResult<&'src PositionedToken<'src>> {
    any.parse_next(input)
}

/// Look at the next token without consuming it.
fn peek_token<'src>(input: &mut Input<'src>) -> Option<&'src PositionedToken<'src>> {
    let checkpoint = input.checkpoint();
    let token = advance(input).ok();
    input.reset(&checkpoint);
    token
}

/// Skip blanks and comments inside a node.
fn blanks<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(
        0..,
        any.verify(|token: &PositionedToken<'_>| {
            matches!(token.token, Token::Whitespace(_) | Token::LineComment(_))
        })
        .void(),
    )
    .parse_next(input)
}

fn left_bracket<'src>(input: &mut Input<'src>) -> IResult<Span> {
    any.verify_map(|token: &'src PositionedToken<'src>| {
        matches!(token.token, Token::LeftBracket).then_some(token.span)
    })
    .context(Context::Label("`[`"))
    .parse_next(input)
}

fn right_bracket<'src>(input: &mut Input<'src>) -> IResult<Span> {
    any.verify_map(|token: &'src PositionedToken<'src>| {
        matches!(token.token, Token::RightBracket).then_some(token.span)
    })
    .context(Context::Label("`]`"))
    .parse_next(input)
}

fn pipe<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Pipe))
        .void()
        .parse_next(input)
}

/// A part separator inside a compartment: `;` or a newline.
fn separator<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| {
        matches!(token.token, Token::Semicolon | Token::Newline)
    })
    .void()
    .parse_next(input)
}

fn classifier<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    any.verify_map(|token: &'src PositionedToken<'src>| match token.token {
        Token::Classifier(name) => Some(Spanned::new(name.to_string(), token.span)),
        _ => None,
    })
    .context(Context::Label("classifier"))
    .parse_next(input)
}

/// Parse `[<classifier> compartment | compartment ...]`.
fn node_literal<'src>(input: &mut Input<'src>) -> IResult<NodeLiteral> {
    let open = left_bracket.parse_next(input)?;

    cut_err(input, |input| {
        blanks.parse_next(input)?;
        let classifier = opt(classifier).parse_next(input)?;

        let mut compartments = vec![compartment(input)?];
        while opt(pipe).parse_next(input)?.is_some() {
            compartments.push(compartment(input)?);
        }

        let close = right_bracket.parse_next(input)?;
        Ok(NodeLiteral {
            classifier,
            compartments,
            span: open.union(close),
        })
    })
}

/// Parse parts separated by `;` or newlines, up to `|`, `]` or the end.
fn compartment<'src>(input: &mut Input<'src>) -> IResult<CompartmentLiteral> {
    let mut parts = Vec::new();
    loop {
        if let Some(part) = part(input)? {
            parts.push(part);
        }
        if opt(separator).parse_next(input)?.is_none() {
            break;
        }
    }

    let span = parts
        .iter()
        .map(Part::span)
        .reduce(|a, b| a.union(b))
        .unwrap_or_default();
    Ok(CompartmentLiteral { parts, span })
}

/// A token or a complete node literal within a part.
enum Element<'src> {
    Atom(&'src PositionedToken<'src>),
    Node(NodeLiteral),
}

impl Element<'_> {
    fn span(&self) -> Option<Span> {
        match self {
            Element::Atom(token) if token.is_blank() => None,
            Element::Atom(token) => Some(token.span),
            Element::Node(node) => Some(node.span),
        }
    }
}

/// Parse one part; `None` when it holds nothing but blanks.
fn part<'src>(input: &mut Input<'src>) -> IResult<Option<Part>> {
    let mut elements = Vec::new();
    while let Some(next) = peek_token(input) {
        match next.token {
            Token::Text(_) | Token::Relation(_) | Token::Whitespace(_) => {
                advance(input)?;
                elements.push(Element::Atom(next));
            }
            Token::LeftBracket => elements.push(Element::Node(node_literal(input)?)),
            Token::LineComment(_) => {
                advance(input)?;
            }
            _ => break,
        }
    }
    Ok(assemble(elements))
}

fn concat(tokens: &[&PositionedToken<'_>]) -> String {
    tokens
        .iter()
        .map(|token| token.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn union_spans(spans: impl Iterator<Item = Span>) -> Option<Span> {
    spans.reduce(|a, b| a.union(b))
}

fn is_blank(segment: &[&PositionedToken<'_>]) -> bool {
    segment.iter().all(|token| token.is_blank())
}

/// Index of the relation operator that separates the two labels of a link.
fn choose_relation(segment: &[&PositionedToken<'_>]) -> Option<usize> {
    let is_text = |index: Option<usize>| {
        index
            .and_then(|index| segment.get(index))
            .is_some_and(|token| matches!(token.token, Token::Text(_)))
    };
    let relations = || {
        segment
            .iter()
            .enumerate()
            .filter(|(_, token)| matches!(token.token, Token::Relation(_)))
            .map(|(index, _)| index)
    };

    relations()
        .find(|&index| !is_text(index.checked_sub(1)) && !is_text(Some(index + 1)))
        .or_else(|| relations().next())
}

fn link(segment: &[&PositionedToken<'_>], target: Option<NodeLiteral>) -> Link {
    let span = union_spans(
        segment
            .iter()
            .filter(|token| !token.is_blank())
            .map(|token| token.span),
    )
    .or_else(|| target.as_ref().map(|node| node.span))
    .unwrap_or_default();

    match choose_relation(segment) {
        Some(index) => Link {
            relation: Some(Spanned::new(
                segment[index].text().to_string(),
                segment[index].span,
            )),
            start_label: concat(&segment[..index]),
            end_label: concat(&segment[index + 1..]),
            target,
            span,
        },
        None => Link {
            relation: None,
            start_label: concat(segment),
            end_label: String::new(),
            target,
            span,
        },
    }
}

/// Turn a flat run of elements into text or a chain.
fn assemble(elements: Vec<Element<'_>>) -> Option<Part> {
    let span = union_spans(elements.iter().filter_map(Element::span))?;

    if !elements.iter().any(|element| matches!(element, Element::Node(_))) {
        let atoms: Vec<_> = elements
            .iter()
            .filter_map(|element| match element {
                Element::Atom(token) => Some(*token),
                Element::Node(_) => None,
            })
            .collect();
        return Some(Part::Text(Spanned::new(concat(&atoms), span)));
    }

    let mut segments = vec![Vec::new()];
    let mut nodes = Vec::new();
    for element in elements {
        match element {
            Element::Atom(token) => {
                if let Some(segment) = segments.last_mut() {
                    segment.push(token);
                }
            }
            Element::Node(node) => {
                nodes.push(node);
                segments.push(Vec::new());
            }
        }
    }

    let mut nodes = nodes.into_iter();
    let mut segments = segments.into_iter();
    let mut links = Vec::new();

    let leading = segments.next().unwrap_or_default();
    let head = if is_blank(&leading) {
        nodes.next()
    } else {
        links.push(link(&leading, nodes.next()));
        None
    };

    for segment in segments {
        let target = nodes.next();
        if target.is_none() && is_blank(&segment) {
            continue;
        }
        links.push(link(&segment, target));
    }

    Some(Part::Chain(Chain { head, links, span }))
}

fn directive(token: &PositionedToken<'_>) -> Option<Statement> {
    match token.token {
        Token::Directive { key, value } => Some(Statement::Directive {
            key: Spanned::new(key.to_string(), token.span),
            value: Spanned::new(value.to_string(), token.span),
        }),
        _ => None,
    }
}

fn document<'src>(input: &mut Input<'src>) -> IResult<Document> {
    let mut statements = Vec::new();

    while let Some(next) = peek_token(input) {
        match next.token {
            Token::Whitespace(_) | Token::Newline | Token::Semicolon | Token::LineComment(_) => {
                advance(input)?;
            }
            Token::Directive { .. } => {
                advance(input)?;
                statements.extend(directive(next));
            }
            Token::Pipe => return Err(cut_error_here(input, "`|` only inside a node")),
            Token::RightBracket | Token::Classifier(_) => {
                return Err(cut_error_here(input, "a node, relation or directive"));
            }
            Token::Text(_) | Token::Relation(_) | Token::LeftBracket => {
                if let Some(part) = part(input)? {
                    statements.push(Statement::Part(part));
                }
            }
        }
    }

    Ok(Document { statements })
}

/// Convert a winnow error into a diagnostic spanning the offending tokens.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken<'_>],
    current_remaining: usize,
) -> Diagnostic {
    let end_offset = tokens.len().saturating_sub(current_remaining);
    let meaningful_span = |range: std::ops::Range<usize>| {
        union_spans(
            tokens
                .get(range)
                .unwrap_or_default()
                .iter()
                .filter(|token| !matches!(token.token, Token::Whitespace(_) | Token::Newline))
                .map(|token| token.span),
        )
    };
    let last_span = tokens.last().map(|token| token.span).unwrap_or_default();

    match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => {
            let start_offset = e
                .context()
                .find_map(|ctx| match ctx {
                    Context::StartOffset(remaining) => {
                        Some(tokens.len().saturating_sub(*remaining))
                    }
                    Context::Label(_) => None,
                })
                .unwrap_or(0);

            let expected: Vec<String> = e
                .context()
                .filter_map(|ctx| match ctx {
                    Context::Label(label) => Some(format!("expected {label}")),
                    Context::StartOffset(_) => None,
                })
                .collect();
            let message = if expected.is_empty() {
                "unexpected token or end of input".to_string()
            } else {
                expected.join(" → ")
            };

            let error_span = if end_offset < tokens.len() {
                tokens[end_offset].span
            } else {
                meaningful_span(start_offset..tokens.len()).unwrap_or(last_span)
            };

            Diagnostic::new(ErrorCode::E100, error_span, format!("unexpected token: {message}"))
        }
        ErrMode::Incomplete(_) => {
            let error_span = tokens
                .get(end_offset)
                .map(|token| token.span)
                .unwrap_or(last_span);
            Diagnostic::new(ErrorCode::E101, error_span, "incomplete input, more tokens expected")
        }
    }
}

/// Build the syntax tree from tokens.
pub fn build_document(tokens: &[PositionedToken<'_>]) -> error::Result<Document> {
    let mut token_slice = TokenSlice::new(tokens);

    document
        .parse_next(&mut token_slice)
        .map_err(|e| convert_error(e, tokens, token_slice.eof_offset()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_str(input: &str) -> Document {
        let tokens = tokenize(input).expect("Failed to tokenize input");
        build_document(&tokens).expect("Failed to parse input")
    }

    fn only_chain(document: &Document) -> &Chain {
        match document.statements.as_slice() {
            [Statement::Part(Part::Chain(chain))] => chain,
            other => panic!("expected a single chain, got {other:?}"),
        }
    }

    #[test]
    fn test_directives_and_comments() {
        let document = parse_str("// heading\n#direction: right\n#fill:\n");
        assert_eq!(document.statements.len(), 2);
        match &document.statements[0] {
            Statement::Directive { key, value } => {
                assert_eq!(key.as_str(), "direction");
                assert_eq!(value.as_str(), "right");
            }
            other => panic!("expected directive, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_chain() {
        let document = parse_str("[A] -> [B]");
        let chain = only_chain(&document);
        assert_eq!(chain.head.as_ref().map(NodeLiteral::identifier).as_deref(), Some("A"));
        assert_eq!(chain.links.len(), 1);
        let link = &chain.links[0];
        assert_eq!(link.relation.as_ref().map(|r| r.as_str()), Some("->"));
        assert_eq!(
            link.target.as_ref().map(NodeLiteral::identifier).as_deref(),
            Some("B")
        );
    }

    #[test]
    fn test_labels_around_relation() {
        let document = parse_str("[Order] has-many 1 -> 0..* items [Line]");
        let link = &only_chain(&document).links[0];
        assert_eq!(link.start_label, "has-many 1");
        assert_eq!(link.end_label, "0..* items");
        assert_eq!(link.relation.as_ref().map(|r| r.as_str()), Some("->"));
    }

    #[test]
    fn test_long_chain() {
        let document = parse_str("[A]->[B]<:-[C]--[D]");
        let chain = only_chain(&document);
        let operators: Vec<_> = chain
            .links
            .iter()
            .filter_map(|link| link.relation.as_ref().map(|r| r.as_str().to_string()))
            .collect();
        assert_eq!(operators, vec!["->", "<:-", "--"]);
    }

    #[test]
    fn test_dangling_relations_are_kept() {
        let document = parse_str("[A] ->");
        let chain = only_chain(&document);
        assert!(chain.head.is_some());
        assert!(chain.links[0].target.is_none());

        let document = parse_str("-> [B]");
        let chain = only_chain(&document);
        assert!(chain.head.is_none());
        assert!(chain.links[0].target.is_some());
    }

    #[test]
    fn test_compartments() {
        let document = parse_str("[<abstract> Shape|+ area(): f64; + name|[Point]]");
        let node = only_chain(&document).head.as_ref().unwrap();
        assert_eq!(node.classifier.as_ref().map(|c| c.as_str()), Some("abstract"));
        assert_eq!(node.compartments.len(), 3);
        assert_eq!(node.identifier(), "Shape");
        assert_eq!(node.compartments[1].parts.len(), 2);
        assert!(node.compartments[1].has_text());
        assert!(node.compartments[2].has_chains());
    }

    #[test]
    fn test_text_part_keeps_relation_characters() {
        let document = parse_str("[A|- count: int\n+ push()]");
        let node = only_chain(&document).head.as_ref().unwrap();
        match &node.compartments[1].parts[0] {
            Part::Text(text) => assert_eq!(text.as_str(), "- count: int"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_multiline_title() {
        let document = parse_str("[Web\nServer]");
        let node = only_chain(&document).head.as_ref().unwrap();
        assert_eq!(node.title_lines(), vec!["Web", "Server"]);
        assert_eq!(node.identifier(), "Web Server");
    }

    #[test]
    fn test_semicolon_separates_statements() {
        let document = parse_str("[A]; [B] -> [C]");
        assert_eq!(document.statements.len(), 2);
    }

    #[test]
    fn test_free_text_is_kept_for_validation() {
        let document = parse_str("hello world");
        assert!(matches!(
            document.statements.as_slice(),
            [Statement::Part(Part::Text(_))]
        ));
    }

    #[test]
    fn test_top_level_pipe_is_rejected() {
        let tokens = tokenize("[A] | [B]").unwrap();
        let err = build_document(&tokens).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E100);
        assert_eq!(err.span(), Span::new(4..5));
    }

    #[test]
    fn test_choose_relation_prefers_free_operator() {
        let tokens = tokenize("a-b -> c").unwrap();
        let segment: Vec<_> = tokens.iter().collect();
        let index = choose_relation(&segment).unwrap();
        assert_eq!(segment[index].text(), "->");
    }
}
