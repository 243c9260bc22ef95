//! Error codes, grouped by the phase that reports them:
//! `E0xx` while lexing, `E1xx` while parsing and validating, `E2xx` while
//! building the graph.

use std::fmt;

/// Broad classification of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The text does not follow the grammar.
    Syntax,
    /// The text parses but an edge is structurally incomplete.
    Reference,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "syntax error"),
            ErrorKind::Reference => write!(f, "reference error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A `[` is still open at the end of the input.
    E001,
    /// A `]` outside of any node.
    E002,
    /// A top-level `#` line without the `:` of `#key: value`.
    E003,
    /// A `<classifier` prefix without its `>`.
    E004,
    /// Nodes nested deeper than the parser accepts.
    E005,

    E100,
    /// Input ended in the middle of a construct.
    E101,
    /// Free text outside of a node.
    E102,
    /// A compartment holding both text lines and nested nodes.
    E103,
    /// Nodes inside the title compartment.
    E104,
    /// Two nodes on one line without a relation between them.
    E105,
    /// `[]` or a node whose title is blank.
    E106,

    /// A relation missing its source or target node, as in `[A] ->`.
    E200,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E106 => "E106",
            ErrorCode::E200 => "E200",
        }
    }

    /// Label placed under the offending span.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "this `[` is never closed",
            ErrorCode::E002 => "stray closing bracket",
            ErrorCode::E003 => "directive without colon",
            ErrorCode::E004 => "unclosed classifier",
            ErrorCode::E005 => "nested too deeply",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "free text outside of a node",
            ErrorCode::E103 => "compartment mixes text and nodes",
            ErrorCode::E104 => "nodes inside a title",
            ErrorCode::E105 => "missing relation",
            ErrorCode::E106 => "node without a name",
            ErrorCode::E200 => "relation without endpoint",
        }
    }

    /// How to fix the source.
    pub fn help(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "add a closing `]`",
            ErrorCode::E002 => "remove it or add the matching `[`",
            ErrorCode::E003 => "write directives as `#key: value`",
            ErrorCode::E004 => "write classifiers as `[<kind> name]`",
            ErrorCode::E005 => "split deeply nested packages into separate diagrams",
            ErrorCode::E100 => "check brackets and separators around this position",
            ErrorCode::E101 => "close every node and finish the last relation",
            ErrorCode::E102 => {
                "wrap the text in `[` `]`, or give it a line of its own inside a node"
            }
            ErrorCode::E103 => "put the text and the nested nodes in separate compartments",
            ErrorCode::E104 => "move nested nodes after a `|`",
            ErrorCode::E105 => "add a relation such as `->`, or put the nodes on separate lines",
            ErrorCode::E106 => "give the node a title, for example `[Name]`",
            ErrorCode::E200 => "connect both ends of the relation to a node such as `[Name]`",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::E200 => ErrorKind::Reference,
            _ => ErrorKind::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
