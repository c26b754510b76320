//! GML graph files: loading and parsing.
//!
//! # Loading
//!
//! [`load_graph_text`] reads a file line by line, strips trailing whitespace
//! from each line and joins the lines with no separator. The result is the
//! single-line form that causal graph tooling passes around as a string.
//!
//! # Parsing
//!
//! [`parse_gml`] accepts the subset of GML used for causal graphs:
//!
//! ```text
//! graph [
//!   directed 1
//!   node [ id 0 label "T" ]
//!   node [ id 1 label "Y" ]
//!   edge [ source 0 target 1 ]
//! ]
//! ```
//!
//! Because loading drops line breaks, tokens may touch (`directed 1node [`).
//! Numbers end at the first non-numeric character, so that text still lexes
//! as `directed`, `1`, `node`, `[`. Reals require a decimal point.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, instrument};

use super::build::CausalGraph;
use crate::error::CausewayError;

/// Read a graph description file into a single string.
///
/// # Errors
///
/// Returns [`CausewayError::Io`] if the file cannot be opened or read.
#[instrument]
pub fn load_graph_text(path: &Path) -> Result<String, CausewayError> {
    let io_err = |source| CausewayError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let mut text = String::new();
    let mut lines = 0usize;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(io_err)?;
        text.push_str(line.trim_end());
        lines += 1;
    }

    debug!(lines, bytes = text.len(), "loaded graph text");
    Ok(text)
}

/// Load and parse a GML file in one step.
///
/// The file is parsed with its line breaks intact so that `#` comments end
/// at the end of their line.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid directed
/// GML graph.
#[instrument]
pub fn load_gml(path: &Path) -> Result<CausalGraph, CausewayError> {
    let text = fs::read_to_string(path).map_err(|source| CausewayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_gml(&text)
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Key(String),
    Int(i64),
    Real(f64),
    Str(String),
    Open,
    Close,
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    const fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek_byte(0) {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if b == b'#' {
                // Comment runs to end of line, or to end of input for joined text.
                while let Some(c) = self.peek_byte(0) {
                    self.pos += 1;
                    if c == b'\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn consume_digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek_byte(0).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Next token with its starting byte offset, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<(usize, Token)>, CausewayError> {
        self.skip_trivia();
        let start = self.pos;
        let Some(b) = self.peek_byte(0) else {
            return Ok(None);
        };

        let token = match b {
            b'[' => {
                self.pos += 1;
                Token::Open
            }
            b']' => {
                self.pos += 1;
                Token::Close
            }
            b'"' => {
                self.pos += 1;
                let body_start = self.pos;
                while self.peek_byte(0).is_some_and(|c| c != b'"') {
                    self.pos += 1;
                }
                if self.peek_byte(0).is_none() {
                    return Err(syntax(start, "unterminated string"));
                }
                let body = &self.src[body_start..self.pos];
                self.pos += 1;
                Token::Str(unescape(body))
            }
            b'+' | b'-' | b'.' | b'0'..=b'9' => self.lex_number(start)?,
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while self
                    .peek_byte(0)
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
                {
                    self.pos += 1;
                }
                Token::Key(self.src[start..self.pos].to_string())
            }
            _ => {
                let ch = self.src[start..].chars().next().unwrap_or('?');
                return Err(syntax(start, format!("unexpected character '{ch}'")));
            }
        };

        Ok(Some((start, token)))
    }

    fn lex_number(&mut self, start: usize) -> Result<Token, CausewayError> {
        if matches!(self.peek_byte(0), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let int_digits = self.consume_digits();
        let mut is_real = false;
        let mut frac_digits = 0;
        if self.peek_byte(0) == Some(b'.') {
            is_real = true;
            self.pos += 1;
            frac_digits = self.consume_digits();
        }
        if int_digits + frac_digits == 0 {
            return Err(syntax(start, "expected digits"));
        }
        // Exponents only follow a decimal point, so `1edge` stays `1` + `edge`.
        if is_real && matches!(self.peek_byte(0), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(self.peek_byte(1), Some(b'+' | b'-')));
            if self.peek_byte(1 + sign).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1 + sign;
                self.consume_digits();
            }
        }

        let text = &self.src[start..self.pos];
        if is_real {
            text.parse::<f64>()
                .map(Token::Real)
                .map_err(|e| syntax(start, format!("invalid real '{text}': {e}")))
        } else {
            text.parse::<i64>()
                .map(Token::Int)
                .map_err(|e| syntax(start, format!("invalid integer '{text}': {e}")))
        }
    }
}

fn syntax(at: usize, reason: impl Into<String>) -> CausewayError {
    CausewayError::GmlSyntax {
        offset: at,
        reason: reason.into(),
    }
}

fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i64),
    Real(f64),
    Str(String),
    List(Vec<(String, Value)>),
}

impl Value {
    /// Identifier form used to match node ids with edge endpoints.
    fn as_id(&self) -> Option<String> {
        match self {
            Self::Int(n) => Some(n.to_string()),
            Self::Str(s) => Some(s.clone()),
            Self::Real(_) | Self::List(_) => None,
        }
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Option<(usize, Token)>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Result<Self, CausewayError> {
        let mut lexer = Lexer::new(src);
        let lookahead = lexer.next_token()?;
        Ok(Self { lexer, lookahead })
    }

    fn advance(&mut self) -> Result<Option<(usize, Token)>, CausewayError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.lookahead, next))
    }

    /// Parse `key value` pairs until `]` (when nested) or end of input.
    fn pairs(&mut self, nested: bool) -> Result<Vec<(String, Value)>, CausewayError> {
        let mut out = Vec::new();
        loop {
            match self.advance()? {
                None if nested => {
                    return Err(syntax(self.lexer.pos, "missing ']'"));
                }
                None => return Ok(out),
                Some((_, Token::Close)) if nested => return Ok(out),
                Some((_, Token::Key(key))) => {
                    let value = self.value(&key)?;
                    out.push((key, value));
                }
                Some((at, other)) => {
                    return Err(syntax(at, format!("expected key, found {other:?}")));
                }
            }
        }
    }

    fn value(&mut self, key: &str) -> Result<Value, CausewayError> {
        match self.advance()? {
            Some((_, Token::Int(n))) => Ok(Value::Int(n)),
            Some((_, Token::Real(x))) => Ok(Value::Real(x)),
            Some((_, Token::Str(s))) => Ok(Value::Str(s)),
            Some((_, Token::Open)) => self.pairs(true).map(Value::List),
            Some((at, other)) => Err(syntax(
                at,
                format!("expected value for '{key}', found {other:?}"),
            )),
            None => Err(syntax(self.lexer.pos, format!("missing value for '{key}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Graph construction
// ---------------------------------------------------------------------------

/// Parse GML text into a [`CausalGraph`].
///
/// Nodes are named by their `label` (falling back to the `id` text). Edges
/// reference node ids. Keys other than `directed`, `node`, `edge`, `id`,
/// `label`, `source` and `target` are ignored.
///
/// # Errors
///
/// - [`CausewayError::GmlSyntax`] for malformed text or a missing `graph` block.
/// - [`CausewayError::Undirected`] unless the graph declares `directed 1`.
/// - [`CausewayError::InvalidGraph`] for duplicate ids/labels or edges that
///   reference undeclared ids.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_gml(text: &str) -> Result<CausalGraph, CausewayError> {
    let mut parser = Parser::new(text)?;
    let top = parser.pairs(false)?;

    let body = top
        .into_iter()
        .find_map(|(key, value)| match (key.as_str(), value) {
            ("graph", Value::List(items)) => Some(items),
            _ => None,
        })
        .ok_or_else(|| CausewayError::GmlSyntax {
            offset: 0,
            reason: "no 'graph [ ... ]' block".to_string(),
        })?;

    let directed = body
        .iter()
        .any(|(key, value)| key == "directed" && *value == Value::Int(1));
    if !directed {
        return Err(CausewayError::Undirected);
    }

    let mut graph = CausalGraph::new();
    let mut id_to_label: HashMap<String, String> = HashMap::new();

    for (key, value) in &body {
        let ("node", Value::List(attrs)) = (key.as_str(), value) else {
            continue;
        };
        let id = attr(attrs, "id")
            .and_then(Value::as_id)
            .ok_or_else(|| CausewayError::InvalidGraph("node without an id".to_string()))?;
        let label = match attr(attrs, "label") {
            Some(Value::Str(label)) => label.clone(),
            _ => id.clone(),
        };
        if id_to_label.contains_key(&id) {
            return Err(CausewayError::InvalidGraph(format!("duplicate node id {id}")));
        }
        if graph.contains(&label) {
            return Err(CausewayError::InvalidGraph(format!(
                "duplicate node label {label}"
            )));
        }
        graph.add_node(&label);
        id_to_label.insert(id, label);
    }

    for (key, value) in &body {
        let ("edge", Value::List(attrs)) = (key.as_str(), value) else {
            continue;
        };
        let endpoint = |name: &str| -> Result<&String, CausewayError> {
            let id = attr(attrs, name).and_then(Value::as_id).ok_or_else(|| {
                CausewayError::InvalidGraph(format!("edge without a {name}"))
            })?;
            id_to_label.get(&id).ok_or_else(|| {
                CausewayError::InvalidGraph(format!("edge {name} references unknown node {id}"))
            })
        };
        let source = endpoint("source")?;
        let target = endpoint("target")?;
        graph.add_edge(source, target);
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "parsed GML graph"
    );
    Ok(graph)
}

fn attr<'v>(attrs: &'v [(String, Value)], name: &str) -> Option<&'v Value> {
    attrs.iter().find(|(key, _)| key == name).map(|(_, value)| value)
}

impl CausalGraph {
    /// Parse a GML string. See [`parse_gml`].
    ///
    /// # Errors
    ///
    /// Propagates errors from [`parse_gml`].
    pub fn from_gml(text: &str) -> Result<Self, CausewayError> {
        parse_gml(text)
    }
}
