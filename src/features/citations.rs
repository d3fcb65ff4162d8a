//! Citation Marker Grammar
//!
//! Parses the content of a designated table cell into groups of citation
//! markers. A cell is either a bare list (`1, 2` or `Smith`) or a sequence
//! of delimited groups:
//!
//! - Bracket: `[Lee, Park]`
//! - Superscript: `$^{1,2}$`, `$^a$`, `^{1}`, `\textsuperscript{1}`, `\tablenotemark{a}`
//! - Cite command: `\citet{smith01,jones03}` and the rest of the natbib family
//!
//! ## Example
//!
//! ```rust
//! use citeorder::citations::{parse_cell, MarkerSyntax};
//!
//! let groups = parse_cell("[Lee, Park]").unwrap();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].syntax, MarkerSyntax::Bracket);
//! assert_eq!(groups[0].ids[1].id, "Park");
//! ```

use std::fmt;

use crate::core::document::Span;
use crate::data::constants::{
    is_identifier_char, CITE_COMMANDS, NO_DATA_CELLS, SUPERSCRIPT_COMMANDS,
};
use crate::utils::tex::normalized_content;

/// Surface syntax of a marker group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerSyntax {
    /// Bare identifier list, the whole cell
    Bare,
    /// `[...]`
    Bracket,
    /// `$^{...}$` and superscript commands
    Superscript,
    /// `\cite`-family command; holds the command name without `*`
    Command(String),
}

impl MarkerSyntax {
    /// Whether only identifiers are rewritten and delimiters are kept
    pub fn rewrites_in_place(&self) -> bool {
        !matches!(self, MarkerSyntax::Command(_))
    }
}

impl fmt::Display for MarkerSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerSyntax::Bare => write!(f, "bare"),
            MarkerSyntax::Bracket => write!(f, "bracket"),
            MarkerSyntax::Superscript => write!(f, "superscript"),
            MarkerSyntax::Command(name) => write!(f, "\\{}", name),
        }
    }
}

/// One identifier inside a group, with its span relative to the cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedId {
    pub id: String,
    pub span: Span,
}

/// A delimited run of identifiers sharing one surface syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerGroup {
    pub syntax: MarkerSyntax,
    /// Whole group including delimiters, relative to the cell
    pub span: Span,
    pub ids: Vec<ParsedId>,
    /// `$^a$`: a single superscript token without braces
    pub unbraced: bool,
}

/// Grammar violation at a byte offset relative to the cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub offset: usize,
    pub message: String,
}

impl SyntaxError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Parse a designated cell into marker groups
///
/// Empty cells and no-data placeholders (`\nodata`, `\ldots`, ...) yield no
/// groups.
pub fn parse_cell(text: &str) -> Result<Vec<MarkerGroup>, SyntaxError> {
    let content = normalized_content(text);
    if content.is_empty() || NO_DATA_CELLS.contains(content.as_str()) {
        return Ok(Vec::new());
    }

    let mut cursor = Cursor::new(text);
    cursor.skip_trivia();

    if cursor.peek().is_some_and(is_identifier_char) {
        let start = cursor.pos;
        let ids = cursor.id_list(None)?;
        let group = MarkerGroup {
            syntax: MarkerSyntax::Bare,
            span: Span::new(start, cursor.last_token_end),
            ids,
            unbraced: false,
        };
        return Ok(vec![group]);
    }

    let mut groups = Vec::new();
    loop {
        cursor.skip_trivia();
        if cursor.at_end() {
            break;
        }
        if !groups.is_empty() && cursor.eat_any(&[',', ';']) {
            cursor.skip_trivia();
            if cursor.at_end() {
                return Err(SyntaxError::new(cursor.pos, "trailing separator"));
            }
        }
        groups.push(cursor.group()?);
    }
    Ok(groups)
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    /// End of the last identifier or closing delimiter consumed
    last_token_end: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            last_token_end: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_any(&mut self, candidates: &[char]) -> bool {
        candidates.iter().any(|&c| self.eat(c))
    }

    /// Skip whitespace and `%` comments
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('%') => {
                    let rest = &self.text[self.pos..];
                    self.pos += rest.find('\n').unwrap_or(rest.len());
                }
                _ => break,
            }
        }
    }

    fn unexpected(&self, context: &str) -> SyntaxError {
        match self.peek() {
            Some(c) => SyntaxError::new(
                self.pos,
                format!("unexpected character '{}' {}", c, context),
            ),
            None => SyntaxError::new(self.pos, format!("unexpected end of cell {}", context)),
        }
    }

    fn expect(&mut self, expected: char, context: &str) -> Result<(), SyntaxError> {
        if self.eat(expected) {
            self.last_token_end = self.pos;
            Ok(())
        } else {
            Err(self.unexpected(&format!("{} (expected '{}')", context, expected)))
        }
    }

    fn identifier(&mut self) -> Result<ParsedId, SyntaxError> {
        let start = self.pos;
        while self.peek().is_some_and(is_identifier_char) {
            self.bump();
        }
        if self.pos == start {
            return Err(self.unexpected("where a citation identifier was expected"));
        }
        self.last_token_end = self.pos;
        Ok(ParsedId {
            id: self.text[start..self.pos].to_string(),
            span: Span::new(start, self.pos),
        })
    }

    /// Identifiers separated by `,` or `;` up to `terminator` (not consumed)
    ///
    /// With no terminator the list must run to the end of the cell.
    fn id_list(&mut self, terminator: Option<char>) -> Result<Vec<ParsedId>, SyntaxError> {
        let mut ids = Vec::new();
        loop {
            self.skip_trivia();
            ids.push(self.identifier()?);
            self.skip_trivia();
            match self.peek() {
                Some(',') | Some(';') => {
                    self.bump();
                }
                Some(c) if Some(c) == terminator => return Ok(ids),
                None if terminator.is_none() => return Ok(ids),
                _ => return Err(self.unexpected("in citation list")),
            }
        }
    }

    fn control_word(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.bump();
        }
        self.eat('*');
        &self.text[start..self.pos]
    }

    fn braced_list(&mut self, context: &str) -> Result<Vec<ParsedId>, SyntaxError> {
        self.skip_trivia();
        self.expect('{', context)?;
        let ids = self.id_list(Some('}'))?;
        self.expect('}', context)?;
        Ok(ids)
    }

    fn group(&mut self) -> Result<MarkerGroup, SyntaxError> {
        let start = self.pos;
        let mut unbraced = false;
        let (syntax, ids) = match self.peek() {
            Some('[') => {
                self.bump();
                let ids = self.id_list(Some(']'))?;
                self.expect(']', "after bracketed citation")?;
                (MarkerSyntax::Bracket, ids)
            }
            Some('$') => {
                self.bump();
                self.skip_trivia();
                self.expect('^', "in math-mode citation")?;
                self.skip_trivia();
                let ids = if self.peek() == Some('{') {
                    self.braced_list("in superscript citation")?
                } else {
                    unbraced = true;
                    vec![self.identifier()?]
                };
                self.skip_trivia();
                self.expect('$', "after superscript citation")?;
                (MarkerSyntax::Superscript, ids)
            }
            Some('^') => {
                self.bump();
                let ids = self.braced_list("in superscript citation")?;
                (MarkerSyntax::Superscript, ids)
            }
            Some('\\') => {
                self.bump();
                let word = self.control_word();
                let name = word.trim_end_matches('*');
                if CITE_COMMANDS.contains(name) {
                    self.skip_trivia();
                    if self.peek() == Some('[') {
                        return Err(SyntaxError::new(
                            self.pos,
                            format!("optional arguments to \\{} are not supported", word),
                        ));
                    }
                    let ids = self.braced_list(&format!("after \\{}", word))?;
                    (MarkerSyntax::Command(name.to_string()), ids)
                } else if SUPERSCRIPT_COMMANDS.contains(name) {
                    let ids = self.braced_list(&format!("after \\{}", word))?;
                    (MarkerSyntax::Superscript, ids)
                } else {
                    return Err(SyntaxError::new(
                        start,
                        format!("unsupported command '\\{}'", word),
                    ));
                }
            }
            _ => return Err(self.unexpected("where a citation was expected")),
        };
        Ok(MarkerGroup {
            syntax,
            span: Span::new(start, self.pos),
            ids,
            unbraced,
        })
    }
}
