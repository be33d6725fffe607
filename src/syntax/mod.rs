//! Typst Highlighting Tokenizer
//!
//! A single forward scan over the document text that classifies spans for
//! syntax highlighting. Rules are tried in a fixed order at each position and
//! the first one that matches wins:
//!
//! ```text
//! line start:  #set/#show/#let/#include/#import   -> keyword
//!              === / == / =  (+ whitespace)        -> heading3/2/1
//! anywhere:    ** __ * _                           -> strong/emphasis
//!              // ...   ``` ...                    -> comment
//!              `code`                              -> string
//!              $math$                              -> number
//!              #ident                              -> keyword
//!              ident(                              -> function
//!              12  3.5                             -> number
//!              "str"  'str'                        -> string
//!              anything else: one char, untagged
//! ```
//!
//! The scanner keeps no state between lines ([`LexState`] is empty), so a
//! scan can be resumed from any line start.

mod rules;


use std::ops::Range;

use serde::Serialize;

/// Highlight class of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Keyword,
    Heading1,
    Heading2,
    Heading3,
    Strong,
    Emphasis,
    Comment,
    String,
    Number,
    Function,
}

impl TokenKind {
    /// Highlight tag name.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Heading1 => "heading1",
            Self::Heading2 => "heading2",
            Self::Heading3 => "heading3",
            Self::Strong => "strong",
            Self::Emphasis => "emphasis",
            Self::Comment => "comment",
            Self::String => "string",
            Self::Number => "number",
            Self::Function => "function",
        }
    }
}

/// A classified span of source text (byte range).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub range: Range<usize>,
}

/// One scanner step: the consumed range and its class, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub kind: Option<TokenKind>,
    pub range: Range<usize>,
}

/// Per-line scanner state. This grammar needs none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexState;

/// Lazy scanner over a text, yielding every step including untagged ones.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Resume scanning at `offset`, which must be a line start.
    pub fn resume(text: &'a str, offset: usize, _state: LexState) -> Option<Self> {
        let scanner = Self { text, pos: offset };
        (offset <= text.len() && scanner.at_line_start()).then_some(scanner)
    }

    /// Current position with the state needed to resume here, if the
    /// scanner sits on a line start.
    pub fn checkpoint(&self) -> Option<(usize, LexState)> {
        self.at_line_start().then_some((self.pos, LexState))
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.text.as_bytes().get(self.pos - 1) == Some(&b'\n')
    }
}

impl Iterator for Scanner<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let rest = self.text.get(self.pos..).filter(|r| !r.is_empty())?;
        let (len, kind) = rules::scan(rest, self.at_line_start());
        let start = self.pos;
        self.pos += len;
        Some(Step {
            kind,
            range: start..self.pos,
        })
    }
}

/// Lazy iterator over the tagged spans of a text.
#[derive(Debug, Clone)]
pub struct Tokens<'a>(Scanner<'a>);

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.0.by_ref().find_map(|step| {
            step.kind.map(|kind| Token {
                kind,
                range: step.range,
            })
        })
    }
}

/// Tokenize `text` from the start.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens(Scanner::new(text))
}
