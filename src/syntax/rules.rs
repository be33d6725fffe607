//! Ordered scan rules. First match wins; there is no longest-match search.

use std::sync::LazyLock;

use regex::Regex;

use super::TokenKind;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect("scan pattern must compile"));
    };
}

// Directive word followed by one non-newline whitespace character.
pattern!(DIRECTIVE, r"^#(?:set|show|let|include|import)[^\S\n]");
// Longest marker first: `===` before `==` before `=`.
pattern!(HEADING3, r"^===[^\S\n]+");
pattern!(HEADING2, r"^==[^\S\n]+");
pattern!(HEADING1, r"^=[^\S\n]+");
pattern!(STRONG_BODY, r"^[^*\n]+\*\*");
pattern!(EMPHASIS_BODY, r"^[^_\n]+__");
pattern!(LINE_COMMENT, r"^//[^\n]*");
pattern!(FENCE, r"^```[^\n]*");
pattern!(INLINE_CODE, r"^`[^`\n]+`");
pattern!(INLINE_MATH, r"^\$[^$\n]+\$");
pattern!(HASH_CALL, r"^#[A-Za-z_][A-Za-z0-9_]*");
pattern!(FUNCTION, r"^[A-Za-z_][A-Za-z0-9_]*\(");
pattern!(NUMBER, r"^[0-9]+(?:\.[0-9]+)?");
pattern!(DOUBLE_QUOTED, r#"^"[^"\n]*""#);
pattern!(SINGLE_QUOTED, r"^'[^'\n]*'");

/// Length of `re`'s match at the start of `rest`.
#[inline]
fn prefix(re: &Regex, rest: &str) -> Option<usize> {
    re.find(rest).map(|m| m.end())
}

/// Scan one step of `rest`. Returns the consumed byte length (never zero
/// for non-empty input) and the classification, if any.
pub(super) fn scan(rest: &str, line_start: bool) -> (usize, Option<TokenKind>) {
    if line_start {
        if let Some(len) = prefix(&DIRECTIVE, rest) {
            // Span covers the directive word, not the whitespace after it.
            let ws = rest[..len].chars().next_back().map_or(0, char::len_utf8);
            return (len - ws, Some(TokenKind::Keyword));
        }
        let headings: [(&Regex, TokenKind); 3] = [
            (&*HEADING3, TokenKind::Heading3),
            (&*HEADING2, TokenKind::Heading2),
            (&*HEADING1, TokenKind::Heading1),
        ];
        for (re, kind) in headings {
            if let Some(len) = prefix(re, rest) {
                return (len, Some(kind));
            }
        }
    }

    if rest.starts_with("**") {
        let body = prefix(&STRONG_BODY, &rest[2..]).unwrap_or(0);
        return (2 + body, Some(TokenKind::Strong));
    }
    if rest.starts_with("__") {
        let body = prefix(&EMPHASIS_BODY, &rest[2..]).unwrap_or(0);
        return (2 + body, Some(TokenKind::Emphasis));
    }
    if rest.starts_with('*') {
        return (1, Some(TokenKind::Strong));
    }
    if rest.starts_with('_') {
        return (1, Some(TokenKind::Emphasis));
    }

    let rules: [(&Regex, TokenKind); 9] = [
        (&*LINE_COMMENT, TokenKind::Comment),
        (&*FENCE, TokenKind::Comment),
        (&*INLINE_CODE, TokenKind::String),
        (&*INLINE_MATH, TokenKind::Number),
        (&*HASH_CALL, TokenKind::Keyword),
        (&*FUNCTION, TokenKind::Function),
        (&*NUMBER, TokenKind::Number),
        (&*DOUBLE_QUOTED, TokenKind::String),
        (&*SINGLE_QUOTED, TokenKind::String),
    ];
    for (re, kind) in rules {
        if let Some(len) = prefix(re, rest) {
            return (len, Some(kind));
        }
    }

    (rest.chars().next().map_or(0, char::len_utf8), None)
}
