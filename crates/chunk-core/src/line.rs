//! Line classification and field tokenizing.
//!
//! Chunk text is line oriented:
//! ```text
//! <TRACK {5E1D3F9A-...}
//!   NAME "Lead vox"
//!   AUXRECV 2 0 1.00000000000000 0.00000000000000 0 0 0 0 0 -1.00000000000000 0 -1 ''
//! >
//! ```
//! A line whose first non-blank character is `<` opens a block, a line made
//! of a single `>` closes one, and everything else is a field line named by
//! its first token.

use std::ops::Range;

const QUOTES: [char; 3] = ['"', '\'', '`'];

/// What a single chunk line is, structurally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// `<TAG ...` opens a nested block.
    Open { tag: String },
    /// A lone `>` closes the innermost open block.
    Close,
    /// `NAME value...` scalar field line.
    Field { name: String },
    /// Empty or whitespace-only line.
    Blank,
}

impl LineKind {
    /// Classify a line. Indentation is ignored.
    pub fn classify(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Blank;
        }
        if trimmed == ">" {
            return Self::Close;
        }
        if let Some(rest) = trimmed.strip_prefix('<') {
            let tag = rest.split_whitespace().next().unwrap_or_default();
            return Self::Open {
                tag: tag.to_string(),
            };
        }
        let name = tokenize(trimmed)
            .first()
            .map(|t| t.value.to_string())
            .unwrap_or_default();
        Self::Field { name }
    }

    /// Tag of an opening line or name of a field line
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Open { tag } => Some(tag),
            Self::Field { name } => Some(name),
            Self::Close | Self::Blank => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    pub fn is_field(&self, field: &str) -> bool {
        matches!(self, Self::Field { name } if name == field)
    }
}

/// A whitespace-delimited token of a field line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token text without its surrounding quotes
    pub value: &'a str,
    /// Byte range in the line, quotes included
    pub span: Range<usize>,
    /// Quote character the token was wrapped in, if any
    pub quote: Option<char>,
}

/// Split a line into tokens.
///
/// A token starting with `"`, `'` or `` ` `` runs up to the next occurrence
/// of the same character, so quoted spans keep their whitespace and any other
/// quote kinds. An unterminated quote runs to the end of the line.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let first = bytes[i] as char;
        if QUOTES.contains(&first) {
            let body = i + 1;
            match line[body..].find(first) {
                Some(offset) => {
                    let end = body + offset;
                    tokens.push(Token {
                        value: &line[body..end],
                        span: start..end + 1,
                        quote: Some(first),
                    });
                    i = end + 1;
                }
                None => {
                    tokens.push(Token {
                        value: &line[body..],
                        span: start..line.len(),
                        quote: Some(first),
                    });
                    i = line.len();
                }
            }
        } else {
            let end = line[i..]
                .find(|c: char| c.is_ascii_whitespace())
                .map_or(line.len(), |offset| i + offset);
            tokens.push(Token {
                value: &line[start..end],
                span: start..end,
                quote: None,
            });
            i = end;
        }
    }

    tokens
}

/// Quote a value the way the host writes it.
///
/// Plain values are written as-is. Values that are empty, contain whitespace
/// or start with a quote character get wrapped in the first quote kind they
/// do not contain. When all three kinds appear, backticks are folded into
/// single quotes and the value is wrapped in backticks.
pub fn quote_token(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.chars().any(char::is_whitespace)
        || value.starts_with(QUOTES);
    if !needs_quotes {
        return value.to_string();
    }

    match QUOTES.into_iter().find(|q| !value.contains(*q)) {
        Some(q) => format!("{q}{value}{q}"),
        None => format!("`{}`", value.replace('`', "'")),
    }
}

/// Leading whitespace of a line
pub fn indentation(line: &str) -> &str {
    let end = line.len() - line.trim_start().len();
    &line[..end]
}
