//! Line tokenizer.
//!
//! Every consumer (include walker, indexers, validator) agrees on
//! what counts as code through [`code_tokens`], so a `#` inside a
//! quoted argument is never mistaken for a comment.

use crate::token::{CodeLine, Token};

/// Split one line into whitespace-separated tokens with their columns.
///
/// Quoted substrings (`"..."` or `'...'`) are kept inside the token,
/// quotes included. The matching quote closes the string unless the
/// character before it is a backslash. An unterminated quote runs to
/// the end of the line. `#` is not special here.
#[must_use]
pub fn tokenize_with_ranges(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut quotes = QuoteTracker::default();
    let mut current = String::new();
    let mut start = 0;
    let mut width = 0;

    for (col, ch) in line.chars().enumerate() {
        width = col + 1;
        let quoted = quotes.feed(ch);

        if !quoted && ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(Token {
                    text: std::mem::take(&mut current),
                    start,
                    end: col,
                });
            }
            continue;
        }

        if current.is_empty() {
            start = col;
        }
        current.push(ch);
    }

    if !current.is_empty() {
        tokens.push(Token {
            text: current,
            start,
            end: width,
        });
    }

    tokens
}

/// Split one line into token texts.
#[must_use]
pub fn tokenize(line: &str) -> Vec<String> {
    tokenize_with_ranges(line)
        .into_iter()
        .map(|token| token.text)
        .collect()
}

/// Column of the first `#` outside quotes.
#[must_use]
pub fn find_inline_comment_index(line: &str) -> Option<usize> {
    let mut quotes = QuoteTracker::default();
    line.chars()
        .enumerate()
        .find(|&(_, ch)| !quotes.feed(ch) && ch == '#')
        .map(|(col, _)| col)
}

/// Column of the first non-whitespace character.
#[must_use]
pub fn first_non_whitespace_index(line: &str) -> Option<usize> {
    line.chars().position(|ch| !ch.is_whitespace())
}

/// Tokens that belong to code, with comments removed.
///
/// A line whose first visible character starts a comment has no code
/// tokens. Otherwise only tokens starting before the first unquoted
/// `#` are kept.
#[must_use]
pub fn code_tokens(line: &str) -> Vec<Token> {
    let comment = find_inline_comment_index(line);
    if comment == first_non_whitespace_index(line) {
        return Vec::new();
    }

    let tokens = tokenize_with_ranges(line);
    match comment {
        Some(col) => tokens.into_iter().filter(|t| t.start < col).collect(),
        None => tokens,
    }
}

/// Code tokens for every line of `text` that has any.
///
/// Accepts both `\n` and `\r\n` line endings.
#[must_use]
pub fn code_lines(text: &str) -> Vec<CodeLine> {
    text.lines()
        .enumerate()
        .filter_map(|(line, raw)| {
            let tokens = code_tokens(raw);
            (!tokens.is_empty()).then_some(CodeLine { line, tokens })
        })
        .collect()
}

/// Remove one layer of matching `"` or `'` quotes.
///
/// Values shorter than two characters are returned unchanged.
#[must_use]
pub fn strip_surrounding_quotes(value: &str) -> &str {
    let mut chars = value.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && is_quote(first) => {
            &value[first.len_utf8()..value.len() - last.len_utf8()]
        }
        _ => value,
    }
}

const fn is_quote(ch: char) -> bool {
    matches!(ch, '"' | '\'')
}

/// Tracks whether the scan position is inside a quoted string.
#[derive(Default)]
struct QuoteTracker {
    open: Option<char>,
    prev: Option<char>,
}

impl QuoteTracker {
    /// Feed the next character. Returns `true` when it is part of a
    /// quoted string, delimiters included.
    fn feed(&mut self, ch: char) -> bool {
        let quoted = match self.open {
            Some(open) => {
                if ch == open && self.prev != Some('\\') {
                    self.open = None;
                }
                true
            }
            None if is_quote(ch) => {
                self.open = Some(ch);
                true
            }
            None => false,
        };
        self.prev = Some(ch);
        quoted
    }
}
