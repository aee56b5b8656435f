use std::path::{Path, PathBuf};

/// A single code token with its column range on the source line.
///
/// Columns are zero-based character offsets; `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// Whether `column` falls inside this token.
    #[must_use]
    pub const fn covers(&self, column: usize) -> bool {
        column >= self.start && column < self.end
    }

    /// Span of this token on the given line.
    #[must_use]
    pub const fn span(&self, line: usize) -> Span {
        Span {
            line,
            start: self.start,
            end: self.end,
        }
    }
}

/// Single-line source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Span widened to cover at least one column.
    #[must_use]
    pub const fn at_least_one_column(self) -> Self {
        let end = if self.end > self.start {
            self.end
        } else {
            self.start + 1
        };
        Self { end, ..self }
    }
}

/// A span inside a specific file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub path: PathBuf,
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl Location {
    #[must_use]
    pub fn new(path: &Path, span: Span) -> Self {
        Self {
            path: path.to_path_buf(),
            line: span.line,
            start: span.start,
            end: span.end,
        }
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        Span {
            line: self.line,
            start: self.start,
            end: self.end,
        }
    }
}

/// The code tokens of one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLine {
    /// Zero-based line number.
    pub line: usize,
    pub tokens: Vec<Token>,
}

impl CodeLine {
    /// The command token, always present.
    #[must_use]
    pub fn command(&self) -> &Token {
        &self.tokens[0]
    }

    /// Case-folded command text.
    #[must_use]
    pub fn command_lower(&self) -> String {
        self.command().text.to_lowercase()
    }

    /// The first argument, if any.
    #[must_use]
    pub fn argument(&self) -> Option<&Token> {
        self.tokens.get(1)
    }
}
