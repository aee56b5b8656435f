use std::fmt;

use crate::token::Span;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// Classifies a diagnostic. `Display` renders the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A comment follows code on the same line.
    InlineComment,
    /// Command mixes upper- and lowercase letters.
    MixedCaseCommand { command: String },
    UnknownCommand { command: String },
    /// Call command without a target.
    MissingCallTarget { command: String },
    /// `else`/`elseif` outside a conditional block.
    MisplacedContinuation { keyword: String, opener: String, closer: String },
    /// Closer with no open block.
    UnexpectedCloser { closer: String },
    /// Closer that does not match the innermost open block.
    MismatchedCloser {
        closer: String,
        expected: String,
        opener: String,
        /// Zero-based line of the opener.
        opened_on: usize,
    },
    /// Block still open at end of file.
    MissingCloser { opener: String, expected: String },
    /// `break` outside a loop.
    MisplacedBreak { keyword: String, opener: String, closer: String },
    /// `returnsub` outside a subroutine.
    MisplacedReturn { keyword: String, opener: String, closer: String },
    IncludeNotFound { target: String },
    UnknownSubroutine { name: String },
}

impl DiagnosticKind {
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::InlineComment | Self::MixedCaseCommand { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InlineComment => write!(
                f,
                "Inline comments are not allowed. \
                 Comments must start the line with #."
            ),
            Self::MixedCaseCommand { .. } => {
                write!(f, "Command must be either all uppercase or all lowercase.")
            }
            Self::UnknownCommand { command } => write!(f, "Unknown command: {command}"),
            Self::MissingCallTarget { command } => {
                write!(f, "{command} requires a subroutine name.")
            }
            Self::MisplacedContinuation {
                keyword,
                opener,
                closer,
            } => write!(f, "{keyword} must appear inside an {opener}/{closer} block."),
            Self::UnexpectedCloser { closer } => {
                write!(f, "Unexpected {closer} without a matching opener.")
            }
            Self::MismatchedCloser {
                closer,
                expected,
                opener,
                opened_on,
            } => write!(
                f,
                "Unexpected {closer}; expected {expected} for {opener} \
                 opened on line {}.",
                opened_on + 1
            ),
            Self::MissingCloser { opener, expected } => {
                write!(f, "Missing {expected} for {opener} block opened here.")
            }
            Self::MisplacedBreak {
                keyword,
                opener,
                closer,
            }
            | Self::MisplacedReturn {
                keyword,
                opener,
                closer,
            } => write!(f, "{keyword} must be used inside a {opener}/{closer} block."),
            Self::IncludeNotFound { target } if target.is_empty() => {
                write!(f, "Included script not found: (missing path)")
            }
            Self::IncludeNotFound { target } => write!(f, "Included script not found: {target}"),
            Self::UnknownSubroutine { name } => write!(f, "Unknown subroutine: {name}"),
        }
    }
}

/// A problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub span: Span,
    pub kind: DiagnosticKind,
    pub severity: Severity,
}

impl Diagnostic {
    /// A diagnostic at `span`, widened to at least one column.
    #[must_use]
    pub const fn new(span: Span, kind: DiagnosticKind) -> Self {
        let severity = kind.severity();
        Self {
            span: span.at_least_one_column(),
            kind,
            severity,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.span.line + 1,
            self.span.start + 1,
            self.severity,
            self.kind
        )
    }
}
