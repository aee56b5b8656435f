//! Static analysis for OSCScript.
//!
//! A line tokenizer that understands quoting and `#` comments, an
//! include-graph walker, subroutine and variable indexes across an
//! include closure, and a validator for block structure, command
//! vocabulary, and symbol usage.
//!
//! # Quick start
//!
//! ## Validate a document
//!
//! ```
//! use std::path::Path;
//! use oscscript_rs::{Vocabulary, validate};
//!
//! let text = "if $x eq 1\n\tgosub greet\nendif\n\nsubroutine greet\n\tprint hi\nendsubroutine\n";
//! let diagnostics = validate(Path::new("/scripts/main.osc"), text, &Vocabulary::default());
//! assert!(diagnostics.is_empty());
//! ```
//!
//! ## Index variables through a shared cache
//!
//! ```
//! use std::path::Path;
//! use oscscript_rs::AnalysisCache;
//!
//! let cache = AnalysisCache::default();
//! let index = cache.variable_index(Path::new("/scripts/main.osc"), Some("seti $x 5\n"), Some(1));
//! assert_eq!(index.definitions_of("x").len(), 1);
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod cache;
pub mod diagnostics;
pub mod include;
pub mod index;
pub mod lexer;
pub mod navigation;
pub mod rename;
pub mod subroutines;
pub mod token;
pub mod validator;
pub mod variables;
pub mod vocabulary;

pub use cache::{AnalysisCache, CacheKey};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use include::{IncludeWalker, include_closure, resolve_include_path};
pub use index::{Indexer, SymbolAt, SymbolIndex, SymbolKind};
pub use lexer::{
    code_lines, code_tokens, find_inline_comment_index, first_non_whitespace_index,
    strip_surrounding_quotes, tokenize, tokenize_with_ranges,
};
pub use navigation::{IncludeLink, OutlineEntry, include_link_at, include_links, outline};
pub use rename::{SymbolError, TextEdit, definitions, plan_rename};
pub use subroutines::SubroutineIndexer;
pub use token::{CodeLine, Location, Span, Token};
pub use validator::validate;
pub use variables::VariableIndexer;
pub use vocabulary::{Vocabulary, VocabularyError};

/// Unified error type for the fallible operations of the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A vocabulary file could not be loaded.
    #[error("{0}")]
    Vocabulary(#[from] VocabularyError),
    /// A symbol lookup or rename was refused.
    #[error("{0}")]
    Symbol(#[from] SymbolError),
}
