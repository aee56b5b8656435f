//! Definition/reference maps shared by the subroutine and variable
//! indexers.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::token::{Location, Span};

static SUBROUTINE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid subroutine pattern"));

static VARIABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$[a-z_][a-z0-9_]*$").expect("valid variable pattern"));

/// Which index a symbol lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Subroutine,
    Variable,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subroutine => write!(f, "subroutine"),
            Self::Variable => write!(f, "variable"),
        }
    }
}

/// Lower-cased subroutine name, or `None` if `text` is not a valid
/// identifier.
#[must_use]
pub fn normalize_subroutine_name(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    SUBROUTINE_NAME.is_match(&lowered).then_some(lowered)
}

/// Lower-cased variable name without the `$` sigil, or `None` if
/// `text` is not a variable token.
#[must_use]
pub fn normalize_variable_name(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    VARIABLE_NAME
        .is_match(&lowered)
        .then(|| lowered[1..].to_string())
}

/// A symbol found under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolAt {
    pub name: String,
    pub span: Span,
}

/// Where every symbol of one kind is defined and referenced across
/// an include closure.
///
/// Lists keep traversal order: root file first, then included files
/// in the order they were reached, then line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolIndex {
    pub definitions: HashMap<String, Vec<Location>>,
    pub references: HashMap<String, Vec<Location>>,
}

impl SymbolIndex {
    pub fn add_definition(&mut self, name: String, location: Location) {
        self.definitions.entry(name).or_default().push(location);
    }

    pub fn add_reference(&mut self, name: String, location: Location) {
        self.references.entry(name).or_default().push(location);
    }

    #[must_use]
    pub fn definitions_of(&self, name: &str) -> &[Location] {
        self.definitions.get(name).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn references_of(&self, name: &str) -> &[Location] {
        self.references.get(name).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        !self.definitions_of(name).is_empty()
    }

    /// Every defined name, sorted.
    #[must_use]
    pub fn defined_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The definition with the lowest `(path, line)`.
    #[must_use]
    pub fn primary_definition(&self, name: &str) -> Option<&Location> {
        self.definitions_of(name)
            .iter()
            .min_by(|a, b| a.path.cmp(&b.path).then(a.line.cmp(&b.line)))
    }
}

/// Builds a [`SymbolIndex`] for a root file and its include closure.
pub trait Indexer {
    /// The kind of symbol this indexer collects.
    const KIND: SymbolKind;

    /// Index `root`. When `root_text` is given it is used instead of
    /// the root's on-disk content; included files are always read
    /// from disk.
    fn index(&self, root: &Path, root_text: Option<&str>) -> SymbolIndex;
}
