//! Definition lookup and rename planning.
//!
//! These are the only operations that fail with an error rather than
//! a diagnostic: the caller needs to tell a built-in symbol apart
//! from one that simply has no definition.

use crate::index::{SymbolIndex, SymbolKind, normalize_subroutine_name, normalize_variable_name};
use crate::token::Location;
use crate::vocabulary::Vocabulary;

/// Why a symbol operation cannot proceed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    /// Provided by the runtime; there is no user location to act on.
    #[error("{kind} {name} is built in and cannot be changed")]
    Builtin { kind: SymbolKind, name: String },
    #[error("no definition found for {kind} {name}")]
    NotFound { kind: SymbolKind, name: String },
    /// The requested new name is not a valid identifier.
    #[error("{name} is not a valid {kind} name")]
    InvalidName { kind: SymbolKind, name: String },
}

/// A replacement of the text at `location`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub location: Location,
    pub new_text: String,
}

/// Every user definition of `name`.
pub fn definitions<'i>(
    index: &'i SymbolIndex,
    kind: SymbolKind,
    name: &str,
    vocabulary: &Vocabulary,
) -> Result<&'i [Location], SymbolError> {
    let found = index.definitions_of(name);
    if !found.is_empty() {
        return Ok(found);
    }

    let name = name.to_string();
    if kind == SymbolKind::Variable && vocabulary.is_builtin_variable(&name) {
        Err(SymbolError::Builtin { kind, name })
    } else {
        Err(SymbolError::NotFound { kind, name })
    }
}

/// Edits renaming `name` to `new_name` at every definition, then every
/// reference.
///
/// `name` is the indexed form (lower-cased, no sigil). A new variable
/// name may be given with or without the `$` sigil; the edits always
/// keep it.
pub fn plan_rename(
    index: &SymbolIndex,
    kind: SymbolKind,
    name: &str,
    new_name: &str,
    vocabulary: &Vocabulary,
) -> Result<Vec<TextEdit>, SymbolError> {
    let defs = definitions(index, kind, name, vocabulary)?;

    let new_text = match kind {
        SymbolKind::Subroutine => normalize_subroutine_name(new_name).map(|_| new_name.to_string()),
        SymbolKind::Variable => {
            let sigiled = format!("${}", new_name.strip_prefix('$').unwrap_or(new_name));
            normalize_variable_name(&sigiled).map(|_| sigiled)
        }
    }
    .ok_or_else(|| SymbolError::InvalidName {
        kind,
        name: new_name.to_string(),
    })?;

    Ok(defs
        .iter()
        .chain(index.references_of(name))
        .map(|location| TextEdit {
            location: location.clone(),
            new_text: new_text.clone(),
        })
        .collect())
}
