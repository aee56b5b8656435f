//! `$name` variables.
//!
//! A variable is defined only by the first argument of an assignment
//! command (`seti $x 5`). Every other matching token is a reference,
//! so in `sets $y $x` only `y` is defined.

use std::path::Path;

use crate::include::IncludeWalker;
use crate::index::{Indexer, SymbolAt, SymbolIndex, SymbolKind, normalize_variable_name};
use crate::lexer::code_tokens;
use crate::token::{CodeLine, Location};
use crate::vocabulary::Vocabulary;

/// Indexes variables across an include closure.
#[derive(Debug, Clone, Copy)]
pub struct VariableIndexer<'v> {
    vocabulary: &'v Vocabulary,
}

impl<'v> VariableIndexer<'v> {
    #[must_use]
    pub const fn new(vocabulary: &'v Vocabulary) -> Self {
        Self { vocabulary }
    }

    fn record(&self, index: &mut SymbolIndex, path: &Path, line: &CodeLine) {
        let assigns = self.vocabulary.is_assignment(&line.command_lower());

        for (position, token) in line.tokens.iter().enumerate().skip(1) {
            let Some(name) = normalize_variable_name(&token.text) else {
                continue;
            };
            let location = Location::new(path, token.span(line.line));
            if position == 1 && assigns {
                index.add_definition(name, location);
            } else {
                index.add_reference(name, location);
            }
        }
    }

    /// The variable token covering `column` of `line_text`, whatever
    /// the command.
    #[must_use]
    pub fn symbol_at(&self, line_text: &str, line: usize, column: usize) -> Option<SymbolAt> {
        let tokens = code_tokens(line_text);
        let target = tokens.iter().find(|t| t.covers(column))?;
        let name = normalize_variable_name(&target.text)?;
        Some(SymbolAt {
            name,
            span: target.span(line),
        })
    }
}

impl Indexer for VariableIndexer<'_> {
    const KIND: SymbolKind = SymbolKind::Variable;

    fn index(&self, root: &Path, root_text: Option<&str>) -> SymbolIndex {
        let mut index = SymbolIndex::default();
        IncludeWalker::new(self.vocabulary).walk(root, root_text, |path, lines| {
            for line in lines {
                self.record(&mut index, path, line);
            }
        });
        index
    }
}
