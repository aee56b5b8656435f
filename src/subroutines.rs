//! Subroutine definitions (`subroutine NAME`) and call sites
//! (`gosub NAME`).

use std::path::Path;

use crate::include::IncludeWalker;
use crate::index::{Indexer, SymbolAt, SymbolIndex, SymbolKind, normalize_subroutine_name};
use crate::lexer::code_tokens;
use crate::token::{CodeLine, Location};
use crate::vocabulary::Vocabulary;

/// Indexes subroutines across an include closure.
#[derive(Debug, Clone, Copy)]
pub struct SubroutineIndexer<'v> {
    vocabulary: &'v Vocabulary,
}

impl<'v> SubroutineIndexer<'v> {
    #[must_use]
    pub const fn new(vocabulary: &'v Vocabulary) -> Self {
        Self { vocabulary }
    }

    fn record(&self, index: &mut SymbolIndex, path: &Path, line: &CodeLine) {
        let command = line.command_lower();
        let is_definition = command == self.vocabulary.subroutine_keyword;
        if !is_definition && command != self.vocabulary.call_keyword {
            return;
        }

        let Some(target) = line.argument() else {
            return;
        };
        let Some(name) = normalize_subroutine_name(&target.text) else {
            return;
        };

        let location = Location::new(path, target.span(line.line));
        if is_definition {
            index.add_definition(name, location);
        } else {
            index.add_reference(name, location);
        }
    }

    /// The subroutine named at `column` of `line_text`.
    ///
    /// Only the name argument of a definition or call line counts;
    /// a bare identifier elsewhere is not a subroutine symbol.
    #[must_use]
    pub fn symbol_at(&self, line_text: &str, line: usize, column: usize) -> Option<SymbolAt> {
        let tokens = code_tokens(line_text);
        let command = tokens.first()?.text.to_lowercase();
        if command != self.vocabulary.subroutine_keyword && command != self.vocabulary.call_keyword
        {
            return None;
        }

        let target = tokens.get(1).filter(|t| t.covers(column))?;
        let name = normalize_subroutine_name(&target.text)?;
        Some(SymbolAt {
            name,
            span: target.span(line),
        })
    }
}

impl Indexer for SubroutineIndexer<'_> {
    const KIND: SymbolKind = SymbolKind::Subroutine;

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
