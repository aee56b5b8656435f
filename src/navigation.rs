//! Document outline and include links.

use std::path::{Path, PathBuf};

use crate::include::IncludeWalker;
use crate::lexer::{code_lines, code_tokens};
use crate::token::{CodeLine, Span};
use crate::vocabulary::Vocabulary;

/// A subroutine in the document outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Name as written.
    pub name: String,
    /// Span of the name on the definition line.
    pub selection: Span,
    pub start_line: usize,
    /// Line of the matching closer, or `start_line` when the block is
    /// never closed.
    pub end_line: usize,
}

/// Subroutines defined in `text`, ordered by start line.
#[must_use]
pub fn outline(text: &str, vocabulary: &Vocabulary) -> Vec<OutlineEntry> {
    let closer = vocabulary.closer_for(&vocabulary.subroutine_keyword);
    let mut entries = Vec::new();
    let mut open: Vec<OutlineEntry> = Vec::new();

    for line in code_lines(text) {
        let command = line.command_lower();
        if command == vocabulary.subroutine_keyword {
            if let Some(name) = line.argument() {
                open.push(OutlineEntry {
                    name: name.text.clone(),
                    selection: name.span(line.line),
                    start_line: line.line,
                    end_line: line.line,
                });
            }
        } else if Some(command.as_str()) == closer {
            if let Some(mut entry) = open.pop() {
                entry.end_line = line.line;
                entries.push(entry);
            }
        }
    }

    entries.append(&mut open);
    entries.sort_by_key(|entry| entry.start_line);
    entries
}

/// An include argument that resolves to a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeLink {
    pub span: Span,
    pub target: PathBuf,
}

/// Every resolvable include in `text`, the content of `path`.
#[must_use]
pub fn include_links(path: &Path, text: &str, vocabulary: &Vocabulary) -> Vec<IncludeLink> {
    let walker = IncludeWalker::new(vocabulary);
    code_lines(text)
        .iter()
        .filter_map(|line| link_for(&walker, path, line))
        .collect()
}

/// The include link under `column` of `line_text`, if any.
#[must_use]
pub fn include_link_at(
    path: &Path,
    line_text: &str,
    line: usize,
    column: usize,
    vocabulary: &Vocabulary,
) -> Option<IncludeLink> {
    let tokens = code_tokens(line_text);
    if !tokens.get(1)?.covers(column) {
        return None;
    }
    link_for(&IncludeWalker::new(vocabulary), path, &CodeLine { line, tokens })
}

fn link_for(walker: &IncludeWalker<'_>, path: &Path, line: &CodeLine) -> Option<IncludeLink> {
    let target = walker.include_target(path, line)?;
    let span = line.argument()?.span(line.line);
    Some(IncludeLink { span, target })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_closes_subroutines() {
        let text = "subroutine Main\n  gosub helper\nendsubroutine\n\n\
                    subroutine helper\nendsubroutine\n";
        let entries = outline(text, &Vocabulary::default());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Main");
        assert_eq!((entries[0].start_line, entries[0].end_line), (0, 2));
        assert_eq!(entries[0].selection, Span { line: 0, start: 11, end: 15 });
        assert_eq!((entries[1].start_line, entries[1].end_line), (4, 5));
    }

    #[test]
    fn outline_keeps_unclosed() {
        let text = "subroutine later\nsubroutine first\nendsubroutine\n";
        let entries = outline(text, &Vocabulary::default());
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["later", "first"]);
        assert_eq!(entries[0].end_line, 0);
        assert_eq!(entries[1].end_line, 2);
    }

    #[test]
    fn unresolved_includes_have_no_link() {
        let links = include_links(
            Path::new("/mem/main.osc"),
            "include missing\n",
            &Vocabulary::default(),
        );
        assert!(links.is_empty());
    }
}
