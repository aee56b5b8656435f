//! Include resolution and include-closure traversal.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, trace};

use crate::lexer::{code_lines, strip_surrounding_quotes};
use crate::token::CodeLine;
use crate::vocabulary::Vocabulary;

/// Resolve an include argument written in `base_file` to an existing
/// script.
///
/// Quotes and surrounding whitespace are stripped first. Relative
/// targets are taken from the directory of `base_file`. A target
/// without an extension is tried as written, then with each script
/// extension in order. Returns the first candidate that is a file.
#[must_use]
pub fn resolve_include_path(
    base_file: &Path,
    raw_target: &str,
    vocabulary: &Vocabulary,
) -> Option<PathBuf> {
    let target = strip_surrounding_quotes(raw_target).trim();
    if target.is_empty() {
        return None;
    }

    let target = Path::new(target);
    let candidate = if target.is_absolute() {
        normalize_lexically(target)
    } else {
        let dir = base_file.parent().unwrap_or_else(|| Path::new(""));
        normalize_lexically(&dir.join(target))
    };

    let mut candidates = vec![candidate.clone()];
    if candidate.extension().is_none() {
        for ext in &vocabulary.script_extensions {
            let mut with_ext = candidate.clone().into_os_string();
            with_ext.push(".");
            with_ext.push(ext);
            candidates.push(PathBuf::from(with_ext));
        }
    }

    candidates.into_iter().find(|path| path.is_file())
}

/// Depth-first, cycle-safe traversal over an include closure.
#[derive(Debug, Clone, Copy)]
pub struct IncludeWalker<'v> {
    vocabulary: &'v Vocabulary,
}

impl<'v> IncludeWalker<'v> {
    #[must_use]
    pub const fn new(vocabulary: &'v Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Visit `root` and every script it transitively includes, in
    /// pre-order, each at most once.
    ///
    /// `root_text` replaces the root's on-disk content. Other files are
    /// decoded lossily; only files that cannot be read at all are
    /// skipped.
    pub fn walk<F>(&self, root: &Path, root_text: Option<&str>, mut visit: F)
    where
        F: FnMut(&Path, &[CodeLine]),
    {
        let mut visited = HashSet::new();
        let mut pending = vec![root.to_path_buf()];
        let mut root_text = root_text;

        while let Some(path) = pending.pop() {
            if !visited.insert(visit_key(&path)) {
                continue;
            }

            let text = match root_text.take() {
                Some(text) => Cow::Borrowed(text),
                // Invalid UTF-8 sequences become U+FFFD.
                None => match fs::read(&path) {
                    Ok(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
                    Err(err) => {
                        debug!(path = %path.display(), error = %err, "skipping unreadable script");
                        continue;
                    }
                },
            };

            let lines = code_lines(&text);
            trace!(path = %path.display(), lines = lines.len(), "visiting script");
            visit(&path, &lines);

            let includes: Vec<PathBuf> = lines
                .iter()
                .filter_map(|line| self.include_target(&path, line))
                .collect();
            pending.extend(includes.into_iter().rev());
        }
    }

    /// The resolved target of an include line.
    #[must_use]
    pub fn include_target(&self, file: &Path, line: &CodeLine) -> Option<PathBuf> {
        if !self.vocabulary.is_include(&line.command_lower()) {
            return None;
        }
        let argument = line.argument()?;
        let resolved = resolve_include_path(file, &argument.text, self.vocabulary);
        if resolved.is_none() {
            debug!(
                file = %file.display(),
                line = line.line,
                target = %argument.text,
                "include target not found"
            );
        }
        resolved
    }
}

/// Every file in the include closure of `root`, in traversal order.
#[must_use]
pub fn include_closure(
    root: &Path,
    root_text: Option<&str>,
    vocabulary: &Vocabulary,
) -> Vec<PathBuf> {
    let mut files = Vec::new();
    IncludeWalker::new(vocabulary).walk(root, root_text, |path, _| {
        files.push(path.to_path_buf());
    });
    files
}

fn visit_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexical_normalization() {
        assert_eq!(
            normalize_lexically(Path::new("/a/b/./../c.osc")),
            PathBuf::from("/a/c.osc")
        );
        assert_eq!(normalize_lexically(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize_lexically(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn empty_target_is_unresolved() {
        let vocab = Vocabulary::default();
        assert!(resolve_include_path(Path::new("/tmp/main.osc"), "\"  \"", &vocab).is_none());
        assert!(resolve_include_path(Path::new("/tmp/main.osc"), "", &vocab).is_none());
    }

    #[test]
    fn missing_root_visits_nothing() {
        let vocab = Vocabulary::default();
        let files = include_closure(Path::new("/definitely/not/here.osc"), None, &vocab);
        assert!(files.is_empty());
    }

    #[test]
    fn in_memory_root_is_visited() {
        let vocab = Vocabulary::default();
        let files = include_closure(Path::new("/unsaved/new.osc"), Some("print 1\n"), &vocab);
        assert_eq!(files, [PathBuf::from("/unsaved/new.osc")]);
    }
}
