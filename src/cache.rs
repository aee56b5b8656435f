//! Memoized symbol indexes.
//!
//! Entries are keyed by root file, document version, and the global
//! revision at lookup time. Any workspace change bumps the revision
//! and drops every entry; there is no per-file invalidation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::debug;

use crate::index::{Indexer, SymbolIndex, SymbolKind};
use crate::subroutines::SubroutineIndexer;
use crate::variables::VariableIndexer;
use crate::vocabulary::Vocabulary;

/// Identifies one computed index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: SymbolKind,
    pub root: PathBuf,
    /// Editor version of the root text, if known.
    pub version: Option<i32>,
    pub revision: u64,
    /// Whether in-memory text was supplied for the root.
    pub has_text: bool,
}

/// Process-wide store of symbol indexes.
///
/// Share one instance between every caller that needs indexes; it is
/// safe to use from several threads.
#[derive(Debug)]
pub struct AnalysisCache {
    vocabulary: Arc<Vocabulary>,
    revision: AtomicU64,
    entries: DashMap<CacheKey, Arc<SymbolIndex>>,
}

impl AnalysisCache {
    #[must_use]
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            vocabulary,
            revision: AtomicU64::new(0),
            entries: DashMap::new(),
        }
    }

    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Current global revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Number of cached indexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key for a lookup made now.
    #[must_use]
    pub fn key(
        &self,
        kind: SymbolKind,
        root: &Path,
        root_text: Option<&str>,
        version: Option<i32>,
    ) -> CacheKey {
        CacheKey {
            kind,
            root: root.to_path_buf(),
            version,
            revision: self.revision(),
            has_text: root_text.is_some(),
        }
    }

    /// Bump the revision and drop every entry. Returns the new
    /// revision.
    pub fn invalidate(&self) -> u64 {
        let revision = self.revision.fetch_add(1, Ordering::AcqRel) + 1;
        self.entries.clear();
        debug!(revision, "analysis cache invalidated");
        revision
    }

    /// Invalidate if any of `paths` is a script file. Returns whether
    /// the cache was invalidated.
    pub fn notify_changed<'p, I>(&self, paths: I) -> bool
    where
        I: IntoIterator<Item = &'p Path>,
    {
        let touches_script = paths
            .into_iter()
            .any(|path| self.vocabulary.is_script_path(path));
        if touches_script {
            self.invalidate();
        }
        touches_script
    }

    /// Index `root` with `indexer`, reusing a result computed under
    /// the same key.
    pub fn index_with<I: Indexer>(
        &self,
        indexer: &I,
        root: &Path,
        root_text: Option<&str>,
        version: Option<i32>,
    ) -> Arc<SymbolIndex> {
        let key = self.key(I::KIND, root, root_text, version);
        if let Some(hit) = self.entries.get(&key) {
            debug!(kind = %key.kind, root = %root.display(), "analysis cache hit");
            return Arc::clone(hit.value());
        }

        debug!(kind = %key.kind, root = %root.display(), "analysis cache miss");
        let index = Arc::new(indexer.index(root, root_text));
        self.entries.insert(key, Arc::clone(&index));
        index
    }

    pub fn subroutine_index(
        &self,
        root: &Path,
        root_text: Option<&str>,
        version: Option<i32>,
    ) -> Arc<SymbolIndex> {
        let indexer = SubroutineIndexer::new(&self.vocabulary);
        self.index_with(&indexer, root, root_text, version)
    }

    pub fn variable_index(
        &self,
        root: &Path,
        root_text: Option<&str>,
        version: Option<i32>,
    ) -> Arc<SymbolIndex> {
        let indexer = VariableIndexer::new(&self.vocabulary);
        self.index_with(&indexer, root, root_text, version)
    }

    /// Names of every subroutine defined in the closure of `root`.
    pub fn subroutine_names(
        &self,
        root: &Path,
        root_text: Option<&str>,
        version: Option<i32>,
    ) -> Vec<String> {
        let index = self.subroutine_index(root, root_text, version);
        index.defined_names().into_iter().map(str::to_string).collect()
    }

    /// Names of every user variable defined in the closure of `root`.
    pub fn variable_names(
        &self,
        root: &Path,
        root_text: Option<&str>,
        version: Option<i32>,
    ) -> Vec<String> {
        let index = self.variable_index(root, root_text, version);
        index.defined_names().into_iter().map(str::to_string).collect()
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(Arc::new(Vocabulary::default()))
    }
}
