//! Dev module graph.
//!
//! Tracks the modules the dev compiler has been asked about, keyed by URL
//! (file path plus optional query). The query decides how the module is
//! treated: `?worker_file` entries are compiled as worker scripts.

use crate::entry::WORKER_QUERY;
use rustc_hash::FxHashMap as HashMap;
use std::sync::{PoisonError, RwLock};

/// How a module graph entry is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// Regular page script.
    Script,
    /// Standalone worker script (no HMR client, no page globals).
    Worker,
}

/// A node in the dev module graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    /// The module URL, query included.
    pub url: String,
    /// The file path on disk.
    pub file: String,
    pub kind: ModuleKind,
    /// Number of completed transforms.
    pub transforms: u64,
}

impl ModuleNode {
    #[must_use]
    pub fn new(url: &str) -> Self {
        let (file, query) = split_query(url);
        let kind = if query.is_some_and(|q| q.split('&').any(|p| p == WORKER_QUERY)) {
            ModuleKind::Worker
        } else {
            ModuleKind::Script
        };
        Self {
            url: url.to_string(),
            file: file.to_string(),
            kind,
            transforms: 0,
        }
    }
}

/// URL-keyed module graph shared by concurrent dev requests.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    /// URL → `ModuleNode` mapping.
    modules: RwLock<HashMap<String, ModuleNode>>,
}

impl ModuleGraph {
    /// Create a new empty module graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the node for `url`, creating it on first sight.
    pub fn ensure_entry_from_url(&self, url: &str) -> ModuleNode {
        let mut modules = self.modules.write().unwrap_or_else(PoisonError::into_inner);
        modules
            .entry(url.to_string())
            .or_insert_with(|| ModuleNode::new(url))
            .clone()
    }

    /// Look up a node by URL.
    pub fn get(&self, url: &str) -> Option<ModuleNode> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    /// Record a completed transform.
    pub fn mark_transformed(&self, url: &str) {
        if let Some(node) = self
            .modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(url)
        {
            node.transforms += 1;
        }
    }

    /// Number of modules in the graph.
    pub fn len(&self) -> usize {
        self.modules.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split `path?query` into its parts.
fn split_query(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}
