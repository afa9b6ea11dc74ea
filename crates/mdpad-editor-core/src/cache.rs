//! Memoized block parsing.
//!
//! Keys are derived from the line ids and text a block covers, so an edited
//! line can never hit a stale entry; eviction only bounds memory. Each editor
//! owns its own cache, there is no shared global map.

use std::fmt;
use std::sync::Arc;

use mini_moka::unsync::Cache;

use crate::element::Element;
use crate::lines::{Line, LineId};

/// Content key of a block: the ids and text of the lines it spans.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockKey {
    ids: Vec<LineId>,
    text: String,
}

impl BlockKey {
    pub fn from_lines(lines: &[Line]) -> Self {
        let mut text = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(&line.text);
        }
        Self {
            ids: lines.iter().map(|l| l.id).collect(),
            text,
        }
    }
}

/// Bounded LRU of parsed blocks.
pub struct ParseCache {
    blocks: Cache<BlockKey, Arc<Element>>,
    hits: u64,
    misses: u64,
}

impl ParseCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            blocks: Cache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached element for `key`, or build, store, and return it.
    pub fn get_or_parse(&mut self, key: BlockKey, parse: impl FnOnce() -> Element) -> Arc<Element> {
        if let Some(hit) = self.blocks.get(&key) {
            self.hits += 1;
            return Arc::clone(hit);
        }
        self.misses += 1;
        let element = Arc::new(parse());
        self.blocks.insert(key, Arc::clone(&element));
        element
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.blocks.invalidate_all();
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl fmt::Debug for ParseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseCache")
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish_non_exhaustive()
    }
}
