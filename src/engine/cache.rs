//! Packrat memo table
//!
//! Maps `(rule id, token position)` to the outcome of resolving that rule
//! there. For a fixed grammar and token sequence the table is a pure memo:
//! an entry always equals what recomputation would produce. The parser clears
//! it at the start of every top-level parse.
//!
//! Besides finished outcomes the table holds [`MemoEntry::InProgress`]
//! markers for rules currently being resolved, which is how re-entry at an
//! unchanged position (left recursion) is detected.

use super::tree::ParseNode;
use ahash::RandomState;
use hashbrown::HashMap;

/// Memo table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoKey {
    /// Rule id (index into the grammar's rules)
    pub rule: usize,
    /// Token position
    pub pos: usize,
}

impl MemoKey {
    /// Create a key
    #[inline]
    pub fn new(rule: usize, pos: usize) -> Self {
        Self { rule, pos }
    }
}

/// A memoized rule outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoEntry {
    /// The rule is being resolved at this position right now
    InProgress,
    /// The rule matched
    Matched {
        /// Tree produced by the winning production (after any transform)
        node: ParseNode,
        /// Position after the match
        end_pos: usize,
    },
    /// No production matched
    Failed,
}

/// Memo table statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found an entry
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Entries currently stored
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups that hit, 0.0 when there were none
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Memo table keyed by `(rule, position)`
pub struct MemoTable {
    entries: HashMap<MemoKey, MemoEntry, RandomState>,
    hits: u64,
    misses: u64,
}

impl Default for MemoTable {
    fn default() -> Self {
        Self::new(256)
    }
}

impl MemoTable {
    /// Create a table with room for `estimated_entries`
    #[inline]
    pub fn new(estimated_entries: usize) -> Self {
        Self {
            entries: HashMap::with_capacity_and_hasher(estimated_entries, RandomState::new()),
            hits: 0,
            misses: 0,
        }
    }

    /// Clear the table and reserve room for a new input
    ///
    /// Allocated capacity from earlier parses is kept.
    #[inline]
    pub fn reset_for_input(&mut self, token_count: usize, rule_count: usize) {
        self.clear();
        self.entries.reserve(estimated_entries(token_count, rule_count));
    }

    /// Look up an entry, counting the hit or miss
    #[inline]
    pub fn get(&mut self, rule: usize, pos: usize) -> Option<&MemoEntry> {
        let entry = self.entries.get(&MemoKey::new(rule, pos));
        if entry.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        entry
    }

    /// Look up an entry without touching the statistics
    #[inline]
    pub fn peek(&self, rule: usize, pos: usize) -> Option<&MemoEntry> {
        self.entries.get(&MemoKey::new(rule, pos))
    }

    /// Insert or replace an entry
    #[inline]
    pub fn insert(&mut self, rule: usize, pos: usize, entry: MemoEntry) {
        self.entries.insert(MemoKey::new(rule, pos), entry);
    }

    /// Remove an entry
    #[inline]
    pub fn remove(&mut self, rule: usize, pos: usize) -> Option<MemoEntry> {
        self.entries.remove(&MemoKey::new(rule, pos))
    }

    /// Drop every entry and reset statistics
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Current statistics
    #[inline]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Most (rule, position) pairs are never visited; a few rules per token is typical
#[inline]
fn estimated_entries(token_count: usize, rule_count: usize) -> usize {
    token_count
        .saturating_mul(rule_count.min(4))
        .clamp(64, 100_000)
}
