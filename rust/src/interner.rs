//! Activity id interning.
//!
//! Maps activity id strings to dense integer indices so adjacency and timing
//! tables can be plain vectors indexed by activity.

use rustc_hash::FxHashMap;

/// Interned activity index (u32 for compact adjacency lists).
pub type ActivityIdx = u32;

/// Interner assigning indices in first-seen order.
#[derive(Debug, Clone)]
pub struct ActivityIdInterner {
    to_int: FxHashMap<String, ActivityIdx>,
    from_int: Vec<String>,
}

impl ActivityIdInterner {
    /// Create a new interner with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_int: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_int: Vec::with_capacity(capacity),
        }
    }

    /// Intern a new id.
    ///
    /// Returns `None` when the id was already interned, which the graph
    /// builder reports as a duplicate.
    pub fn insert(&mut self, s: &str) -> Option<ActivityIdx> {
        if self.to_int.contains_key(s) {
            return None;
        }
        let idx = self.from_int.len() as ActivityIdx;
        self.from_int.push(s.to_string());
        self.to_int.insert(s.to_string(), idx);
        Some(idx)
    }

    /// Get the index for an id, if it exists.
    #[inline]
    pub fn get(&self, s: &str) -> Option<ActivityIdx> {
        self.to_int.get(s).copied()
    }

    /// Get the id string for an index.
    #[inline]
    pub fn resolve(&self, idx: ActivityIdx) -> Option<&str> {
        self.from_int.get(idx as usize).map(|s| s.as_str())
    }

    /// Number of interned ids.
    pub fn len(&self) -> usize {
        self.from_int.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.from_int.is_empty()
    }
}

impl Default for ActivityIdInterner {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_resolve() {
        let mut interner = ActivityIdInterner::with_capacity(4);

        let a = interner.insert("A").unwrap();
        let b = interner.insert("B").unwrap();

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(interner.resolve(a), Some("A"));
        assert_eq!(interner.get("B"), Some(b));
        assert_eq!(interner.get("Z"), None);
        assert_eq!(interner.resolve(7), None);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_insert_rejects_repeat() {
        let mut interner = ActivityIdInterner::default();
        assert!(interner.is_empty());
        assert_eq!(interner.insert("A"), Some(0));
        assert_eq!(interner.insert("A"), None);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_ids_are_case_sensitive() {
        let mut interner = ActivityIdInterner::default();
        assert!(interner.insert("a").is_some());
        assert!(interner.insert("A").is_some());
        assert_eq!(interner.len(), 2);
    }
}
