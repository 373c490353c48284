//! Cached search results
//!
//! Result lists as stored in the caches, remembering the limit they were fetched with.

/// A search result list plus the limit the data source was asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResults<T> {
    pub items: Vec<T>,
    pub fetch_limit: usize,
}

impl<T: Clone> CachedResults<T> {
    pub fn new(items: Vec<T>, fetch_limit: usize) -> Self {
        Self { items, fetch_limit }
    }

    /// True when the data source returned fewer items than asked for,
    /// i.e. the list holds every match.
    pub fn is_complete(&self) -> bool {
        self.items.len() < self.fetch_limit
    }

    // == Serve ==
    /// Answers a request for `limit` items, or None if this list cannot.
    ///
    /// A list fetched with a smaller limit that was cut short may be missing
    /// matches a larger request would see.
    pub fn serve(&self, limit: usize) -> Option<Vec<T>> {
        if limit <= self.fetch_limit || self.is_complete() {
            Some(self.items.iter().take(limit).cloned().collect())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_truncates_to_smaller_limit() {
        let cached = CachedResults::new(vec![1, 2, 3], 3);
        assert_eq!(cached.serve(2), Some(vec![1, 2]));
        assert_eq!(cached.serve(3), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_serve_larger_limit_needs_complete_list() {
        let truncated = CachedResults::new(vec![1, 2, 3], 3);
        assert!(!truncated.is_complete());
        assert_eq!(truncated.serve(10), None);

        let complete = CachedResults::new(vec![1, 2], 5);
        assert!(complete.is_complete());
        assert_eq!(complete.serve(10), Some(vec![1, 2]));
    }
}
