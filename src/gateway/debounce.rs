//! Keystroke debouncing
//!
//! Caller-side helper that collapses a burst of queries into the last one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lets only the latest of a burst of inputs through after a quiet period.
///
/// ```ignore
/// if let Some(query) = debouncer.settle(text).await {
///     let names = service.search_customers(&query, 10).await;
/// }
/// ```
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    /// Waits out the delay and returns `input` only if no newer call arrived meanwhile.
    pub async fn settle<T>(&self, input: T) -> Option<T> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        (self.generation.load(Ordering::SeqCst) == ticket).then_some(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_lone_input_passes_through() {
        let debouncer = Debouncer::new(Duration::from_millis(150));
        assert_eq!(debouncer.settle("acme").await, Some("acme"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_keeps_only_last_input() {
        let debouncer = Arc::new(Debouncer::new(Duration::from_millis(150)));

        let mut pending = Vec::new();
        for query in ["a", "ac", "acm"] {
            let debouncer = Arc::clone(&debouncer);
            pending.push(tokio::spawn(async move { debouncer.settle(query).await }));
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let mut settled = Vec::new();
        for handle in pending {
            settled.push(handle.await.unwrap());
        }
        assert_eq!(settled, vec![None, None, Some("acm")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inputs_spaced_past_delay_all_pass() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        assert_eq!(debouncer.settle(1).await, Some(1));
        assert_eq!(debouncer.settle(2).await, Some(2));
    }
}
