//! Shared arena of materialized page text, keyed by page number

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::page::PageText;

/// Cloneable handle to the page-text arena. The materialization service
/// writes completed pages; the engine reads them during locate passes and
/// evicts entries as the page window moves. Never grows past the window
/// tolerance band.
#[derive(Clone, Default)]
pub struct TextArena {
    inner: Arc<Mutex<HashMap<usize, Arc<PageText>>>>,
}

impl TextArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<usize, Arc<PageText>>> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[must_use]
    pub fn get(&self, page: usize) -> Option<Arc<PageText>> {
        self.lock().get(&page).cloned()
    }

    #[must_use]
    pub fn contains(&self, page: usize) -> bool {
        self.lock().contains_key(&page)
    }

    pub fn insert(&self, text: Arc<PageText>) {
        self.lock().insert(text.page, text);
    }

    pub fn remove(&self, page: usize) {
        self.lock().remove(&page);
    }

    /// Drop every page outside the inclusive band [min, max].
    pub fn retain_range(&self, min: usize, max: usize) {
        self.lock().retain(|page, _| *page >= min && *page <= max);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: usize) -> Arc<PageText> {
        Arc::new(PageText::assemble(n, vec![format!("page {n}")]))
    }

    #[test]
    fn insert_and_get() {
        let arena = TextArena::new();
        arena.insert(page(3));

        assert!(arena.contains(3));
        assert_eq!(arena.get(3).unwrap().page, 3);
        assert!(arena.get(4).is_none());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn retain_range_drops_outside_band() {
        let arena = TextArena::new();
        for n in 0..10 {
            arena.insert(page(n));
        }

        arena.retain_range(4, 6);

        assert_eq!(arena.len(), 3);
        assert!(!arena.contains(3));
        assert!(arena.contains(4));
        assert!(arena.contains(6));
        assert!(!arena.contains(7));
    }

    #[test]
    fn clear_empties_arena() {
        let arena = TextArena::new();
        arena.insert(page(0));
        arena.insert(page(1));

        arena.clear();
        assert!(arena.is_empty());
    }

    #[test]
    fn handles_share_state() {
        let arena = TextArena::new();
        let other = arena.clone();

        other.insert(page(2));
        assert!(arena.contains(2));
    }
}
