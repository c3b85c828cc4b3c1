use crate::store::{StoreError, WordStore};

/// Default cap on the number of words presented in one session.
pub const MAX_WORDS_PER_SESSION: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub position: usize,
    pub word: String,
    pub response: String,
}

/// Ordered queue for one session. Immutable once built; a refresh means
/// building a new queue via [`build_session`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionQueue {
    entries: Vec<QueueEntry>,
}

impl SessionQueue {
    pub fn new(entries: Vec<QueueEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QueueEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }
}

/// Scans the store in position order collecting unshown records up to `cap`.
///
/// When every record has been shown and the store is non-empty, all flags are
/// reset and the scan runs once more, so a full fresh session starts
/// immediately instead of leaving the user with an empty one. An empty store
/// yields an empty queue; that is the degenerate no-session state, distinct
/// from "just completed".
pub fn build_session(store: &mut WordStore, cap: usize) -> Result<SessionQueue, StoreError> {
    let queue = collect_unshown(store, cap);
    if !queue.is_empty() || store.count_total() == 0 {
        return Ok(queue);
    }

    store.reset_all()?;
    Ok(collect_unshown(store, cap))
}

fn collect_unshown(store: &WordStore, cap: usize) -> SessionQueue {
    let entries = store
        .records()
        .iter()
        .filter(|record| !record.shown)
        .take(cap)
        .map(|record| QueueEntry {
            position: record.position,
            word: record.word.clone(),
            response: record.response.clone(),
        })
        .collect();
    SessionQueue::new(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn store_with_rows(dir: &tempfile::TempDir, rows: &[(&str, bool)]) -> WordStore {
        let path: PathBuf = dir.path().join("wat.csv");
        let mut table = String::from("word,best_response,shown\n");
        for (word, shown) in rows {
            table.push_str(&format!("{word},some response,{shown}\n"));
        }
        fs::write(&path, table).unwrap();
        WordStore::load(&path).unwrap()
    }

    #[test]
    fn never_exceeds_cap_and_never_returns_shown() {
        let dir = tempdir().unwrap();
        let rows: Vec<(String, bool)> = (0..90)
            .map(|i| (format!("WORD{i}"), i % 3 == 0))
            .collect();
        let refs: Vec<(&str, bool)> = rows.iter().map(|(w, s)| (w.as_str(), *s)).collect();
        let mut store = store_with_rows(&dir, &refs);

        let queue = build_session(&mut store, 40).unwrap();
        assert!(queue.len() <= 40);
        for entry in queue.entries() {
            assert!(!store.get(entry.position).unwrap().shown);
        }
    }

    #[test]
    fn scan_is_in_position_order() {
        let dir = tempdir().unwrap();
        let mut store = store_with_rows(
            &dir,
            &[("A", true), ("B", false), ("C", true), ("D", false), ("E", false)],
        );

        let queue = build_session(&mut store, 60).unwrap();
        let positions: Vec<usize> = queue.entries().iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![1, 3, 4]);
        assert_eq!(queue.get(0).unwrap().word, "B");
    }

    #[test]
    fn exhausted_store_resets_and_rescans_once() {
        let dir = tempdir().unwrap();
        let mut store = store_with_rows(&dir, &[("A", true), ("B", true), ("C", true)]);

        let queue = build_session(&mut store, 60).unwrap();

        // all flags wiped, and the fresh cycle fills a whole queue right away
        assert_eq!(store.count_shown(), 0);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn exhausted_store_respects_cap_after_reset() {
        let dir = tempdir().unwrap();
        let rows: Vec<(String, bool)> = (0..10).map(|i| (format!("W{i}"), true)).collect();
        let refs: Vec<(&str, bool)> = rows.iter().map(|(w, s)| (w.as_str(), *s)).collect();
        let mut store = store_with_rows(&dir, &refs);

        let queue = build_session(&mut store, 4).unwrap();
        assert_eq!(queue.len(), 4);
        assert_eq!(store.count_shown(), 0);
    }

    #[test]
    fn empty_store_yields_empty_queue_without_reset() {
        let dir = tempdir().unwrap();
        let mut store = store_with_rows(&dir, &[]);

        let queue = build_session(&mut store, 60).unwrap();
        assert!(queue.is_empty());
        assert_eq!(store.count_total(), 0);
    }

    #[test]
    fn three_unshown_records_fill_a_short_session() {
        // Scenario: 3 unshown, cap 60 -> queue of 3
        let dir = tempdir().unwrap();
        let mut store = store_with_rows(&dir, &[("X", false), ("Y", false), ("Z", false)]);

        let queue = build_session(&mut store, MAX_WORDS_PER_SESSION).unwrap();
        assert_eq!(queue.len(), 3);
    }
}
