use std::collections::HashSet;
use std::sync::Mutex;

use ahash::RandomState;

use crate::board::Board;

/// Set of boards visited within one IDA* iteration.
///
/// A single mutex serializes access. Each searcher owns its table, so the
/// lock is effectively uncontended; it exists so a table could be shared
/// across threads without changing callers.
#[derive(Default)]
pub struct TranspositionTable {
    set: Mutex<HashSet<Board, RandomState>>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, board: &Board) -> bool {
        self.lock().contains(board)
    }

    pub fn insert(&self, board: Board) {
        self.lock().insert(board);
    }

    /// Drop all entries; called at each new f-threshold, since states pruned
    /// under the old threshold may be affordable under the new one.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<Board, RandomState>> {
        self.set.lock().expect("transposition table mutex poisoned")
    }
}
