//! Breadth-first pattern databases for the placement stage.
//!
//! A database maps a full board layout to its true BFS depth from the solved
//! board, restricted to moves that keep the stage's prefix tiles (1..ntiles)
//! in their goal cells and capped at a construction depth. Layouts past the
//! cap are absent; the heuristic falls back to Manhattan for them.

use std::collections::{HashMap, VecDeque};
use std::sync::OnceLock;

use ahash::RandomState;

use crate::board::Board;

const PLACEMENT_PREFIX_4X4: usize = 6;
const PLACEMENT_DEPTH_CAP_4X4: u8 = 14;
const PLACEMENT_PREFIX_5X5: usize = 12;
const PLACEMENT_DEPTH_CAP_5X5: u8 = 16;

static PLACEMENT_4X4: OnceLock<PatternDb> = OnceLock::new();
static PLACEMENT_5X5: OnceLock<PatternDb> = OnceLock::new();

/// A depth-bounded layout->distance table for one (size, prefix) stage goal.
pub struct PatternDb {
    depths: HashMap<Board, u8, RandomState>,
}

impl PatternDb {
    /// Enumerate breadth-first from the solved board, accepting only children
    /// whose tiles 1..=ntiles all remain in their goal cells, down to
    /// `max_depth` layers.
    pub fn build(size: usize, ntiles: usize, max_depth: u8) -> Self {
        let start = Board::solved(size);
        let mut depths: HashMap<Board, u8, RandomState> = HashMap::default();
        let mut queue = VecDeque::new();
        depths.insert(start, 0);
        queue.push_back((start, 0u8));
        while let Some((board, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for cell in board.blank_neighbors() {
                let child = board.child(cell);
                if !prefix_placed(&child, ntiles) {
                    continue;
                }
                if depths.contains_key(&child) {
                    continue;
                }
                depths.insert(child, depth + 1);
                queue.push_back((child, depth + 1));
            }
        }
        tracing::debug!(size, ntiles, max_depth, entries = depths.len(), "pattern database built");
        PatternDb { depths }
    }

    /// Stored BFS depth for this exact layout, if within the construction cap.
    #[inline]
    pub fn lookup(&self, board: &Board) -> Option<u32> {
        self.depths.get(board).map(|&d| d as u32)
    }

    /// Number of stored layouts.
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}

/// Build the process-wide placement database for `size` if it does not exist
/// yet. Later calls are no-ops; concurrent first uses race on the same latch.
pub fn warm(size: usize) {
    match size {
        4 => {
            PLACEMENT_4X4
                .get_or_init(|| PatternDb::build(4, PLACEMENT_PREFIX_4X4, PLACEMENT_DEPTH_CAP_4X4));
        }
        5 => {
            PLACEMENT_5X5
                .get_or_init(|| PatternDb::build(5, PLACEMENT_PREFIX_5X5, PLACEMENT_DEPTH_CAP_5X5));
        }
        _ => {}
    }
}

/// Placement-stage lookup against the process-wide table for the board's
/// size. `None` when the table is unbuilt or the layout is past the cap.
pub(crate) fn placement_lookup(board: &Board) -> Option<u32> {
    let db = match board.size() {
        4 => PLACEMENT_4X4.get(),
        5 => PLACEMENT_5X5.get(),
        _ => None,
    }?;
    db.lookup(board)
}

fn prefix_placed(board: &Board, ntiles: usize) -> bool {
    (0..ntiles).all(|i| board.tile_at(i) as usize == i + 1)
}
