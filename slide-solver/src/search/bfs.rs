use std::collections::{HashSet, VecDeque};

use ahash::RandomState;

use crate::board::Board;

use super::{FailureTag, LockedMask, SearchReport};

/// Exhaustive fallback: forward breadth-first search from `start` toward the
/// solved board, bounded by `max_depth` and `node_limit` and honoring the
/// locked mask. Queue items carry their move list; the visited set holds full
/// boards.
pub fn breadth_first(
    start: &Board,
    max_depth: usize,
    node_limit: u64,
    locked: LockedMask,
) -> SearchReport {
    let goal = Board::solved(start.size());
    let mut visited: HashSet<Board, RandomState> = HashSet::default();
    let mut queue: VecDeque<(Board, Vec<u8>)> = VecDeque::new();
    visited.insert(*start);
    queue.push_back((*start, Vec::new()));
    let mut nodes = 0u64;
    while let Some((state, moves)) = queue.pop_front() {
        if nodes >= node_limit {
            break;
        }
        nodes += 1;
        if state == goal {
            tracing::debug!(nodes, length = moves.len(), "fallback bfs solved");
            return SearchReport::solved(moves, nodes);
        }
        if moves.len() >= max_depth {
            continue;
        }
        for cell in state.blank_neighbors() {
            if locked.contains(cell) {
                continue;
            }
            let child = state.child(cell);
            if !visited.insert(child) {
                continue;
            }
            let mut next_moves = moves.clone();
            next_moves.push(state.tile_at(cell));
            queue.push_back((child, next_moves));
        }
    }
    tracing::debug!(nodes, "fallback bfs exhausted");
    SearchReport::failed(FailureTag::Failed, nodes)
}
