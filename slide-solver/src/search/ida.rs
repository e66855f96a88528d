use std::time::{Duration, Instant};

use crate::board::Board;

use super::heuristic::heuristic;
use super::table::TranspositionTable;
use super::{FailureTag, LockedMask, SearchReport, Stage};

/// Sentinel f-value: no threshold can admit the state.
const OVER: u32 = u32::MAX;

/// Budgets for one IDA* invocation.
#[derive(Debug, Clone, Copy)]
pub struct IdaConfig {
    /// Nodes allowed per deepening iteration.
    pub node_limit: u64,
    /// Wall-clock budget, sampled between iterations only; within an
    /// iteration the node budget is the binding bound.
    pub time_limit: Duration,
    /// Give up instead of deepening past this f-threshold.
    pub threshold_cap: Option<u32>,
}

/// Iterative-deepening A* over blank moves.
///
/// Each iteration is a depth-first search under an f-cost threshold, with a
/// fresh transposition scope, locked-cell exclusion, reversal skipping, and
/// symmetry pruning; the threshold then rises to the smallest f that
/// overflowed it.
pub struct IdaStar {
    stage: Stage,
    cfg: IdaConfig,
    locked: LockedMask,
}

struct DfsRun<'a> {
    nodes: u64,
    path: Vec<u8>,
    found: bool,
    failure: Option<FailureTag>,
    table: &'a TranspositionTable,
}

impl IdaStar {
    pub fn new(stage: Stage, cfg: IdaConfig, locked: LockedMask) -> Self {
        IdaStar { stage, cfg, locked }
    }

    pub fn search(&self, start: &Board) -> SearchReport {
        let begun = Instant::now();
        let mut threshold = heuristic(start, self.stage);
        let table = TranspositionTable::new();
        let mut run =
            DfsRun { nodes: 0, path: Vec::new(), found: false, failure: None, table: &table };
        loop {
            run.nodes = 0;
            table.clear();
            let next = self.dfs(&mut run, *start, 0, None, threshold);
            if run.found {
                tracing::debug!(
                    stage = ?self.stage,
                    threshold,
                    nodes = run.nodes,
                    length = run.path.len(),
                    "ida* solved"
                );
                let moves = std::mem::take(&mut run.path);
                return SearchReport::solved(moves, run.nodes);
            }
            if let Some(tag) = run.failure {
                tracing::debug!(stage = ?self.stage, threshold, %tag, "ida* gave up");
                return SearchReport::failed(tag, run.nodes);
            }
            if next == OVER || self.cfg.threshold_cap.is_some_and(|cap| next > cap) {
                return SearchReport::failed(FailureTag::SearchLimit, run.nodes);
            }
            threshold = next;
            if begun.elapsed() >= self.cfg.time_limit {
                return SearchReport::failed(FailureTag::Timeout, run.nodes);
            }
        }
    }

    /// One depth-first probe under `threshold`. Returns the smallest f seen
    /// above the threshold (`OVER` when the subtree is exhausted or the node
    /// budget stopped the iteration).
    fn dfs(
        &self,
        run: &mut DfsRun<'_>,
        state: Board,
        g: u32,
        prev_blank: Option<usize>,
        threshold: u32,
    ) -> u32 {
        run.nodes += 1;
        if run.nodes > self.cfg.node_limit {
            run.failure = Some(FailureTag::NodeLimit);
            return OVER;
        }
        let h = heuristic(&state, self.stage);
        let f = g + h;
        if f > threshold {
            return f;
        }
        let at_goal = match self.stage {
            Stage::Endgame => state.is_solved(),
            Stage::Placement => h == 0,
        };
        if at_goal {
            run.found = true;
            return f;
        }
        run.table.insert(state);
        let mut min_over = OVER;
        let blank = state.blank_index();
        for cell in state.blank_neighbors() {
            if self.locked.contains(cell) {
                continue;
            }
            if prev_blank == Some(cell) {
                continue;
            }
            let child = state.child(cell);
            if child.symmetries().iter().any(|img| run.table.exists(img)) {
                continue;
            }
            run.path.push(state.tile_at(cell));
            let t = self.dfs(run, child, g + 1, Some(blank), threshold);
            if run.found {
                // leave the path intact: it is the solution
                return t;
            }
            if run.failure.is_some() {
                return OVER;
            }
            min_over = min_over.min(t);
            run.path.pop();
        }
        min_over
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_solution;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn generous() -> IdaConfig {
        IdaConfig {
            node_limit: 500_000,
            time_limit: Duration::from_secs(30),
            threshold_cap: None,
        }
    }

    #[test]
    fn solves_trivial_endgames() {
        let one = Board::from_tiles(4, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 0, 15])
            .unwrap();
        let report = IdaStar::new(Stage::Endgame, generous(), LockedMask::EMPTY).search(&one);
        assert!(report.success);
        assert_eq!(report.moves, vec![15]);

        let two = Board::from_tiles(4, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 0, 14, 15])
            .unwrap();
        let report = IdaStar::new(Stage::Endgame, generous(), LockedMask::EMPTY).search(&two);
        assert!(report.success);
        assert_eq!(report.moves, vec![14, 15]);
    }

    #[test]
    fn already_at_goal_is_empty() {
        let report =
            IdaStar::new(Stage::Endgame, generous(), LockedMask::EMPTY).search(&Board::solved(4));
        assert!(report.success);
        assert!(report.moves.is_empty());
        assert_eq!(report.nodes, 1);
    }

    #[test]
    fn solves_seeded_scramble() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut board = Board::solved(4);
        board.shuffle(12, &mut rng);
        let report = IdaStar::new(Stage::Endgame, generous(), LockedMask::EMPTY).search(&board);
        assert!(report.success);
        assert!(validate_solution(&board, &report.moves));
    }

    #[test]
    fn placement_stage_reaches_zero_heuristic() {
        crate::pdb::warm(4);
        let mut rng = StdRng::seed_from_u64(5);
        let mut board = Board::solved(4);
        board.shuffle(10, &mut rng);
        let report = IdaStar::new(Stage::Placement, generous(), LockedMask::EMPTY).search(&board);
        assert!(report.success);
        assert!(validate_solution(&board, &report.moves));
    }

    #[test]
    fn locked_cells_stay_untouched() {
        // scramble only the non-prefix region, then require the prefix to
        // survive the whole solution
        let mut locked = LockedMask::EMPTY;
        for cell in 0..6 {
            locked.insert(cell);
        }
        let mut rng = StdRng::seed_from_u64(21);
        let mut board = Board::solved(4);
        for _ in 0..14 {
            let options: Vec<usize> =
                board.blank_neighbors().filter(|&c| !locked.contains(c)).collect();
            board = board.child(options[rng.gen_range(0..options.len())]);
        }
        let report = IdaStar::new(Stage::Endgame, generous(), locked).search(&board);
        assert!(report.success);
        let mut replay = board;
        for &mv in &report.moves {
            assert!(replay.apply_tile_move(mv));
            for cell in 0..6 {
                assert_eq!(replay.tile_at(cell) as usize, cell + 1);
            }
        }
        assert!(replay.is_solved());
    }

    #[test]
    fn node_budget_stops_the_search() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut board = Board::solved(4);
        board.shuffle(20, &mut rng);
        let cfg = IdaConfig {
            node_limit: 1,
            time_limit: Duration::from_secs(30),
            threshold_cap: None,
        };
        let report = IdaStar::new(Stage::Endgame, cfg, LockedMask::EMPTY).search(&board);
        assert!(!report.success);
        assert_eq!(report.failure, Some(FailureTag::NodeLimit));
    }

    #[test]
    fn threshold_cap_converts_to_search_limit() {
        // three-cycle in the bottom row: Manhattan 4, true distance larger
        let board = Board::from_tiles(4, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 14, 15, 13, 0])
            .unwrap();
        let cfg = IdaConfig {
            node_limit: 500_000,
            time_limit: Duration::from_secs(30),
            threshold_cap: Some(4),
        };
        let report = IdaStar::new(Stage::Endgame, cfg, LockedMask::EMPTY).search(&board);
        assert!(!report.success);
        assert_eq!(report.failure, Some(FailureTag::SearchLimit));
    }

    #[test]
    fn fenced_blank_exhausts_the_space() {
        // blank boxed into its corner with the board unsolved
        let board = Board::from_tiles(4, &[2, 1, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 0])
            .unwrap();
        let mut locked = LockedMask::EMPTY;
        locked.insert(11);
        locked.insert(14);
        let report = IdaStar::new(Stage::Endgame, generous(), locked).search(&board);
        assert!(!report.success);
        assert_eq!(report.failure, Some(FailureTag::SearchLimit));
    }

    #[test]
    fn zero_time_budget_times_out() {
        let board = Board::from_tiles(4, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 14, 15, 13, 0])
            .unwrap();
        let cfg = IdaConfig {
            node_limit: 500_000,
            time_limit: Duration::ZERO,
            threshold_cap: None,
        };
        let report = IdaStar::new(Stage::Endgame, cfg, LockedMask::EMPTY).search(&board);
        assert!(!report.success);
        assert_eq!(report.failure, Some(FailureTag::Timeout));
    }
}
