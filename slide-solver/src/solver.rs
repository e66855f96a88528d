//! The stage controller: progressive tile locking over sub-searches.

use std::time::Duration;

use crate::board::Board;
use crate::pdb;
use crate::search::{
    breadth_first, parallel_endgame, FailureTag, IdaConfig, IdaStar, LockedMask, SearchReport,
    Stage,
};

/// Why a solve attempt failed. The C boundary collapses every variant to -1;
/// library callers get the full story.
#[derive(thiserror::Error, Debug)]
pub enum SolveError {
    #[error("unsupported board size: {0}")]
    UnsupportedSize(usize),
    #[error("input is not a permutation of 0..size^2")]
    InvalidInput,
    #[error("failed to place tile {tile}: {tag}")]
    TilePlacement { tile: u8, tag: FailureTag },
    #[error("endgame search exhausted: {tag}")]
    Endgame { tag: FailureTag },
}

/// Budgets and shape of the staged solve for one board size.
struct StagePlan {
    /// Prefix tiles placed and locked one by one before the endgame.
    prefix: usize,
    placement: IdaConfig,
    endgame: IdaConfig,
    parallel_endgame: bool,
    fallback_depth: usize,
    fallback_nodes: u64,
}

const PLAN_4X4: StagePlan = StagePlan {
    prefix: 6,
    placement: IdaConfig {
        node_limit: 300_000,
        time_limit: Duration::from_secs(4),
        threshold_cap: None,
    },
    endgame: IdaConfig {
        node_limit: 800_000,
        time_limit: Duration::from_secs(16),
        threshold_cap: Some(40),
    },
    parallel_endgame: false,
    fallback_depth: 40,
    fallback_nodes: 200_000,
};

const PLAN_5X5: StagePlan = StagePlan {
    prefix: 12,
    placement: IdaConfig {
        node_limit: 250_000,
        time_limit: Duration::from_secs(3),
        threshold_cap: None,
    },
    endgame: IdaConfig {
        node_limit: 400_000,
        time_limit: Duration::from_secs(9),
        threshold_cap: Some(60),
    },
    parallel_endgame: true,
    fallback_depth: 60,
    fallback_nodes: 400_000,
};

/// Solve a legal board, returning the tile-number move sequence.
///
/// Stage 1 walks the prefix cells in order, invoking a placement search for
/// each tile not already home and locking its cell afterwards; the locked
/// mask only ever grows. Stage 2 finishes the rest with the endgame search
/// (four parallel workers on 5x5), falling back to the bounded breadth-first
/// search when that fails.
pub fn solve(start: &Board) -> Result<Vec<u8>, SolveError> {
    let plan = match start.size() {
        4 => &PLAN_4X4,
        5 => &PLAN_5X5,
        n => return Err(SolveError::UnsupportedSize(n)),
    };
    pdb::warm(start.size());

    let mut cur = *start;
    let mut locked = LockedMask::EMPTY;
    let mut all_moves: Vec<u8> = Vec::new();

    for cell in 0..plan.prefix {
        let tile = (cell + 1) as u8;
        if cur.tile_at(cell) == tile {
            locked.insert(cell);
            continue;
        }
        let report = IdaStar::new(Stage::Placement, plan.placement, locked).search(&cur);
        if !report.success {
            let tag = report.failure.unwrap_or(FailureTag::Failed);
            tracing::warn!(tile, %tag, "placement stage failed");
            return Err(SolveError::TilePlacement { tile, tag });
        }
        extend_solution(&mut cur, &mut all_moves, report);
        locked.insert(cell);
    }
    tracing::debug!(
        size = start.size(),
        locked = locked.len(),
        moves = all_moves.len(),
        "prefix placement complete"
    );

    let endgame = if plan.parallel_endgame {
        parallel_endgame(&cur, plan.endgame, locked)
    } else {
        IdaStar::new(Stage::Endgame, plan.endgame, locked).search(&cur)
    };
    if endgame.success {
        extend_solution(&mut cur, &mut all_moves, endgame);
    } else {
        let tag = endgame.failure.unwrap_or(FailureTag::Failed);
        tracing::debug!(%tag, "endgame ida* failed, trying bfs fallback");
        let fallback = breadth_first(&cur, plan.fallback_depth, plan.fallback_nodes, locked);
        if !fallback.success {
            return Err(SolveError::Endgame { tag: fallback.failure.unwrap_or(tag) });
        }
        extend_solution(&mut cur, &mut all_moves, fallback);
    }

    // the controller's own confirmation that the accumulated moves solve the board
    if !cur.is_solved() {
        tracing::warn!("solution replay did not reach the goal");
        return Err(SolveError::Endgame { tag: FailureTag::Failed });
    }
    Ok(all_moves)
}

/// Validate-then-solve over a raw byte layout; the boundary's workhorse.
/// Already-solved inputs return an empty move list.
pub fn solve_bytes(size: usize, tiles: &[u8]) -> Result<Vec<u8>, SolveError> {
    if size != 4 && size != 5 {
        return Err(SolveError::UnsupportedSize(size));
    }
    let board = Board::from_tiles(size, tiles).ok_or(SolveError::InvalidInput)?;
    if board.is_solved() {
        return Ok(Vec::new());
    }
    solve(&board)
}

fn extend_solution(cur: &mut Board, all_moves: &mut Vec<u8>, report: SearchReport) {
    for &mv in &report.moves {
        let applied = cur.apply_tile_move(mv);
        debug_assert!(applied, "searcher emitted an unknown tile {mv}");
    }
    all_moves.extend_from_slice(&report.moves);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_solution;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const SOLVED_4X4: [u8; 16] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 0];

    #[test]
    fn solved_input_needs_no_moves() {
        assert_eq!(solve_bytes(4, &SOLVED_4X4).unwrap(), Vec::<u8>::new());
        let solved_5x5: Vec<u8> = (1..25).chain([0]).collect();
        assert_eq!(solve_bytes(5, &solved_5x5).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn one_move_scramble() {
        let tiles = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 0, 15];
        assert_eq!(solve_bytes(4, &tiles).unwrap(), vec![15]);
    }

    #[test]
    fn two_move_scramble() {
        let tiles = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 0, 14, 15];
        assert_eq!(solve_bytes(4, &tiles).unwrap(), vec![14, 15]);
    }

    #[test]
    fn moderate_4x4_scramble_solves_and_validates() {
        let mut rng = StdRng::seed_from_u64(30);
        let mut board = Board::solved(4);
        board.shuffle(30, &mut rng);
        let moves = solve(&board).unwrap();
        assert!(moves.len() <= 80);
        assert!(validate_solution(&board, &moves));
    }

    #[test]
    fn light_5x5_scramble_solves_and_validates() {
        let mut rng = StdRng::seed_from_u64(20);
        let mut board = Board::solved(5);
        board.shuffle(20, &mut rng);
        let moves = solve(&board).unwrap();
        assert!(moves.len() <= 200);
        assert!(validate_solution(&board, &moves));
    }

    #[test]
    fn duplicate_tile_is_invalid() {
        let mut tiles = SOLVED_4X4;
        tiles[0] = 2; // two 2s, no 1
        assert!(matches!(solve_bytes(4, &tiles), Err(SolveError::InvalidInput)));
    }

    #[test]
    fn unsupported_sizes_are_rejected() {
        let three: Vec<u8> = (1..9).chain([0]).collect();
        assert!(matches!(solve_bytes(3, &three), Err(SolveError::UnsupportedSize(3))));
        assert!(matches!(solve_bytes(6, &[0; 36]), Err(SolveError::UnsupportedSize(6))));
    }

    #[test]
    fn placed_prefix_is_locked_for_the_whole_solve() {
        // prefix already home at the start: the controller locks cells 0..6
        // before any search, so no emitted move may ever disturb them
        let mut rng = StdRng::seed_from_u64(31);
        let mut board = Board::solved(4);
        for _ in 0..16 {
            let options: Vec<usize> = board.blank_neighbors().filter(|&c| c >= 6).collect();
            board = board.child(options[rng.gen_range(0..options.len())]);
        }
        let moves = solve(&board).unwrap();
        let mut replay = board;
        for &mv in &moves {
            assert!(replay.apply_tile_move(mv));
            for cell in 0..6 {
                assert_eq!(replay.tile_at(cell) as usize, cell + 1);
            }
        }
        assert!(replay.is_solved());
    }

    #[test]
    fn error_messages_name_the_failure() {
        let err = SolveError::TilePlacement { tile: 3, tag: FailureTag::Timeout };
        assert_eq!(err.to_string(), "failed to place tile 3: timeout");
        let err = SolveError::Endgame { tag: FailureTag::Failed };
        assert_eq!(err.to_string(), "endgame search exhausted: failed");
    }
}
