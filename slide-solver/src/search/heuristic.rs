use crate::board::Board;
use crate::pdb;

use super::Stage;

/// Admissible distance estimate for `board` under the given stage.
///
/// Placement-stage lookups consult the process-wide pattern database first
/// and fall back to Manhattan on a miss; the endgame has no database and
/// always uses Manhattan. The two are never mixed with `max`: a database hit
/// wins outright.
pub fn heuristic(board: &Board, stage: Stage) -> u32 {
    match stage {
        Stage::Placement => pdb::placement_lookup(board).unwrap_or_else(|| board.manhattan()),
        Stage::Endgame => board.manhattan(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endgame_is_manhattan() {
        let board = Board::from_tiles(4, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 0, 14, 15])
            .unwrap();
        assert_eq!(heuristic(&board, Stage::Endgame), board.manhattan());
        assert_eq!(heuristic(&board, Stage::Endgame), 2);
    }

    #[test]
    fn placement_hits_database_when_built() {
        pdb::warm(4);
        let solved = Board::solved(4);
        assert_eq!(heuristic(&solved, Stage::Placement), 0);
        // one blank move away from solved: a depth 1 entry, equal to Manhattan
        let board = solved.child(14);
        assert_eq!(heuristic(&board, Stage::Placement), 1);
    }

    #[test]
    fn placement_falls_back_on_miss() {
        pdb::warm(4);
        // prefix tile displaced: never a database key
        let board = Board::from_tiles(4, &[2, 1, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 0])
            .unwrap();
        assert_eq!(heuristic(&board, Stage::Placement), board.manhattan());
    }
}
