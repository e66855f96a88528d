use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::board::Board;

use super::ida::{IdaConfig, IdaStar};
use super::{LockedMask, SearchReport, Stage};

/// Fixed worker pool for the large-board endgame.
pub const ENDGAME_WORKERS: usize = 4;

/// Run four identical endgame IDA* searches concurrently and return the
/// first successful result in worker order.
///
/// Workers share nothing but an advisory relaxed flag: there is no
/// cancellation, every worker runs to its own budget, and the dispatcher
/// joins all of them before selecting.
pub fn parallel_endgame(start: &Board, cfg: IdaConfig, locked: LockedMask) -> SearchReport {
    let found = AtomicBool::new(false);
    let mut results: Vec<SearchReport> = (0..ENDGAME_WORKERS)
        .into_par_iter()
        .map(|worker| {
            let report = IdaStar::new(Stage::Endgame, cfg, locked).search(start);
            if report.success {
                found.store(true, Ordering::Relaxed);
                tracing::debug!(worker, length = report.moves.len(), "endgame worker solved");
            }
            report
        })
        .collect();
    tracing::debug!(solved = found.load(Ordering::Relaxed), "endgame workers joined");
    match results.iter().position(|r| r.success) {
        Some(i) => results.swap_remove(i),
        None => results.swap_remove(0),
    }
}
