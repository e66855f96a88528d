//! C-ABI boundary for the slide-solver core.
//!
//! The surface is a small set of `extern "C"` functions a host runtime can
//! bind against: buffer allocation, the solver entry point, replay
//! validation and a few diagnostics. Pointers cross the boundary raw; the
//! host owns buffer sizing (200 bytes of move output is safe for 4x4, 400
//! for 5x5). Every failure (bad input, exhausted search, or a panic inside
//! the core) surfaces as -1; nothing unwinds across the boundary.

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::panic::catch_unwind;

use slide_solver::board::Board;
use slide_solver::pdb::PatternDb;
use slide_solver::search::{heuristic, Stage};
use slide_solver::{solver, validate};

const HEADER: usize = std::mem::size_of::<usize>();

fn buffer_layout(n: usize) -> Layout {
    Layout::from_size_align(HEADER + n, std::mem::align_of::<usize>())
        .expect("buffer size overflows a layout")
}

/// Allocate a zeroed `n`-byte buffer. Returns null when `n` is not positive.
///
/// The length is stashed in a header ahead of the returned pointer so the
/// matching free needs only the pointer.
#[no_mangle]
pub extern "C" fn alloc_state(n: i32) -> *mut u8 {
    if n <= 0 {
        return std::ptr::null_mut();
    }
    let n = n as usize;
    unsafe {
        let base = alloc_zeroed(buffer_layout(n));
        if base.is_null() {
            return std::ptr::null_mut();
        }
        (base as *mut usize).write(n);
        base.add(HEADER)
    }
}

/// Free a buffer from [`alloc_state`]. Null is a no-op.
///
/// # Safety
/// `ptr` must be null or a pointer previously returned by [`alloc_state`] or
/// [`alloc_moves`] and not yet freed.
#[no_mangle]
pub unsafe extern "C" fn free_state(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    let base = ptr.sub(HEADER);
    let n = (base as *const usize).read();
    dealloc(base, buffer_layout(n));
}

/// Allocate a move buffer; identical to [`alloc_state`].
#[no_mangle]
pub extern "C" fn alloc_moves(n: i32) -> *mut u8 {
    alloc_state(n)
}

/// Free a buffer from [`alloc_moves`]. Null is a no-op.
///
/// # Safety
/// Same contract as [`free_state`].
#[no_mangle]
pub unsafe extern "C" fn free_moves(ptr: *mut u8) {
    free_state(ptr);
}

/// Solve the `size^2`-byte row-major layout at `state`.
///
/// Writes one tile-number byte per move to `moves_out` and returns the move
/// count; 0 when the board is already solved; -1 on invalid input,
/// unsupported size, search exhaustion, or any internal fault.
///
/// # Safety
/// `state` must point to `size^2` readable bytes and `moves_out` to a
/// writable buffer large enough for the solution (200 bytes for 4x4, 400
/// for 5x5 are safe bounds).
#[no_mangle]
pub unsafe extern "C" fn solve_puzzle(state: *const u8, size: i32, moves_out: *mut u8) -> i32 {
    if state.is_null() || moves_out.is_null() || !(size == 4 || size == 5) {
        return -1;
    }
    let n = (size * size) as usize;
    let tiles = std::slice::from_raw_parts(state, n).to_vec();
    match catch_unwind(move || solver::solve_bytes(size as usize, &tiles)) {
        Ok(Ok(moves)) => {
            std::ptr::copy_nonoverlapping(moves.as_ptr(), moves_out, moves.len());
            moves.len() as i32
        }
        Ok(Err(err)) => {
            tracing::warn!(%err, "solve_puzzle failed");
            -1
        }
        Err(_) => {
            tracing::warn!("solver panicked; contained at the boundary");
            -1
        }
    }
}

/// Replay `n_moves` tile-number bytes from `moves` on the layout at `state`;
/// 1 iff the result is the solved board.
///
/// # Safety
/// `state` must point to `size^2` readable bytes and `moves` to `n_moves`
/// readable bytes.
#[no_mangle]
pub unsafe extern "C" fn validate_solution(
    state: *const u8,
    size: i32,
    moves: *const u8,
    n_moves: i32,
) -> i32 {
    if state.is_null() || moves.is_null() || n_moves < 0 || !(size == 4 || size == 5) {
        return 0;
    }
    let n = (size * size) as usize;
    let tiles = std::slice::from_raw_parts(state, n);
    let moves = std::slice::from_raw_parts(moves, n_moves as usize);
    let Some(board) = Board::from_tiles(size as usize, tiles) else {
        return 0;
    };
    i32::from(validate::validate_solution(&board, moves))
}

/// Manhattan distance of the layout at `state`; -1 on illegal input.
///
/// # Safety
/// `state` must point to `size^2` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn get_manhattan(state: *const u8, size: i32) -> i32 {
    if state.is_null() || !(size == 4 || size == 5) {
        return -1;
    }
    let n = (size * size) as usize;
    let tiles = std::slice::from_raw_parts(state, n);
    match Board::from_tiles(size as usize, tiles) {
        Some(board) => board.manhattan() as i32,
        None => -1,
    }
}

/// Stage heuristic for the layout at `state`: the pattern-database depth
/// when one is built and holds the layout, else Manhattan. -1 on illegal
/// input or a stage outside {1, 2}.
///
/// # Safety
/// `state` must point to `size^2` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn get_pdb_heuristic(state: *const u8, size: i32, stage: i32) -> i32 {
    if state.is_null() || !(size == 4 || size == 5) {
        return -1;
    }
    let Some(stage) = Stage::from_index(stage) else {
        return -1;
    };
    let n = (size * size) as usize;
    let tiles = std::slice::from_raw_parts(state, n);
    match Board::from_tiles(size as usize, tiles) {
        Some(board) => heuristic(&board, stage) as i32,
        None => -1,
    }
}

/// Apply `times` random legal blank moves to the layout at `state`,
/// in place. Illegal input is left untouched.
///
/// # Safety
/// `state` must point to `size^2` readable and writable bytes.
#[no_mangle]
pub unsafe extern "C" fn shuffle_state(state: *mut u8, size: i32, times: i32) {
    if state.is_null() || times <= 0 || !(size == 4 || size == 5) {
        return;
    }
    let n = (size * size) as usize;
    let tiles = std::slice::from_raw_parts_mut(state, n);
    let Some(mut board) = Board::from_tiles(size as usize, tiles) else {
        return;
    };
    board.shuffle_thread(times as usize);
    tiles.copy_from_slice(board.cells());
}

/// Build a throwaway pattern database for tiles 1..=ntiles with depth
/// cap 12 and return its entry count; -1 on unusable arguments.
#[no_mangle]
pub extern "C" fn test_pdb_build(size: i32, ntiles: i32) -> i32 {
    if !(size == 4 || size == 5) || ntiles < 0 || ntiles >= size * size {
        return -1;
    }
    catch_unwind(|| PatternDb::build(size as usize, ntiles as usize, 12).len() as i32)
        .unwrap_or(-1)
}

/// Log the layout at `state` as a grid, at debug verbosity.
///
/// # Safety
/// `state` must point to `size^2` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn print_state(state: *const u8, size: i32) {
    if state.is_null() || !(size == 4 || size == 5) {
        return;
    }
    let n = (size * size) as usize;
    let tiles = std::slice::from_raw_parts(state, n);
    if let Some(board) = Board::from_tiles(size as usize, tiles) {
        tracing::debug!("state:\n{board}");
    }
}
