use rand::Rng;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::validate;

/// Largest supported board edge.
pub const MAX_SIZE: usize = 5;
/// Cell count of the largest supported board.
pub const MAX_CELLS: usize = MAX_SIZE * MAX_SIZE;

// Row/column deltas for the four orthogonal blank moves.
const DIRS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// An NxN sliding-tile board (N in {4, 5}) as a compact `Copy` value.
///
/// Tiles are stored row-major; 0 is the blank, 1..N^2-1 are the numbered
/// tiles. Cells past `size^2` stay zero so that equality and hashing over the
/// live prefix are well defined. `blank` always equals the index of the 0.
///
/// ```
/// use slide_solver::board::Board;
///
/// let board = Board::solved(4);
/// assert!(board.is_solved());
/// assert_eq!(board.blank_index(), 15);
/// ```
#[derive(Clone, Copy)]
pub struct Board {
    tiles: [u8; MAX_CELLS],
    size: u8,
    blank: u8,
}

impl Board {
    /// The goal layout: 1..size^2-1 in row-major order, blank in the last cell.
    pub fn solved(size: usize) -> Self {
        assert!(size == 4 || size == 5, "unsupported board size {size}");
        let n = size * size;
        let mut tiles = [0u8; MAX_CELLS];
        for (i, slot) in tiles.iter_mut().enumerate().take(n - 1) {
            *slot = (i + 1) as u8;
        }
        Board { tiles, size: size as u8, blank: (n - 1) as u8 }
    }

    /// Construct from a row-major byte slice of length `size^2`.
    ///
    /// Returns `None` unless the size is supported and the bytes are a
    /// permutation of 0..size^2-1.
    ///
    /// ```
    /// use slide_solver::board::Board;
    ///
    /// assert!(Board::from_tiles(4, &[1, 2, 2, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 0]).is_none());
    /// let board = Board::from_tiles(4, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 0, 15]).unwrap();
    /// assert_eq!(board.blank_index(), 14);
    /// ```
    pub fn from_tiles(size: usize, tiles: &[u8]) -> Option<Self> {
        if size != 4 && size != 5 {
            return None;
        }
        if !validate::is_permutation(size, tiles) {
            return None;
        }
        let mut cells = [0u8; MAX_CELLS];
        cells[..tiles.len()].copy_from_slice(tiles);
        let blank = tiles.iter().position(|&t| t == 0)?;
        Some(Board { tiles: cells, size: size as u8, blank: blank as u8 })
    }

    /// Board edge length.
    #[inline]
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Number of live cells (`size^2`).
    #[inline]
    pub fn cell_count(&self) -> usize {
        (self.size as usize) * (self.size as usize)
    }

    /// The row-major tile bytes of the live cells.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.tiles[..self.cell_count()]
    }

    /// Index of the blank cell.
    #[inline]
    pub fn blank_index(&self) -> usize {
        self.blank as usize
    }

    /// Tile value at a cell index.
    #[inline]
    pub fn tile_at(&self, cell: usize) -> u8 {
        debug_assert!(cell < self.cell_count());
        self.tiles[cell]
    }

    /// Cell index currently holding `tile`, if the value is on the board.
    pub fn position_of(&self, tile: u8) -> Option<usize> {
        self.cells().iter().position(|&t| t == tile)
    }

    /// True iff every tile sits in its goal cell and the blank is last.
    pub fn is_solved(&self) -> bool {
        let n = self.cell_count();
        self.tiles[..n - 1].iter().enumerate().all(|(i, &t)| t as usize == i + 1)
            && self.tiles[n - 1] == 0
    }

    /// Cell indices orthogonally adjacent to the blank (2 to 4 of them).
    pub fn blank_neighbors(&self) -> impl Iterator<Item = usize> {
        let sz = self.size as i32;
        let r = self.blank as i32 / sz;
        let c = self.blank as i32 % sz;
        DIRS.into_iter().filter_map(move |(dr, dc)| {
            let (nr, nc) = (r + dr, c + dc);
            if nr < 0 || nr >= sz || nc < 0 || nc >= sz {
                None
            } else {
                Some((nr * sz + nc) as usize)
            }
        })
    }

    /// Board after sliding the tile at `cell` into the blank.
    ///
    /// `cell` must be orthogonally adjacent to the blank.
    pub fn child(&self, cell: usize) -> Self {
        debug_assert!(
            self.blank_neighbors().any(|n| n == cell),
            "cell {cell} is not adjacent to the blank"
        );
        let mut next = *self;
        next.tiles.swap(self.blank as usize, cell);
        next.blank = cell as u8;
        next
    }

    /// Slide the tile with value `tile` into the blank, wherever it sits.
    ///
    /// This is the playback primitive: a recorded move names the tile, not a
    /// direction, so replay needs no knowledge of the blank's position.
    /// Returns false (board untouched) when the value is not on the board.
    pub fn apply_tile_move(&mut self, tile: u8) -> bool {
        let Some(from) = self.position_of(tile) else {
            return false;
        };
        self.tiles.swap(self.blank as usize, from);
        self.blank = from as u8;
        true
    }

    /// Sum over non-blank tiles of row + column distance to the goal cell.
    ///
    /// Zero exactly on the solved board.
    pub fn manhattan(&self) -> u32 {
        let sz = self.size as usize;
        let mut dist = 0u32;
        for (i, &v) in self.cells().iter().enumerate() {
            if v == 0 {
                continue;
            }
            let goal = (v - 1) as usize;
            dist += (i / sz).abs_diff(goal / sz) as u32;
            dist += (i % sz).abs_diff(goal % sz) as u32;
        }
        dist
    }

    /// The layout rotated 90 deg clockwise.
    pub fn rotate90(&self) -> Self {
        let sz = self.size as usize;
        let mut tiles = [0u8; MAX_CELLS];
        for r in 0..sz {
            for c in 0..sz {
                tiles[c * sz + (sz - 1 - r)] = self.tiles[r * sz + c];
            }
        }
        let (br, bc) = (self.blank as usize / sz, self.blank as usize % sz);
        Board { tiles, size: self.size, blank: (bc * sz + (sz - 1 - br)) as u8 }
    }

    /// The layout mirrored left-to-right.
    pub fn reflect_h(&self) -> Self {
        let sz = self.size as usize;
        let mut tiles = [0u8; MAX_CELLS];
        for r in 0..sz {
            for c in 0..sz {
                tiles[r * sz + (sz - 1 - c)] = self.tiles[r * sz + c];
            }
        }
        let (br, bc) = (self.blank as usize / sz, self.blank as usize % sz);
        Board { tiles, size: self.size, blank: (br * sz + (sz - 1 - bc)) as u8 }
    }

    /// The eight symmetry images: identity, three successive 90 deg rotations,
    /// and the horizontal reflection of each.
    ///
    /// A rotated layout is not an equivalent puzzle in general (tile goals do
    /// not rotate with the grid); the searcher uses these only to prune
    /// within one iteration's transposition scope.
    pub fn symmetries(&self) -> [Self; 8] {
        let r90 = self.rotate90();
        let r180 = r90.rotate90();
        let r270 = r180.rotate90();
        [
            *self,
            r90,
            r180,
            r270,
            self.reflect_h(),
            r90.reflect_h(),
            r180.reflect_h(),
            r270.reflect_h(),
        ]
    }

    /// Apply `times` uniformly random legal blank moves, using the provided RNG.
    ///
    /// Deterministic example with a seeded RNG:
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use slide_solver::board::Board;
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let mut board = Board::solved(4);
    /// board.shuffle(10, &mut rng);
    /// assert_eq!(board.blank_index(), board.position_of(0).unwrap());
    /// ```
    pub fn shuffle<R: Rng + ?Sized>(&mut self, times: usize, rng: &mut R) {
        for _ in 0..times {
            let mut options = [0usize; 4];
            let mut count = 0;
            for cell in self.blank_neighbors() {
                options[count] = cell;
                count += 1;
            }
            *self = self.child(options[rng.gen_range(0..count)]);
        }
    }

    /// Convenience: like `shuffle` but uses the thread-local RNG.
    pub fn shuffle_thread(&mut self, times: usize) {
        let mut rng = rand::thread_rng();
        self.shuffle(times, &mut rng);
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.cells() == other.cells()
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cells().hash(state);
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({}x{}, {:?})", self.size, self.size, self.cells())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sz = self.size as usize;
        for r in 0..sz {
            for c in 0..sz {
                if c > 0 {
                    write!(f, " ")?;
                }
                match self.tiles[r * sz + c] {
                    0 => write!(f, "{:>2}", "_")?,
                    v => write!(f, "{v:>2}")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
