//! Polyomino piece definitions
//!
//! The 21 piece shapes, their precomputed orientations (4 rotations times an
//! optional horizontal flip) and the contact cells usable to attach a piece
//! to an open corner on the board.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Piece identifier (index into PIECES)
pub type PieceId = u8;

/// Number of distinct piece shapes
pub const PIECE_COUNT: usize = 21;

pub const O1: PieceId = 0;
pub const I2: PieceId = 1;
pub const L3: PieceId = 2;
pub const I3: PieceId = 3;
pub const I4: PieceId = 4;
pub const L4: PieceId = 5;
pub const Z4: PieceId = 6;
pub const O4: PieceId = 7;
pub const T4: PieceId = 8;
pub const F5: PieceId = 9;
pub const I5: PieceId = 10;
pub const L5: PieceId = 11;
pub const N5: PieceId = 12;
pub const P5: PieceId = 13;
pub const T5: PieceId = 14;
pub const U5: PieceId = 15;
pub const V5: PieceId = 16;
pub const W5: PieceId = 17;
pub const X5: PieceId = 18;
pub const Y5: PieceId = 19;
pub const Z5: PieceId = 20;

/// Piece names, indexed by PieceId
pub const PIECE_NAMES: [&str; PIECE_COUNT] = [
    "O1", "I2", "L3", "I3", "I4", "L4", "Z4", "O4", "T4", "F5", "I5", "L5", "N5", "P5", "T5",
    "U5", "V5", "W5", "X5", "Y5", "Z5",
];

/// Orientation of a piece: four rotations, then the horizontal flip of each
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    North,
    East,
    South,
    West,
    NorthF,
    EastF,
    SouthF,
    WestF,
}

impl Rotation {
    pub const ALL: [Rotation; 8] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
        Rotation::NorthF,
        Rotation::EastF,
        Rotation::SouthF,
        Rotation::WestF,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Rotation::North => "n",
            Rotation::East => "e",
            Rotation::South => "s",
            Rotation::West => "w",
            Rotation::NorthF => "nf",
            Rotation::EastF => "ef",
            Rotation::SouthF => "sf",
            Rotation::WestF => "wf",
        }
    }
}

/// Small boolean grid, row 0 at the bottom
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u8,
    height: u8,
    cells: Vec<bool>,
}

impl Grid {
    /// Build from rows authored top to bottom (stored bottom-up)
    fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len() as u8;
        let width = rows[0].len() as u8;
        let mut cells = vec![false; (width as usize) * (height as usize)];
        for (y, row) in rows.iter().rev().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                cells[y * width as usize + x] = v != 0;
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Cell at (y, x), y counted from the bottom row
    pub fn get(&self, y: u8, x: u8) -> bool {
        y < self.height && x < self.width && self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Filled cell coordinates as (y, x) pairs
    pub fn filled(&self) -> Vec<(u8, u8)> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(y, x) {
                    out.push((y, x));
                }
            }
        }
        out
    }

    /// Quarter turn counterclockwise
    fn rotated_ccw(&self) -> Grid {
        let (width, height) = (self.height, self.width);
        let mut cells = vec![false; (width as usize) * (height as usize)];
        for y in 0..height {
            for x in 0..width {
                cells[y as usize * width as usize + x as usize] = self.get(x, self.width - 1 - y);
            }
        }
        Grid {
            width,
            height,
            cells,
        }
    }

    /// Mirror left-to-right
    fn flipped(&self) -> Grid {
        let mut cells = vec![false; self.cells.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                cells[y as usize * self.width as usize + x as usize] =
                    self.get(y, self.width - 1 - x);
            }
        }
        Grid {
            width: self.width,
            height: self.height,
            cells,
        }
    }

    /// Contact cells: filled cells with at most one orthogonal neighbor, or
    /// exactly one vertical and one horizontal neighbor (corner cells)
    fn contacts(&self) -> Grid {
        let mut cells = vec![false; self.cells.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.get(y, x) {
                    continue;
                }
                let v = (y > 0 && self.get(y - 1, x)) as u8 + self.get(y + 1, x) as u8;
                let h = (x > 0 && self.get(y, x - 1)) as u8 + self.get(y, x + 1) as u8;
                if v + h <= 1 || (v == 1 && h == 1) {
                    cells[y as usize * self.width as usize + x as usize] = true;
                }
            }
        }
        Grid {
            width: self.width,
            height: self.height,
            cells,
        }
    }
}

/// One of the eight orientations of a piece
#[derive(Clone, Debug)]
pub struct Orientation {
    pub shape: Grid,
    pub contacts: Grid,
    /// False when an earlier orientation produces the identical shape
    pub unique: bool,
}

/// A piece shape with all derived orientation data
#[derive(Clone, Debug)]
pub struct Piece {
    pub name: &'static str,
    /// Cell count, which is also the score the piece is worth
    pub score: u32,
    orientations: Vec<Orientation>,
}

impl Piece {
    fn new(name: &'static str, rows: &[&[u8]]) -> Self {
        let base = Grid::from_rows(rows);
        let score = base.filled().len() as u32;

        let mut shapes = Vec::with_capacity(8);
        let mut cur = base;
        for _ in 0..4 {
            shapes.push(cur.clone());
            cur = cur.rotated_ccw();
        }
        for i in 0..4 {
            let flipped = shapes[i].flipped();
            shapes.push(flipped);
        }

        let orientations = shapes
            .iter()
            .enumerate()
            .map(|(i, shape)| Orientation {
                unique: !shapes[..i].contains(shape),
                contacts: shape.contacts(),
                shape: shape.clone(),
            })
            .collect();

        Self {
            name,
            score,
            orientations,
        }
    }

    pub fn orientation(&self, rotation: Rotation) -> &Orientation {
        &self.orientations[rotation.index()]
    }
}

/// All 21 pieces with precomputed orientations
pub static PIECES: LazyLock<Vec<Piece>> = LazyLock::new(|| {
    vec![
        Piece::new("O1", &[&[1]]),
        Piece::new("I2", &[&[1], &[1]]),
        Piece::new("L3", &[&[1, 0], &[1, 1]]),
        Piece::new("I3", &[&[1], &[1], &[1]]),
        Piece::new("I4", &[&[1], &[1], &[1], &[1]]),
        Piece::new("L4", &[&[1, 0], &[1, 0], &[1, 1]]),
        Piece::new("Z4", &[&[1, 1, 0], &[0, 1, 1]]),
        Piece::new("O4", &[&[1, 1], &[1, 1]]),
        Piece::new("T4", &[&[1, 1, 1], &[0, 1, 0]]),
        Piece::new("F5", &[&[0, 1, 1], &[1, 1, 0], &[0, 1, 0]]),
        Piece::new("I5", &[&[1], &[1], &[1], &[1], &[1]]),
        Piece::new("L5", &[&[1, 0], &[1, 0], &[1, 0], &[1, 1]]),
        Piece::new("N5", &[&[0, 1], &[1, 1], &[1, 0], &[1, 0]]),
        Piece::new("P5", &[&[1, 1], &[1, 1], &[1, 0]]),
        Piece::new("T5", &[&[1, 1, 1], &[0, 1, 0], &[0, 1, 0]]),
        Piece::new("U5", &[&[1, 0, 1], &[1, 1, 1]]),
        Piece::new("V5", &[&[0, 0, 1], &[0, 0, 1], &[1, 1, 1]]),
        Piece::new("W5", &[&[0, 0, 1], &[0, 1, 1], &[1, 1, 0]]),
        Piece::new("X5", &[&[0, 1, 0], &[1, 1, 1], &[0, 1, 0]]),
        Piece::new("Y5", &[&[0, 1], &[1, 1], &[0, 1], &[0, 1]]),
        Piece::new("Z5", &[&[1, 1, 0], &[0, 1, 0], &[0, 1, 1]]),
    ]
});

/// Get piece data from its id
pub fn piece(id: PieceId) -> &'static Piece {
    &PIECES[id as usize]
}

/// Get piece id from its name
pub fn piece_by_name(name: &str) -> Option<PieceId> {
    PIECE_NAMES.iter().position(|&n| n == name).map(|i| i as u8)
}
