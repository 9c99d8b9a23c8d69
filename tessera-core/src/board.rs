//! Board state, move generation and rule enforcement

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pieces::{piece, PieceId, Rotation, PIECE_COUNT, PIECE_NAMES};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Board edge length
pub const BOARD_WIDTH: usize = 20;

/// Total tile count
pub const TILE_COUNT: usize = BOARD_WIDTH * BOARD_WIDTH;

/// Maximum number of players in one game
pub const MAX_PLAYERS: usize = 4;

/// Single-letter player glyphs used by the board display
const PLAYER_GLYPHS: [char; MAX_PLAYERS] = ['B', 'Y', 'R', 'G'];

// ============================================================================
// CORE TYPES
// ============================================================================

/// A tile index, row-major from the bottom-left corner (`a1` = 0, `t20` = 399)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile(pub u16);

impl Tile {
    pub const fn from_coords(y: u8, x: u8) -> Self {
        Tile(y as u16 * BOARD_WIDTH as u16 + x as u16)
    }

    /// (y, x) with the origin at the bottom-left
    pub const fn coords(self) -> (u8, u8) {
        (
            (self.0 / BOARD_WIDTH as u16) as u8,
            (self.0 % BOARD_WIDTH as u16) as u8,
        )
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (y, x) = self.coords();
        write!(f, "{}{}", (b'a' + x) as char, y as u16 + 1)
    }
}

/// A piece placement: the contact cell of the rotated piece lands on `to`
///
/// `contact` is expressed in tile notation but addresses a cell inside the
/// piece grid, not a board square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub piece: PieceId,
    pub rotation: Rotation,
    pub contact: Tile,
    pub to: Tile,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}-{}{}",
            PIECE_NAMES[self.piece as usize],
            self.rotation.label(),
            self.contact,
            self.to
        )
    }
}

/// Rule violations surfaced by the board
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("player count must be 1 to {MAX_PLAYERS}, got {0}")]
    InvalidPlayerCount(usize),
    #[error("game is already finished")]
    GameFinished,
    #[error("illegal move {0}")]
    IllegalMove(Move),
}

/// Per-player bookkeeping
#[derive(Clone, Debug, Serialize, Deserialize)]
struct PlayerState {
    /// Pieces still in hand
    rack: Vec<bool>,
    score: u32,
    /// Tiles this player may cover: empty and not edge-adjacent to own cells
    legal: Vec<bool>,
    /// Tiles diagonally touching own cells, restricted to legal tiles
    corners: Vec<bool>,
    can_play: bool,
    has_played: bool,
}

impl PlayerState {
    fn new() -> Self {
        Self {
            rack: vec![true; PIECE_COUNT],
            score: 0,
            legal: vec![true; TILE_COUNT],
            corners: vec![false; TILE_COUNT],
            can_play: true,
            has_played: false,
        }
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Game state (clone to mutate speculatively)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Board {
    /// 0 = empty, otherwise player index + 1
    cells: Vec<u8>,
    players: Vec<PlayerState>,
    current: usize,
    ply: u32,
    finished: bool,
    /// Board corners still available as a starting square
    open_corners: Vec<bool>,
}

impl Board {
    /// Fresh position for 1 to 4 players
    pub fn new(n_players: usize) -> Result<Self, RuleError> {
        if n_players < 1 || n_players > MAX_PLAYERS {
            return Err(RuleError::InvalidPlayerCount(n_players));
        }
        let mut open_corners = vec![false; TILE_COUNT];
        let edge = (BOARD_WIDTH - 1) as u8;
        for tile in [
            Tile::from_coords(0, 0),
            Tile::from_coords(0, edge),
            Tile::from_coords(edge, 0),
            Tile::from_coords(edge, edge),
        ] {
            open_corners[tile.index()] = true;
        }
        Ok(Self {
            cells: vec![0; TILE_COUNT],
            players: (0..n_players).map(|_| PlayerState::new()).collect(),
            current: 0,
            ply: 0,
            finished: false,
            open_corners,
        })
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Seat index whose turn it is
    pub fn current_player(&self) -> usize {
        self.current
    }

    pub fn ply(&self) -> u32 {
        self.ply
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn score(&self, player: usize) -> u32 {
        self.players[player].score
    }

    pub fn scores(&self) -> Vec<u32> {
        self.players.iter().map(|p| p.score).collect()
    }

    /// Number of open corner tiles the player could attach a piece to
    pub fn corner_count(&self, player: usize) -> usize {
        let p = &self.players[player];
        if p.has_played {
            p.corners.iter().filter(|&&c| c).count()
        } else {
            self.open_corners.iter().filter(|&&c| c).count()
        }
    }

    /// All seats sharing the highest score; None while the game is running
    pub fn winners(&self) -> Option<Vec<usize>> {
        if !self.finished {
            return None;
        }
        let best = self.players.iter().map(|p| p.score).max().unwrap_or(0);
        Some(
            (0..self.players.len())
                .filter(|&i| self.players[i].score == best)
                .collect(),
        )
    }

    /// Whether the move is legal for the player to move
    pub fn is_legal(&self, mv: Move) -> bool {
        self.is_legal_for(mv, self.current)
    }

    /// Whether the move would be legal for the given seat
    pub fn is_legal_for(&self, mv: Move, player: usize) -> bool {
        if self.finished || mv.piece as usize >= PIECE_COUNT {
            return false;
        }
        let state = &self.players[player];
        if !state.rack[mv.piece as usize] {
            return false;
        }

        // First move must cover a board corner, later moves one of the
        // player's own diagonal openings
        let diags = if state.has_played {
            &state.corners
        } else {
            &self.open_corners
        };
        if mv.to.index() >= TILE_COUNT || !diags[mv.to.index()] {
            return false;
        }

        let orientation = piece(mv.piece).orientation(mv.rotation);
        let shape = &orientation.shape;
        let (cy, cx) = mv.contact.coords();
        if cy >= shape.height() || cx >= shape.width() || !orientation.contacts.get(cy, cx) {
            return false;
        }

        // The whole piece must stay on the board once the contact cell is
        // pinned to the destination tile
        let (y, x) = mv.to.coords();
        let (y, x) = (y as i16, x as i16);
        let north = (shape.height() - 1 - cy) as i16;
        let east = (shape.width() - 1 - cx) as i16;
        if y + north >= BOARD_WIDTH as i16
            || y - (cy as i16) < 0
            || x + east >= BOARD_WIDTH as i16
            || x - (cx as i16) < 0
        {
            return false;
        }

        // Every covered tile must be empty and clear of the player's own
        // edge-adjacent cells
        let (oy, ox) = ((y - cy as i16) as u8, (x - cx as i16) as u8);
        for (sy, sx) in shape.filled() {
            let tile = Tile::from_coords(oy + sy, ox + sx);
            if self.cells[tile.index()] != 0 || !state.legal[tile.index()] {
                return false;
            }
        }

        true
    }

    /// Legal moves for the player to move
    pub fn legal_moves(&self, unique: bool) -> Vec<Move> {
        self.legal_moves_for(self.current, unique)
    }

    /// Legal moves for the given seat
    ///
    /// With `unique` set, orientations that duplicate an earlier rotation of
    /// the same piece are skipped.
    pub fn legal_moves_for(&self, player: usize, unique: bool) -> Vec<Move> {
        if self.finished || !self.players[player].can_play {
            return Vec::new();
        }
        let state = &self.players[player];
        let diags = if state.has_played {
            &state.corners
        } else {
            &self.open_corners
        };

        let mut out = Vec::new();
        for to in (0..TILE_COUNT).filter(|&t| diags[t]) {
            for piece_id in 0..PIECE_COUNT {
                if !state.rack[piece_id] {
                    continue;
                }
                for rotation in Rotation::ALL {
                    let orientation = piece(piece_id as PieceId).orientation(rotation);
                    if unique && !orientation.unique {
                        continue;
                    }
                    for (cy, cx) in orientation.contacts.filled() {
                        let mv = Move {
                            piece: piece_id as PieceId,
                            rotation,
                            contact: Tile::from_coords(cy, cx),
                            to: Tile(to as u16),
                        };
                        if self.is_legal_for(mv, player) {
                            out.push(mv);
                        }
                    }
                }
            }
        }
        out
    }

    /// Apply a move for the player to move, then advance the turn, skipping
    /// seats with no legal reply; the game finishes when nobody can play
    pub fn push(&mut self, mv: Move) -> Result<(), RuleError> {
        if self.finished {
            return Err(RuleError::GameFinished);
        }
        if !self.is_legal(mv) {
            return Err(RuleError::IllegalMove(mv));
        }

        let data = piece(mv.piece);
        let shape = &data.orientation(mv.rotation).shape;
        let (cy, cx) = mv.contact.coords();
        let (ty, tx) = mv.to.coords();
        let (oy, ox) = (ty - cy, tx - cx);

        {
            let state = &mut self.players[self.current];
            state.rack[mv.piece as usize] = false;
            state.score += data.score;
            state.has_played = true;
        }
        for (sy, sx) in shape.filled() {
            self.cells[Tile::from_coords(oy + sy, ox + sx).index()] = self.current as u8 + 1;
        }
        self.open_corners[mv.to.index()] = false;

        self.refresh_masks();

        // Advance the turn; if we cycle all the way back without finding a
        // seat that can move, the game is over
        self.ply += 1;
        let mover = self.current;
        loop {
            self.current = (self.current + 1) % self.players.len();
            if self.players[self.current].can_play {
                break;
            }
            if self.current == mover {
                self.finished = true;
                break;
            }
        }

        Ok(())
    }

    /// Recompute each live player's legal and corner masks from the cells
    fn refresh_masks(&mut self) {
        for p in 0..self.players.len() {
            if !self.players[p].can_play {
                continue;
            }
            let own = p as u8 + 1;
            let mut legal = vec![false; TILE_COUNT];
            let mut corners = vec![false; TILE_COUNT];
            for y in 0..BOARD_WIDTH as i16 {
                for x in 0..BOARD_WIDTH as i16 {
                    let tile = Tile::from_coords(y as u8, x as u8);
                    if self.cells[tile.index()] != 0 {
                        continue;
                    }
                    let at = |yy: i16, xx: i16| {
                        yy >= 0
                            && yy < BOARD_WIDTH as i16
                            && xx >= 0
                            && xx < BOARD_WIDTH as i16
                            && self.cells[Tile::from_coords(yy as u8, xx as u8).index()] == own
                    };
                    let edge_adjacent =
                        at(y - 1, x) || at(y + 1, x) || at(y, x - 1) || at(y, x + 1);
                    if edge_adjacent {
                        continue;
                    }
                    legal[tile.index()] = true;
                    if at(y - 1, x - 1) || at(y - 1, x + 1) || at(y + 1, x - 1) || at(y + 1, x + 1)
                    {
                        corners[tile.index()] = true;
                    }
                }
            }
            self.players[p].legal = legal;
            self.players[p].corners = corners;
            self.players[p].can_play = !self.legal_moves_for(p, true).is_empty();
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..BOARD_WIDTH).rev() {
            for x in 0..BOARD_WIDTH {
                let cell = self.cells[Tile::from_coords(y as u8, x as u8).index()];
                let glyph = match cell {
                    0 => '.',
                    n => PLAYER_GLYPHS[n as usize - 1],
                };
                write!(f, "{} ", glyph)?;
            }
            writeln!(f)?;
        }
        for (i, p) in self.players.iter().enumerate() {
            write!(f, "{}: {}", PLAYER_GLYPHS[i], p.score)?;
            let held: Vec<&str> = p
                .rack
                .iter()
                .enumerate()
                .filter(|(_, &h)| h)
                .map(|(id, _)| PIECE_NAMES[id])
                .collect();
            if !held.is_empty() {
                write!(f, " ( {} )", held.join(" "))?;
            }
            writeln!(f)?;
        }
        write!(f, "Finished: {}", self.finished)?;
        if self.finished {
            write!(f, "\nWinner:")?;
            for w in self.winners().unwrap_or_default() {
                write!(f, " {}", PLAYER_GLYPHS[w])?;
            }
            Ok(())
        } else {
            write!(f, "\nTurn: {}", PLAYER_GLYPHS[self.current])
        }
    }
}
