//! Tessera Core - Game rules for the polyomino placement game
//!
//! This crate provides the core game logic:
//! - The 21 polyomino pieces with precomputed orientations and contact cells
//! - Board state, legal-move generation and rule enforcement
//! - Scoring and winner determination

pub mod board;
pub mod pieces;

// Re-exports for convenient access
pub use board::{Board, Move, RuleError, Tile, BOARD_WIDTH, MAX_PLAYERS, TILE_COUNT};
pub use pieces::{piece, piece_by_name, PieceId, Rotation, PIECES, PIECE_COUNT, PIECE_NAMES};
