use std::str::FromStr;

use chess::{ChessMove, Color, Game, Piece, Rank, Square};
use thiserror::Error;
use uuid::Uuid;

use crate::models::MovePayload;

/// One playing side, either free or held by a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Seat {
    #[default]
    Empty,
    Occupied(Uuid),
}

impl Seat {
    pub fn occupant(&self) -> Option<Uuid> {
        match *self {
            Seat::Empty => None,
            Seat::Occupied(id) => Some(id),
        }
    }

    /// Frees the seat if `id` holds it. Returns whether it did.
    fn vacate(&mut self, id: Uuid) -> bool {
        if *self == Seat::Occupied(id) {
            *self = Seat::Empty;
            true
        } else {
            false
        }
    }
}

/// The two playing seats. Filled in arrival order, white first; a
/// connection holds at most one seat.
#[derive(Debug, Default)]
pub struct SeatTable {
    white: Seat,
    black: Seat,
}

impl SeatTable {
    /// Seats `id` on the first free side, or returns `None` when both
    /// seats are taken. Re-seating an id that already holds a seat just
    /// reports the seat it holds.
    pub fn occupy(&mut self, id: Uuid) -> Option<Color> {
        if let Some(color) = self.seat_of(id) {
            return Some(color);
        }
        if self.white == Seat::Empty {
            self.white = Seat::Occupied(id);
            Some(Color::White)
        } else if self.black == Seat::Empty {
            self.black = Seat::Occupied(id);
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Frees whichever seat `id` holds, if any.
    pub fn release(&mut self, id: Uuid) -> Option<Color> {
        if self.white.vacate(id) {
            Some(Color::White)
        } else if self.black.vacate(id) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn seat_of(&self, id: Uuid) -> Option<Color> {
        if self.white.occupant() == Some(id) {
            Some(Color::White)
        } else if self.black.occupant() == Some(id) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn occupant(&self, color: Color) -> Option<Uuid> {
        match color {
            Color::White => self.white.occupant(),
            Color::Black => self.black.occupant(),
        }
    }
}

/// What a freshly connected client is told it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleGrant {
    Player(Color),
    /// Spectators get an immediate snapshot so they can render without
    /// waiting for the next move.
    Spectator { fen: String },
}

/// A move proposal that could not even be handed to the rules engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("unrecognized square {0:?}")]
    BadSquare(String),
    #[error("unrecognized promotion piece {0:?}")]
    BadPromotion(String),
}

/// Outcome of a well-formed move proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The proposer does not hold the seat whose turn it is. Dropped
    /// without any reply.
    OutOfTurn,
    /// Illegal per the rules engine; state untouched.
    Rejected,
    /// Applied to the shared game. `winner` is set when the game ended
    /// on this move and names the side that just moved.
    Applied { fen: String, winner: Option<String> },
}

/// The single authoritative game plus its seat table. Every handler
/// receives this as explicit context; nothing lives in module globals.
pub struct GameSession {
    game: Game,
    seats: SeatTable,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        GameSession {
            game: Game::new(),
            seats: SeatTable::default(),
        }
    }

    pub fn fen(&self) -> String {
        self.game.current_position().to_string()
    }

    pub fn seat_of(&self, id: Uuid) -> Option<Color> {
        self.seats.seat_of(id)
    }

    pub fn connect(&mut self, id: Uuid) -> RoleGrant {
        match self.seats.occupy(id) {
            Some(color) => RoleGrant::Player(color),
            None => RoleGrant::Spectator { fen: self.fen() },
        }
    }

    /// Releases the seat `id` held, if any. The position is untouched;
    /// the freed seat goes to the next new connection.
    pub fn disconnect(&mut self, id: Uuid) -> Option<Color> {
        self.seats.release(id)
    }

    /// Validates and applies a move proposal from connection `id`.
    ///
    /// Turn ownership is decided by comparing `id` against the seat
    /// occupant for the side to move, never against anything the client
    /// claims about itself.
    pub fn try_move(&mut self, id: Uuid, payload: &MovePayload) -> Result<MoveOutcome, MoveError> {
        let turn = self.game.side_to_move();
        if self.seats.occupant(turn) != Some(id) {
            return Ok(MoveOutcome::OutOfTurn);
        }

        let from = parse_square(&payload.from)?;
        let to = parse_square(&payload.to)?;
        let promotion = self.promotion_for(from, to, payload.promotion.as_deref())?;

        if !self.game.make_move(ChessMove::new(from, to, promotion)) {
            return Ok(MoveOutcome::Rejected);
        }

        // Repetition and fifty-move endings only show up in `result()`
        // once declared.
        if self.game.can_declare_draw() {
            self.game.declare_draw();
        }

        // After the mutation the turn has flipped to the loser, so the
        // winner is the side NOT to move.
        let winner = if self.game.result().is_some() {
            Some(match self.game.side_to_move() {
                Color::White => "Black wins".to_string(),
                Color::Black => "White wins".to_string(),
            })
        } else {
            None
        };

        Ok(MoveOutcome::Applied {
            fen: self.fen(),
            winner,
        })
    }

    /// The wire payload always carries `promotion: "q"`; it only becomes
    /// part of the move when a pawn actually reaches the back rank.
    fn promotion_for(
        &self,
        from: Square,
        to: Square,
        code: Option<&str>,
    ) -> Result<Option<Piece>, MoveError> {
        let board = self.game.current_position();
        let promoting = board.piece_on(from) == Some(Piece::Pawn)
            && matches!(to.get_rank(), Rank::First | Rank::Eighth);
        if !promoting {
            return Ok(None);
        }
        match code.unwrap_or("q") {
            "q" => Ok(Some(Piece::Queen)),
            "r" => Ok(Some(Piece::Rook)),
            "b" => Ok(Some(Piece::Bishop)),
            "n" => Ok(Some(Piece::Knight)),
            other => Err(MoveError::BadPromotion(other.to_string())),
        }
    }
}

fn parse_square(s: &str) -> Result<Square, MoveError> {
    Square::from_str(&s.to_lowercase()).map_err(|_| MoveError::BadSquare(s.to_string()))
}
