use std::str::FromStr;

use chess::{Board, ChessMove, Color, Game, Piece, Rank, Square};

use crate::models::MovePayload;

/// A proposed move that has been sent to the server but not yet
/// confirmed by an authoritative snapshot.
struct PendingMove {
    payload: MovePayload,
    predicted: Game,
}

/// The client's local view of the shared game.
///
/// The confirmed state only ever changes in response to server events;
/// an optimistic proposal is tracked separately as a pending move so a
/// divergent authoritative snapshot can be reconciled instead of
/// silently clobbering local guesses.
pub struct BoardMirror {
    role: Option<Color>,
    confirmed: Game,
    pending: Option<PendingMove>,
}

impl Default for BoardMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardMirror {
    pub fn new() -> Self {
        BoardMirror {
            role: None,
            confirmed: Game::new(),
            pending: None,
        }
    }

    /// Role receipt: `Some(color)` for a seated player, `None` for a
    /// spectator.
    pub fn set_role(&mut self, role: Option<Color>) {
        self.role = role;
    }

    pub fn role(&self) -> Option<Color> {
        self.role
    }

    /// Black players see the board flipped so their pieces render at
    /// the bottom.
    pub fn flipped(&self) -> bool {
        self.role == Some(Color::Black)
    }

    /// The position to render: the optimistic prediction while a
    /// proposal is in flight, the confirmed state otherwise.
    pub fn view(&self) -> Board {
        match &self.pending {
            Some(pending) => pending.predicted.current_position(),
            None => self.confirmed.current_position(),
        }
    }

    pub fn fen(&self) -> String {
        self.view().to_string()
    }

    pub fn confirmed_fen(&self) -> String {
        self.confirmed.current_position().to_string()
    }

    pub fn pending_move(&self) -> Option<&MovePayload> {
        self.pending.as_ref().map(|p| &p.payload)
    }

    /// Whether the piece on `square` may be picked up as a move source.
    pub fn can_select(&self, square: Square) -> bool {
        match self.role {
            Some(color) => self.view().color_on(square) == Some(color),
            None => false,
        }
    }

    /// Captures a move intent. Returns the payload to submit when the
    /// local rules mirror accepts the move; an intent the mirror itself
    /// rejects produces no submission and no error. A successful
    /// proposal replaces any earlier unconfirmed one.
    pub fn propose(&mut self, from: Square, to: Square) -> Option<MovePayload> {
        let role = self.role?;
        if self.confirmed.side_to_move() != role {
            return None;
        }
        let board = self.confirmed.current_position();
        if board.color_on(from) != Some(role) {
            return None;
        }

        // Promotion is always auto-selected to the strongest piece.
        let promotion = if board.piece_on(from) == Some(Piece::Pawn)
            && matches!(to.get_rank(), Rank::First | Rank::Eighth)
        {
            Some(Piece::Queen)
        } else {
            None
        };

        let mut predicted = self.confirmed.clone();
        if !predicted.make_move(ChessMove::new(from, to, promotion)) {
            return None;
        }

        let payload = MovePayload {
            from: from.to_string(),
            to: to.to_string(),
            promotion: promotion.map(|_| "q".to_string()),
        };
        self.pending = Some(PendingMove {
            payload: payload.clone(),
            predicted,
        });
        Some(payload)
    }

    /// Move broadcast receipt: applies the move to the confirmed state.
    /// The client's own echoed move lands here too; it clears the
    /// matching pending proposal instead of double-applying.
    pub fn apply_move(&mut self, payload: &MovePayload) -> bool {
        let (Ok(from), Ok(to)) = (
            Square::from_str(&payload.from),
            Square::from_str(&payload.to),
        ) else {
            return false;
        };

        let board = self.confirmed.current_position();
        let promotion = if board.piece_on(from) == Some(Piece::Pawn)
            && matches!(to.get_rank(), Rank::First | Rank::Eighth)
        {
            Some(Piece::Queen)
        } else {
            None
        };

        if !self.confirmed.make_move(ChessMove::new(from, to, promotion)) {
            return false;
        }
        if let Some(pending) = &self.pending {
            if pending.payload.from == payload.from && pending.payload.to == payload.to {
                self.pending = None;
            }
        }
        true
    }

    /// Full-state receipt: reconcile the authoritative snapshot against
    /// the pending proposal. A snapshot matching the prediction confirms
    /// it; anything else wins outright and the proposal is dropped.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), chess::Error> {
        let board = Board::from_str(fen)?;

        if let Some(pending) = self.pending.take() {
            if pending.predicted.current_position() == board {
                self.confirmed = pending.predicted;
                return Ok(());
            }
        }
        self.confirmed = Game::new_with_board(board);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_str(name).unwrap()
    }

    fn seated(color: Color) -> BoardMirror {
        let mut mirror = BoardMirror::new();
        mirror.set_role(Some(color));
        mirror
    }

    #[test]
    fn spectators_cannot_select_or_propose() {
        let mut mirror = BoardMirror::new();
        assert!(!mirror.can_select(sq("e2")));
        assert_eq!(mirror.propose(sq("e2"), sq("e4")), None);
    }

    #[test]
    fn only_own_pieces_are_selectable() {
        let mirror = seated(Color::White);
        assert!(mirror.can_select(sq("e2")));
        assert!(!mirror.can_select(sq("e7")));
        assert!(!mirror.can_select(sq("e4")));
    }

    #[test]
    fn black_role_flips_the_board() {
        assert!(seated(Color::Black).flipped());
        assert!(!seated(Color::White).flipped());
        assert!(!BoardMirror::new().flipped());
    }

    #[test]
    fn legal_proposal_is_optimistic_but_not_confirmed() {
        let mut mirror = seated(Color::White);
        let baseline = mirror.confirmed_fen();

        let payload = mirror.propose(sq("e2"), sq("e4")).unwrap();
        assert_eq!(payload, MovePayload::new("e2", "e4"));
        assert_eq!(mirror.pending_move(), Some(&payload));

        // The rendered view shows the pawn on e4, the confirmed state
        // does not.
        assert!(mirror.fen().contains("4P3"));
        assert_eq!(mirror.confirmed_fen(), baseline);
    }

    #[test]
    fn locally_illegal_intents_produce_no_submission() {
        let mut mirror = seated(Color::White);
        assert_eq!(mirror.propose(sq("e2"), sq("e5")), None);
        assert_eq!(mirror.propose(sq("e7"), sq("e5")), None);
        assert!(mirror.pending_move().is_none());
    }

    #[test]
    fn out_of_turn_proposals_are_refused_locally() {
        let mut mirror = seated(Color::Black);
        assert_eq!(mirror.propose(sq("e7"), sq("e5")), None);
    }

    #[test]
    fn echoed_move_clears_the_pending_proposal() {
        let mut mirror = seated(Color::White);
        let payload = mirror.propose(sq("e2"), sq("e4")).unwrap();

        assert!(mirror.apply_move(&payload));
        assert!(mirror.pending_move().is_none());
        assert!(mirror.confirmed_fen().contains("4P3"));
    }

    #[test]
    fn matching_snapshot_confirms_the_prediction() {
        let mut mirror = seated(Color::White);
        mirror.propose(sq("e2"), sq("e4")).unwrap();
        let predicted = mirror.fen();

        mirror.load_fen(&predicted).unwrap();
        assert!(mirror.pending_move().is_none());
        assert_eq!(mirror.confirmed_fen(), predicted);
    }

    #[test]
    fn divergent_snapshot_discards_the_prediction() {
        let mut mirror = seated(Color::White);
        mirror.propose(sq("e2"), sq("e4")).unwrap();

        // The server says something else happened entirely.
        let mut authoritative = Game::new();
        authoritative.make_move(ChessMove::new(sq("d2"), sq("d4"), None));
        let snapshot = authoritative.current_position().to_string();

        mirror.load_fen(&snapshot).unwrap();
        assert!(mirror.pending_move().is_none());
        assert_eq!(mirror.confirmed_fen(), snapshot);
        assert_eq!(mirror.fen(), snapshot);
    }

    #[test]
    fn opponent_moves_apply_to_the_confirmed_state() {
        let mut mirror = seated(Color::Black);
        assert!(mirror.apply_move(&MovePayload::new("e2", "e4")));
        assert!(mirror.confirmed_fen().contains("4P3"));
        // Garbage squares are ignored.
        assert!(!mirror.apply_move(&MovePayload::new("zz", "e4")));
    }

    #[test]
    fn promotion_auto_selects_queen() {
        let mut mirror = seated(Color::White);
        mirror.load_fen("k7/4P3/8/8/8/8/8/K7 w - - 0 1").unwrap();

        let payload = mirror.propose(sq("e7"), sq("e8")).unwrap();
        assert_eq!(payload.promotion.as_deref(), Some("q"));
        assert!(mirror.fen().starts_with("k3Q3/"));
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        let mut mirror = BoardMirror::new();
        assert!(mirror.load_fen("not a fen").is_err());
    }
}
