//! Headless core of the board client: the local rules mirror with
//! optimistic pending-move tracking, and the keyboard square cursor.
//! The browser shell in `static/js/chessgame.js` follows the same
//! protocol.

pub mod cursor;
pub mod mirror;

pub use cursor::SquareCursor;
pub use mirror::BoardMirror;
