//! Desktop input mapped to camera actions.
//!
//! The frame loop and camera consume [`Action`]s and per-frame held
//! directions, never raw window events.
//!
//! # Invariants
//! - The first cursor sample after (re)capture never produces a look delta.
//! - Held directions are reported in a fixed order so frame results do not
//!   depend on key press order.

pub mod action;
pub mod cursor;

pub use action::{Action, HeldMoves, MoveDirection};
pub use cursor::CursorTracker;
