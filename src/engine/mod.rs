pub mod board;
pub mod rules;
pub mod session;
pub mod types;

pub use board::Board;
pub use rules::{IllegalMove, is_legal, legal_destinations};
pub use session::{MoveRecord, Rejection, Roles, Selection, Session, SessionEvent, SessionState};
pub use types::*;
