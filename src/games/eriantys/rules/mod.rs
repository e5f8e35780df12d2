//! Game rules for Eriantys.
//!
//! Pure functions and resolvers evaluated by the session controller:
//! island control, professor control, turn order, priority-card legality
//! and the end of the game.

pub mod influence;
pub mod order;
pub mod priority;
pub mod professors;
pub mod win;

pub use influence::{Resolution, influence};
pub use order::sort_by_priority;
pub use priority::is_playable;
pub use professors::professor_holder;
pub use win::{EndReason, Outcome, Termination, check_end, resolve_winner};
