pub mod matcher;
pub mod scorer;

pub use matcher::{Caller, MatchService, Role};
pub use scorer::score_lost_vs_found;
