pub mod handlers;

pub use handlers::{
    export_matches, health_check, potential_owners, seed_found, seed_lost, suggest_matches,
};
