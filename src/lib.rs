pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use db::{create_pool, MatchStore, PgMatchStore};
pub use error::MatchError;
pub use service::{score_lost_vs_found, Caller, MatchService, Role};
