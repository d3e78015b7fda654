pub mod models;
pub mod routes;

pub use models::{Player, RosterMessage};
