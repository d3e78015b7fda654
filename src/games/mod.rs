pub mod models;
pub mod routes;

pub use models::{CreateGame, Game, GameFilter, WinnerMessage, MAX_WEEK};
