pub mod engine;
pub mod models;
pub mod routes;

pub use models::{Correctness, Pick, PickMessage};
