pub mod models;
pub mod routes;

pub use models::{CreatePool, Pool};
