pub mod helpers;
pub mod routes;

pub use helpers::{get_email, verify_admin};
