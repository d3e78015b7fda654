use actix_identity::Identity;

use crate::config::Config;
use crate::errors::ServiceError;

/// get the email of the current authenticated session
/// returns Unauthorized when no identity cookie is present
pub fn get_email(id: &Identity) -> Result<String, ServiceError> {
    match id.identity() {
        Some(email) => Ok(email),
        None => Err(ServiceError::Unauthorized),
    }
}

/// returns the caller's email iff it carries the admin capability
pub fn verify_admin(id: &Identity) -> Result<String, ServiceError> {
    let email = get_email(id)?;

    if !Config::is_admin(&email) {
        forbidden!("admin access required");
    }

    Ok(email)
}
