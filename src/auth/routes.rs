use actix_identity::Identity;
use actix_web::http::StatusCode;
use actix_web::web::Json;
use actix_web::{get, post, web, HttpResponse};
use regex::Regex;
use serde_json::json;

use crate::auth;
use crate::errors::ServiceError;
use crate::server::Response;
use crate::validator::Validator;

/// The identity this service receives is an already-resolved email;
/// delivering magic links and verifying mailbox ownership happens upstream.
#[derive(Debug, Deserialize)]
pub struct LoginMessage {
    pub email: String,
}

impl crate::validator::Validate<LoginMessage> for LoginMessage {
    fn validate(&self) -> Result<(), ServiceError> {
        let pattern: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();

        if !pattern.is_match(&self.email) {
            bad_request!("that doesn't look like an email address");
        }

        Ok(())
    }
}

#[post("/login")]
async fn login(credentials: Json<Validator<LoginMessage>>, id: Identity) -> Response {
    let credentials = credentials.into_inner().validate()?;

    id.remember(credentials.email.to_lowercase());

    Ok(HttpResponse::new(StatusCode::OK))
}

#[post("/logout")]
async fn logout(id: Identity) -> Response {
    if id.identity().is_none() {
        return Err(ServiceError::Unauthorized);
    }

    id.forget();

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully signed out" })))
}

#[get("/session")]
async fn session(id: Identity) -> Response {
    let email = auth::get_email(&id)?;

    http_ok_json!(json!({ "email": email }));
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(login);
    cfg.service(logout);
    cfg.service(session);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email() {
        let credentials = LoginMessage {
            email: String::from("player@example.com"),
        };

        assert!(Validator::new(credentials).validate().is_ok());
    }

    #[test]
    fn invalid_email() {
        let credentials = LoginMessage {
            email: String::from("not-an-email"),
        };

        assert!(Validator::new(credentials).validate().is_err());
    }

    #[test]
    fn email_with_spaces() {
        let credentials = LoginMessage {
            email: String::from("player @example.com"),
        };

        assert!(Validator::new(credentials).validate().is_err());
    }
}
