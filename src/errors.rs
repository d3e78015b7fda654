use actix_web::{error::ResponseError, HttpResponse};
use derive_more::Display;
use diesel::result::{DatabaseErrorKind, Error as DBError};
use std::convert::From;

#[derive(Debug, Display)]
pub enum ServiceError {
    #[display(fmt = "Internal Server Error")]
    InternalServerError,

    #[display(fmt = "BadRequest: {}", _0)]
    BadRequest(String),

    #[display(fmt = "Conflict: {}", _0)]
    Conflict(String),

    #[display(fmt = "Unauthorized")]
    Unauthorized,

    #[display(fmt = "Forbidden: {}", _0)]
    Forbidden(String),

    #[display(fmt = "Not Found")]
    NotFound,

    #[display(fmt = "team '{}' is not available for this player", _0)]
    InvalidTeamSelection(String),

    #[display(fmt = "picks for this week are locked")]
    PickLocked,

    #[display(fmt = "this player has been eliminated")]
    PlayerEliminated,

    #[display(fmt = "a pick for this week already exists")]
    DuplicatePick,

    #[display(fmt = "player not found")]
    PlayerNotFound,

    #[display(fmt = "pool not found")]
    PoolNotFound,

    #[display(fmt = "the datastore is unavailable")]
    StoreUnavailable,
}

// impl ResponseError trait allows to convert our errors into http responses with appropriate data
impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::InternalServerError => {
                HttpResponse::InternalServerError().json("Internal Server Error, Please try later")
            }
            ServiceError::BadRequest(ref message) => HttpResponse::BadRequest().json(message),
            ServiceError::Conflict(ref message) => HttpResponse::Conflict().json(message),
            ServiceError::Unauthorized => HttpResponse::Unauthorized().json("Unauthorized"),
            ServiceError::Forbidden(ref message) => HttpResponse::Forbidden().json(message),
            ServiceError::NotFound => HttpResponse::NotFound().json("Not Found"),
            ServiceError::InvalidTeamSelection(_) => {
                HttpResponse::BadRequest().json(self.to_string())
            }
            ServiceError::PickLocked => HttpResponse::Conflict().json(self.to_string()),
            ServiceError::PlayerEliminated => HttpResponse::Forbidden().json(self.to_string()),
            ServiceError::DuplicatePick => HttpResponse::Conflict().json(self.to_string()),
            ServiceError::PlayerNotFound => HttpResponse::NotFound().json(self.to_string()),
            ServiceError::PoolNotFound => HttpResponse::NotFound().json(self.to_string()),
            ServiceError::StoreUnavailable => {
                HttpResponse::ServiceUnavailable().json(self.to_string())
            }
        }
    }
}

impl From<DBError> for ServiceError {
    fn from(error: DBError) -> ServiceError {
        error!("db error: {}", error);
        match error {
            DBError::NotFound => ServiceError::NotFound,
            DBError::DatabaseError(kind, info) => {
                if let DatabaseErrorKind::UniqueViolation = kind {
                    let message = info.details().unwrap_or_else(|| info.message()).to_string();
                    return ServiceError::Conflict(message);
                }
                ServiceError::StoreUnavailable
            }
            _ => ServiceError::StoreUnavailable,
        }
    }
}

impl From<r2d2::Error> for ServiceError {
    fn from(error: r2d2::Error) -> ServiceError {
        error!("r2d2 connection pool error: {}", error);
        ServiceError::StoreUnavailable
    }
}

impl From<redis::RedisError> for ServiceError {
    fn from(error: redis::RedisError) -> ServiceError {
        error!("redis error: {}", error);
        ServiceError::InternalServerError
    }
}

// a database call through web::block either carries our own error
// or got canceled by a dying threadpool
impl From<actix_threadpool::BlockingError<ServiceError>> for ServiceError {
    fn from(error: actix_threadpool::BlockingError<ServiceError>) -> ServiceError {
        match error {
            actix_threadpool::BlockingError::Error(service_error) => service_error,
            actix_threadpool::BlockingError::Canceled => {
                error!("actix threadpool canceled a blocking call");
                ServiceError::InternalServerError
            }
        }
    }
}
