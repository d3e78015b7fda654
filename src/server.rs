use actix_identity::{CookieIdentityPolicy, IdentityService};
use actix_web::{cookie, get, middleware, web, App, HttpRequest, HttpResponse, HttpServer};

use crate::admin;
use crate::auth;
use crate::config::Config;
use crate::db;
use crate::errors::ServiceError;
use crate::games;
use crate::picks;
use crate::players;
use crate::pools;
use crate::stats;
use crate::teams;

pub type Response = Result<HttpResponse, ServiceError>;

#[get("/health")]
async fn health(_: HttpRequest) -> &'static str {
    "ok"
}

pub async fn launch(db_pool: db::Pool) -> std::io::Result<()> {
    let stats = web::Data::new(stats::Stats::new());

    HttpServer::new(move || {
        App::new()
            .data(db_pool.clone())
            .app_data(stats.clone())
            .wrap(middleware::DefaultHeaders::new().header("X-Version", env!("CARGO_PKG_VERSION")))
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::default())
            .wrap(stats::Middleware::default())
            .wrap(IdentityService::new(
                CookieIdentityPolicy::new(Config::session_private_key().as_bytes())
                    .name("survivor-auth")
                    .secure(false)
                    .same_site(cookie::SameSite::Strict),
            ))
            .data(web::JsonConfig::default().limit(262_144))
            .data(web::PayloadConfig::default().limit(262_144))
            .service(health)
            .service(stats::route)
            .service(
                web::scope("/api")
                    .configure(auth::routes::register)
                    .configure(teams::routes::register)
                    .configure(pools::routes::register)
                    .configure(players::routes::register)
                    .configure(games::routes::register)
                    .configure(picks::routes::register)
                    .configure(admin::routes::register),
            )
    })
    .bind(format!("{}:{}", Config::api_host(), Config::api_port()))?
    .run()
    .await
}
