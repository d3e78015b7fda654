use actix_web::get;
use actix_web::web;
use actix_web::web::{Data, Query};

use crate::config::Config;
use crate::db;
use crate::games::models::{Game, GameFilter};
use crate::server;

#[get("/games")]
async fn find_all(query: Query<GameFilter>, pool: Data<db::Pool>) -> server::Response {
    let conn = pool.get()?;

    let mut filter = query.into_inner();
    if filter.season.is_none() {
        filter.season = Some(Config::season());
    }

    let games = web::block(move || Game::find_all(filter, &conn)).await?;

    http_ok_json!(games);
}

#[get("/games/current-week")]
async fn current_week(pool: Data<db::Pool>) -> server::Response {
    let conn = pool.get()?;

    let week = web::block(move || Game::current_week(Config::season(), &conn)).await?;

    http_ok_json!(week);
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(current_week);
    cfg.service(find_all);
}
