use actix_identity::Identity;
use actix_web::get;
use actix_web::web;
use actix_web::web::{Data, Path};

use crate::auth;
use crate::db;
use crate::picks::models::Pick;
use crate::players::models::Player;
use crate::pools::models::Pool;
use crate::server;

#[get("/pools/default")]
async fn find_default(pool: Data<db::Pool>, id: Identity) -> server::Response {
    auth::get_email(&id)?;

    let conn = pool.get()?;

    let default_pool = web::block(move || Pool::find_default(&conn)).await?;

    http_ok_json!(default_pool);
}

#[get("/pools/{id}/players")]
async fn find_players(pool_id: Path<i64>, pool: Data<db::Pool>, id: Identity) -> server::Response {
    auth::get_email(&id)?;

    let conn = pool.get()?;

    let players = web::block(move || Player::find_by_pool(*pool_id, &conn)).await?;

    http_ok_json!(players);
}

#[get("/pools/{id}/leaderboard")]
async fn leaderboard(pool_id: Path<i64>, pool: Data<db::Pool>, id: Identity) -> server::Response {
    auth::get_email(&id)?;

    let conn = pool.get()?;

    let standings = web::block(move || Player::leaderboard(*pool_id, &conn)).await?;

    http_ok_json!(standings);
}

#[get("/pools/{id}/picks")]
async fn all_picks(pool_id: Path<i64>, pool: Data<db::Pool>, id: Identity) -> server::Response {
    auth::get_email(&id)?;

    let conn = pool.get()?;

    let picks = web::block(move || Pick::for_pool(*pool_id, &conn)).await?;

    http_ok_json!(picks);
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find_default);
    cfg.service(find_players);
    cfg.service(leaderboard);
    cfg.service(all_picks);
}
