use actix_identity::Identity;
use actix_web::web;
use actix_web::web::{Data, Json, Path};
use actix_web::{post, put};

use crate::auth;
use crate::config::Config;
use crate::db;
use crate::games::models::WinnerMessage;
use crate::picks::engine;
use crate::picks::models::PickMessage;
use crate::players::models::{Player, RosterMessage};
use crate::pools::models::{CreatePool, Pool};
use crate::schedule::sync;
use crate::server::Response;
use crate::validator::Validator;

#[derive(Debug, Deserialize)]
pub struct WeekMessage {
    pub week: i32,
}

/// Entering (or clearing) a result is the trigger for the pick engine:
/// every pick exposed to this game gets re-flagged and the affected
/// players' life counts move accordingly.
#[put("/admin/games/{id}/winner")]
async fn enter_result(
    game_id: Path<i64>,
    message: Json<WinnerMessage>,
    pool: Data<db::Pool>,
    id: Identity,
) -> Response {
    auth::verify_admin(&id)?;

    let conn = pool.get()?;
    let winner = message.into_inner().winner;

    let resolution =
        web::block(move || engine::resolve_game_result(*game_id, winner, &conn)).await?;

    http_ok_json!(resolution);
}

#[post("/admin/pools")]
async fn create_pool(
    new_pool: Json<Validator<CreatePool>>,
    pool: Data<db::Pool>,
    id: Identity,
) -> Response {
    auth::verify_admin(&id)?;

    let new_pool = new_pool.into_inner().validate()?;
    let conn = pool.get()?;

    let created = web::block(move || Pool::create(new_pool, &conn)).await?;

    http_created_json!(created);
}

#[put("/admin/pools/{id}/current-week")]
async fn set_current_week(
    pool_id: Path<i64>,
    message: Json<WeekMessage>,
    pool: Data<db::Pool>,
    id: Identity,
) -> Response {
    auth::verify_admin(&id)?;

    let conn = pool.get()?;
    let week = message.week;

    let updated = web::block(move || Pool::set_current_week(*pool_id, week, &conn)).await?;

    http_ok_json!(updated);
}

#[post("/admin/players")]
async fn roster_player(
    message: Json<Validator<RosterMessage>>,
    pool: Data<db::Pool>,
    id: Identity,
) -> Response {
    auth::verify_admin(&id)?;

    let message = message.into_inner().validate()?;
    let conn = pool.get()?;

    let player = web::block(move || Player::roster(message, &conn)).await?;

    http_created_json!(player);
}

/// admins can pick on a player's behalf, creating or moving as needed
#[post("/admin/players/{id}/picks")]
async fn pick_for_player(
    player_id: Path<i64>,
    message: Json<Validator<PickMessage>>,
    pool: Data<db::Pool>,
    id: Identity,
) -> Response {
    auth::verify_admin(&id)?;

    let message = message.into_inner().validate()?;
    let conn = pool.get()?;

    let pick = web::block(move || {
        engine::submit_or_update_pick(
            *player_id,
            Config::season(),
            message.week_number,
            &message.team_id,
            &conn,
        )
    })
    .await?;

    http_ok_json!(pick);
}

#[post("/admin/schedule/sync")]
async fn sync_schedule(pool: Data<db::Pool>, id: Identity) -> Response {
    auth::verify_admin(&id)?;

    let feed = sync::fetch_feed(Config::season()).await?;

    let conn = pool.get()?;
    let report = web::block(move || sync::apply(feed, Config::season(), &conn)).await?;

    http_ok_json!(report);
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(enter_result);
    cfg.service(create_pool);
    cfg.service(set_current_week);
    cfg.service(roster_player);
    cfg.service(pick_for_player);
    cfg.service(sync_schedule);
}
