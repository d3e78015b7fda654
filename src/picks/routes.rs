use actix_identity::Identity;
use actix_web::web;
use actix_web::web::{Data, Json, Query};
use actix_web::{get, post, put};

use crate::auth;
use crate::config::Config;
use crate::db;
use crate::games::models::Game;
use crate::picks::engine;
use crate::picks::models::PickMessage;
use crate::players::models::Player;
use crate::server;
use crate::validator::Validator;

#[derive(Debug, Deserialize)]
pub struct CanEditQuery {
    pub week: i32,
}

#[get("/picks/can-edit")]
async fn can_edit(query: Query<CanEditQuery>, pool: Data<db::Pool>) -> server::Response {
    let conn = pool.get()?;
    let week = query.week;

    let open = web::block(move || {
        let slate = Game::find_by_week(Config::season(), week, &conn)?;

        Ok(engine::can_edit_pick(&slate, chrono::Utc::now()))
    })
    .await?;

    http_ok_json!(open);
}

#[post("/picks")]
async fn submit(
    message: Json<Validator<PickMessage>>,
    pool: Data<db::Pool>,
    id: Identity,
) -> server::Response {
    let email = auth::get_email(&id)?;
    let message = message.into_inner().validate()?;

    let conn = pool.get()?;

    let pick = web::block(move || {
        let player = Player::find_by_email(&email, &conn)?;
        engine::submit_pick(
            player.id,
            Config::season(),
            message.week_number,
            &message.team_id,
            &conn,
        )
    })
    .await?;

    http_created_json!(pick);
}

#[put("/picks")]
async fn update(
    message: Json<Validator<PickMessage>>,
    pool: Data<db::Pool>,
    id: Identity,
) -> server::Response {
    let email = auth::get_email(&id)?;
    let message = message.into_inner().validate()?;

    let conn = pool.get()?;

    let pick = web::block(move || {
        let player = Player::find_by_email(&email, &conn)?;
        engine::update_pick(
            player.id,
            Config::season(),
            message.week_number,
            &message.team_id,
            &conn,
        )
    })
    .await?;

    http_ok_json!(pick);
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(can_edit);
    cfg.service(submit);
    cfg.service(update);
}
