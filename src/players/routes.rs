use actix_identity::Identity;
use actix_web::get;
use actix_web::web;
use actix_web::web::{Data, Path, Query};

use crate::auth;
use crate::db;
use crate::picks::engine;
use crate::picks::models::Pick;
use crate::players::models::Player;
use crate::server;
use crate::teams::models::Team;

#[derive(Debug, Deserialize)]
pub struct AvailableTeamsQuery {
    /// omit this week's own pick from the used set, for an in-place edit
    pub exclude_week: Option<i32>,
}

#[get("/players/me")]
async fn find_me(pool: Data<db::Pool>, id: Identity) -> server::Response {
    let email = auth::get_email(&id)?;

    let conn = pool.get()?;

    let player = web::block(move || Player::find_by_email(&email, &conn)).await?;

    http_ok_json!(player);
}

#[get("/players/{id}/picks")]
async fn pick_history(player_id: Path<i64>, pool: Data<db::Pool>, id: Identity) -> server::Response {
    auth::get_email(&id)?;

    let conn = pool.get()?;

    let picks = web::block(move || Pick::find_by_player(*player_id, &conn)).await?;

    http_ok_json!(picks);
}

#[get("/players/{id}/available-teams")]
async fn available_teams(
    player_id: Path<i64>,
    query: Query<AvailableTeamsQuery>,
    pool: Data<db::Pool>,
    id: Identity,
) -> server::Response {
    auth::get_email(&id)?;

    let conn = pool.get()?;
    let exclude_week = query.exclude_week;

    let teams = web::block(move || {
        let catalog = Team::find_all(&conn)?;
        let history = Pick::find_by_player(*player_id, &conn)?;

        Ok(engine::available_teams(&catalog, &history, exclude_week))
    })
    .await?;

    http_ok_json!(teams);
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find_me);
    cfg.service(pick_history);
    cfg.service(available_teams);
}
