use actix_web::get;
use actix_web::web;
use actix_web::web::{Data, Path};

use crate::db;
use crate::server;
use crate::teams::models::Team;

#[get("/teams")]
async fn find_all(pool: Data<db::Pool>) -> server::Response {
    let conn = pool.get()?;

    let teams = web::block(move || Team::find_all(&conn)).await?;

    http_ok_json!(teams);
}

#[get("/teams/{id}")]
async fn find(team_id: Path<String>, pool: Data<db::Pool>) -> server::Response {
    let conn = pool.get()?;

    let team = web::block(move || Team::find_by_id(&team_id, &conn)).await?;

    http_ok_json!(team);
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find_all);
    cfg.service(find);
}
