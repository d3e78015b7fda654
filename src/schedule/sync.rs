//! Season schedule import from the upstream sports-data feed.
//!
//! The feed is the source of truth for matchups and kickoff times, but
//! never for results: games with an entered winner survive a re-import
//! untouched apart from their kickoff time.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use url::Url;

use crate::config::Config;
use crate::db;
use crate::errors::ServiceError;
use crate::games::models::{CreateGame, Game, MAX_WEEK};
use crate::teams::models::Team;

/// One matchup as the upstream feed reports it.
#[derive(Debug, Deserialize)]
pub struct FeedGame {
    #[serde(rename = "Week")]
    pub week: i32,
    #[serde(rename = "AwayTeam")]
    pub away_team: String,
    #[serde(rename = "HomeTeam")]
    pub home_team: String,
    #[serde(rename = "DateTime")]
    pub kickoff: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
    pub preserved: usize,
    pub errors: Vec<String>,
}

enum Imported {
    Added,
    Updated,
}

pub async fn fetch_feed(season: i32) -> Result<Vec<FeedGame>, ServiceError> {
    let feed_url = Config::schedule_feed_url().ok_or_else(|| {
        ServiceError::BadRequest("no schedule feed has been configured".to_string())
    })?;

    let mut url = Url::parse(&format!("{}/{}", feed_url.trim_end_matches('/'), season))
        .map_err(|error| {
            error!("invalid schedule feed url: {}", error);
            ServiceError::InternalServerError
        })?;

    if let Some(key) = Config::schedule_feed_key() {
        url.query_pairs_mut().append_pair("key", key);
    }

    let feed = reqwest::Client::new()
        .get(url)
        .send()
        .await
        .map_err(|error| {
            error!("schedule feed unreachable: {}", error);
            ServiceError::InternalServerError
        })?
        .json::<Vec<FeedGame>>()
        .await
        .map_err(|error| {
            error!("unable to decode the schedule feed: {}", error);
            ServiceError::InternalServerError
        })?;

    Ok(feed)
}

/// Replace the season's undecided games with the feed's matchups.
/// Per-game failures are collected in the report, not fail-fast.
pub fn apply(feed: Vec<FeedGame>, season: i32, conn: &db::Conn) -> Result<SyncReport, ServiceError> {
    let mut report = SyncReport::default();

    let decided: HashMap<(i32, String, String), Game> = Game::find_decided(season, conn)?
        .into_iter()
        .map(|game| {
            (
                (game.week_number, game.away_team.clone(), game.home_team.clone()),
                game,
            )
        })
        .collect();

    report.deleted = Game::delete_undecided(season, conn)?;
    report.preserved = decided.len();

    for feed_game in &feed {
        match import_game(feed_game, season, &decided, conn) {
            Ok(Imported::Added) => report.added += 1,
            Ok(Imported::Updated) => report.updated += 1,
            Err(error) => report.errors.push(format!(
                "{} @ {}: {}",
                feed_game.away_team, feed_game.home_team, error
            )),
        }
    }

    info!(
        "schedule sync: {} added, {} updated, {} deleted, {} preserved, {} errors",
        report.added,
        report.updated,
        report.deleted,
        report.preserved,
        report.errors.len()
    );

    Ok(report)
}

fn import_game(
    feed_game: &FeedGame,
    season: i32,
    decided: &HashMap<(i32, String, String), Game>,
    conn: &db::Conn,
) -> Result<Imported, ServiceError> {
    if !(1..=MAX_WEEK).contains(&feed_game.week) {
        bad_request!(format!("week {} is out of range", feed_game.week));
    }

    let away = Team::find_by_abbreviation(&feed_game.away_team, conn)?
        .ok_or_else(|| ServiceError::BadRequest(format!("unknown team '{}'", feed_game.away_team)))?;
    let home = Team::find_by_abbreviation(&feed_game.home_team, conn)?
        .ok_or_else(|| ServiceError::BadRequest(format!("unknown team '{}'", feed_game.home_team)))?;

    let kickoff = parse_kickoff(feed_game.kickoff.as_deref())?;

    let key = (feed_game.week, away.id.clone(), home.id.clone());
    if let Some(existing) = decided.get(&key) {
        Game::update_kickoff(existing.id, kickoff, conn)?;
        return Ok(Imported::Updated);
    }

    CreateGame {
        season,
        week_number: feed_game.week,
        home_team: home.id,
        away_team: away.id,
        game_time: kickoff,
        is_complete: false,
        winner: None,
    }
    .save(conn)?;

    Ok(Imported::Added)
}

/// The feed reports kickoffs either with an explicit offset or as a bare
/// eastern wall clock; bare timestamps get the league's offset.
fn parse_kickoff(raw: Option<&str>) -> Result<DateTime<Utc>, ServiceError> {
    let raw =
        raw.ok_or_else(|| ServiceError::BadRequest("kickoff time missing".to_string()))?;

    if let Ok(kickoff) = DateTime::parse_from_rfc3339(raw) {
        return Ok(kickoff.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map_err(|_| {
        ServiceError::BadRequest(format!("unparseable kickoff time '{}'", raw))
    })?;

    Ok(DateTime::<Utc>::from_utc(
        naive + chrono::Duration::hours(5),
        Utc,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn feed_games_decode() {
        let body = r#"[
            {
                "Week": 1,
                "AwayTeam": "MIA",
                "HomeTeam": "BUF",
                "Date": "2025-09-04T20:20:00",
                "DateTime": "2025-09-04T20:20:00",
                "GameKey": "202510104",
                "Status": "Scheduled"
            }
        ]"#;

        let feed: Vec<FeedGame> = serde_json::from_str(body).unwrap();

        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].week, 1);
        assert_eq!(feed[0].away_team, "MIA");
        assert_eq!(feed[0].home_team, "BUF");
    }

    #[test]
    fn bare_kickoffs_are_treated_as_eastern() {
        let kickoff = parse_kickoff(Some("2025-09-04T20:20:00")).unwrap();

        assert_eq!(kickoff.to_rfc3339(), "2025-09-05T01:20:00+00:00");
    }

    #[test]
    fn offset_kickoffs_are_respected() {
        let kickoff = parse_kickoff(Some("2025-09-04T20:20:00-04:00")).unwrap();

        assert_eq!(kickoff.hour(), 0);
    }

    #[test]
    fn missing_kickoffs_are_rejected() {
        assert!(parse_kickoff(None).is_err());
        assert!(parse_kickoff(Some("tonight-ish")).is_err());
    }
}
