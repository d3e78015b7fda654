use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::db;
use crate::errors::ServiceError;
use crate::schema::games;

/// the NFL regular season
pub const MAX_WEEK: i32 = 18;

/// A scheduled matchup. `winner` is null until an admin enters a result;
/// `is_complete` mirrors `winner != null` and never diverges from it.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, AsChangeset)]
pub struct Game {
    pub id: i64,
    pub season: i32,
    pub week_number: i32,
    pub home_team: String,
    pub away_team: String,
    pub game_time: DateTime<Utc>,
    pub is_complete: bool,
    pub winner: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Insertable)]
#[table_name = "games"]
pub struct CreateGame {
    pub season: i32,
    pub week_number: i32,
    pub home_team: String,
    pub away_team: String,
    pub game_time: DateTime<Utc>,
    #[serde(skip)]
    pub is_complete: bool,
    #[serde(skip)]
    pub winner: Option<String>,
}

/// GameFilter is a struct that the client can use to query for games.
#[derive(Debug, Deserialize)]
pub struct GameFilter {
    pub week: Option<i32>,
    pub season: Option<i32>,
}

/// WinnerMessage is what an admin sends us to enter or clear a result.
///
/// **PUT /api/admin/games/{id}/winner**
///
/// ``` shell
/// curl --location --request PUT 'http://localhost:8080/api/admin/games/1/winner' \
/// --header 'Content-Type: application/json' \
/// --data-raw '{ "winner": "buf" }'
/// ```
///
/// A null winner clears the result and reverts the affected picks to
/// unresolved.
#[derive(Debug, Deserialize)]
pub struct WinnerMessage {
    pub winner: Option<String>,
}

impl Game {
    pub fn find_by_id(id: i64, conn: &db::Conn) -> Result<Game, ServiceError> {
        let game = games::table.filter(games::id.eq(id)).first::<Game>(conn)?;

        Ok(game)
    }

    pub fn find_all(filter: GameFilter, conn: &db::Conn) -> Result<Vec<Game>, ServiceError> {
        let mut query = games::table
            .order((games::week_number, games::game_time))
            .into_boxed();

        if let Some(season) = filter.season {
            query = query.filter(games::season.eq(season));
        }

        if let Some(week) = filter.week {
            query = query.filter(games::week_number.eq(week));
        }

        let games = query.load::<Game>(conn)?;
        Ok(games)
    }

    /// a week's slate, ordered by kickoff
    pub fn find_by_week(season: i32, week: i32, conn: &db::Conn) -> Result<Vec<Game>, ServiceError> {
        let games = games::table
            .filter(games::season.eq(season))
            .filter(games::week_number.eq(week))
            .order(games::game_time)
            .load::<Game>(conn)?;

        Ok(games)
    }

    /// Persist a result (or clear it with `None`). `is_complete` is derived
    /// from the winner, never set independently.
    pub fn set_winner(&self, winner: Option<&str>, conn: &db::Conn) -> Result<Game, ServiceError> {
        let game: Game = diesel::update(games::table.filter(games::id.eq(self.id)))
            .set((
                games::winner.eq(winner),
                games::is_complete.eq(winner.is_some()),
            ))
            .get_result(conn)?;

        Ok(game)
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.home_team == team_id || self.away_team == team_id
    }

    /// The week the season is currently in, derived from stored kickoff
    /// times: the week of the first game still in the future, or the last
    /// known week once everything has been played.
    pub fn current_week(season: i32, conn: &db::Conn) -> Result<i32, ServiceError> {
        let schedule = games::table
            .filter(games::season.eq(season))
            .select((games::week_number, games::game_time))
            .order((games::week_number, games::game_time))
            .load::<(i32, DateTime<Utc>)>(conn)?;

        Ok(current_week_from(&schedule, Utc::now()))
    }

    /// games with an entered result, used by the schedule sync to know
    /// which rows must survive a re-import
    pub fn find_decided(season: i32, conn: &db::Conn) -> Result<Vec<Game>, ServiceError> {
        let games = games::table
            .filter(games::season.eq(season))
            .filter(games::winner.is_not_null())
            .load::<Game>(conn)?;

        Ok(games)
    }

    pub fn delete_undecided(season: i32, conn: &db::Conn) -> Result<usize, ServiceError> {
        let deleted = diesel::delete(
            games::table
                .filter(games::season.eq(season))
                .filter(games::winner.is_null()),
        )
        .execute(conn)?;

        Ok(deleted)
    }

    pub fn update_kickoff(
        id: i64,
        game_time: DateTime<Utc>,
        conn: &db::Conn,
    ) -> Result<Game, ServiceError> {
        let game: Game = diesel::update(games::table.filter(games::id.eq(id)))
            .set(games::game_time.eq(game_time))
            .get_result(conn)?;

        Ok(game)
    }
}

fn current_week_from(schedule: &[(i32, DateTime<Utc>)], now: DateTime<Utc>) -> i32 {
    for (week, kickoff) in schedule {
        if *kickoff > now {
            return *week;
        }
    }

    schedule.last().map(|(week, _)| *week).unwrap_or(1)
}

impl CreateGame {
    pub fn save(&self, conn: &db::Conn) -> Result<Game, ServiceError> {
        let game = diesel::insert_into(games::table)
            .values(self)
            .get_result::<Game>(conn)?;

        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::ops::Add;

    fn game(week: i32, home: &str, away: &str, game_time: DateTime<Utc>) -> Game {
        Game {
            id: 1,
            season: 2025,
            week_number: week,
            home_team: home.to_string(),
            away_team: away.to_string(),
            game_time,
            is_complete: false,
            winner: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn involves_both_sides_only() {
        let game = game(1, "buf", "mia", Utc::now());

        assert!(game.involves("buf"));
        assert!(game.involves("mia"));
        assert!(!game.involves("ne"));
    }

    #[test]
    fn current_week_is_first_week_with_a_future_game() {
        let now = Utc::now();
        let schedule = vec![
            (1, now.add(Duration::days(-7))),
            (2, now.add(Duration::days(-1))),
            (2, now.add(Duration::days(1))),
            (3, now.add(Duration::days(8))),
        ];

        assert_eq!(current_week_from(&schedule, now), 2);
    }

    #[test]
    fn current_week_sticks_to_the_last_played_week() {
        let now = Utc::now();
        let schedule = vec![
            (17, now.add(Duration::days(-8))),
            (18, now.add(Duration::days(-1))),
        ];

        assert_eq!(current_week_from(&schedule, now), 18);
    }

    #[test]
    fn current_week_defaults_to_opening_week() {
        assert_eq!(current_week_from(&[], Utc::now()), 1);
    }
}
