use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::db;
use crate::errors::ServiceError;
use crate::games::models::{Game, MAX_WEEK};
use crate::schema::{picks, players};

/// Tri-state outcome of a pick relative to its game's result.
///
/// Stored as a nullable boolean: NULL while the game is undecided,
/// then true/false once a winner has been entered. Clearing a result
/// puts the pick back to `Unresolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correctness {
    Unresolved,
    Correct,
    Incorrect,
}

impl Correctness {
    pub fn from_column(value: Option<bool>) -> Correctness {
        match value {
            None => Correctness::Unresolved,
            Some(true) => Correctness::Correct,
            Some(false) => Correctness::Incorrect,
        }
    }

    pub fn as_column(self) -> Option<bool> {
        match self {
            Correctness::Unresolved => None,
            Correctness::Correct => Some(true),
            Correctness::Incorrect => Some(false),
        }
    }
}

impl std::fmt::Display for Correctness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A player's single weekly team selection. One row per (player, week),
/// enforced here and by a unique index.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, AsChangeset)]
pub struct Pick {
    pub id: i64,
    pub player_id: i64,
    pub pool_id: i64,
    pub week_number: i32,
    pub team_id: String,
    pub is_correct: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[table_name = "picks"]
pub struct NewPick {
    pub player_id: i64,
    pub pool_id: i64,
    pub week_number: i32,
    pub team_id: String,
}

/// PickMessage is what the client sends us to place or move a pick
///
/// **POST /api/picks** (new pick) / **PUT /api/picks** (move an open pick)
///
/// ``` shell
/// curl --location --request POST 'http://localhost:8080/api/picks' \
/// --header 'Content-Type: application/json' \
/// --data-raw '{ "week_number": 1, "team_id": "buf" }'
/// ```
#[derive(Debug, Deserialize)]
pub struct PickMessage {
    pub week_number: i32,
    pub team_id: String,
}

/// a pool-wide pick row, as shown on the all-picks board
#[derive(Debug, Serialize, Queryable)]
pub struct PoolPick {
    pub player: String,
    pub week_number: i32,
    pub team_id: String,
    pub is_correct: Option<bool>,
}

impl Pick {
    pub fn correctness(&self) -> Correctness {
        Correctness::from_column(self.is_correct)
    }

    /// a player's season so far, week by week
    pub fn find_by_player(player_id: i64, conn: &db::Conn) -> Result<Vec<Pick>, ServiceError> {
        let picks = picks::table
            .filter(picks::player_id.eq(player_id))
            .order(picks::week_number)
            .load::<Pick>(conn)?;

        Ok(picks)
    }

    pub fn find_for_week(
        player_id: i64,
        week: i32,
        conn: &db::Conn,
    ) -> Result<Option<Pick>, ServiceError> {
        let pick = picks::table
            .filter(picks::player_id.eq(player_id))
            .filter(picks::week_number.eq(week))
            .first::<Pick>(conn)
            .optional()?;

        Ok(pick)
    }

    /// every pick in a pool joined with its player, for the all-picks board
    pub fn for_pool(pool_id: i64, conn: &db::Conn) -> Result<Vec<PoolPick>, ServiceError> {
        let picks = picks::table
            .inner_join(players::table)
            .filter(picks::pool_id.eq(pool_id))
            .select((
                players::display_name,
                picks::week_number,
                picks::team_id,
                picks::is_correct,
            ))
            .order((picks::week_number, players::display_name))
            .load::<PoolPick>(conn)?;

        Ok(picks)
    }

    /// the picks a specific game result can touch: same week, on either
    /// of the two teams that played
    pub fn exposed_to_game(game: &Game, conn: &db::Conn) -> Result<Vec<Pick>, ServiceError> {
        let picks = picks::table
            .filter(picks::week_number.eq(game.week_number))
            .filter(picks::team_id.eq_any(vec![game.home_team.clone(), game.away_team.clone()]))
            .load::<Pick>(conn)?;

        Ok(picks)
    }

    /// move an open pick to another team; the correctness flag stays
    /// untouched since editing is only possible while it is unresolved
    pub fn reassign(&self, team_id: &str, conn: &db::Conn) -> Result<Pick, ServiceError> {
        let pick: Pick = diesel::update(picks::table.filter(picks::id.eq(self.id)))
            .set(picks::team_id.eq(team_id))
            .get_result(conn)?;

        Ok(pick)
    }

    pub fn set_correctness(
        &self,
        correctness: Correctness,
        conn: &db::Conn,
    ) -> Result<Pick, ServiceError> {
        let pick: Pick = diesel::update(picks::table.filter(picks::id.eq(self.id)))
            .set(picks::is_correct.eq(correctness.as_column()))
            .get_result(conn)?;

        Ok(pick)
    }
}

impl NewPick {
    /// Store a pick in the database. The (player, week) unique index backs
    /// up the engine's duplicate check, so a race surfaces as a conflict.
    pub fn save(&self, conn: &db::Conn) -> Result<Pick, ServiceError> {
        let pick = diesel::insert_into(picks::table)
            .values(self)
            .get_result::<Pick>(conn)?;

        Ok(pick)
    }
}

impl crate::validator::Validate<PickMessage> for PickMessage {
    fn validate(&self) -> Result<(), ServiceError> {
        if !(1..=MAX_WEEK).contains(&self.week_number) {
            bad_request!(format!("the week must be within [1-{}]", MAX_WEEK));
        }

        if self.team_id.trim().is_empty() {
            bad_request!("a team is required");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;

    #[test]
    fn correctness_round_trips_through_the_column() {
        for correctness in &[
            Correctness::Unresolved,
            Correctness::Correct,
            Correctness::Incorrect,
        ] {
            assert_eq!(
                Correctness::from_column(correctness.as_column()),
                *correctness
            );
        }
    }

    #[test]
    fn week_out_of_range() {
        let message = PickMessage {
            week_number: 19,
            team_id: String::from("buf"),
        };

        assert!(Validator::new(message).validate().is_err());

        let message = PickMessage {
            week_number: 0,
            team_id: String::from("buf"),
        };

        assert!(Validator::new(message).validate().is_err());
    }

    #[test]
    fn valid_pick_message() {
        let message = PickMessage {
            week_number: 1,
            team_id: String::from("buf"),
        };

        assert!(Validator::new(message).validate().is_ok());
    }
}
