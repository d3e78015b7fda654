use chrono::{DateTime, Utc};
use diesel::prelude::*;
use regex::Regex;

use crate::db;
use crate::errors::ServiceError;
use crate::pools::models::Pool;
use crate::schema::{picks, players};

/// A pool member. `lives_remaining` is only ever mutated through
/// [`Player::adjust_lives`], which keeps `is_eliminated` in lockstep.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, AsChangeset)]
pub struct Player {
    pub id: i64,
    pub pool_id: i64,
    pub email: Option<String>,
    pub display_name: String,
    pub lives_remaining: i32,
    pub is_eliminated: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// RosterMessage is what an admin sends us to add a player to a pool.
/// The display name falls back to the local part of the email address.
#[derive(Debug, Deserialize)]
pub struct RosterMessage {
    pub pool_id: i64,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Insertable)]
#[table_name = "players"]
pub struct NewPlayer {
    pub pool_id: i64,
    pub email: Option<String>,
    pub display_name: String,
    pub lives_remaining: i32,
    pub is_eliminated: bool,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub player: Player,
    pub pick_count: i64,
}

/// bounded retries for the compare-and-swap on a player's life count
const CAS_ATTEMPTS: usize = 8;

impl Player {
    pub fn find(id: i64, conn: &db::Conn) -> Result<Player, ServiceError> {
        let player = players::table
            .filter(players::id.eq(id))
            .first::<Player>(conn)
            .optional()?
            .ok_or(ServiceError::PlayerNotFound)?;

        Ok(player)
    }

    pub fn find_by_email(email: &str, conn: &db::Conn) -> Result<Player, ServiceError> {
        let player = players::table
            .filter(players::email.eq(email))
            .order(players::created_at.desc())
            .first::<Player>(conn)
            .optional()?
            .ok_or(ServiceError::PlayerNotFound)?;

        Ok(player)
    }

    /// pool roster, survivors first
    pub fn find_by_pool(pool_id: i64, conn: &db::Conn) -> Result<Vec<Player>, ServiceError> {
        let players = players::table
            .filter(players::pool_id.eq(pool_id))
            .order((players::lives_remaining.desc(), players::display_name))
            .load::<Player>(conn)?;

        Ok(players)
    }

    /// the roster annotated with season pick counts
    pub fn leaderboard(
        pool_id: i64,
        conn: &db::Conn,
    ) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let roster = Player::find_by_pool(pool_id, conn)?;

        let mut standings = Vec::with_capacity(roster.len());
        for player in roster {
            let pick_count = picks::table
                .filter(picks::player_id.eq(player.id))
                .count()
                .get_result::<i64>(conn)?;

            standings.push(LeaderboardEntry { player, pick_count });
        }

        Ok(standings)
    }

    /// Add a player to a pool with the pool's starting life budget.
    /// Display names are unique within a pool; the database constraint
    /// backs up the explicit check.
    pub fn roster(message: RosterMessage, conn: &db::Conn) -> Result<Player, ServiceError> {
        let display_name = message.resolve_display_name()?;

        let pool = Pool::find_by_id(message.pool_id, conn)?;

        let existing = players::table
            .filter(players::pool_id.eq(pool.id))
            .filter(players::display_name.eq(&display_name))
            .select(players::id)
            .first::<i64>(conn)
            .optional()?;

        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "a player with this name already exists in the pool".to_string(),
            ));
        }

        let player: Player = diesel::insert_into(players::table)
            .values(&NewPlayer {
                pool_id: pool.id,
                email: message.email.map(|email| email.to_lowercase()),
                display_name,
                lives_remaining: pool.starting_lives,
                is_eliminated: false,
            })
            .get_result(conn)?;

        Ok(player)
    }

    /// Apply a life delta through a compare-and-swap against the stored
    /// count, so two result resolutions touching the same player can't
    /// race the read-modify-write. Lives stay within [0, starting_lives]
    /// and `is_eliminated` is recomputed on the same write.
    pub fn adjust_lives(
        player_id: i64,
        delta: i32,
        starting_lives: i32,
        conn: &db::Conn,
    ) -> Result<Player, ServiceError> {
        for _ in 0..CAS_ATTEMPTS {
            let player = Player::find(player_id, conn)?;
            let lives = (player.lives_remaining + delta).max(0).min(starting_lives);

            let swapped = diesel::update(
                players::table
                    .filter(players::id.eq(player_id))
                    .filter(players::lives_remaining.eq(player.lives_remaining)),
            )
            .set((
                players::lives_remaining.eq(lives),
                players::is_eliminated.eq(lives == 0),
            ))
            .execute(conn)?;

            if swapped > 0 {
                return Player::find(player_id, conn);
            }

            debug!("player {} changed underneath us, retrying", player_id);
        }

        error!(
            "gave up adjusting lives for player {} after {} attempts",
            player_id, CAS_ATTEMPTS
        );
        Err(ServiceError::StoreUnavailable)
    }
}

impl RosterMessage {
    fn resolve_display_name(&self) -> Result<String, ServiceError> {
        if let Some(name) = &self.display_name {
            return Ok(name.trim().to_string());
        }

        match &self.email {
            Some(email) => match email.split('@').next() {
                Some(local) if !local.is_empty() => Ok(local.to_string()),
                _ => Err(ServiceError::BadRequest(
                    "unable to derive a display name from that email".to_string(),
                )),
            },
            None => Err(ServiceError::BadRequest(
                "either a display name or an email is required".to_string(),
            )),
        }
    }
}

impl crate::validator::Validate<RosterMessage> for RosterMessage {
    fn validate(&self) -> Result<(), ServiceError> {
        if let Some(name) = &self.display_name {
            if name.trim().is_empty() {
                bad_request!("display name is too short");
            }

            if name.trim().len() > 30 {
                bad_request!("display name is too long, maximum 30 characters");
            }

            let pattern: Regex = Regex::new(r"^[a-zA-Z0-9_-]+( [a-zA-Z0-9_-]+)*$").unwrap();

            if !pattern.is_match(name.trim()) {
                bad_request!("display name can only contain letters, numbers, spaces, '-' and '_'");
            }
        }

        if let Some(email) = &self.email {
            let pattern: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();

            if !pattern.is_match(email) {
                bad_request!("that doesn't look like an email address");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        let message = RosterMessage {
            pool_id: 1,
            display_name: None,
            email: Some(String::from("ricky.bobby@example.com")),
        };

        assert_eq!(message.resolve_display_name().unwrap(), "ricky.bobby");
    }

    #[test]
    fn explicit_display_name_wins() {
        let message = RosterMessage {
            pool_id: 1,
            display_name: Some(String::from(" Ricky ")),
            email: Some(String::from("ricky.bobby@example.com")),
        };

        assert_eq!(message.resolve_display_name().unwrap(), "Ricky");
    }

    #[test]
    fn nameless_and_emailless_is_rejected() {
        let message = RosterMessage {
            pool_id: 1,
            display_name: None,
            email: None,
        };

        assert!(message.resolve_display_name().is_err());
    }

    #[test]
    fn invalid_display_name() {
        let message = RosterMessage {
            pool_id: 1,
            display_name: Some(String::from("a€$b")),
            email: None,
        };

        assert!(Validator::new(message).validate().is_err());
    }

    #[test]
    fn valid_roster_message() {
        let message = RosterMessage {
            pool_id: 1,
            display_name: Some(String::from("Ricky Bobby")),
            email: Some(String::from("ricky@example.com")),
        };

        assert!(Validator::new(message).validate().is_ok());
    }
}
