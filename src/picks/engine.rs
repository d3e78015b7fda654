//! The pick engine: team eligibility, the pick mutability window, and the
//! life/elimination transitions that fire when a game result changes.
//!
//! The rules themselves are pure functions over plain rows so they can be
//! tested without a database; the store-backed operations below them only
//! orchestrate loads, the rule calls, and writes.

use chrono::{DateTime, Utc};

use crate::db;
use crate::errors::ServiceError;
use crate::games::models::Game;
use crate::picks::models::{Correctness, NewPick, Pick};
use crate::players::models::Player;
use crate::pools::models::Pool;
use crate::teams::models::Team;

/// The teams a player can still pick: the catalog minus everything already
/// used this season. `exclude_week` omits that week's own pick from the
/// used set, so moving a pick doesn't block on itself.
pub fn available_teams(catalog: &[Team], history: &[Pick], exclude_week: Option<i32>) -> Vec<Team> {
    let used: Vec<&str> = history
        .iter()
        .filter(|pick| exclude_week.map_or(true, |week| pick.week_number != week))
        .map(|pick| pick.team_id.as_str())
        .collect();

    catalog
        .iter()
        .filter(|team| !used.contains(&team.id.as_str()))
        .cloned()
        .collect()
}

/// A week is open for picking strictly before its earliest kickoff: once
/// any game has started the week has begun for everyone. A week without
/// games is closed.
pub fn can_edit_pick(games_in_week: &[Game], now: DateTime<Utc>) -> bool {
    match games_in_week.iter().map(|game| game.game_time).min() {
        Some(kickoff) => now < kickoff,
        None => false,
    }
}

/// What a result means for a pick on `team_id`. No winner means the game
/// is (back to) undecided, not that the pick was wrong.
pub fn classify(team_id: &str, winner: Option<&str>) -> Correctness {
    match winner {
        None => Correctness::Unresolved,
        Some(winner) if winner == team_id => Correctness::Correct,
        Some(_) => Correctness::Incorrect,
    }
}

/// An incorrect pick holds exactly one of the player's lives: entering
/// `Incorrect` costs one, leaving it refunds one, every other transition
/// is free. Re-applying an unchanged result is therefore a no-op, and
/// entering, clearing and re-entering the same winner lands back on the
/// original life count.
pub fn life_delta(was: Correctness, now: Correctness) -> i32 {
    let refund = (was == Correctness::Incorrect) as i32;
    let charge = (now == Correctness::Incorrect) as i32;

    refund - charge
}

/// What one `resolve_game_result` invocation did, pick by pick. Failures
/// are accumulated, never fail-fast: one pick's write going wrong must not
/// keep the rest of the week from resolving.
#[derive(Debug, Serialize)]
pub struct Resolution {
    pub game_id: i64,
    pub winner: Option<String>,
    pub picks_updated: usize,
    pub lives_adjusted: usize,
    pub failures: Vec<String>,
}

enum PickOutcome {
    Unchanged,
    Flagged,
    LivesAdjusted,
}

/// Enter (or clear) a game's result and re-evaluate every pick exposed to
/// it. Each pick is processed independently; each affected player's life
/// count moves through a compare-and-swap, so a concurrent resolution
/// touching the same player can't double-count.
pub fn resolve_game_result(
    game_id: i64,
    winner: Option<String>,
    conn: &db::Conn,
) -> Result<Resolution, ServiceError> {
    let game = Game::find_by_id(game_id, conn)?;

    if let Some(team) = winner.as_deref() {
        if !game.involves(team) {
            bad_request!(format!(
                "'{}' did not play in game {}, expected '{}' or '{}'",
                team, game.id, game.away_team, game.home_team
            ));
        }
    }

    let game = game.set_winner(winner.as_deref(), conn)?;
    let exposed = Pick::exposed_to_game(&game, conn)?;

    info!(
        "resolving game {} (week {}, {} @ {}) for {} picks",
        game.id,
        game.week_number,
        game.away_team,
        game.home_team,
        exposed.len()
    );

    let mut resolution = Resolution {
        game_id: game.id,
        winner: game.winner.clone(),
        picks_updated: 0,
        lives_adjusted: 0,
        failures: Vec::new(),
    };

    for pick in &exposed {
        match resolve_pick(pick, game.winner.as_deref(), conn) {
            Ok(PickOutcome::Unchanged) => {}
            Ok(PickOutcome::Flagged) => resolution.picks_updated += 1,
            Ok(PickOutcome::LivesAdjusted) => {
                resolution.picks_updated += 1;
                resolution.lives_adjusted += 1;
            }
            Err(error) => {
                error!("failed to resolve pick {}: {}", pick.id, error);
                resolution
                    .failures
                    .push(format!("pick {}: {}", pick.id, error));
            }
        }
    }

    Ok(resolution)
}

fn resolve_pick(
    pick: &Pick,
    winner: Option<&str>,
    conn: &db::Conn,
) -> Result<PickOutcome, ServiceError> {
    let was = pick.correctness();
    let now = classify(&pick.team_id, winner);

    if was == now {
        return Ok(PickOutcome::Unchanged);
    }

    pick.set_correctness(now, conn)?;

    let delta = life_delta(was, now);
    if delta == 0 {
        return Ok(PickOutcome::Flagged);
    }

    let player = Player::find(pick.player_id, conn)?;
    let pool = Pool::find_by_id(player.pool_id, conn)?;
    Player::adjust_lives(player.id, delta, pool.starting_lives, conn)?;

    Ok(PickOutcome::LivesAdjusted)
}

/// Place a first pick for a week. Fails with `DuplicatePick` when one
/// already exists; moving an existing pick goes through [`update_pick`].
pub fn submit_pick(
    player_id: i64,
    season: i32,
    week: i32,
    team_id: &str,
    conn: &db::Conn,
) -> Result<Pick, ServiceError> {
    let player = Player::find(player_id, conn)?;

    if Pick::find_for_week(player_id, week, conn)?.is_some() {
        return Err(ServiceError::DuplicatePick);
    }

    place_pick(&player, season, week, team_id, None, conn)
}

/// Move this week's pick to another team, only while the week is open.
pub fn update_pick(
    player_id: i64,
    season: i32,
    week: i32,
    team_id: &str,
    conn: &db::Conn,
) -> Result<Pick, ServiceError> {
    let player = Player::find(player_id, conn)?;

    let existing =
        Pick::find_for_week(player_id, week, conn)?.ok_or(ServiceError::NotFound)?;

    place_pick(&player, season, week, team_id, Some(&existing), conn)
}

/// Create-or-move, used by admins picking on a player's behalf.
pub fn submit_or_update_pick(
    player_id: i64,
    season: i32,
    week: i32,
    team_id: &str,
    conn: &db::Conn,
) -> Result<Pick, ServiceError> {
    let player = Player::find(player_id, conn)?;
    let existing = Pick::find_for_week(player_id, week, conn)?;

    place_pick(&player, season, week, team_id, existing.as_ref(), conn)
}

fn place_pick(
    player: &Player,
    season: i32,
    week: i32,
    team_id: &str,
    existing: Option<&Pick>,
    conn: &db::Conn,
) -> Result<Pick, ServiceError> {
    if player.is_eliminated {
        return Err(ServiceError::PlayerEliminated);
    }

    let slate = Game::find_by_week(season, week, conn)?;
    if !can_edit_pick(&slate, Utc::now()) {
        return Err(ServiceError::PickLocked);
    }

    let catalog = Team::find_all(conn)?;
    let history = Pick::find_by_player(player.id, conn)?;
    let exclude_week = existing.map(|pick| pick.week_number);

    let available = available_teams(&catalog, &history, exclude_week);
    if !available.iter().any(|team| team.id == team_id) {
        return Err(ServiceError::InvalidTeamSelection(team_id.to_string()));
    }

    match existing {
        Some(pick) => pick.reassign(team_id, conn),
        None => NewPick {
            player_id: player.id,
            pool_id: player.pool_id,
            week_number: week,
            team_id: team_id.to_string(),
        }
        .save(conn),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::ops::Add;

    fn team(id: &str) -> Team {
        Team {
            id: id.to_string(),
            name: id.to_uppercase(),
            abbreviation: id.to_uppercase(),
            conference: String::from("AFC"),
            division: String::from("East"),
        }
    }

    fn pick(week: i32, team_id: &str) -> Pick {
        Pick {
            id: week as i64,
            player_id: 1,
            pool_id: 1,
            week_number: week,
            team_id: team_id.to_string(),
            is_correct: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn game_at(kickoff: DateTime<Utc>) -> Game {
        Game {
            id: 1,
            season: 2025,
            week_number: 1,
            home_team: String::from("buf"),
            away_team: String::from("mia"),
            game_time: kickoff,
            is_complete: false,
            winner: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn used_teams_are_not_available() {
        let catalog = vec![team("buf"), team("mia"), team("ne")];
        let history = vec![pick(1, "buf"), pick(2, "mia")];

        let available = available_teams(&catalog, &history, None);

        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, "ne");
    }

    #[test]
    fn editing_a_week_does_not_block_on_its_own_pick() {
        let catalog = vec![team("buf"), team("mia"), team("ne")];
        let history = vec![pick(1, "buf"), pick(2, "mia")];

        let available = available_teams(&catalog, &history, Some(2));
        let ids: Vec<&str> = available.iter().map(|team| team.id.as_str()).collect();

        // week 2 currently holds mia, so mia is pickable again for week 2
        assert_eq!(ids, vec!["mia", "ne"]);
    }

    #[test]
    fn a_week_without_games_is_closed() {
        assert!(!can_edit_pick(&[], Utc::now()));
    }

    #[test]
    fn a_week_locks_at_its_earliest_kickoff() {
        let now = Utc::now();
        let slate = vec![
            game_at(now.add(Duration::hours(2))),
            game_at(now.add(Duration::days(3))),
        ];

        assert!(can_edit_pick(&slate, now));
        // the second game is still days away, but the week has begun
        assert!(!can_edit_pick(&slate, now.add(Duration::hours(2))));
        assert!(!can_edit_pick(&slate, now.add(Duration::days(1))));
    }

    #[test]
    fn classify_against_a_winner() {
        assert_eq!(classify("buf", Some("buf")), Correctness::Correct);
        assert_eq!(classify("mia", Some("buf")), Correctness::Incorrect);
        assert_eq!(classify("buf", None), Correctness::Unresolved);
    }

    #[test]
    fn life_delta_transition_table() {
        use Correctness::*;

        // only entering or leaving Incorrect moves the life count
        assert_eq!(life_delta(Unresolved, Correct), 0);
        assert_eq!(life_delta(Unresolved, Incorrect), -1);
        assert_eq!(life_delta(Correct, Incorrect), -1);
        assert_eq!(life_delta(Incorrect, Correct), 1);
        assert_eq!(life_delta(Incorrect, Unresolved), 1);
        assert_eq!(life_delta(Correct, Unresolved), 0);
        assert_eq!(life_delta(Unresolved, Unresolved), 0);
        assert_eq!(life_delta(Correct, Correct), 0);
        assert_eq!(life_delta(Incorrect, Incorrect), 0);
    }

    /// in-memory replay of resolve_pick's rule, for sequence properties
    fn apply(state: &mut Correctness, lives: &mut i32, team: &str, winner: Option<&str>, cap: i32) {
        let next = classify(team, winner);
        *lives = (*lives + life_delta(*state, next)).max(0).min(cap);
        *state = next;
    }

    #[test]
    fn a_win_keeps_lives_a_loss_costs_one() {
        let mut p_state = Correctness::Unresolved;
        let mut p_lives = 3;
        let mut q_state = Correctness::Unresolved;
        let mut q_lives = 3;

        apply(&mut p_state, &mut p_lives, "buf", Some("buf"), 3);
        apply(&mut q_state, &mut q_lives, "mia", Some("buf"), 3);

        assert_eq!(p_state, Correctness::Correct);
        assert_eq!(p_lives, 3);
        assert_eq!(q_state, Correctness::Incorrect);
        assert_eq!(q_lives, 2);
    }

    #[test]
    fn flipping_the_winner_moves_the_life() {
        let mut p_state = Correctness::Unresolved;
        let mut p_lives = 3;
        let mut q_state = Correctness::Unresolved;
        let mut q_lives = 3;

        apply(&mut p_state, &mut p_lives, "buf", Some("buf"), 3);
        apply(&mut q_state, &mut q_lives, "mia", Some("buf"), 3);

        // the admin corrects the result: mia actually won
        apply(&mut p_state, &mut p_lives, "buf", Some("mia"), 3);
        apply(&mut q_state, &mut q_lives, "mia", Some("mia"), 3);

        assert_eq!(p_state, Correctness::Incorrect);
        assert_eq!(p_lives, 2);
        assert_eq!(q_state, Correctness::Correct);
        assert_eq!(q_lives, 3);
    }

    #[test]
    fn reapplying_the_same_winner_changes_nothing() {
        let mut state = Correctness::Unresolved;
        let mut lives = 3;

        apply(&mut state, &mut lives, "mia", Some("buf"), 3);
        let (state_after_first, lives_after_first) = (state, lives);

        apply(&mut state, &mut lives, "mia", Some("buf"), 3);

        assert_eq!(state, state_after_first);
        assert_eq!(lives, lives_after_first);
    }

    #[test]
    fn clearing_and_reentering_a_winner_round_trips() {
        let mut state = Correctness::Unresolved;
        let mut lives = 3;

        apply(&mut state, &mut lives, "mia", Some("buf"), 3);
        let (state_after_first, lives_after_first) = (state, lives);
        assert_eq!(lives_after_first, 2);

        // result entered by mistake, cleared, then re-entered
        apply(&mut state, &mut lives, "mia", None, 3);
        assert_eq!(state, Correctness::Unresolved);
        assert_eq!(lives, 3);

        apply(&mut state, &mut lives, "mia", Some("buf"), 3);
        assert_eq!(state, state_after_first);
        assert_eq!(lives, lives_after_first);
    }

    #[test]
    fn lives_never_leave_their_bounds() {
        let mut state = Correctness::Unresolved;
        let mut lives = 1;

        apply(&mut state, &mut lives, "mia", Some("buf"), 3);
        assert_eq!(lives, 0);

        // another wrong result can't push the count below zero
        state = Correctness::Unresolved;
        apply(&mut state, &mut lives, "mia", Some("buf"), 3);
        assert_eq!(lives, 0);

        // a refund at the cap stays at the cap
        state = Correctness::Incorrect;
        lives = 3;
        apply(&mut state, &mut lives, "mia", Some("mia"), 3);
        assert_eq!(lives, 3);
    }
}
