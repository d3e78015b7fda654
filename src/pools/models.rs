use chrono::{DateTime, Utc};
use diesel::prelude::*;
use regex::Regex;

use crate::cache;
use crate::db;
use crate::errors::ServiceError;
use crate::games::MAX_WEEK;
use crate::schema::pools;

/// One season-long competition instance with its own roster and life budget.
///
/// The most recently created active pool is the "default" pool, the
/// operative scope for every player and pick query.
#[derive(Debug, Serialize, Deserialize, Queryable, Identifiable, AsChangeset)]
pub struct Pool {
    pub id: i64,
    pub name: String,
    pub starting_lives: i32,
    pub is_active: bool,
    pub current_week: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Insertable)]
#[table_name = "pools"]
pub struct CreatePool {
    pub name: String,
    pub starting_lives: i32,
    #[serde(skip)]
    pub is_active: bool,
    #[serde(skip)]
    pub current_week: i32,
}

const MAX_STARTING_LIVES: i32 = 10;

impl Pool {
    pub fn create(mut new_pool: CreatePool, conn: &db::Conn) -> Result<Pool, ServiceError> {
        new_pool.is_active = true;
        new_pool.current_week = 1;

        let pool: Pool = diesel::insert_into(pools::table)
            .values(&new_pool)
            .get_result(conn)?;

        cache::set(&pool, pool.id)?;

        Ok(pool)
    }

    pub fn find_by_id(id: i64, conn: &db::Conn) -> Result<Pool, ServiceError> {
        if let Some(pool) = cache::find(id)? {
            debug!("found pool in cache");
            return Ok(pool);
        }

        let pool = pools::table
            .filter(pools::id.eq(id))
            .first::<Pool>(conn)
            .optional()?
            .ok_or(ServiceError::PoolNotFound)?;

        cache::set(&pool, pool.id)?;

        Ok(pool)
    }

    /// the operative pool: active, most recently created
    pub fn find_default(conn: &db::Conn) -> Result<Pool, ServiceError> {
        let pool = pools::table
            .filter(pools::is_active.eq(true))
            .order(pools::created_at.desc())
            .first::<Pool>(conn)
            .optional()?
            .ok_or(ServiceError::PoolNotFound)?;

        Ok(pool)
    }

    pub fn set_current_week(id: i64, week: i32, conn: &db::Conn) -> Result<Pool, ServiceError> {
        if !(1..=MAX_WEEK).contains(&week) {
            bad_request!(format!("the week must be within [1-{}]", MAX_WEEK));
        }

        let pool: Pool = diesel::update(pools::table.filter(pools::id.eq(id)))
            .set(pools::current_week.eq(week))
            .get_result(conn)?;

        cache::set(&pool, pool.id)?;

        Ok(pool)
    }

    /// how many pools are currently accepting picks
    pub fn active_pools(conn: &db::Conn) -> Result<i64, ServiceError> {
        use diesel::dsl::sql;

        let count = pools::table
            .filter(pools::is_active.eq(true))
            .select(sql::<diesel::sql_types::BigInt>("COUNT(*)"))
            .first::<i64>(conn)?;

        Ok(count)
    }
}

impl cache::Cache for Pool {
    fn cache_key<T: std::fmt::Display>(id: T) -> String {
        format!("pool.{}", id)
    }
}

impl crate::validator::Validate<CreatePool> for CreatePool {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            bad_request!("name is too short");
        }

        if self.name.trim().len() > 40 {
            bad_request!("name is too long, maximum 40 characters");
        }

        let pattern: Regex = Regex::new(r"^[a-zA-Z0-9_-]+( [a-zA-Z0-9_-]+)*$").unwrap();

        if !pattern.is_match(&self.name) {
            bad_request!("name can only contain letters, numbers, spaces, '-' and '_'");
        }

        if self.starting_lives < 1 {
            bad_request!("a pool needs at least 1 starting life");
        }

        if self.starting_lives > MAX_STARTING_LIVES {
            bad_request!(format!(
                "the maximum starting life count is {}",
                MAX_STARTING_LIVES
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;

    fn pool_with(name: &str, starting_lives: i32) -> CreatePool {
        CreatePool {
            name: String::from(name),
            starting_lives,
            is_active: false,
            current_week: 0,
        }
    }

    #[test]
    fn valid_pool_names() {
        assert!(Validator::new(pool_with("office pool", 3)).validate().is_ok());
        assert!(Validator::new(pool_with("pool-2025_b", 3)).validate().is_ok());
    }

    #[test]
    fn invalid_pool_names() {
        assert!(Validator::new(pool_with("", 3)).validate().is_err());
        assert!(Validator::new(pool_with("pool!", 3)).validate().is_err());
        assert!(Validator::new(pool_with("('something')", 3)).validate().is_err());
    }

    #[test]
    fn starting_lives_bounds() {
        assert!(Validator::new(pool_with("pool", 0)).validate().is_err());
        assert!(Validator::new(pool_with("pool", 1)).validate().is_ok());
        assert!(Validator::new(pool_with("pool", 10)).validate().is_ok());
        assert!(Validator::new(pool_with("pool", 11)).validate().is_err());
    }
}
