use diesel::prelude::*;

use crate::cache;
use crate::db;
use crate::errors::ServiceError;
use crate::schema::teams;

/// Immutable reference data: the 32 NFL franchises, seeded by a migration.
/// Team ids are the lowercased abbreviations ("buf", "mia", ...).
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Insertable)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
    pub conference: String,
    pub division: String,
}

impl Team {
    /// the full catalog, ordered by name
    pub fn find_all(conn: &db::Conn) -> Result<Vec<Team>, ServiceError> {
        if let Some(catalog) = cache::find("catalog")? {
            debug!("found team catalog in cache");
            return Ok(catalog);
        }

        let catalog = teams::table.order(teams::name).load::<Team>(conn)?;

        cache::set(&catalog, "catalog")?;

        Ok(catalog)
    }

    pub fn find_by_id(id: &str, conn: &db::Conn) -> Result<Team, ServiceError> {
        let team = teams::table.filter(teams::id.eq(id)).first::<Team>(conn)?;

        Ok(team)
    }

    /// lookup used by the schedule sync to map feed abbreviations ("BUF")
    /// onto our team ids
    pub fn find_by_abbreviation(
        abbreviation: &str,
        conn: &db::Conn,
    ) -> Result<Option<Team>, ServiceError> {
        let team = teams::table
            .filter(teams::abbreviation.eq(abbreviation))
            .first::<Team>(conn)
            .optional()?;

        Ok(team)
    }
}

impl cache::Cache for Vec<Team> {
    fn cache_key<T: std::fmt::Display>(id: T) -> String {
        format!("teams.{}", id)
    }
}
