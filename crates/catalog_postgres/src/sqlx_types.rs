//! Row types for `sqlx::query_as`, converted into catalog_core types.

use chrono::NaiveDate;

use catalog_core::types::{Actor, Gender, Movie, Role, User};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PgActorRow {
    pub id: i32,
    pub name: String,
    pub gender: String,
    pub birth_date: NaiveDate,
}

impl TryFrom<PgActorRow> for Actor {
    type Error = String;

    fn try_from(row: PgActorRow) -> Result<Self, Self::Error> {
        let gender = Gender::parse(&row.gender)
            .ok_or_else(|| format!("actor {} has unknown gender '{}'", row.id, row.gender))?;
        Ok(Actor {
            id: row.id,
            name: row.name,
            gender,
            birth_date: row.birth_date,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PgMovieRow {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub rating: i32,
}

impl From<PgMovieRow> for Movie {
    fn from(row: PgMovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            description: row.description,
            release_date: row.release_date,
            rating: row.rating,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PgRoleRow {
    pub id: i32,
    pub name: String,
}

impl From<PgRoleRow> for Role {
    fn from(row: PgRoleRow) -> Self {
        Role {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PgUserRow {
    pub id: i32,
    pub login: String,
    pub pass: String,
    pub role_id: i32,
}

impl From<PgUserRow> for User {
    fn from(row: PgUserRow) -> Self {
        User {
            id: row.id,
            login: row.login,
            password_hash: row.pass,
            role_id: row.role_id,
        }
    }
}

/// One `movies_actors` row as returned by the batched edge lookups.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PgEdgeRow {
    pub movie_id: i32,
    pub actor_id: i32,
}
