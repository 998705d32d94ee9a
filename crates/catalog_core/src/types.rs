//! Catalog domain types.
//!
//! Stored entities (`Actor`, `Movie`, `Role`, `User`), their validated
//! creation forms, the denormalized read views, and the raw client payloads.
//! Payload fields default to their "absent" sentinel (empty string, zero) so a
//! partially filled JSON body deserializes without error; validation and merge
//! decide what an empty field means.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type ActorId = i32;
pub type MovieId = i32;
pub type RoleId = i32;
pub type UserId = i32;

/// Calendar date format used on the wire and in payload validation.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const ADMIN_ROLE: &str = "admin";

// ── Actor ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Exact, case-sensitive match on the two accepted spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    #[serde(rename = "ID")]
    pub id: ActorId,
    pub name: String,
    pub gender: Gender,
    #[serde(rename = "birthDate")]
    pub birth_date: NaiveDate,
}

/// A validated actor that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActor {
    pub name: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
}

impl NewActor {
    pub fn with_id(self, id: ActorId) -> Actor {
        Actor {
            id,
            name: self.name,
            gender: self.gender,
            birth_date: self.birth_date,
        }
    }
}

// ── Movie ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "ID")]
    pub id: MovieId,
    pub title: String,
    pub description: String,
    #[serde(rename = "releaseDate")]
    pub release_date: NaiveDate,
    pub rating: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub rating: i32,
}

impl NewMovie {
    pub fn with_id(self, id: MovieId) -> Movie {
        Movie {
            id,
            title: self.title,
            description: self.description,
            release_date: self.release_date,
            rating: self.rating,
        }
    }
}

// ── Denormalized views ────────────────────────────────────────

/// A movie together with every actor reachable through its edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieView {
    pub movie: Movie,
    pub actors: Vec<Actor>,
}

/// An actor together with every movie reachable through its edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorView {
    pub actor: Actor,
    pub movies: Vec<Movie>,
}

// ── Access control ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "ID")]
    pub id: RoleId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub password_hash: String,
    pub role_id: RoleId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub login: String,
    pub password_hash: String,
}

// ── Sorting ───────────────────────────────────────────────────

/// Sort order for the primary actor fetch. Unknown keys fall back to id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActorOrder {
    #[default]
    Id,
    Name,
    BirthDateDesc,
}

impl ActorOrder {
    pub fn from_sort_key(key: &str) -> Self {
        match key {
            "name" => Self::Name,
            "date" => Self::BirthDateDesc,
            _ => Self::Id,
        }
    }
}

/// Sort order for the primary movie fetch. Unknown keys fall back to rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovieOrder {
    #[default]
    RatingDesc,
    Title,
    ReleaseDateDesc,
}

impl MovieOrder {
    pub fn from_sort_key(key: &str) -> Self {
        match key {
            "title" => Self::Title,
            "date" => Self::ReleaseDateDesc,
            _ => Self::RatingDesc,
        }
    }
}

// ── Client payloads ───────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorPayload {
    #[serde(rename = "ID")]
    pub id: ActorId,
    pub name: String,
    pub gender: String,
    #[serde(rename = "birthDate")]
    pub birth_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoviePayload {
    #[serde(rename = "ID")]
    pub id: MovieId,
    pub title: String,
    pub description: String,
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    pub rating: i32,
}

/// Movie creation body: the movie plus the actors to link, referenced by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewMoviePayload {
    pub movie: MoviePayload,
    pub actors: Vec<ActorPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub login: String,
    pub pass: String,
}
