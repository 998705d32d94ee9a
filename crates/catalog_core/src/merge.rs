//! Partial-update merge.
//!
//! A client payload is first turned into a set of changes: each sentinel
//! field (empty string, rating `0`) becomes `None`, every supplied field is
//! validated. Any validation failure rejects the whole update before storage
//! is touched. The changes are then applied field by field over the stored
//! entity; `None` keeps the stored value.
//!
//! Rating `0` is the "absent" sentinel, so a client cannot set a rating to
//! zero through an update: `{rating: 0}` keeps whatever is stored.

use chrono::NaiveDate;

use crate::ports::Result;
use crate::types::*;
use crate::validate::{check_description, check_rating, check_title, parse_date, parse_gender};

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorChanges {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
}

impl ActorChanges {
    pub fn from_payload(payload: &ActorPayload) -> Result<Self> {
        Ok(Self {
            name: non_empty(&payload.name).map(str::to_owned),
            gender: non_empty(&payload.gender).map(parse_gender).transpose()?,
            birth_date: non_empty(&payload.birth_date)
                .map(|d| parse_date("birthDate", d))
                .transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.gender.is_none() && self.birth_date.is_none()
    }

    pub fn apply(&self, stored: &Actor) -> Actor {
        Actor {
            id: stored.id,
            name: self.name.clone().unwrap_or_else(|| stored.name.clone()),
            gender: self.gender.unwrap_or(stored.gender),
            birth_date: self.birth_date.unwrap_or(stored.birth_date),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub rating: Option<i32>,
}

impl MovieChanges {
    pub fn from_payload(payload: &MoviePayload) -> Result<Self> {
        let title = non_empty(&payload.title)
            .map(|t| check_title(t).map(|()| t.to_owned()))
            .transpose()?;
        let description = non_empty(&payload.description)
            .map(|d| check_description(d).map(|()| d.to_owned()))
            .transpose()?;
        let release_date = non_empty(&payload.release_date)
            .map(|d| parse_date("releaseDate", d))
            .transpose()?;
        let rating = match payload.rating {
            0 => None,
            r => Some(check_rating(r)?),
        };
        Ok(Self {
            title,
            description,
            release_date,
            rating,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.release_date.is_none()
            && self.rating.is_none()
    }

    pub fn apply(&self, stored: &Movie) -> Movie {
        Movie {
            id: stored.id,
            title: self.title.clone().unwrap_or_else(|| stored.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| stored.description.clone()),
            release_date: self.release_date.unwrap_or(stored.release_date),
            rating: self.rating.unwrap_or(stored.rating),
        }
    }
}

/// Validate `incoming` and merge it over `stored`.
pub fn merge_actor(stored: &Actor, incoming: &ActorPayload) -> Result<Actor> {
    Ok(ActorChanges::from_payload(incoming)?.apply(stored))
}

/// Validate `incoming` and merge it over `stored`.
pub fn merge_movie(stored: &Movie, incoming: &MoviePayload) -> Result<Movie> {
    Ok(MovieChanges::from_payload(incoming)?.apply(stored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;

    fn stored_actor() -> Actor {
        Actor {
            id: 1,
            name: "test".into(),
            gender: Gender::Male,
            birth_date: NaiveDate::from_ymd_opt(1984, 2, 24).unwrap(),
        }
    }

    fn stored_movie() -> Movie {
        Movie {
            id: 1,
            title: "Old Title".into(),
            description: "Old Description".into(),
            release_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            rating: 5,
        }
    }

    #[test]
    fn absent_actor_fields_keep_stored_values() {
        let stored = stored_actor();
        let merged = merge_actor(&stored, &ActorPayload::default()).unwrap();
        assert_eq!(merged, stored);
        assert!(ActorChanges::from_payload(&ActorPayload::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn absent_movie_fields_keep_stored_values() {
        let stored = stored_movie();
        let merged = merge_movie(&stored, &MoviePayload::default()).unwrap();
        assert_eq!(merged, stored);
    }

    #[test]
    fn rating_zero_is_indistinguishable_from_absent() {
        let stored = stored_movie();
        let incoming = MoviePayload {
            rating: 0,
            ..Default::default()
        };
        let merged = merge_movie(&stored, &incoming).unwrap();
        assert_eq!(merged.rating, 5);
    }

    #[test]
    fn supplied_fields_override_independently() {
        let stored = stored_actor();
        let incoming = ActorPayload {
            gender: "female".into(),
            ..Default::default()
        };
        let merged = merge_actor(&stored, &incoming).unwrap();
        assert_eq!(merged.name, "test");
        assert_eq!(merged.gender, Gender::Female);
        assert_eq!(merged.birth_date, stored.birth_date);

        let incoming = MoviePayload {
            title: "New Title".into(),
            release_date: "2023-07-21".into(),
            rating: 9,
            ..Default::default()
        };
        let merged = merge_movie(&stored_movie(), &incoming).unwrap();
        assert_eq!(merged.title, "New Title");
        assert_eq!(merged.description, "Old Description");
        assert_eq!(
            merged.release_date,
            NaiveDate::from_ymd_opt(2023, 7, 21).unwrap()
        );
        assert_eq!(merged.rating, 9);
    }

    #[test]
    fn invalid_fields_reject_the_whole_update() {
        let bad_gender = ActorPayload {
            name: "Renamed".into(),
            gender: "unknown".into(),
            ..Default::default()
        };
        assert!(matches!(
            merge_actor(&stored_actor(), &bad_gender),
            Err(CatalogError::Validation(_))
        ));

        let bad_date = MoviePayload {
            release_date: "invalid date".into(),
            ..Default::default()
        };
        assert!(matches!(
            merge_movie(&stored_movie(), &bad_date),
            Err(CatalogError::Validation(_))
        ));

        for rating in [-1, 11] {
            let bad_rating = MoviePayload {
                rating,
                ..Default::default()
            };
            assert!(merge_movie(&stored_movie(), &bad_rating).is_err());
        }
    }
}
