//! Payload validation for create operations and credentials.
//!
//! Runs before any repository call: a payload that fails here never reaches
//! storage.

use std::ops::RangeInclusive;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::CatalogError;
use crate::ports::Result;
use crate::types::*;

pub const TITLE_MAX_CHARS: usize = 150;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const RATING_RANGE: RangeInclusive<i32> = 0..=10;

static DATE_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Anything outside letters, digits, whitespace and `-`.
static LOGIN_REJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s-]").unwrap());

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    if !DATE_SHAPE_RE.is_match(value) {
        return Err(CatalogError::validation(format!(
            "{field} must be formatted as YYYY-MM-DD, got '{value}'"
        )));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        CatalogError::validation(format!("{field} '{value}' is not a calendar date: {e}"))
    })
}

pub fn parse_gender(value: &str) -> Result<Gender> {
    Gender::parse(value).ok_or_else(|| {
        CatalogError::validation(format!(
            "gender must be 'male' or 'female', got '{value}'"
        ))
    })
}

pub fn check_rating(rating: i32) -> Result<i32> {
    if RATING_RANGE.contains(&rating) {
        Ok(rating)
    } else {
        Err(CatalogError::validation(format!(
            "rating must be within 0..=10, got {rating}"
        )))
    }
}

pub fn check_title(title: &str) -> Result<()> {
    let len = title.chars().count();
    if len == 0 || len > TITLE_MAX_CHARS {
        return Err(CatalogError::validation(format!(
            "title must be 1..={TITLE_MAX_CHARS} characters, got {len}"
        )));
    }
    Ok(())
}

pub fn check_description(description: &str) -> Result<()> {
    let len = description.chars().count();
    if len > DESCRIPTION_MAX_CHARS {
        return Err(CatalogError::validation(format!(
            "description must be at most {DESCRIPTION_MAX_CHARS} characters, got {len}"
        )));
    }
    Ok(())
}

/// Strip unsupported characters from a login.
/// Returns the cleaned string and whether it was already clean.
pub fn sanitize_login(input: &str) -> (String, bool) {
    let cleaned = LOGIN_REJECT_RE.replace_all(input, "").into_owned();
    let clean = cleaned == input;
    (cleaned, clean)
}

impl Credentials {
    /// Both fields present and the login free of unsupported characters.
    pub fn validate(&self) -> Result<()> {
        if self.login.is_empty() || self.pass.is_empty() {
            return Err(CatalogError::validation("login and pass are required"));
        }
        let (_, clean) = sanitize_login(&self.login);
        if !clean {
            return Err(CatalogError::validation(
                "login contains unsupported characters",
            ));
        }
        Ok(())
    }
}

impl ActorPayload {
    /// Validate a complete actor for creation. The payload id is ignored.
    pub fn validate_new(&self) -> Result<NewActor> {
        if self.name.is_empty() {
            return Err(CatalogError::validation("actor name is required"));
        }
        Ok(NewActor {
            name: self.name.clone(),
            gender: parse_gender(&self.gender)?,
            birth_date: parse_date("birthDate", &self.birth_date)?,
        })
    }
}

impl MoviePayload {
    pub fn validate_new(&self) -> Result<NewMovie> {
        check_title(&self.title)?;
        check_description(&self.description)?;
        Ok(NewMovie {
            title: self.title.clone(),
            description: self.description.clone(),
            release_date: parse_date("releaseDate", &self.release_date)?,
            rating: check_rating(self.rating)?,
        })
    }
}

impl NewMoviePayload {
    /// Validate the movie and every actor candidate up front.
    pub fn validate(&self) -> Result<(NewMovie, Vec<NewActor>)> {
        let movie = self.movie.validate_new()?;
        let actors = self
            .actors
            .iter()
            .enumerate()
            .map(|(i, a)| {
                a.validate_new().map_err(|e| match e {
                    CatalogError::Validation(msg) => {
                        CatalogError::Validation(format!("actors[{i}]: {msg}"))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((movie, actors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor_payload(name: &str, gender: &str, birth: &str) -> ActorPayload {
        ActorPayload {
            id: 0,
            name: name.into(),
            gender: gender.into(),
            birth_date: birth.into(),
        }
    }

    fn movie_payload(title: &str, rating: i32) -> MoviePayload {
        MoviePayload {
            id: 0,
            title: title.into(),
            description: "d".into(),
            release_date: "2023-07-21".into(),
            rating,
        }
    }

    #[test]
    fn parse_date_accepts_iso_calendar_dates() {
        let d = parse_date("birthDate", "1976-05-25").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(1976, 5, 25).unwrap());
    }

    #[test]
    fn parse_date_rejects_bad_shapes() {
        for bad in ["1976-5-25", "76-05-25", "1976/05/25", "invalid date", "1976-02-30"] {
            let err = parse_date("birthDate", bad).unwrap_err();
            assert!(matches!(err, CatalogError::Validation(_)), "{bad}");
        }
    }

    #[test]
    fn sanitize_login_matches_reference_cases() {
        let cases = [
            ("Hello, World!", "Hello World", false),
            ("123-456-7@89", "123-456-789", false),
            ("!@#$%^&*()_+", "", false),
            ("This is a test.", "This is a test", false),
            ("", "", true),
            ("   ", "   ", true),
            ("hello_world", "helloworld", false),
        ];
        for (input, expected, clean) in cases {
            let (out, was_clean) = sanitize_login(input);
            assert_eq!(out, expected, "input {input:?}");
            assert_eq!(was_clean, clean, "input {input:?}");
        }
    }

    #[test]
    fn credentials_require_both_fields_and_clean_login() {
        let ok = Credentials {
            login: "testuser".into(),
            pass: "password".into(),
        };
        assert!(ok.validate().is_ok());

        let no_pass = Credentials {
            login: "testuser".into(),
            pass: String::new(),
        };
        assert!(no_pass.validate().is_err());

        let dirty = Credentials {
            login: "test_user".into(),
            pass: "password".into(),
        };
        assert!(dirty.validate().is_err());
    }

    #[test]
    fn actor_validation() {
        let a = actor_payload("Cillian Murphy", "male", "1976-05-25")
            .validate_new()
            .unwrap();
        assert_eq!(a.gender, Gender::Male);

        assert!(actor_payload("", "male", "1976-05-25").validate_new().is_err());
        assert!(actor_payload("X", "other", "1976-05-25").validate_new().is_err());
        assert!(actor_payload("X", "female", "").validate_new().is_err());
    }

    #[test]
    fn movie_validation_bounds() {
        assert!(movie_payload("Oppenheimer", 8).validate_new().is_ok());
        assert!(movie_payload("Zero", 0).validate_new().is_ok());
        assert!(movie_payload("", 5).validate_new().is_err());
        assert!(movie_payload(&"x".repeat(151), 5).validate_new().is_err());
        assert!(movie_payload(&"x".repeat(150), 5).validate_new().is_ok());
        assert!(movie_payload("Too good", 11).validate_new().is_err());
        assert!(movie_payload("Too bad", -1).validate_new().is_err());

        let mut long_description = movie_payload("Long", 5);
        long_description.description = "y".repeat(1001);
        assert!(long_description.validate_new().is_err());
    }

    #[test]
    fn new_movie_payload_rejects_any_bad_actor() {
        let payload = NewMoviePayload {
            movie: movie_payload("Oppenheimer", 8),
            actors: vec![
                actor_payload("Cillian Murphy", "male", "1976-05-25"),
                actor_payload("Emily Blunt", "f", "1983-02-23"),
            ],
        };
        let err = payload.validate().unwrap_err();
        assert!(err.to_string().contains("actors[1]"));
    }
}
