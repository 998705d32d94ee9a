//! Postgres implementations of all catalog_core port traits.
//!
//! Each adapter is a newtype wrapping PgPool. All SQL is runtime-checked
//! (sqlx::query_as, not sqlx::query_as!) to avoid a compile-time DB requirement.
//! Substring searches use `strpos`, so `%` and `_` in a fragment match literally.

use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use catalog_core::error::CatalogError;
use catalog_core::ports::{
    ActorStore, MovieActorStore, MovieStore, Repositories, Result, RoleStore, UserStore,
};
use catalog_core::types::*;

use crate::sqlx_types::{PgActorRow, PgEdgeRow, PgMovieRow, PgRoleRow, PgUserRow};

fn actor_from_row(row: PgActorRow) -> Result<Actor> {
    row.try_into()
        .map_err(|e: String| CatalogError::Storage(anyhow!(e)))
}

fn actor_order_sql(order: ActorOrder) -> &'static str {
    match order {
        ActorOrder::Id => "id",
        ActorOrder::Name => "name, id",
        ActorOrder::BirthDateDesc => "birth_date DESC, id",
    }
}

fn movie_order_sql(order: MovieOrder) -> &'static str {
    match order {
        MovieOrder::RatingDesc => "rating DESC, id",
        MovieOrder::Title => "title, id",
        MovieOrder::ReleaseDateDesc => "release_date DESC, id",
    }
}

// ── PgActorStore ──────────────────────────────────────────────

pub struct PgActorStore {
    pool: PgPool,
}

impl PgActorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActorStore for PgActorStore {
    async fn create(&self, actor: &NewActor) -> Result<Actor> {
        let row = sqlx::query_as::<_, PgActorRow>(
            r#"
            INSERT INTO actors (name, gender, birth_date)
            VALUES ($1, $2, $3)
            RETURNING id, name, gender, birth_date
            "#,
        )
        .bind(&actor.name)
        .bind(actor.gender.as_str())
        .bind(actor.birth_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        actor_from_row(row)
    }

    async fn delete_by_name(&self, name: &str) -> Result<u64> {
        let res = sqlx::query("DELETE FROM actors WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(res.rows_affected())
    }

    async fn update(&self, actor: &Actor) -> Result<u64> {
        let res = sqlx::query(
            "UPDATE actors SET name = $2, gender = $3, birth_date = $4 WHERE id = $1",
        )
        .bind(actor.id)
        .bind(&actor.name)
        .bind(actor.gender.as_str())
        .bind(actor.birth_date)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(res.rows_affected())
    }

    async fn get_by_id(&self, id: ActorId) -> Result<Actor> {
        let row = sqlx::query_as::<_, PgActorRow>(
            "SELECT id, name, gender, birth_date FROM actors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?
        .ok_or_else(|| CatalogError::NotFound(format!("actor {id}")))?;
        actor_from_row(row)
    }

    async fn get_by_name(&self, name: &str) -> Result<Actor> {
        let row = sqlx::query_as::<_, PgActorRow>(
            r#"
            SELECT id, name, gender, birth_date
            FROM actors
            WHERE name = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?
        .ok_or_else(|| CatalogError::NotFound(format!("actor '{name}'")))?;
        actor_from_row(row)
    }

    async fn list_like_name(&self, fragment: &str, order: ActorOrder) -> Result<Vec<Actor>> {
        let query = format!(
            r#"
            SELECT id, name, gender, birth_date
            FROM actors
            WHERE strpos(name, $1) > 0
            ORDER BY {}
            "#,
            actor_order_sql(order)
        );
        let rows = sqlx::query_as::<_, PgActorRow>(&query)
            .bind(fragment)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        rows.into_iter().map(actor_from_row).collect()
    }

    async fn get_map_by_ids(&self, ids: &[ActorId]) -> Result<HashMap<ActorId, Actor>> {
        let rows = sqlx::query_as::<_, PgActorRow>(
            "SELECT id, name, gender, birth_date FROM actors WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        rows.into_iter()
            .map(|r| actor_from_row(r).map(|a| (a.id, a)))
            .collect()
    }
}

// ── PgMovieStore ──────────────────────────────────────────────

pub struct PgMovieStore {
    pool: PgPool,
}

impl PgMovieStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieStore for PgMovieStore {
    async fn create(&self, movie: &NewMovie) -> Result<Movie> {
        let row = sqlx::query_as::<_, PgMovieRow>(
            r#"
            INSERT INTO movies (title, description, release_date, rating)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, release_date, rating
            "#,
        )
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(movie.release_date)
        .bind(movie.rating)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(row.into())
    }

    async fn delete_by_id(&self, id: MovieId) -> Result<u64> {
        let res = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(res.rows_affected())
    }

    async fn update(&self, movie: &Movie) -> Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE movies
            SET title = $2, description = $3, release_date = $4, rating = $5
            WHERE id = $1
            "#,
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(movie.release_date)
        .bind(movie.rating)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(res.rows_affected())
    }

    async fn get_by_id(&self, id: MovieId) -> Result<Movie> {
        sqlx::query_as::<_, PgMovieRow>(
            "SELECT id, title, description, release_date, rating FROM movies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?
        .map(Movie::from)
        .ok_or_else(|| CatalogError::NotFound(format!("movie {id}")))
    }

    async fn list_like_title(&self, fragment: &str, order: MovieOrder) -> Result<Vec<Movie>> {
        let query = format!(
            r#"
            SELECT id, title, description, release_date, rating
            FROM movies
            WHERE strpos(title, $1) > 0
            ORDER BY {}
            "#,
            movie_order_sql(order)
        );
        let rows = sqlx::query_as::<_, PgMovieRow>(&query)
            .bind(fragment)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn list_by_ids(&self, ids: &[MovieId], order: MovieOrder) -> Result<Vec<Movie>> {
        let query = format!(
            r#"
            SELECT id, title, description, release_date, rating
            FROM movies
            WHERE id = ANY($1)
            ORDER BY {}
            "#,
            movie_order_sql(order)
        );
        let rows = sqlx::query_as::<_, PgMovieRow>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn get_map_by_ids(&self, ids: &[MovieId]) -> Result<HashMap<MovieId, Movie>> {
        let rows = sqlx::query_as::<_, PgMovieRow>(
            "SELECT id, title, description, release_date, rating FROM movies WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?;
        Ok(rows
            .into_iter()
            .map(|r| (r.id, Movie::from(r)))
            .collect())
    }
}

// ── PgMovieActorStore ─────────────────────────────────────────

pub struct PgMovieActorStore {
    pool: PgPool,
}

impl PgMovieActorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn edges_where(&self, column: &str, ids: &[i32]) -> Result<Vec<PgEdgeRow>> {
        let query = format!(
            "SELECT movie_id, actor_id FROM movies_actors WHERE {column} = ANY($1) ORDER BY seq"
        );
        let rows = sqlx::query_as::<_, PgEdgeRow>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(rows)
    }
}

#[async_trait]
impl MovieActorStore for PgMovieActorStore {
    async fn create_edges(&self, movie_id: MovieId, actor_ids: &[ActorId]) -> Result<()> {
        if actor_ids.is_empty() {
            return Ok(());
        }
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO movies_actors (movie_id, actor_id) ");
        builder.push_values(actor_ids, |mut row, actor_id| {
            row.push_bind(movie_id).push_bind(*actor_id);
        });
        builder.push(" ON CONFLICT DO NOTHING");
        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(())
    }

    async fn edges_by_movie_ids(
        &self,
        movie_ids: &[MovieId],
    ) -> Result<HashMap<MovieId, Vec<ActorId>>> {
        let mut grouped: HashMap<MovieId, Vec<ActorId>> = HashMap::new();
        for edge in self.edges_where("movie_id", movie_ids).await? {
            grouped.entry(edge.movie_id).or_default().push(edge.actor_id);
        }
        Ok(grouped)
    }

    async fn edges_by_actor_ids(
        &self,
        actor_ids: &[ActorId],
    ) -> Result<HashMap<ActorId, Vec<MovieId>>> {
        let mut grouped: HashMap<ActorId, Vec<MovieId>> = HashMap::new();
        for edge in self.edges_where("actor_id", actor_ids).await? {
            grouped.entry(edge.actor_id).or_default().push(edge.movie_id);
        }
        Ok(grouped)
    }
}

// ── PgRoleStore ───────────────────────────────────────────────

pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn get_by_id(&self, id: RoleId) -> Result<Role> {
        sqlx::query_as::<_, PgRoleRow>("SELECT id, name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| anyhow!(e))?
            .map(Role::from)
            .ok_or_else(|| CatalogError::NotFound(format!("role with id {id}")))
    }
}

// ── PgUserStore ───────────────────────────────────────────────

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_login(&self, login: &str) -> Result<User> {
        sqlx::query_as::<_, PgUserRow>(
            "SELECT id, login, pass, role_id FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!(e))?
        .map(User::from)
        .ok_or_else(|| CatalogError::NotFound(format!("user '{login}'")))
    }

    async fn create(&self, user: &NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, PgUserRow>(
            r#"
            INSERT INTO users (login, pass)
            VALUES ($1, $2)
            RETURNING id, login, pass, role_id
            "#,
        )
        .bind(&user.login)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                CatalogError::Conflict(format!("user '{}' already exists", user.login))
            }
            other => CatalogError::Storage(anyhow!(other)),
        })?;
        Ok(row.into())
    }
}

// ── PgStores ──────────────────────────────────────────────────

/// Every adapter over one shared pool.
pub struct PgStores {
    pub actors: PgActorStore,
    pub movies: PgMovieStore,
    pub edges: PgMovieActorStore,
    pub roles: PgRoleStore,
    pub users: PgUserStore,
}

impl PgStores {
    pub fn new(pool: PgPool) -> Self {
        Self {
            actors: PgActorStore::new(pool.clone()),
            movies: PgMovieStore::new(pool.clone()),
            edges: PgMovieActorStore::new(pool.clone()),
            roles: PgRoleStore::new(pool.clone()),
            users: PgUserStore::new(pool),
        }
    }

    pub fn into_repositories(self) -> Repositories {
        use std::sync::Arc;

        Repositories {
            actors: Arc::new(self.actors),
            movies: Arc::new(self.movies),
            edges: Arc::new(self.edges),
            roles: Arc::new(self.roles),
            users: Arc::new(self.users),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_clauses_break_ties_by_id() {
        assert_eq!(actor_order_sql(ActorOrder::Id), "id");
        assert_eq!(actor_order_sql(ActorOrder::BirthDateDesc), "birth_date DESC, id");
        assert_eq!(movie_order_sql(MovieOrder::default()), "rating DESC, id");
        assert_eq!(movie_order_sql(MovieOrder::Title), "title, id");
    }

    #[test]
    fn unknown_gender_in_row_is_a_storage_error() {
        let row = PgActorRow {
            id: 3,
            name: "x".into(),
            gender: "other".into(),
            birth_date: chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        };
        let err = actor_from_row(row).unwrap_err();
        assert!(matches!(err, CatalogError::Storage(_)));
    }
}
