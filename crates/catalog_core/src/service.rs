//! CatalogService: the domain service behind the HTTP surface.
//!
//! Takes its repositories and the access authority as `Arc<dyn Trait>` so the
//! same logic runs against Postgres or `MemoryStore`. Admin gating is not
//! applied here: handlers call `require_admin` before mutating operations.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::CatalogError;
use crate::merge::{ActorChanges, MovieChanges};
use crate::ports::{AccessAuthority, Repositories, Result};
use crate::principal::Principal;
use crate::relation::{actors_with_movies, movies_with_actors, unique_values};
use crate::resolution::{resolve_or_create_actors, ResolutionFailure};
use crate::types::*;

/// Lifetime of the token handed out on registration.
pub const REGISTER_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);
/// Lifetime of the token handed out on login.
pub const LOGIN_TOKEN_TTL: Duration = Duration::from_secs(5 * 60 * 60);

/// Result of a movie creation: the linked view plus any cast member that
/// could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieCreation {
    #[serde(flatten)]
    pub view: MovieView,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<ResolutionFailure>,
}

// ── CatalogService trait ──────────────────────────────────────

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn create_actor(&self, payload: ActorPayload) -> Result<Actor>;

    /// Delete every actor with this exact name. Zero rows is not an error.
    async fn delete_actor(&self, name: &str) -> Result<u64>;

    /// Partial update. The stored row is re-read after the write.
    async fn update_actor(&self, payload: ActorPayload) -> Result<Actor>;

    async fn search_actors(&self, name_fragment: &str, order: ActorOrder)
        -> Result<Vec<ActorView>>;

    /// Persist the movie, resolve its cast by name and link the resolved actors.
    async fn create_movie(&self, payload: NewMoviePayload) -> Result<MovieCreation>;

    async fn delete_movie(&self, id: MovieId) -> Result<u64>;

    async fn update_movie(&self, payload: MoviePayload) -> Result<Movie>;

    async fn search_movies_by_title(
        &self,
        title_fragment: &str,
        order: MovieOrder,
    ) -> Result<Vec<MovieView>>;

    /// Movies featuring any actor whose name contains the fragment, each with its full cast.
    async fn search_movies_by_actor(
        &self,
        name_fragment: &str,
        order: MovieOrder,
    ) -> Result<Vec<MovieView>>;

    /// Create a user with the default role and return a fresh token.
    async fn register_user(&self, credentials: Credentials) -> Result<String>;

    async fn login(&self, credentials: Credentials) -> Result<String>;

    async fn authenticate(&self, token: &str) -> Result<Principal>;

    /// Fresh role lookup. Lookup failures count as "does not have the role".
    async fn has_role(&self, principal: &Principal, role: &str) -> bool;

    /// `Unauthorized` unless `has_role` holds. A storage outage during the
    /// lookup is logged and also reported as `Unauthorized` (HTTP 403), not
    /// as a storage failure.
    async fn require_role(&self, principal: &Principal, role: &str) -> Result<()> {
        if self.has_role(principal, role).await {
            Ok(())
        } else {
            Err(CatalogError::Unauthorized(format!(
                "'{}' does not have role '{role}'",
                principal.login
            )))
        }
    }

    async fn require_admin(&self, principal: &Principal) -> Result<()> {
        self.require_role(principal, ADMIN_ROLE).await
    }
}

// ── CatalogServiceImpl ────────────────────────────────────────

pub struct CatalogServiceImpl {
    repos: Repositories,
    authority: Arc<dyn AccessAuthority>,
}

impl CatalogServiceImpl {
    pub fn new(repos: Repositories, authority: Arc<dyn AccessAuthority>) -> Self {
        Self { repos, authority }
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn create_actor(&self, payload: ActorPayload) -> Result<Actor> {
        info!(name = %payload.name, "create actor");
        let actor = payload.validate_new()?;
        self.repos.actors.create(&actor).await
    }

    async fn delete_actor(&self, name: &str) -> Result<u64> {
        info!(name, "delete actor");
        self.repos.actors.delete_by_name(name).await
    }

    async fn update_actor(&self, payload: ActorPayload) -> Result<Actor> {
        info!(actor_id = payload.id, "update actor");
        let changes = ActorChanges::from_payload(&payload)?;
        let stored = self.repos.actors.get_by_id(payload.id).await?;
        let merged = changes.apply(&stored);
        self.repos.actors.update(&merged).await?;
        self.repos.actors.get_by_id(merged.id).await
    }

    async fn search_actors(
        &self,
        name_fragment: &str,
        order: ActorOrder,
    ) -> Result<Vec<ActorView>> {
        info!(name = name_fragment, ?order, "search actors");
        let actors = self.repos.actors.list_like_name(name_fragment, order).await?;
        actors_with_movies(self.repos.edges.as_ref(), self.repos.movies.as_ref(), actors).await
    }

    async fn create_movie(&self, payload: NewMoviePayload) -> Result<MovieCreation> {
        info!(title = %payload.movie.title, cast = payload.actors.len(), "create movie");
        let (new_movie, candidates) = payload.validate()?;
        let movie = self.repos.movies.create(&new_movie).await?;

        let resolution = resolve_or_create_actors(self.repos.actors.as_ref(), candidates).await;
        let actor_ids = unique_values(resolution.actor_ids());
        if !actor_ids.is_empty() {
            self.repos.edges.create_edges(movie.id, &actor_ids).await?;
        }

        let unresolved = resolution.failures();
        if !unresolved.is_empty() {
            warn!(
                movie_id = movie.id,
                unresolved = unresolved.len(),
                "movie created with a partial cast"
            );
        }

        let mut actors = resolution.actors();
        let mut seen = HashSet::new();
        actors.retain(|a| seen.insert(a.id));
        Ok(MovieCreation {
            view: MovieView { movie, actors },
            unresolved,
        })
    }

    async fn delete_movie(&self, id: MovieId) -> Result<u64> {
        info!(movie_id = id, "delete movie");
        self.repos.movies.delete_by_id(id).await
    }

    async fn update_movie(&self, payload: MoviePayload) -> Result<Movie> {
        info!(movie_id = payload.id, "update movie");
        let changes = MovieChanges::from_payload(&payload)?;
        let stored = self.repos.movies.get_by_id(payload.id).await?;
        let merged = changes.apply(&stored);
        self.repos.movies.update(&merged).await?;
        self.repos.movies.get_by_id(merged.id).await
    }

    async fn search_movies_by_title(
        &self,
        title_fragment: &str,
        order: MovieOrder,
    ) -> Result<Vec<MovieView>> {
        info!(title = title_fragment, ?order, "search movies by title");
        let movies = self.repos.movies.list_like_title(title_fragment, order).await?;
        movies_with_actors(self.repos.edges.as_ref(), self.repos.actors.as_ref(), movies).await
    }

    async fn search_movies_by_actor(
        &self,
        name_fragment: &str,
        order: MovieOrder,
    ) -> Result<Vec<MovieView>> {
        info!(name = name_fragment, ?order, "search movies by actor");
        let actors = self.repos.actors.list_like_name(name_fragment, ActorOrder::Id).await?;
        if actors.is_empty() {
            return Ok(Vec::new());
        }
        let actor_ids: Vec<ActorId> = actors.iter().map(|a| a.id).collect();
        let edges = self.repos.edges.edges_by_actor_ids(&actor_ids).await?;
        let movie_ids = unique_values(
            actor_ids
                .iter()
                .filter_map(|id| edges.get(id))
                .flat_map(|ids| ids.iter().copied()),
        );
        if movie_ids.is_empty() {
            return Ok(Vec::new());
        }
        let movies = self.repos.movies.list_by_ids(&movie_ids, order).await?;
        movies_with_actors(self.repos.edges.as_ref(), self.repos.actors.as_ref(), movies).await
    }

    async fn register_user(&self, credentials: Credentials) -> Result<String> {
        info!(login = %credentials.login, "register user");
        credentials.validate()?;
        let password_hash = self.authority.hash_password(&credentials.pass)?;
        let user = self
            .repos
            .users
            .create(&NewUser {
                login: credentials.login,
                password_hash,
            })
            .await?;
        self.authority.issue_token(&user.login, REGISTER_TOKEN_TTL)
    }

    async fn login(&self, credentials: Credentials) -> Result<String> {
        info!(login = %credentials.login, "login");
        credentials.validate()?;
        let user = match self.repos.users.get_by_login(&credentials.login).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => return Err(wrong_credentials()),
            Err(e) => return Err(e),
        };
        self.authority
            .verify_password(&user.password_hash, &credentials.pass)
            .map_err(|_| wrong_credentials())?;
        self.authority.issue_token(&user.login, LOGIN_TOKEN_TTL)
    }

    async fn authenticate(&self, token: &str) -> Result<Principal> {
        self.authority.validate_token(token)
    }

    async fn has_role(&self, principal: &Principal, role: &str) -> bool {
        let user = match self.repos.users.get_by_login(&principal.login).await {
            Ok(user) => user,
            Err(e) => {
                warn!(login = %principal.login, error = %e, "role check: user lookup failed");
                return false;
            }
        };
        match self.repos.roles.get_by_id(user.role_id).await {
            Ok(r) => r.name == role,
            Err(e) => {
                warn!(login = %principal.login, role_id = user.role_id, error = %e, "role check: role lookup failed");
                false
            }
        }
    }
}

fn wrong_credentials() -> CatalogError {
    CatalogError::Unauthenticated("wrong login or password".into())
}
