//! Storage and access port traits.
//! Implemented by catalog_postgres and `memory::MemoryStore`. Core logic
//! depends only on these traits.
//!
//! Every call is one repository round trip. Lookups that miss return
//! `CatalogError::NotFound`; driver failures surface as `CatalogError::Storage`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::principal::Principal;
use crate::types::*;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[async_trait]
pub trait ActorStore: Send + Sync {
    /// Insert an actor and return it with its assigned id.
    async fn create(&self, actor: &NewActor) -> Result<Actor>;

    /// Delete every actor with exactly this name. Returns rows affected.
    async fn delete_by_name(&self, name: &str) -> Result<u64>;

    /// Overwrite all columns of the actor with `actor.id`. Returns rows affected.
    async fn update(&self, actor: &Actor) -> Result<u64>;

    async fn get_by_id(&self, id: ActorId) -> Result<Actor>;

    /// Exact name match. When several actors share a name the lowest id wins.
    async fn get_by_name(&self, name: &str) -> Result<Actor>;

    /// Substring match on name, ordered by `order`.
    async fn list_like_name(&self, fragment: &str, order: ActorOrder) -> Result<Vec<Actor>>;

    /// Batched fetch. Ids without a row are simply absent from the map.
    async fn get_map_by_ids(&self, ids: &[ActorId]) -> Result<HashMap<ActorId, Actor>>;
}

#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn create(&self, movie: &NewMovie) -> Result<Movie>;

    async fn delete_by_id(&self, id: MovieId) -> Result<u64>;

    async fn update(&self, movie: &Movie) -> Result<u64>;

    async fn get_by_id(&self, id: MovieId) -> Result<Movie>;

    /// Substring match on title, ordered by `order`.
    async fn list_like_title(&self, fragment: &str, order: MovieOrder) -> Result<Vec<Movie>>;

    /// Batched fetch preserving `order`. Missing ids are skipped.
    async fn list_by_ids(&self, ids: &[MovieId], order: MovieOrder) -> Result<Vec<Movie>>;

    /// Batched fetch keyed by id. Missing ids are absent from the map.
    async fn get_map_by_ids(&self, ids: &[MovieId]) -> Result<HashMap<MovieId, Movie>>;
}

/// The movie/actor join table.
#[async_trait]
pub trait MovieActorStore: Send + Sync {
    /// Link one movie to many actors in a single write. Existing pairs are kept.
    async fn create_edges(&self, movie_id: MovieId, actor_ids: &[ActorId]) -> Result<()>;

    /// movie id → actor ids, each list in edge-table order.
    async fn edges_by_movie_ids(
        &self,
        movie_ids: &[MovieId],
    ) -> Result<HashMap<MovieId, Vec<ActorId>>>;

    /// actor id → movie ids, each list in edge-table order.
    async fn edges_by_actor_ids(
        &self,
        actor_ids: &[ActorId],
    ) -> Result<HashMap<ActorId, Vec<MovieId>>>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn get_by_id(&self, id: RoleId) -> Result<Role>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_login(&self, login: &str) -> Result<User>;

    /// Insert with the default role. A taken login is `CatalogError::Conflict`.
    async fn create(&self, user: &NewUser) -> Result<User>;
}

/// Token issuance/validation and password hashing.
///
/// Implementations must fail cleanly: a bad token or password is
/// `CatalogError::Unauthenticated`, never a panic.
pub trait AccessAuthority: Send + Sync {
    fn issue_token(&self, login: &str, ttl: Duration) -> Result<String>;

    /// Validate the token and extract the caller identity.
    fn validate_token(&self, token: &str) -> Result<Principal>;

    fn hash_password(&self, password: &str) -> Result<String>;

    fn verify_password(&self, password_hash: &str, password: &str) -> Result<()>;
}

/// The full repository capability set, bundled for service construction.
#[derive(Clone)]
pub struct Repositories {
    pub actors: Arc<dyn ActorStore>,
    pub movies: Arc<dyn MovieStore>,
    pub edges: Arc<dyn MovieActorStore>,
    pub roles: Arc<dyn RoleStore>,
    pub users: Arc<dyn UserStore>,
}
