//! In-memory implementation of every storage port.
//!
//! Behaves like the Postgres adapter (case-sensitive substring search,
//! stable ordering, `NotFound` on misses) and counts repository round trips
//! so callers can assert how many queries an operation issued.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CatalogError;
use crate::ports::*;
use crate::types::*;

pub const USER_ROLE_ID: RoleId = 1;
pub const ADMIN_ROLE_ID: RoleId = 2;

struct State {
    actors: BTreeMap<ActorId, Actor>,
    movies: BTreeMap<MovieId, Movie>,
    edges: Vec<(MovieId, ActorId)>,
    roles: BTreeMap<RoleId, Role>,
    users: BTreeMap<UserId, User>,
    next_actor_id: ActorId,
    next_movie_id: MovieId,
    next_user_id: UserId,
}

impl Default for State {
    fn default() -> Self {
        let roles = [(USER_ROLE_ID, "user"), (ADMIN_ROLE_ID, ADMIN_ROLE)]
            .into_iter()
            .map(|(id, name)| {
                (
                    id,
                    Role {
                        id,
                        name: name.to_string(),
                    },
                )
            })
            .collect();
        Self {
            actors: BTreeMap::new(),
            movies: BTreeMap::new(),
            edges: Vec::new(),
            roles,
            users: BTreeMap::new(),
            next_actor_id: 1,
            next_movie_id: 1,
            next_user_id: 1,
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    round_trips: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Hand out this store as the full repository capability set.
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            actors: Arc::clone(self) as Arc<dyn ActorStore>,
            movies: Arc::clone(self) as Arc<dyn MovieStore>,
            edges: Arc::clone(self) as Arc<dyn MovieActorStore>,
            roles: Arc::clone(self) as Arc<dyn RoleStore>,
            users: Arc::clone(self) as Arc<dyn UserStore>,
        }
    }

    /// Number of port calls served so far.
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }

    pub fn reset_round_trips(&self) {
        self.round_trips.store(0, Ordering::SeqCst);
    }

    /// Reassign a user's role. Role assignment has no port of its own.
    pub async fn set_user_role(&self, login: &str, role_id: RoleId) -> Result<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .values_mut()
            .find(|u| u.login == login)
            .ok_or_else(|| CatalogError::NotFound(format!("user '{login}'")))?;
        user.role_id = role_id;
        Ok(())
    }

    /// Remove a role row, leaving users that reference it dangling.
    pub async fn remove_role(&self, role_id: RoleId) {
        self.state.write().await.roles.remove(&role_id);
    }

    /// Every stored edge in insertion order.
    pub async fn edges(&self) -> Vec<(MovieId, ActorId)> {
        self.state.read().await.edges.clone()
    }

    fn tick(&self) {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
    }
}

fn group_edges<K, V>(pairs: impl Iterator<Item = (K, V)>) -> HashMap<K, Vec<V>>
where
    K: std::hash::Hash + Eq,
{
    let mut grouped: HashMap<K, Vec<V>> = HashMap::new();
    for (k, v) in pairs {
        grouped.entry(k).or_default().push(v);
    }
    grouped
}

fn sort_actors(actors: &mut [Actor], order: ActorOrder) {
    match order {
        ActorOrder::Id => actors.sort_by_key(|a| a.id),
        ActorOrder::Name => actors.sort_by(|a, b| a.name.cmp(&b.name)),
        ActorOrder::BirthDateDesc => actors.sort_by(|a, b| b.birth_date.cmp(&a.birth_date)),
    }
}

fn sort_movies(movies: &mut [Movie], order: MovieOrder) {
    match order {
        MovieOrder::RatingDesc => movies.sort_by(|a, b| b.rating.cmp(&a.rating)),
        MovieOrder::Title => movies.sort_by(|a, b| a.title.cmp(&b.title)),
        MovieOrder::ReleaseDateDesc => {
            movies.sort_by(|a, b| b.release_date.cmp(&a.release_date))
        }
    }
}

#[async_trait]
impl ActorStore for MemoryStore {
    async fn create(&self, actor: &NewActor) -> Result<Actor> {
        self.tick();
        let mut state = self.state.write().await;
        let id = state.next_actor_id;
        state.next_actor_id += 1;
        let stored = actor.clone().with_id(id);
        state.actors.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete_by_name(&self, name: &str) -> Result<u64> {
        self.tick();
        let mut state = self.state.write().await;
        let before = state.actors.len();
        state.actors.retain(|_, a| a.name != name);
        Ok((before - state.actors.len()) as u64)
    }

    async fn update(&self, actor: &Actor) -> Result<u64> {
        self.tick();
        let mut state = self.state.write().await;
        match state.actors.get_mut(&actor.id) {
            Some(slot) => {
                *slot = actor.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn get_by_id(&self, id: ActorId) -> Result<Actor> {
        self.tick();
        self.state
            .read()
            .await
            .actors
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("actor {id}")))
    }

    async fn get_by_name(&self, name: &str) -> Result<Actor> {
        self.tick();
        self.state
            .read()
            .await
            .actors
            .values()
            .find(|a| a.name == name)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("actor '{name}'")))
    }

    async fn list_like_name(&self, fragment: &str, order: ActorOrder) -> Result<Vec<Actor>> {
        self.tick();
        let mut actors: Vec<Actor> = self
            .state
            .read()
            .await
            .actors
            .values()
            .filter(|a| a.name.contains(fragment))
            .cloned()
            .collect();
        sort_actors(&mut actors, order);
        Ok(actors)
    }

    async fn get_map_by_ids(&self, ids: &[ActorId]) -> Result<HashMap<ActorId, Actor>> {
        self.tick();
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.actors.get(id).map(|a| (*id, a.clone())))
            .collect())
    }
}

#[async_trait]
impl MovieStore for MemoryStore {
    async fn create(&self, movie: &NewMovie) -> Result<Movie> {
        self.tick();
        let mut state = self.state.write().await;
        let id = state.next_movie_id;
        state.next_movie_id += 1;
        let stored = movie.clone().with_id(id);
        state.movies.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete_by_id(&self, id: MovieId) -> Result<u64> {
        self.tick();
        Ok(self.state.write().await.movies.remove(&id).map_or(0, |_| 1))
    }

    async fn update(&self, movie: &Movie) -> Result<u64> {
        self.tick();
        let mut state = self.state.write().await;
        match state.movies.get_mut(&movie.id) {
            Some(slot) => {
                *slot = movie.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn get_by_id(&self, id: MovieId) -> Result<Movie> {
        self.tick();
        self.state
            .read()
            .await
            .movies
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("movie {id}")))
    }

    async fn list_like_title(&self, fragment: &str, order: MovieOrder) -> Result<Vec<Movie>> {
        self.tick();
        let mut movies: Vec<Movie> = self
            .state
            .read()
            .await
            .movies
            .values()
            .filter(|m| m.title.contains(fragment))
            .cloned()
            .collect();
        sort_movies(&mut movies, order);
        Ok(movies)
    }

    async fn list_by_ids(&self, ids: &[MovieId], order: MovieOrder) -> Result<Vec<Movie>> {
        self.tick();
        let wanted: HashSet<MovieId> = ids.iter().copied().collect();
        let mut movies: Vec<Movie> = self
            .state
            .read()
            .await
            .movies
            .values()
            .filter(|m| wanted.contains(&m.id))
            .cloned()
            .collect();
        sort_movies(&mut movies, order);
        Ok(movies)
    }

    async fn get_map_by_ids(&self, ids: &[MovieId]) -> Result<HashMap<MovieId, Movie>> {
        self.tick();
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.movies.get(id).map(|m| (*id, m.clone())))
            .collect())
    }
}

#[async_trait]
impl MovieActorStore for MemoryStore {
    async fn create_edges(&self, movie_id: MovieId, actor_ids: &[ActorId]) -> Result<()> {
        self.tick();
        let mut state = self.state.write().await;
        for actor_id in actor_ids {
            let pair = (movie_id, *actor_id);
            if !state.edges.contains(&pair) {
                state.edges.push(pair);
            }
        }
        Ok(())
    }

    async fn edges_by_movie_ids(
        &self,
        movie_ids: &[MovieId],
    ) -> Result<HashMap<MovieId, Vec<ActorId>>> {
        self.tick();
        let wanted: HashSet<MovieId> = movie_ids.iter().copied().collect();
        let state = self.state.read().await;
        Ok(group_edges(
            state
                .edges
                .iter()
                .filter(|(m, _)| wanted.contains(m))
                .copied(),
        ))
    }

    async fn edges_by_actor_ids(
        &self,
        actor_ids: &[ActorId],
    ) -> Result<HashMap<ActorId, Vec<MovieId>>> {
        self.tick();
        let wanted: HashSet<ActorId> = actor_ids.iter().copied().collect();
        let state = self.state.read().await;
        Ok(group_edges(
            state
                .edges
                .iter()
                .filter(|(_, a)| wanted.contains(a))
                .map(|(m, a)| (*a, *m)),
        ))
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn get_by_id(&self, id: RoleId) -> Result<Role> {
        self.tick();
        self.state
            .read()
            .await
            .roles
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("role with id {id}")))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_by_login(&self, login: &str) -> Result<User> {
        self.tick();
        self.state
            .read()
            .await
            .users
            .values()
            .find(|u| u.login == login)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("user '{login}'")))
    }

    async fn create(&self, user: &NewUser) -> Result<User> {
        self.tick();
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.login == user.login) {
            return Err(CatalogError::Conflict(format!(
                "user '{}' already exists",
                user.login
            )));
        }
        let id = state.next_user_id;
        state.next_user_id += 1;
        let stored = User {
            id,
            login: user.login.clone(),
            password_hash: user.password_hash.clone(),
            role_id: USER_ROLE_ID,
        };
        state.users.insert(id, stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn new_actor(name: &str, birth: (i32, u32, u32)) -> NewActor {
        NewActor {
            name: name.into(),
            gender: Gender::Male,
            birth_date: NaiveDate::from_ymd_opt(birth.0, birth.1, birth.2).unwrap(),
        }
    }

    #[tokio::test]
    async fn actor_lookup_misses_are_not_found() {
        let store = MemoryStore::new();
        let err = ActorStore::get_by_id(&store, 42).await.unwrap_err();
        assert!(err.is_not_found());
        let err = store.get_by_name("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn list_like_name_is_case_sensitive_substring() {
        let store = MemoryStore::new();
        ActorStore::create(&store, &new_actor("Cillian Murphy", (1976, 5, 25)))
            .await
            .unwrap();
        ActorStore::create(&store, &new_actor("Emily Blunt", (1983, 2, 23)))
            .await
            .unwrap();
        let hits = store.list_like_name("Murph", ActorOrder::Id).await.unwrap();
        assert_eq!(hits.len(), 1);
        let hits = store.list_like_name("murph", ActorOrder::Id).await.unwrap();
        assert!(hits.is_empty());
        let all = store.list_like_name("", ActorOrder::Id).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn create_edges_ignores_existing_pairs() {
        let store = MemoryStore::new();
        store.create_edges(1, &[1, 2, 1]).await.unwrap();
        store.create_edges(1, &[2]).await.unwrap();
        assert_eq!(store.edges().await, vec![(1, 1), (1, 2)]);
    }

    #[tokio::test]
    async fn duplicate_login_is_conflict() {
        let store = MemoryStore::new();
        let user = NewUser {
            login: "alice".into(),
            password_hash: "h".into(),
        };
        UserStore::create(&store, &user).await.unwrap();
        let err = UserStore::create(&store, &user).await.unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));
    }

    #[tokio::test]
    async fn round_trips_are_counted_per_call() {
        let store = MemoryStore::new();
        assert_eq!(store.round_trips(), 0);
        let _ = store.edges_by_movie_ids(&[1, 2, 3]).await.unwrap();
        let _ = ActorStore::get_map_by_ids(&store, &[1, 2]).await.unwrap();
        assert_eq!(store.round_trips(), 2);
        store.reset_round_trips();
        assert_eq!(store.round_trips(), 0);
    }
}
