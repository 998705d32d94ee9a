//! Relation resolver: builds denormalized views from normalized storage.
//!
//! Each direction costs exactly two batched round trips, edges then the
//! opposite entities, regardless of how many primary entities are passed in.
//! An empty input issues no query at all, and an edge set that references no
//! secondary entity skips the second query.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use tracing::debug;

use crate::ports::{ActorStore, MovieActorStore, MovieStore, Result};
use crate::types::*;

/// Stable de-duplication: first occurrence wins, input order is kept.
pub fn unique_values<T>(values: impl IntoIterator<Item = T>) -> Vec<T>
where
    T: Eq + Hash + Copy,
{
    let mut seen = HashSet::new();
    values.into_iter().filter(|v| seen.insert(*v)).collect()
}

/// Attach to every movie the actors reachable through its edges.
pub async fn movies_with_actors(
    edges: &dyn MovieActorStore,
    actors: &dyn ActorStore,
    movies: Vec<Movie>,
) -> Result<Vec<MovieView>> {
    if movies.is_empty() {
        return Ok(Vec::new());
    }
    let movie_ids = unique_values(movies.iter().map(|m| m.id));
    let edge_map = edges.edges_by_movie_ids(&movie_ids).await?;
    let actor_ids = unique_values(flatten_in_order(&movie_ids, &edge_map));
    let actor_map = if actor_ids.is_empty() {
        HashMap::new()
    } else {
        actors.get_map_by_ids(&actor_ids).await?
    };

    Ok(movies
        .into_iter()
        .map(|movie| {
            let actors = stitch(movie.id, &edge_map, &actor_map, "actor");
            MovieView { movie, actors }
        })
        .collect())
}

/// Attach to every actor the movies reachable through its edges.
pub async fn actors_with_movies(
    edges: &dyn MovieActorStore,
    movies: &dyn MovieStore,
    actors: Vec<Actor>,
) -> Result<Vec<ActorView>> {
    if actors.is_empty() {
        return Ok(Vec::new());
    }
    let actor_ids = unique_values(actors.iter().map(|a| a.id));
    let edge_map = edges.edges_by_actor_ids(&actor_ids).await?;
    let movie_ids = unique_values(flatten_in_order(&actor_ids, &edge_map));
    let movie_map = if movie_ids.is_empty() {
        HashMap::new()
    } else {
        movies.get_map_by_ids(&movie_ids).await?
    };

    Ok(actors
        .into_iter()
        .map(|actor| {
            let movies = stitch(actor.id, &edge_map, &movie_map, "movie");
            ActorView { actor, movies }
        })
        .collect())
}

/// Secondary ids in primary-input order, then edge order.
fn flatten_in_order<'a>(
    primary_ids: &'a [i32],
    edge_map: &'a HashMap<i32, Vec<i32>>,
) -> impl Iterator<Item = i32> + 'a {
    primary_ids
        .iter()
        .filter_map(|id| edge_map.get(id))
        .flat_map(|targets| targets.iter().copied())
}

fn stitch<T: Clone>(
    primary_id: i32,
    edge_map: &HashMap<i32, Vec<i32>>,
    resolved: &HashMap<i32, T>,
    kind: &str,
) -> Vec<T> {
    let Some(targets) = edge_map.get(&primary_id) else {
        return Vec::new();
    };
    targets
        .iter()
        .filter_map(|id| {
            let hit = resolved.get(id).cloned();
            if hit.is_none() {
                debug!(primary_id, missing_id = *id, kind, "edge points at a missing row, skipped");
            }
            hit
        })
        .collect()
}
