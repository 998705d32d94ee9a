//! Actor resolution-on-write.
//!
//! Movie creation references its cast by name. Each candidate is resolved in
//! list order to an existing actor (exact name match) or created from the
//! candidate payload. A candidate that cannot be resolved is recorded and
//! skipped; the rest still resolve.

use serde::Serialize;
use tracing::{debug, warn};

use crate::ports::ActorStore;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// An actor with this name already existed; the candidate's payload is discarded.
    Reused(Actor),
    Created(Actor),
    Failed(ResolutionFailure),
}

/// A candidate that resolved to no actor id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionFailure {
    pub name: String,
    pub error: String,
}

/// Per-candidate outcomes, in candidate order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorResolution {
    pub outcomes: Vec<ResolutionOutcome>,
}

impl ActorResolution {
    /// Resolved actors in candidate order.
    pub fn actors(&self) -> Vec<Actor> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ResolutionOutcome::Reused(a) | ResolutionOutcome::Created(a) => Some(a.clone()),
                ResolutionOutcome::Failed(_) => None,
            })
            .collect()
    }

    /// Ids to link. May be shorter than the candidate list.
    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.actors().iter().map(|a| a.id).collect()
    }

    pub fn failures(&self) -> Vec<ResolutionFailure> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ResolutionOutcome::Failed(f) => Some(f.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_partial(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o, ResolutionOutcome::Failed(_)))
    }
}

pub async fn resolve_or_create_actors(
    actors: &dyn ActorStore,
    candidates: Vec<NewActor>,
) -> ActorResolution {
    let mut outcomes = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let outcome = match actors.get_by_name(&candidate.name).await {
            Ok(existing) => {
                debug!(name = %existing.name, actor_id = existing.id, "reusing actor");
                ResolutionOutcome::Reused(existing)
            }
            Err(e) if e.is_not_found() => match actors.create(&candidate).await {
                Ok(created) => {
                    debug!(name = %created.name, actor_id = created.id, "created actor");
                    ResolutionOutcome::Created(created)
                }
                Err(e) => failed(candidate.name, e),
            },
            Err(e) => failed(candidate.name, e),
        };
        outcomes.push(outcome);
    }
    ActorResolution { outcomes }
}

fn failed(name: String, error: crate::error::CatalogError) -> ResolutionOutcome {
    warn!(name = %name, error = %error, "actor could not be resolved, skipping");
    ResolutionOutcome::Failed(ResolutionFailure {
        name,
        error: error.to_string(),
    })
}
