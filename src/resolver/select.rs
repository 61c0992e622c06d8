//! Candidate filtering and tie-break rules.

use crate::model::Actor;

/// A public actor that has not been destroyed.
pub fn live_public(actor: &Actor) -> bool {
    actor.is_public() && !actor.is_destroyed()
}

/// Keeps live public actors whose declared ports are all ready.
pub fn reachable(actors: Vec<Actor>) -> Vec<Actor> {
    actors
        .into_iter()
        .filter(|a| live_public(a) && a.ports_ready())
        .collect()
}

/// The actor with the lexicographically smallest id.
pub fn smallest_id(actors: Vec<Actor>) -> Option<Actor> {
    actors.into_iter().min_by(|a, b| a.id.cmp(&b.id))
}

/// The actor with the greatest `created_at`, smallest id among equal timestamps.
///
/// Timestamps are ISO-8601 strings, so string order is chronological order.
pub fn most_recent(actors: Vec<Actor>) -> Option<Actor> {
    actors.into_iter().min_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    })
}
