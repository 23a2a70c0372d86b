//! Progenitor resolution for squashed events.
//!
//! Squashing usually points a duplicate straight at its canonical event, but
//! chains can form when the canonical event is itself squashed later. The
//! walk follows `duplicate_of_id` one hop at a time with a visited set, so a
//! corrupt chain is reported instead of looping.
//!
//! [`DuplicateWalk`] does not load events itself: callers feed it the next
//! hop, which keeps it usable from both sync code and async repositories.

use std::collections::HashSet;

use thiserror::Error;

use super::types::{Event, EventId};

/// Upper bound on the length of a duplicate chain.
pub const MAX_DUPLICATE_HOPS: usize = 64;

/// Data-integrity violations found while following a duplicate chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DuplicateError {
    #[error("Duplicate chain starting at event {start} loops back to event {at}")]
    Cycle { start: EventId, at: EventId },
    #[error("Event {from} is marked as a duplicate of missing event {missing}")]
    Dangling { from: EventId, missing: EventId },
    #[error(
        "Duplicate chain starting at event {start} is longer than {} hops",
        MAX_DUPLICATE_HOPS
    )]
    TooManyHops { start: EventId },
}

/// Step-by-step walk from an event to its progenitor.
#[derive(Debug, Clone)]
pub struct DuplicateWalk {
    start: EventId,
    current: Event,
    visited: HashSet<EventId>,
}

impl DuplicateWalk {
    /// Starts a walk at `event`.
    pub fn start(event: Event) -> Self {
        let mut visited = HashSet::new();
        visited.insert(event.id);
        Self {
            start: event.id,
            current: event,
            visited,
        }
    }

    /// The event the walk needs next, or `None` once the progenitor is reached.
    pub fn next_hop(&self) -> Option<EventId> {
        self.current.duplicate_of_id
    }

    /// The event the walk is currently on.
    pub fn current(&self) -> &Event {
        &self.current
    }

    /// Moves to `next`, the event loaded for [`next_hop`](Self::next_hop).
    ///
    /// Pass `None` when the lookup found nothing. An event with another id
    /// counts as nothing found. Calling this after the progenitor is reached
    /// does nothing.
    pub fn advance(&mut self, next: Option<Event>) -> Result<(), DuplicateError> {
        let Some(wanted) = self.next_hop() else {
            return Ok(());
        };

        let Some(next) = next.filter(|e| e.id == wanted) else {
            return Err(DuplicateError::Dangling {
                from: self.current.id,
                missing: wanted,
            });
        };

        if self.visited.contains(&next.id) {
            return Err(DuplicateError::Cycle {
                start: self.start,
                at: next.id,
            });
        }

        if self.visited.len() > MAX_DUPLICATE_HOPS {
            return Err(DuplicateError::TooManyHops { start: self.start });
        }

        self.visited.insert(next.id);
        self.current = next;
        Ok(())
    }

    /// Ends the walk, returning the event it stopped on.
    ///
    /// This is the progenitor once [`next_hop`](Self::next_hop) returns `None`.
    pub fn finish(self) -> Event {
        self.current
    }
}

/// Returns the canonical event for `event`, loading hops with `find`.
///
/// Non-duplicates are returned unchanged.
pub fn progenitor_of<F>(event: Event, mut find: F) -> Result<Event, DuplicateError>
where
    F: FnMut(EventId) -> Option<Event>,
{
    let mut walk = DuplicateWalk::start(event);
    while let Some(next) = walk.next_hop() {
        walk.advance(find(next))?;
    }
    Ok(walk.finish())
}

/// Drops every event flagged as a duplicate.
pub fn exclude_duplicates(events: Vec<Event>) -> Vec<Event> {
    events.into_iter().filter(|e| !e.is_duplicate()).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap()
    }

    fn event(id: i64) -> Event {
        Event::new(EventId(id), format!("Event {id}"), at())
    }

    fn store(events: &[Event]) -> HashMap<EventId, Event> {
        events.iter().map(|e| (e.id, e.clone())).collect()
    }

    #[test]
    fn test_non_duplicate_is_its_own_progenitor() {
        let e = event(1);
        let result = progenitor_of(e.clone(), |_| panic!("no lookup expected")).unwrap();
        assert_eq!(result, e);
    }

    #[test]
    fn test_single_hop() {
        let original = event(1);
        let dup = event(2).duplicate_of(EventId(1));
        let db = store(&[original.clone(), dup.clone()]);

        let result = progenitor_of(dup, |id| db.get(&id).cloned()).unwrap();
        assert_eq!(result.id, EventId(1));
    }

    #[test]
    fn test_multi_hop_chain() {
        let db = store(&[
            event(1),
            event(2).duplicate_of(EventId(1)),
            event(3).duplicate_of(EventId(2)),
            event(4).duplicate_of(EventId(3)),
        ]);

        let result = progenitor_of(db[&EventId(4)].clone(), |id| db.get(&id).cloned()).unwrap();
        assert_eq!(result.id, EventId(1));
    }

    #[test]
    fn test_idempotent() {
        let db = store(&[event(1), event(2).duplicate_of(EventId(1))]);
        let find = |id: EventId| db.get(&id).cloned();

        let once = progenitor_of(db[&EventId(2)].clone(), find).unwrap();
        let twice = progenitor_of(once.clone(), find).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cycle_is_an_error() {
        let db = store(&[
            event(1).duplicate_of(EventId(2)),
            event(2).duplicate_of(EventId(1)),
        ]);

        let result = progenitor_of(db[&EventId(1)].clone(), |id| db.get(&id).cloned());
        assert_eq!(
            result,
            Err(DuplicateError::Cycle {
                start: EventId(1),
                at: EventId(1)
            })
        );
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let db = store(&[event(5).duplicate_of(EventId(5))]);

        let result = progenitor_of(db[&EventId(5)].clone(), |id| db.get(&id).cloned());
        assert!(matches!(result, Err(DuplicateError::Cycle { .. })));
    }

    #[test]
    fn test_dangling_reference() {
        let dup = event(2).duplicate_of(EventId(99));

        let result = progenitor_of(dup, |_| None);
        assert_eq!(
            result,
            Err(DuplicateError::Dangling {
                from: EventId(2),
                missing: EventId(99)
            })
        );
    }

    #[test]
    fn test_chain_longer_than_limit() {
        let count = MAX_DUPLICATE_HOPS as i64 + 5;
        let mut events = vec![event(0)];
        events.extend((1..=count).map(|id| event(id).duplicate_of(EventId(id - 1))));
        let db = store(&events);

        let result = progenitor_of(db[&EventId(count)].clone(), |id| db.get(&id).cloned());
        assert_eq!(
            result,
            Err(DuplicateError::TooManyHops {
                start: EventId(count)
            })
        );
    }

    #[test]
    fn test_walk_steps() {
        let dup = event(2).duplicate_of(EventId(1));
        let mut walk = DuplicateWalk::start(dup);

        assert_eq!(walk.next_hop(), Some(EventId(1)));
        walk.advance(Some(event(1))).unwrap();
        assert_eq!(walk.next_hop(), None);
        assert_eq!(walk.current().id, EventId(1));

        walk.advance(None).unwrap();
        assert_eq!(walk.finish().id, EventId(1));
    }

    #[test]
    fn test_walk_rejects_the_wrong_event() {
        let mut walk = DuplicateWalk::start(event(2).duplicate_of(EventId(1)));

        assert_eq!(
            walk.advance(Some(event(7))),
            Err(DuplicateError::Dangling {
                from: EventId(2),
                missing: EventId(1)
            })
        );
        assert_eq!(walk.current().id, EventId(2));
    }

    #[test]
    fn test_exclude_duplicates() {
        let events = vec![event(1), event(2).duplicate_of(EventId(1)), event(3)];

        let ids: Vec<_> = exclude_duplicates(events).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![EventId(1), EventId(3)]);
    }
}
