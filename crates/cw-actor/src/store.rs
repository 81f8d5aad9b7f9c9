//! Actor storage.
//!
//! # Why take-out?
//!
//! Simulating one actor routinely needs `&mut` that actor *and* read access
//! to the rest of the population (planning looks at co-located actors), and
//! a two-party exchange needs `&mut` both sides at once.  Rather than split
//! SoA arrays, the store supports temporarily removing an actor
//! ([`take`][ActorStore::take]/[`put`][ActorStore::put]) and disjoint pair
//! borrows ([`pair_mut`][ActorStore::pair_mut]); both make the disjointness
//! visible to the borrow checker instead of promising it in comments.

use cw_core::ActorId;
use rustc_hash::FxHashMap;

use crate::actor::Actor;

/// The population, keyed by id, with a name index for persistence lookups.
#[derive(Default)]
pub struct ActorStore {
    actors: FxHashMap<ActorId, Actor>,
    by_name: FxHashMap<String, ActorId>,
    next_id: u32,
}

impl ActorStore {
    pub fn new() -> Self {
        ActorStore::default()
    }

    /// Reserve a fresh id.  Ids are never reused within a world.
    pub fn alloc_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert `actor`, indexing its name.  Replaces nothing: ids come from
    /// [`alloc_id`][Self::alloc_id] and names are expected unique.
    pub fn insert(&mut self, actor: Actor) {
        debug_assert!(
            !self.actors.contains_key(&actor.id),
            "duplicate actor id {}",
            actor.id
        );
        self.by_name.insert(actor.name.clone(), actor.id);
        self.actors.insert(actor.id, actor);
    }

    /// Remove an actor permanently (death cleanup).
    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        let actor = self.actors.remove(&id)?;
        self.by_name.remove(&actor.name);
        Some(actor)
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    pub fn lookup(&self, name: &str) -> Option<ActorId> {
        self.by_name.get(name).copied()
    }

    /// Temporarily remove an actor for simulation.  The caller must
    /// [`put`][Self::put] it back; the name index is left intact in between.
    pub fn take(&mut self, id: ActorId) -> Option<Actor> {
        self.actors.remove(&id)
    }

    /// Return a taken actor.
    pub fn put(&mut self, actor: Actor) {
        self.actors.insert(actor.id, actor);
    }

    /// Disjoint mutable borrows of two distinct actors.
    ///
    /// Returns `None` if `a == b` or either is absent.
    pub fn pair_mut(&mut self, a: ActorId, b: ActorId) -> Option<(&mut Actor, &mut Actor)> {
        if a == b {
            return None;
        }
        let [first, second] = self.actors.get_disjoint_mut([&a, &b]);
        Some((first?, second?))
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    /// All ids in ascending order — the deterministic iteration order for
    /// whole-population sweeps.
    pub fn ids_sorted(&self) -> Vec<ActorId> {
        let mut ids: Vec<ActorId> = self.actors.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ActorId, &Actor)> {
        self.actors.iter()
    }
}
