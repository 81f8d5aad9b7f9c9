//! Convoys and their multi-index registry.

use cw_core::{ActorId, ConvoyId, PlaceId, RoadId};
use rustc_hash::FxHashMap;

/// A group of actors travelling together behind a leader.
#[derive(Clone, PartialEq, Debug)]
pub struct Convoy {
    pub id: ConvoyId,
    pub leader: ActorId,
    /// Leader first, then joiners in join order.
    pub members: Vec<ActorId>,
    /// Where the convoy currently is; at most one of these is set.
    pub place: Option<PlaceId>,
    pub road: Option<RoadId>,
}

/// All convoys, indexed by actor, place, and road.
///
/// The three indices are kept consistent by construction: every mutation
/// goes through the registry, never through a `Convoy` directly.
#[derive(Default)]
pub struct ConvoyRegistry {
    convoys: FxHashMap<ConvoyId, Convoy>,
    by_actor: FxHashMap<ActorId, ConvoyId>,
    by_place: FxHashMap<PlaceId, Vec<ConvoyId>>,
    by_road: FxHashMap<RoadId, Vec<ConvoyId>>,
    next_id: u32,
}

impl ConvoyRegistry {
    pub fn new() -> Self {
        ConvoyRegistry::default()
    }

    /// Found a convoy at `place` with `leader` as its only member.
    ///
    /// A leader already in a convoy stays there; returns that convoy's id.
    pub fn found(&mut self, leader: ActorId, place: PlaceId) -> ConvoyId {
        if let Some(&existing) = self.by_actor.get(&leader) {
            return existing;
        }
        let id = ConvoyId(self.next_id);
        self.next_id += 1;
        self.convoys.insert(
            id,
            Convoy {
                id,
                leader,
                members: vec![leader],
                place: Some(place),
                road: None,
            },
        );
        self.by_actor.insert(leader, id);
        self.by_place.entry(place).or_default().push(id);
        id
    }

    /// Add `actor` to `convoy`.  No-op if already a member of any convoy.
    pub fn join(&mut self, convoy: ConvoyId, actor: ActorId) -> bool {
        if self.by_actor.contains_key(&actor) {
            return false;
        }
        let Some(c) = self.convoys.get_mut(&convoy) else {
            return false;
        };
        c.members.push(actor);
        self.by_actor.insert(actor, convoy);
        true
    }

    /// Remove `actor` from its convoy.  A convoy losing its leader promotes
    /// the next member; a convoy losing its last member is disbanded.
    pub fn leave(&mut self, actor: ActorId) {
        let Some(convoy_id) = self.by_actor.remove(&actor) else {
            return;
        };
        let Some(c) = self.convoys.get_mut(&convoy_id) else {
            return;
        };
        c.members.retain(|&m| m != actor);
        let disband = c.members.is_empty();
        if c.leader == actor {
            if let Some(&next) = c.members.first() {
                c.leader = next;
            }
        }
        if disband {
            if let Some(c) = self.convoys.remove(&convoy_id) {
                Self::unindex(&mut self.by_place, c.place, convoy_id);
                Self::unindex(&mut self.by_road, c.road, convoy_id);
            }
        }
    }

    /// Move a convoy onto a road (departure).
    pub fn onto_road(&mut self, convoy: ConvoyId, road: RoadId) {
        let Some(c) = self.convoys.get_mut(&convoy) else {
            return;
        };
        Self::unindex(&mut self.by_place, c.place.take(), convoy);
        c.road = Some(road);
        self.by_road.entry(road).or_default().push(convoy);
    }

    /// Move a convoy into a place (arrival).
    pub fn into_place(&mut self, convoy: ConvoyId, place: PlaceId) {
        let Some(c) = self.convoys.get_mut(&convoy) else {
            return;
        };
        Self::unindex(&mut self.by_road, c.road.take(), convoy);
        c.place = Some(place);
        self.by_place.entry(place).or_default().push(convoy);
    }

    fn unindex<K: Copy + Eq + std::hash::Hash>(
        index: &mut FxHashMap<K, Vec<ConvoyId>>,
        key: Option<K>,
        convoy: ConvoyId,
    ) {
        if let Some(k) = key {
            if let Some(list) = index.get_mut(&k) {
                list.retain(|&c| c != convoy);
                if list.is_empty() {
                    index.remove(&k);
                }
            }
        }
    }

    /// Rebuild a convoy from persisted state, bypassing the founding
    /// rules.  Members already in a convoy are skipped.
    pub fn restore(
        &mut self,
        leader: ActorId,
        members: Vec<ActorId>,
        place: Option<PlaceId>,
        road: Option<RoadId>,
    ) -> ConvoyId {
        let id = ConvoyId(self.next_id);
        self.next_id += 1;
        let members: Vec<ActorId> = members
            .into_iter()
            .filter(|m| !self.by_actor.contains_key(m))
            .collect();
        for &m in &members {
            self.by_actor.insert(m, id);
        }
        if let Some(p) = place {
            self.by_place.entry(p).or_default().push(id);
        }
        if let Some(r) = road {
            self.by_road.entry(r).or_default().push(id);
        }
        self.convoys.insert(
            id,
            Convoy {
                id,
                leader,
                members,
                place,
                road,
            },
        );
        id
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn get(&self, id: ConvoyId) -> Option<&Convoy> {
        self.convoys.get(&id)
    }

    /// All convoys, in arbitrary order; persistence sorts by leader.
    pub fn iter(&self) -> impl Iterator<Item = &Convoy> {
        self.convoys.values()
    }

    pub fn of_actor(&self, actor: ActorId) -> Option<&Convoy> {
        self.by_actor.get(&actor).and_then(|id| self.convoys.get(id))
    }

    pub fn at_place(&self, place: PlaceId) -> &[ConvoyId] {
        self.by_place.get(&place).map_or(&[], Vec::as_slice)
    }

    pub fn on_road(&self, road: RoadId) -> &[ConvoyId] {
        self.by_road.get(&road).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.convoys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.convoys.is_empty()
    }
}
