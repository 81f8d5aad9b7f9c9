//! The road graph.
//!
//! An undirected graph of places joined by roads.  Small worlds, simple
//! representation: a `Vec` of roads indexed by `RoadId` plus a per-place
//! adjacency list in insertion order — iteration order must never depend on
//! hashing.

use cw_core::{PlaceId, RoadId};
use rustc_hash::FxHashMap;

use crate::error::{TransitError, TransitResult};

/// One undirected road between two places.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Road {
    pub id: RoadId,
    pub a: PlaceId,
    pub b: PlaceId,
    pub length_km: f64,
}

impl Road {
    /// The far end as seen from `from`; `None` if `from` is not an endpoint.
    pub fn other_end(&self, from: PlaceId) -> Option<PlaceId> {
        if from == self.a {
            Some(self.b)
        } else if from == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// The world's roads.
#[derive(Default)]
pub struct RoadGraph {
    roads: Vec<Road>,
    adjacency: FxHashMap<PlaceId, Vec<RoadId>>,
}

impl RoadGraph {
    pub fn new() -> Self {
        RoadGraph::default()
    }

    /// Add a road; returns its id.  Adjacency keeps insertion order.
    pub fn add_road(&mut self, a: PlaceId, b: PlaceId, length_km: f64) -> RoadId {
        debug_assert!(a != b, "road from a place to itself");
        debug_assert!(length_km > 0.0, "road of non-positive length");
        let id = RoadId(self.roads.len() as u32);
        self.roads.push(Road {
            id,
            a,
            b,
            length_km,
        });
        self.adjacency.entry(a).or_default().push(id);
        self.adjacency.entry(b).or_default().push(id);
        id
    }

    pub fn get(&self, id: RoadId) -> TransitResult<&Road> {
        self.roads.get(id.index()).ok_or(TransitError::RoadNotFound(id))
    }

    /// The first road joining `a` and `b`, if any.
    pub fn between(&self, a: PlaceId, b: PlaceId) -> Option<RoadId> {
        self.adjacency
            .get(&a)?
            .iter()
            .copied()
            .find(|&id| self.roads[id.index()].other_end(a) == Some(b))
    }

    /// Roads leaving `place`, in the order they were added.
    pub fn exits(&self, place: PlaceId) -> &[RoadId] {
        self.adjacency.get(&place).map_or(&[], Vec::as_slice)
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Road> {
        self.roads.iter()
    }
}
