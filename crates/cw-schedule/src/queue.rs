//! The `Scheduler` priority queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::hash::Hash;

use cw_core::TimePoint;
use rustc_hash::FxHashMap;

// ── QueueEvent ────────────────────────────────────────────────────────────────

/// An event admissible to a [`Scheduler`].
///
/// `tag()` identifies the owning entity — the scheduler enforces at most one
/// live event per tag.  `due()` and `priority()` must be stable for the
/// lifetime of the event inside the queue; the scheduler caches them at
/// admission time.
pub trait QueueEvent {
    type Tag: Copy + Eq + Hash + fmt::Debug;

    fn tag(&self) -> Self::Tag;
    fn due(&self) -> TimePoint;
    fn priority(&self) -> i32;
}

// ── Admission ─────────────────────────────────────────────────────────────────

/// Verdict of [`Scheduler::schedule`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Admission {
    /// The tag had no live event; the candidate was admitted.
    Fresh,
    /// The candidate preempted the tag's previous event (higher priority, or
    /// equal priority with an earlier due time).  The old heap entry is now
    /// stale.
    Replaced,
    /// The existing event won; the candidate was discarded.  The proposer is
    /// not notified further.
    Dropped,
}

impl Admission {
    /// `true` unless the candidate was discarded.
    #[inline]
    pub fn accepted(self) -> bool {
        !matches!(self, Admission::Dropped)
    }
}

// ── Heap plumbing ─────────────────────────────────────────────────────────────

/// One heap entry.  Ordering fields are cached at admission so `Ord` never
/// calls back into the event.
struct Slot<E> {
    due: TimePoint,
    priority: i32,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Slot<E> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<E> Eq for Slot<E> {}

impl<E> Ord for Slot<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert due and seq so the earliest-due,
        // highest-priority, first-admitted slot surfaces first.
        other
            .due
            .cmp(&self.due)
            .then(self.priority.cmp(&other.priority))
            .then(other.seq.cmp(&self.seq))
    }
}

impl<E> PartialOrd for Slot<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The tag's current pointer: which admission is live, and the cached
/// ordering key needed to arbitrate the next admission.
#[derive(Copy, Clone)]
struct Live {
    seq: u64,
    due: TimePoint,
    priority: i32,
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// One-event-per-tag priority queue with lazy deletion.
///
/// See the crate docs for the admission and deletion contracts.
pub struct Scheduler<E: QueueEvent> {
    heap: BinaryHeap<Slot<E>>,
    live: FxHashMap<E::Tag, Live>,
    next_seq: u64,
}

impl<E: QueueEvent> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: QueueEvent> Scheduler<E> {
    pub fn new() -> Self {
        Scheduler {
            heap: BinaryHeap::new(),
            live: FxHashMap::default(),
            next_seq: 0,
        }
    }

    /// Admit `event` under the preemption rule: a tag's existing event is
    /// replaced iff the candidate has strictly higher priority, or equal
    /// priority and a strictly earlier due time.  Otherwise the candidate is
    /// dropped and the existing event stands.
    pub fn schedule(&mut self, event: E) -> Admission {
        let tag = event.tag();
        let due = event.due();
        let priority = event.priority();

        let verdict = match self.live.get(&tag) {
            None => Admission::Fresh,
            Some(old) => {
                let preempts =
                    priority > old.priority || (priority == old.priority && due < old.due);
                if preempts {
                    Admission::Replaced
                } else {
                    return Admission::Dropped;
                }
            }
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.insert(tag, Live { seq, due, priority });
        self.heap.push(Slot {
            due,
            priority,
            seq,
            event,
        });
        verdict
    }

    /// Drop the tag's live event, if any.  The heap entry is left in place
    /// (lazily deleted).  Used when an actor dies or leaves the scheduler's
    /// domain.
    pub fn remove(&mut self, tag: E::Tag) -> bool {
        self.live.remove(&tag).is_some()
    }

    /// The next live event, without removing it.  Stale heap entries
    /// surfacing above it are pruned as a side effect.
    pub fn peek(&mut self) -> Option<&E> {
        self.prune();
        self.heap.peek().map(|slot| &slot.event)
    }

    /// Due time of the next live event.
    pub fn next_due(&mut self) -> Option<TimePoint> {
        self.prune();
        self.heap.peek().map(|slot| slot.due)
    }

    /// Pop the next live event and clear its tag's pointer.  The tag must be
    /// re-scheduled to re-enroll.
    pub fn dequeue(&mut self) -> Option<E> {
        self.prune();
        let slot = self.heap.pop()?;
        self.live.remove(&slot.event.tag());
        Some(slot.event)
    }

    /// Discard stale entries at the top of the heap.
    fn prune(&mut self) {
        while let Some(top) = self.heap.peek() {
            let is_live = self
                .live
                .get(&top.event.tag())
                .is_some_and(|live| live.seq == top.seq);
            if is_live {
                return;
            }
            self.heap.pop();
        }
    }

    // ── Audit accessors ───────────────────────────────────────────────────

    /// Number of tags with a live event.
    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    /// Total heap entries, live and stale.  Tests use the difference from
    /// [`live_len`][Self::live_len] to observe lazy deletion.
    pub fn heap_len(&self) -> usize {
        self.heap.len()
    }

    /// Due time of `tag`'s live event, if it has one.
    pub fn live_due(&self, tag: E::Tag) -> Option<TimePoint> {
        self.live.get(&tag).map(|live| live.due)
    }

    /// `true` if no tag has a live event.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Drop every event, live and stale.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
    }
}
