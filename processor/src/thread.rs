//! Transient per-run scheduling state. None of this is part of the public API:
//! callers only ever see compiled programs, traces and run results, never a raw
//! thread cursor.

use tracevm_core::{Pc, TraceId};

/// Per-PC generation stamps carried by one thread's lineage: a dense array
/// traded for simplicity over a sparse set or bit-trie.
///
/// Cloned and extended on every fork rather than shared: the epsilon-cycle guard
/// is checked against a thread's own lineage, never a trace a sibling thread
/// might also hold, so no thread can mark a PC visited on another thread's
/// behalf.
#[derive(Clone)]
pub(crate) struct VisitedSet(Vec<Option<usize>>);

impl VisitedSet {
    pub fn new(program_len: usize) -> Self {
        VisitedSet(vec![None; program_len])
    }

    /// Whether `pc` was visited by this lineage in exactly `generation`.
    pub fn contains_in_generation(&self, pc: Pc, generation: usize) -> bool {
        self.0[pc.index()] == Some(generation)
    }

    pub fn mark(&mut self, pc: Pc, generation: usize) {
        self.0[pc.index()] = Some(generation);
    }
}

/// One lineage working through a generation's zero-input instructions: a thread
/// that has not yet reached a `test`, `accept`, or a cycle.
pub(crate) struct Lineage {
    pub pc: Pc,
    pub badness: u32,
    pub trace_id: TraceId,
    pub visited: VisitedSet,
}

/// A thread parked at a `test` instruction, waiting for the generation's input
/// item. `visited` is carried forward so the lineage's cycle-guard history
/// survives into the next generation if the test succeeds.
pub(crate) struct ParkedThread {
    pub pc: Pc,
    pub badness: u32,
    pub trace_id: TraceId,
    pub visited: VisitedSet,
}
