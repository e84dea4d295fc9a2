//! The trace provenance DAG.
//!
//! Every `jump`-target arrival, `record`, `bad` and `test`-success visited during
//! execution allocates a node in a per-run [`TraceArena`]. Nodes are addressed by
//! [`TraceId`], a plain arena index — the same "arena of nodes behind an integer
//! handle" shape as an AST or IR graph, so nodes can share structure (a DAG, not a
//! tree) without fighting the borrow checker.
//!
//! The type threads have and hand back to callers is [`Trace`], a cheap `Rc` handle
//! into the arena. Cloning a `Trace` never deep-copies node contents; only `Rc<D>`
//! record payloads are shared, so record values use reference rather than value
//! semantics.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::Pc;

/// An index into a [`TraceArena`]. Opaque outside this crate: the `tracevm-processor`
/// crate passes these around while building traces but never inspects them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TraceId(usize);

/// One or more dispatched instructions' worth of provenance appended after
/// `parent`: the PCs dispatched (`head`) and any record values emitted along the
/// way (`records`). Holds more than one PC only after [`TraceArena::compact`] has
/// merged a chain of single-prefix nodes into one.
#[derive(Clone)]
enum TraceNode<D> {
    /// The empty trace every thread starts from.
    Root,
    /// A dispatched-instruction segment appended after `parent`.
    Cons { parent: TraceId, head: Vec<Pc>, records: Vec<Rc<D>> },
    /// Two traces joined at a scheduler-decided merge point: `first` is the half
    /// ordered earlier in badness-preferred order, `second` the later half.
    Join { first: TraceId, second: TraceId },
}

/// Per-run storage for trace nodes. Owned by the `tracevm-processor` crate's
/// scheduler for the lifetime of one `execute` call; dropped at the end of the run.
///
/// Nodes are stored behind a `RefCell` so that `compact` — which allocates new,
/// merged nodes to shrink long single-prefix chains — can take `&self` rather than
/// `&mut self`, matching [`Trace::compact`]'s signature on a handle that only ever
/// holds a shared `Rc<TraceArena<D>>`.
pub struct TraceArena<D> {
    nodes: RefCell<Vec<TraceNode<D>>>,
}

impl<D> Default for TraceArena<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> TraceArena<D> {
    pub fn new() -> Self {
        TraceArena { nodes: RefCell::new(vec![TraceNode::Root]) }
    }

    pub fn root(&self) -> TraceId {
        TraceId(0)
    }

    fn push(&self, node: TraceNode<D>) -> TraceId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(node);
        TraceId(nodes.len() - 1)
    }

    fn node(&self, id: TraceId) -> TraceNode<D> {
        self.nodes.borrow()[id.0].clone()
    }

    /// Appends a dispatched instruction after `parent`. `data = None` covers both
    /// non-`record` instructions and a `record` whose callback returned `None` for
    /// this visit: the visit still occurs, but nothing is emitted. A node is
    /// allocated regardless, so PC provenance through the visit is preserved even
    /// when it carries no payload.
    pub fn cons(&self, parent: TraceId, pc: Pc, data: Option<Rc<D>>) -> TraceId {
        self.push(TraceNode::Cons { parent, head: vec![pc], records: data.into_iter().collect() })
    }

    /// Joins two traces at a scheduler-decided merge point. `first` must be the
    /// branch the scheduler has decided sorts earlier under badness-preferred
    /// ordering; the arena does not re-derive that decision.
    pub fn join(&self, first: TraceId, second: TraceId) -> TraceId {
        self.push(TraceNode::Join { first, second })
    }

    /// Walks from `id` to the arena root, appending each node's `head` PCs and
    /// record values in root-to-leaf order. Used by `flatten`, `head` and the
    /// public rendering in the `tracevm` facade crate.
    fn collect_into(&self, id: TraceId, heads: &mut Vec<Pc>, records: &mut Vec<Rc<D>>) {
        match self.node(id) {
            TraceNode::Root => {}
            TraceNode::Cons { parent, head, records: node_records } => {
                self.collect_into(parent, heads, records);
                heads.extend(head);
                records.extend(node_records);
            }
            TraceNode::Join { first, second } => {
                self.collect_into(first, heads, records);
                self.collect_into(second, heads, records);
            }
        }
    }

    /// The record values on the trace ending at `id`, oldest first.
    pub fn flatten(&self, id: TraceId) -> Vec<Rc<D>> {
        let mut heads = Vec::new();
        let mut records = Vec::new();
        self.collect_into(id, &mut heads, &mut records);
        records
    }

    /// The PCs dispatched along the trace ending at `id`, oldest first. Used by
    /// diagnostic rendering; never inspected by the scheduler itself.
    pub fn head(&self, id: TraceId) -> Vec<Pc> {
        let mut heads = Vec::new();
        let mut records = Vec::new();
        self.collect_into(id, &mut heads, &mut records);
        heads
    }

    /// Enumerates every root-to-tip path through the trace ending at `id`, each as
    /// its own ordered record list. A trace with no `Join` nodes has exactly one
    /// path, equal to `flatten`; each `Join` multiplies the path count by the sum
    /// of its two sides' path counts, with the `first` (cheaper) branch's paths
    /// listed before `second`'s. This is how ambiguity survives a `test`-pc merge:
    /// the merged lineages share one `Trace`, but each remains recoverable as a
    /// distinct path through its DAG rather than as a separate accepting trace.
    /// `accept` itself never merges two lineages into one trace; this is a
    /// separate, finer-grained ambiguity that the `test`-pc merge does introduce
    /// within a single trace.
    pub fn record_paths(&self, id: TraceId) -> Vec<Vec<Rc<D>>> {
        match self.node(id) {
            TraceNode::Root => vec![Vec::new()],
            TraceNode::Cons { parent, records, .. } => {
                let mut paths = self.record_paths(parent);
                for path in &mut paths {
                    path.extend(records.iter().cloned());
                }
                paths
            }
            TraceNode::Join { first, second } => {
                let mut paths = self.record_paths(first);
                paths.extend(self.record_paths(second));
                paths
            }
        }
    }

    /// Collapses each maximal chain of single-prefix `Cons` nodes into one node
    /// carrying the concatenated `head`/`records` of the whole chain. A run of
    /// `jump`/`bad`-without-`record` otherwise leaves one trace node per
    /// instruction visited; this merges such a run down to its nearest root or
    /// join ancestor without losing any `head` PC or record.
    ///
    /// Memoized per call via a `HashMap` keyed by `TraceId`, so that structure
    /// shared between threads (a common ancestor reached via different paths) is
    /// compacted once, preserving DAG sharing rather than duplicating work per path.
    /// Idempotent: every `Cons` node produced by `compact` has a `Root` or `Join`
    /// parent directly, so compacting it again is a no-op that returns the same id.
    pub fn compact(&self, id: TraceId) -> TraceId
    where
        D: 'static,
    {
        let mut memo = std::collections::HashMap::new();
        self.compact_inner(id, &mut memo)
    }

    fn compact_inner(&self, id: TraceId, memo: &mut std::collections::HashMap<TraceId, TraceId>) -> TraceId {
        if let Some(&done) = memo.get(&id) {
            return done;
        }
        let result = match self.node(id) {
            TraceNode::Root => id,
            TraceNode::Join { first, second } => {
                let cf = self.compact_inner(first, memo);
                let cs = self.compact_inner(second, memo);
                if cf == first && cs == second { id } else { self.push(TraceNode::Join { first: cf, second: cs }) }
            }
            TraceNode::Cons { parent, head, records } => match self.node(parent) {
                // Parent is itself a single-prefix Cons: fold the whole chain up to
                // the nearest root/join into one node.
                TraceNode::Cons { .. } => self.merge_chain(parent, head, records, memo),
                // Parent is a root or a join: this node is already maximal.
                TraceNode::Root | TraceNode::Join { .. } => id,
            },
        };
        memo.insert(id, result);
        result
    }

    /// Walks `cur` upward through `Cons` ancestors, accumulating their `head`/
    /// `records` alongside the ones already collected (`head`/`records`, from the
    /// node the caller started at), until it reaches a root or a (recursively
    /// compacted) join, then allocates one merged node there.
    fn merge_chain(
        &self,
        mut cur: TraceId,
        head: Vec<Pc>,
        records: Vec<Rc<D>>,
        memo: &mut std::collections::HashMap<TraceId, TraceId>,
    ) -> TraceId {
        let mut segments = vec![(head, records)];
        let base = loop {
            match self.node(cur) {
                TraceNode::Cons { parent, head, records } => {
                    segments.push((head, records));
                    cur = parent;
                }
                TraceNode::Root => break cur,
                TraceNode::Join { first, second } => {
                    let cf = self.compact_inner(first, memo);
                    let cs = self.compact_inner(second, memo);
                    break if cf == first && cs == second { cur } else { self.push(TraceNode::Join { first: cf, second: cs }) };
                }
            }
        };
        segments.reverse();
        let merged_head: Vec<Pc> = segments.iter().flat_map(|(h, _)| h.iter().copied()).collect();
        let merged_records: Vec<Rc<D>> = segments.into_iter().flat_map(|(_, r)| r.into_iter()).collect();
        self.push(TraceNode::Cons { parent: base, head: merged_head, records: merged_records })
    }
}

/// A handle into the trace DAG of a single run. Cheap to clone: cloning copies the
/// `Rc` pointer and arena handle only, never the payloads it denotes.
///
/// `Trace` is the type returned in [`crate::RunResult`] (defined in the `processor`
/// crate) for each accepting thread. It does not own an arena; it borrows one for
/// its lifetime via `Rc`, so traces from the same run may safely outlive the
/// scheduler that produced them.
pub struct Trace<D> {
    arena: Rc<TraceArena<D>>,
    id: TraceId,
}

impl<D> Trace<D> {
    /// Builds a handle from a run's arena and a node within it. Called by the
    /// scheduler once per accepting thread, after execution has finished.
    pub fn new(arena: Rc<TraceArena<D>>, id: TraceId) -> Self {
        Trace { arena, id }
    }

    /// The arena node this handle points to, for schedulers building further
    /// traces (joins, conses) on top of an existing one.
    pub fn id(&self) -> TraceId {
        self.id
    }

    /// The arena backing this handle.
    pub fn arena(&self) -> &Rc<TraceArena<D>> {
        &self.arena
    }

    /// The record values on this trace, oldest first.
    pub fn values(&self) -> Vec<Rc<D>> {
        self.arena.flatten(self.id)
    }

    /// The PCs dispatched along this trace, oldest first.
    pub fn head(&self) -> Vec<Pc> {
        self.arena.head(self.id)
    }

    /// Every root-to-tip interpretation this trace's DAG encodes, cheapest first
    /// at each merge. `values()` is `record_paths()` flattened into one list; this
    /// keeps each interpretation's records separate instead of concatenating them,
    /// which is what makes an ambiguous match's individual completions recoverable
    /// after the scheduler has merged their lineages.
    pub fn record_paths(&self) -> Vec<Vec<Rc<D>>> {
        self.arena.record_paths(self.id)
    }

    /// Returns the compacted form of this trace. Compaction is idempotent: calling
    /// it again on the result is a no-op.
    pub fn compact(&self) -> Trace<D>
    where
        D: 'static,
    {
        Trace { arena: Rc::clone(&self.arena), id: self.arena.compact(self.id) }
    }
}

impl<D> Clone for Trace<D> {
    fn clone(&self) -> Self {
        Trace { arena: Rc::clone(&self.arena), id: self.id }
    }
}

impl<D: fmt::Debug> fmt::Debug for Trace<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values().iter().map(|v| v.as_ref())).finish()
    }
}

impl<D: PartialEq> PartialEq for Trace<D> {
    fn eq(&self, other: &Self) -> bool {
        self.values().iter().map(|v| v.as_ref()).eq(other.values().iter().map(|v| v.as_ref()))
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    /// Builds a straight-line chain of `cons` nodes off `root`, one per entry in
    /// `segments`; `None` entries are the empty, non-`record` visits that
    /// `compact` is meant to fold away.
    fn build_chain(arena: &TraceArena<u32>, segments: &[Option<u32>]) -> TraceId {
        let mut id = arena.root();
        for (i, data) in segments.iter().enumerate() {
            id = arena.cons(id, Pc::new(i), data.map(Rc::new));
        }
        id
    }

    fn any_segments() -> impl Strategy<Value = Vec<Option<u32>>> {
        proptest::collection::vec(proptest::option::of(any::<u32>()), 0..12)
    }

    proptest! {
        /// Compacting an arbitrary chain never changes what it denotes: same
        /// record values, same dispatched PCs, regardless of how many empty
        /// (non-`record`) visits separate the payload-bearing ones.
        #[test]
        fn compaction_preserves_flatten_and_head(segments in any_segments()) {
            let arena = TraceArena::<u32>::new();
            let id = build_chain(&arena, &segments);
            let compacted = arena.compact(id);

            prop_assert_eq!(
                arena.flatten(compacted).iter().map(|v| **v).collect::<Vec<_>>(),
                arena.flatten(id).iter().map(|v| **v).collect::<Vec<_>>()
            );
            prop_assert_eq!(arena.head(compacted), arena.head(id));
        }

        /// Compacting twice is the same as compacting once, for any chain shape.
        #[test]
        fn compaction_is_idempotent_over_arbitrary_chains(segments in any_segments()) {
            let arena = TraceArena::<u32>::new();
            let id = build_chain(&arena, &segments);
            let once = arena.compact(id);
            let twice = arena.compact(once);
            prop_assert_eq!(once, twice);
        }

        /// A join of two arbitrary chains compacts to the same content as the
        /// uncompacted join, with both branches' records preserved and ordered.
        #[test]
        fn compaction_preserves_join_branches(
            left in proptest::collection::vec(any::<u32>(), 0..6),
            right in proptest::collection::vec(any::<u32>(), 0..6),
        ) {
            let arena = TraceArena::<u32>::new();
            let left_segments: Vec<Option<u32>> = left.iter().copied().map(Some).collect();
            let right_segments: Vec<Option<u32>> = right.iter().copied().map(Some).collect();
            let lid = build_chain(&arena, &left_segments);
            let mut rid = arena.root();
            for (i, v) in right_segments.iter().enumerate() {
                rid = arena.cons(rid, Pc::new(100 + i), v.map(Rc::new));
            }
            let joined = arena.join(lid, rid);
            let compacted = arena.compact(joined);

            prop_assert_eq!(
                arena.flatten(compacted).iter().map(|v| **v).collect::<Vec<_>>(),
                arena.flatten(joined).iter().map(|v| **v).collect::<Vec<_>>()
            );
        }
    }
}
