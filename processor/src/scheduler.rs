use std::collections::VecDeque;
use std::rc::Rc;

use tracevm_core::{Instruction, Pc, Program, Trace, TraceArena, TraceId};

use crate::errors::ExecutionError;
use crate::options::RunOptions;
use crate::result::RunResult;
use crate::thread::{Lineage, ParkedThread, VisitedSet};

/// Runs `program` against the items `input` produces, advancing one generation
/// per input item. `input` is called once per generation: a nullary callable
/// returning either the next item or end-of-input.
#[tracing::instrument(skip_all, fields(program_len = program.len()))]
pub fn execute<T, D, O>(
    program: &Program<T, D, O>,
    mut input: impl FnMut() -> Option<T>,
    run_options: &RunOptions<O>,
) -> Result<RunResult<D>, ExecutionError> {
    let arena = TraceArena::<D>::new();

    let mut visited = VisitedSet::new(program.len());
    visited.mark(Pc::new(0), 0);
    let spawn_trace = arena.cons(arena.root(), Pc::new(0), None);
    let mut seeds = vec![Lineage { pc: Pc::new(0), badness: 0, trace_id: spawn_trace, visited }];

    let mut accepting: Vec<TraceId> = Vec::new();
    let mut failing: Vec<TraceId> = Vec::new();
    let mut generation: usize = 0;

    loop {
        if let Some(limit) = run_options.limits.max_generations {
            if generation >= limit {
                return Err(ExecutionError::GenerationLimitExceeded { limit, consumed: generation });
            }
        }

        let item = input();
        let is_final = item.is_none();
        let _span = tracing::debug_span!("generation", n = generation, is_final).entered();

        let (parked, generation_accepts) =
            close_generation(&arena, program, &run_options.options, generation, is_final, seeds);
        accepting.extend(generation_accepts);

        let mut next_seeds = Vec::new();
        match &item {
            None => {
                for p in parked {
                    tracing::trace!(pc = ?p.pc, "parked thread dropped: input exhausted");
                    failing.push(p.trace_id);
                }
            }
            Some(it) => {
                let next_generation = generation + 1;
                for p in parked {
                    let Instruction::Test { data, func } = &program.instructions()[p.pc.index()] else {
                        unreachable!("parked threads only ever sit at Test instructions");
                    };
                    if func(it, data.as_ref(), &run_options.options) {
                        let target = Pc::new(p.pc.index() + 1);
                        let mut visited = p.visited;
                        visited.mark(target, next_generation);
                        let trace_id = arena.cons(p.trace_id, target, None);
                        next_seeds.push(Lineage { pc: target, badness: p.badness, trace_id, visited });
                    } else {
                        tracing::trace!(pc = ?p.pc, "thread failed test");
                        failing.push(p.trace_id);
                    }
                }
            }
        }

        if is_final || next_seeds.is_empty() {
            break;
        }
        seeds = next_seeds;
        generation += 1;
    }

    let arena = Rc::new(arena);
    let finish = |ids: Vec<TraceId>| -> Vec<Trace<D>> {
        ids.into_iter().map(|id| Trace::new(Rc::clone(&arena), id).compact()).collect()
    };
    Ok(RunResult::new(finish(accepting), finish(failing)))
}

/// Expands every zero-input instruction reachable from `seeds` within one
/// generation: `jump` fans a thread out to its targets, `record`/`bad` continue at
/// `pc + 1`, `accept` is captured only if `is_final` (an early accept with input
/// remaining is silently dropped), and `test` threads are parked for the caller to
/// dispatch against the input item. Breadth-first order is preserved by working
/// off a FIFO queue rather than recursing.
///
/// Two different dedup mechanisms are at play, and conflating them is a bug
/// (documented in DESIGN.md): a lineage's own `VisitedSet` guards against *that
/// lineage* re-entering a PC without consuming input (an epsilon cycle); a
/// generation-wide `test_seen` table is what actually merges *distinct* lineages
/// that converge, and only ever applies at `test` PCs, since those are the only
/// PCs treated as shared, mergeable state — `jump`, `record` and `bad`
/// continuations are path segments, not states, so two lineages passing through
/// the same one independently is not a collision.
fn close_generation<T, D, O>(
    arena: &TraceArena<D>,
    program: &Program<T, D, O>,
    options: &O,
    generation: usize,
    is_final: bool,
    seeds: Vec<Lineage>,
) -> (Vec<ParkedThread>, Vec<TraceId>) {
    let mut test_seen: Vec<Option<usize>> = vec![None; program.len()];
    let mut work: VecDeque<Lineage> = seeds.into();
    let mut parked: Vec<ParkedThread> = Vec::new();
    let mut accepts: Vec<TraceId> = Vec::new();

    while let Some(th) = work.pop_front() {
        match &program.instructions()[th.pc.index()] {
            Instruction::Jump { targets } => {
                for &target in targets {
                    if let Some(child) = advance(arena, &th, target, th.badness, None, generation) {
                        work.push_back(child);
                    } else {
                        tracing::trace!(pc = ?target, "epsilon-cycle guard dropped thread");
                    }
                }
            }
            Instruction::Record { data, func } => {
                let value = match func {
                    Some(f) => f(data.as_ref(), generation, options).map(Rc::new),
                    None => Some(Rc::clone(data)),
                };
                let target = Pc::new(th.pc.index() + 1);
                if let Some(child) = advance(arena, &th, target, th.badness, value, generation) {
                    work.push_back(child);
                }
            }
            Instruction::Bad { cost, func } => {
                let apply = func.as_ref().map_or(true, |f| f(options));
                let new_badness = if apply { th.badness + cost } else { th.badness };
                let target = Pc::new(th.pc.index() + 1);
                if let Some(child) = advance(arena, &th, target, new_badness, None, generation) {
                    work.push_back(child);
                }
            }
            Instruction::Accept => {
                // Each accept is a distinct accepting trace, never merged with
                // another, even when another lineage reaches accept independently
                // in the same generation.
                if is_final {
                    accepts.push(th.trace_id);
                } else {
                    tracing::trace!(pc = ?th.pc, "early accept dropped: input remains");
                }
            }
            Instruction::Test { .. } => match test_seen[th.pc.index()] {
                Some(idx) => merge_parked(arena, &mut parked[idx], th.badness, th.trace_id),
                None => {
                    test_seen[th.pc.index()] = Some(parked.len());
                    parked.push(ParkedThread { pc: th.pc, badness: th.badness, trace_id: th.trace_id, visited: th.visited });
                }
            },
        }
    }

    (parked, accepts)
}

/// Builds the successor of `th` at `target`, unless `th`'s own lineage has
/// already visited `target` this generation. Checked against the parent's own
/// history, so a sibling lineage forked from the same jump can never poison this
/// one's guard.
fn advance<D>(
    arena: &TraceArena<D>,
    th: &Lineage,
    target: Pc,
    badness: u32,
    record_value: Option<Rc<D>>,
    generation: usize,
) -> Option<Lineage> {
    if th.visited.contains_in_generation(target, generation) {
        return None;
    }
    let mut visited = th.visited.clone();
    visited.mark(target, generation);
    let trace_id = arena.cons(th.trace_id, target, record_value);
    Some(Lineage { pc: target, badness, trace_id, visited })
}

/// Merges a newly-arriving lineage into an already-parked thread at the same PC.
/// The cheaper-badness trace is prepended; the survivor's badness is the minimum
/// of the two.
fn merge_parked<D>(arena: &TraceArena<D>, existing: &mut ParkedThread, badness: u32, trace_id: TraceId) {
    let merged_trace = if badness < existing.badness {
        arena.join(trace_id, existing.trace_id)
    } else {
        arena.join(existing.trace_id, trace_id)
    };
    existing.trace_id = merged_trace;
    existing.badness = existing.badness.min(badness);
}
