//! Human-readable rendering of a [`Trace`]/[`RunResult`]. Not a wire format or a
//! persistence mechanism — just enough to print a compacted trace for diagnostics
//! and for this crate's own test assertions.

use std::fmt;

use tracevm_core::{Pc, Trace};
use tracevm_processor::RunResult;

/// Renders a single prefix branch of a trace: its head PCs and any records,
/// e.g. `0 -> 1 -> 4 ["joined"]`.
fn render_branch<D: fmt::Debug>(f: &mut fmt::Formatter<'_>, head: &[Pc], records: &[std::rc::Rc<D>]) -> fmt::Result {
    for (i, pc) in head.iter().enumerate() {
        if i > 0 {
            write!(f, " -> ")?;
        }
        write!(f, "{pc}")?;
    }
    if !records.is_empty() {
        write!(f, " ")?;
        f.debug_list().entries(records.iter().map(|r| r.as_ref())).finish()?;
    }
    Ok(())
}

/// Wraps a [`Trace`] reference for `Display`, rendering it compacted as one line
/// per merged prefix branch the trace's `head` actually contains post-compaction
/// (a single line for an unmerged trace).
pub struct TraceRender<'a, D>(pub &'a Trace<D>);

impl<D: fmt::Debug + 'static> fmt::Display for TraceRender<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let compacted = self.0.compact();
        render_branch(f, &compacted.head(), &compacted.values())
    }
}

/// Wraps a [`RunResult`] reference for `Display`, rendering its accepting and
/// failing traces one per line, in the order their threads were enqueued.
pub struct RunResultRender<'a, D>(pub &'a RunResult<D>);

impl<D: fmt::Debug + 'static> fmt::Display for RunResultRender<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "success: {}", self.0.success())?;
        for (i, trace) in self.0.accepting_traces().iter().enumerate() {
            writeln!(f, "accept[{i}]: {}", TraceRender(trace))?;
        }
        for (i, trace) in self.0.failing_traces().iter().enumerate() {
            writeln!(f, "fail[{i}]: {}", TraceRender(trace))?;
        }
        Ok(())
    }
}
