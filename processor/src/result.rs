use tracevm_core::Trace;

/// The artifact of one `execute` call.
///
/// All traces are returned already compacted. `success()` is derived rather than
/// stored, so it can never drift out of sync with `accepting_traces`: a run is a
/// success exactly when at least one accepting trace exists.
pub struct RunResult<D> {
    accepting_traces: Vec<Trace<D>>,
    failing_traces: Vec<Trace<D>>,
}

impl<D> RunResult<D> {
    pub(crate) fn new(accepting_traces: Vec<Trace<D>>, failing_traces: Vec<Trace<D>>) -> Self {
        RunResult { accepting_traces, failing_traces }
    }

    pub fn success(&self) -> bool {
        !self.accepting_traces.is_empty()
    }

    /// Accepting traces, in the order their threads were enqueued.
    pub fn accepting_traces(&self) -> &[Trace<D>] {
        &self.accepting_traces
    }

    /// Failing traces, in the order their threads were enqueued.
    pub fn failing_traces(&self) -> &[Trace<D>] {
        &self.failing_traces
    }
}
