#![doc = include_str!("../README.md")]

mod render;
mod vm;

pub use render::{RunResultRender, TraceRender};
pub use vm::{Vm, compile_vm};

pub use tracevm_assembly::{Assembler, InstrHandle, JumpHandle};
pub use tracevm_core::errors::ProgramError;
pub use tracevm_core::{BadFn, Instruction, Pc, Program, RecordFn, TestFn, Trace, TraceArena, TraceId};
pub use tracevm_processor::{ExecutionError, ExecutionLimits, RunOptions, RunResult, execute};
/// Re-exported so a caller instrumenting their own `test`/`record`/`bad`
/// callbacks can annotate them with the same tracing infrastructure the
/// scheduler itself uses internally.
pub use tracing::instrument;
