//! Core types for the structure-matching virtual machine: instructions, programs
//! and the trace provenance DAG. See the workspace `tracevm` crate for the VM
//! facade and the `tracevm-processor` crate for the scheduler that walks these
//! types.

pub mod callback;
#[cfg(feature = "validate")]
pub mod errors;
mod instruction;
mod pc;
mod program;
mod trace;

pub use callback::{BadFn, RecordFn, TestFn};
pub use instruction::Instruction;
pub use pc::Pc;
pub use program::Program;
pub use trace::{Trace, TraceArena, TraceId};
