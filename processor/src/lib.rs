//! The thread scheduler: drives a compiled program through an input sequence one
//! item at a time, producing accepting and failing traces.

mod errors;
mod options;
mod result;
mod scheduler;
mod thread;

pub use errors::ExecutionError;
pub use options::{ExecutionLimits, RunOptions};
pub use result::RunResult;
pub use scheduler::execute;
