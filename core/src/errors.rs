//! Opt-in diagnostics for program construction bugs.
//!
//! The VM itself treats malformed programs as undefined-behavior territory: it
//! does not validate. [`crate::Program::validate`] is a separate, read-only pass a
//! caller may run voluntarily (typically in tests, or while developing a new
//! frontend on top of the assembler) to catch the two mistakes that are otherwise
//! silent: an unpatched `jump([])` and a jump target outside the program. It never
//! runs as part of `execute`.

use crate::Pc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("jump at pc {pc} has no targets (an emitted jump([]) was never patched)")]
    EmptyJump { pc: Pc },
    #[error("jump at pc {pc} targets out-of-bounds pc {target} (program has {len} instructions)")]
    JumpOutOfBounds { pc: Pc, target: Pc, len: usize },
}
