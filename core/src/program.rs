use crate::Instruction;
#[cfg(feature = "validate")]
use crate::{Pc, errors::ProgramError};

/// An assembled, immutable program: an ordered list of [`Instruction`]s addressed
/// by [`Pc`](crate::Pc). Programs carry no per-run state and may be shared across
/// concurrent `execute` calls.
pub struct Program<T, D, O> {
    instructions: Vec<Instruction<T, D, O>>,
}

impl<T, D, O> Program<T, D, O> {
    /// Constructs a program from its instructions. Used by the assembler's
    /// `finish()`; not meant to be called directly by frontends.
    pub fn from_instructions(instructions: Vec<Instruction<T, D, O>>) -> Self {
        Program { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction<T, D, O>] {
        &self.instructions
    }
}

#[cfg(feature = "validate")]
impl<T, D, O> Program<T, D, O> {
    /// Opt-in structural sanity pass over a finished program. Never called by
    /// `execute`.
    ///
    /// Flags two construction mistakes that would otherwise surface only as silent,
    /// hard-to-debug match failures: a `jump([])` nobody patched, and a jump target
    /// outside the program bounds.
    pub fn validate(&self) -> Result<(), ProgramError> {
        for (idx, instr) in self.instructions.iter().enumerate() {
            let Some(targets) = instr.jump_targets() else { continue };
            let pc = Pc::new(idx);
            if targets.is_empty() {
                return Err(ProgramError::EmptyJump { pc });
            }
            for &target in targets {
                if target.index() >= self.instructions.len() {
                    return Err(ProgramError::JumpOutOfBounds { pc, target, len: self.instructions.len() });
                }
            }
        }
        Ok(())
    }
}
