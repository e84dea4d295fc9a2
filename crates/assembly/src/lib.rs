//! Builds [`Program`]s by emitting one [`Instruction`] at a time.
//!
//! Programs are compiled from structured, possibly recursive descriptions (a regular
//! expression, a grammar production, a schema) where a `jump`'s targets are not known
//! until the branches it forks into have themselves been compiled. The assembler's
//! job is to let a caller emit a `jump` before its targets exist and patch them in
//! once they do, the same back-patching shape a basic-block compiler uses for
//! forward branches.

use std::rc::Rc;

use tracevm_core::{BadFn, Instruction, Pc, Program, RecordFn, TestFn};

/// A handle to a previously emitted instruction, by program counter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstrHandle(Pc);

impl InstrHandle {
    /// The program counter this handle addresses.
    pub fn pc(self) -> Pc {
        self.0
    }
}

/// A handle to a previously emitted `jump` instruction whose target list is still
/// empty. Must be patched with at least one target via
/// [`Assembler::patch_jump`] before the program is finished, or
/// [`tracevm_core::Program::validate`] will reject it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct JumpHandle(Pc);

impl JumpHandle {
    pub fn pc(self) -> Pc {
        self.0
    }
}

/// Incrementally builds a [`Program`] by appending instructions.
///
/// ```
/// use tracevm_assembly::Assembler;
///
/// let mut asm: Assembler<char, (), ()> = Assembler::new();
/// asm.test((), Box::new(|item: &char, _, _| *item == 'a'));
/// asm.accept();
/// let program = asm.finish();
/// assert_eq!(program.len(), 2);
/// ```
pub struct Assembler<T, D, O> {
    instructions: Vec<Instruction<T, D, O>>,
}

impl<T, D, O> Default for Assembler<T, D, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D, O> Assembler<T, D, O> {
    pub fn new() -> Self {
        Assembler { instructions: Vec::new() }
    }

    /// The program counter the next emitted instruction will occupy. Useful for
    /// recording a target address before the instruction at that address exists,
    /// e.g. a loop head a later `jump` will point back to.
    pub fn here(&self) -> Pc {
        Pc::new(self.instructions.len())
    }

    fn push(&mut self, instr: Instruction<T, D, O>) -> InstrHandle {
        let pc = self.here();
        self.instructions.push(instr);
        InstrHandle(pc)
    }

    /// Emits a `test` instruction.
    pub fn test(&mut self, data: D, func: Box<TestFn<T, D, O>>) -> InstrHandle {
        self.push(Instruction::Test { data: Rc::new(data), func })
    }

    /// Emits a `record` instruction. `func = None` is the unconditional record
    /// form: the value carried is always `data`, with no per-visit transform.
    pub fn record(&mut self, data: D, func: Option<Box<RecordFn<D, O>>>) -> InstrHandle {
        self.push(Instruction::Record { data: Rc::new(data), func })
    }

    /// Emits a `bad` instruction.
    pub fn bad(&mut self, cost: u32, func: Option<Box<BadFn<O>>>) -> InstrHandle {
        self.push(Instruction::Bad { cost, func })
    }

    /// Emits `accept`.
    pub fn accept(&mut self) -> InstrHandle {
        self.push(Instruction::Accept)
    }

    /// Emits an empty `jump`, returning a handle to patch once its targets are
    /// known. An un-patched jump left in the finished program is a bug; run
    /// `Program::validate` (behind the `validate` feature on `tracevm-core`) in
    /// tests to catch it.
    pub fn jump(&mut self) -> JumpHandle {
        let pc = self.here();
        self.instructions.push(Instruction::Jump { targets: Vec::new() });
        JumpHandle(pc)
    }

    /// Emits a `jump` whose targets are already known, skipping the patch step.
    pub fn jump_to(&mut self, targets: Vec<Pc>) -> InstrHandle {
        self.push(Instruction::Jump { targets })
    }

    /// Appends one target to a jump emitted via [`Self::jump`].
    pub fn add_jump_target(&mut self, handle: JumpHandle, target: Pc) {
        let Instruction::Jump { targets } = &mut self.instructions[handle.0.index()] else {
            unreachable!("JumpHandle always addresses a Jump instruction");
        };
        targets.push(target);
    }

    /// Replaces the full target list of a jump emitted via [`Self::jump`].
    pub fn patch_jump(&mut self, handle: JumpHandle, targets: Vec<Pc>) {
        let Instruction::Jump { targets: slot } = &mut self.instructions[handle.0.index()] else {
            unreachable!("JumpHandle always addresses a Jump instruction");
        };
        *slot = targets;
    }

    /// Points the jump at the program's current end, i.e. `self.here()`. A common
    /// idiom when the branch immediately follows the jump in program order.
    pub fn patch_jump_here(&mut self, handle: JumpHandle) {
        let here = self.here();
        self.add_jump_target(handle, here);
    }

    /// Consumes the assembler, producing an immutable [`Program`].
    pub fn finish(self) -> Program<T, D, O> {
        Program::from_instructions(self.instructions)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn back_patches_a_forward_jump() {
        let mut asm: Assembler<char, (), ()> = Assembler::new();
        let j = asm.jump();
        let target = asm.here();
        asm.accept();
        asm.patch_jump(j, vec![target]);

        let program = asm.finish();
        match &program.instructions()[0] {
            Instruction::Jump { targets } => assert_eq!(targets, &[target]),
            other => panic!("expected jump, got {:?}", other.mnemonic()),
        }
    }

    #[test]
    fn patch_jump_here_targets_current_end() {
        let mut asm: Assembler<char, (), ()> = Assembler::new();
        let j = asm.jump();
        asm.patch_jump_here(j);
        let expected = asm.here();
        asm.accept();

        match &asm.finish().instructions()[0] {
            Instruction::Jump { targets } => assert_eq!(targets, &[expected]),
            _ => unreachable!(),
        }
    }

    #[test]
    fn multi_target_jump_forks_into_all_branches() {
        let mut asm: Assembler<char, (), ()> = Assembler::new();
        let j = asm.jump();
        let a = asm.here();
        asm.accept();
        let b = asm.here();
        asm.accept();
        asm.patch_jump(j, vec![a, b]);

        match &asm.finish().instructions()[0] {
            Instruction::Jump { targets } => assert_eq!(targets, &[a, b]),
            _ => unreachable!(),
        }
    }
}
