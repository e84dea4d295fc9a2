use std::rc::Rc;

use crate::Pc;
use crate::callback::{BadFn, RecordFn, TestFn};

/// One instruction of a compiled program. Jump targets are a mutable list rather
/// than a fixed field because the assembler needs to back-patch them after
/// compiling subtrees.
///
/// `Test` and `Record` hold their associated data behind `Rc` so that dispatching
/// either opcode many times across many threads never clones the underlying
/// value, only bumps a refcount — the same reference semantics the trace DAG uses
/// for record values.
pub enum Instruction<T, D, O> {
    /// Consumes one input item; survives iff `func(item, data, options)` is true.
    Test { data: Rc<D>, func: Box<TestFn<T, D, O>> },
    /// Forks the thread into one successor per target PC. Does not consume input.
    Jump { targets: Vec<Pc> },
    /// Emits a value onto the thread's trace. Does not consume input.
    ///
    /// `func = None` emits `data` itself on every visit. `func = Some(f)` calls
    /// `f(&data, input_index, options)` and emits its result, if any; `None` from
    /// `f` suppresses emission for that visit without skipping the instruction.
    Record { data: Rc<D>, func: Option<Box<RecordFn<D, O>>> },
    /// Adds to the thread's badness, optionally conditioned on a predicate.
    Bad { cost: u32, func: Option<Box<BadFn<O>>> },
    /// Marks the thread as accepting at the current input position.
    Accept,
}

impl<T, D, O> Instruction<T, D, O> {
    /// A short, stable name for the opcode, used in diagnostics and `Debug` output.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Test { .. } => "test",
            Instruction::Jump { .. } => "jump",
            Instruction::Record { .. } => "record",
            Instruction::Bad { .. } => "bad",
            Instruction::Accept => "accept",
        }
    }

    /// Mutable access to this instruction's jump targets, if it is a `jump`.
    ///
    /// This is how the assembler back-patches a forward jump after it has compiled
    /// the branches the jump should target: `jump([])` is emitted first, its handle
    /// retained, and targets are pushed once they are known.
    pub fn jump_targets_mut(&mut self) -> Option<&mut Vec<Pc>> {
        match self {
            Instruction::Jump { targets } => Some(targets),
            _ => None,
        }
    }

    pub fn jump_targets(&self) -> Option<&[Pc]> {
        match self {
            Instruction::Jump { targets } => Some(targets),
            _ => None,
        }
    }
}

impl<T, D, O> std::fmt::Debug for Instruction<T, D, O>
where
    D: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Test { data, .. } => f.debug_struct("Test").field("data", data).finish(),
            Instruction::Jump { targets } => f.debug_struct("Jump").field("targets", targets).finish(),
            Instruction::Record { data, func } => f
                .debug_struct("Record")
                .field("data", data)
                .field("has_func", &func.is_some())
                .finish(),
            Instruction::Bad { cost, func } => f
                .debug_struct("Bad")
                .field("cost", cost)
                .field("has_func", &func.is_some())
                .finish(),
            Instruction::Accept => write!(f, "Accept"),
        }
    }
}
