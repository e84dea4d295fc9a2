//! Callback signatures used by [`crate::Instruction`].
//!
//! No `Send`/`Sync` bound: the VM is single-threaded cooperative, with no OS
//! threads involved, so callbacks are free to close over `Rc`/`RefCell` state the
//! way the rest of this single-threaded scheduler does.

/// Decides whether a `test` instruction survives against the current input item.
///
/// `TestFunc(item, data, options) -> bool`
pub type TestFn<T, D, O> = dyn Fn(&T, &D, &O) -> bool;

/// Computes the value a `record` instruction emits onto its trace. A `None` return
/// suppresses emission for that visit.
///
/// `RecordFunc(data, input_index, options) -> Option<data>`
pub type RecordFn<D, O> = dyn Fn(&D, usize, &O) -> Option<D>;

/// Decides whether a `bad` instruction's cost should be applied this visit.
///
/// `FailFunc(options) -> bool`
pub type BadFn<O> = dyn Fn(&O) -> bool;
