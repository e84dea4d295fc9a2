use tracevm_assembly::Assembler;
use tracevm_core::Program;
use tracevm_processor::{ExecutionError, RunOptions, RunResult, execute};

/// An immutable, compiled program ready to run. `Vm` owns no per-run state: the
/// same `Vm` may be driven by any number of concurrent or sequential `execute`
/// calls, each against its own input adapter and options.
pub struct Vm<T, D, O> {
    program: Program<T, D, O>,
}

impl<T, D, O> Vm<T, D, O> {
    /// Runs this program against `input`, calling it once per generation until it
    /// returns `None`.
    pub fn execute(
        &self,
        input: impl FnMut() -> Option<T>,
        run_options: &RunOptions<O>,
    ) -> Result<RunResult<D>, ExecutionError> {
        execute(&self.program, input, run_options)
    }

    /// The underlying compiled program, e.g. to run [`tracevm_core::Program::validate`]
    /// (behind the `validate` feature) in a test.
    pub fn program(&self) -> &Program<T, D, O> {
        &self.program
    }
}

/// Builds a [`Vm`] by running `build` against a fresh [`Assembler`].
///
/// ```
/// use tracevm::compile_vm;
///
/// let vm = compile_vm::<char, (), ()>(|asm| {
///     asm.test((), Box::new(|item: &char, _: &(), _: &()| *item == 'a'));
///     asm.accept();
/// });
/// assert_eq!(vm.program().len(), 2);
/// ```
pub fn compile_vm<T, D, O>(build: impl FnOnce(&mut Assembler<T, D, O>)) -> Vm<T, D, O> {
    let mut asm = Assembler::new();
    build(&mut asm);
    Vm { program: asm.finish() }
}
