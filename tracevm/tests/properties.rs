//! Property-based checks over arbitrary small programs and inputs: the scheduler's
//! generation loop is meant to behave identically run to run and to terminate on
//! any jump graph, epsilon cycles included — properties no fixed-example test can
//! exhaustively cover.

use proptest::prelude::*;
use tracevm::{Pc, RunOptions, Vm, compile_vm};

/// `a*.*`, the `.*` charged one unit of badness per item it absorbs. Succeeds on
/// any input, deterministically, since the catch-all `test` accepts anything.
fn a_star_dot_star() -> Vm<char, u32, ()> {
    compile_vm::<char, u32, ()>(|asm| {
        let loop1 = asm.here();
        let fork1 = asm.jump();
        let consume_a = asm.here();
        asm.test(0u32, Box::new(|item: &char, _: &u32, _: &()| *item == 'a'));
        let back1 = asm.jump();
        let exit_a = asm.here();
        asm.record(0u32, Some(Box::new(|_: &u32, idx: usize, _: &()| Some(idx as u32))));

        let loop2 = asm.here();
        let fork2 = asm.jump();
        let consume_any = asm.here();
        asm.bad(1, None);
        asm.test(0u32, Box::new(|_: &char, _: &u32, _: &()| true));
        let back2 = asm.jump();
        let exit_any = asm.here();
        asm.accept();

        asm.patch_jump(fork1, vec![consume_a, exit_a]);
        asm.patch_jump(back1, vec![loop1]);
        asm.patch_jump(fork2, vec![consume_any, exit_any]);
        asm.patch_jump(back2, vec![loop2]);
    })
}

fn run(vm: &Vm<char, u32, ()>, input: &[char]) -> tracevm::RunResult<u32> {
    let mut items = input.iter().copied();
    vm.execute(|| items.next(), &RunOptions::new(())).expect("a*.* never errors")
}

fn any_input() -> impl Strategy<Value = Vec<char>> {
    proptest::collection::vec(prop_oneof![Just('a'), Just('b'), Just('c')], 0..16)
}

proptest! {
    /// Running the same program against the same input twice always produces the
    /// same outcome: same success, same accepting and failing traces, in the same
    /// order.
    #[test]
    fn execution_is_deterministic(input in any_input()) {
        let vm = a_star_dot_star();
        let first = run(&vm, &input);
        let second = run(&vm, &input);

        prop_assert_eq!(first.success(), second.success());
        prop_assert_eq!(first.accepting_traces(), second.accepting_traces());
        prop_assert_eq!(first.failing_traces(), second.failing_traces());
    }

    /// A trace's recorded values never outnumber the PCs its lineage dispatched
    /// against: every `record` sits on a path already reflected in `head`.
    #[test]
    fn trace_values_never_exceed_head_length(input in any_input()) {
        let vm = a_star_dot_star();
        let result = run(&vm, &input);

        for trace in result.accepting_traces().iter().chain(result.failing_traces()) {
            prop_assert!(trace.values().len() <= trace.head().len());
        }
    }
}

/// Builds a program out of nothing but `jump`s, one per entry in `targets`
/// (`targets[i]` is the set of pcs jump `i` forks into), with an `accept`
/// appended after them as the only non-`jump` instruction.
fn epsilon_graph(targets: &[Vec<usize>]) -> Vm<char, (), ()> {
    compile_vm::<char, (), ()>(|asm| {
        for t in targets {
            let jump = asm.jump();
            asm.patch_jump(jump, t.iter().map(|&i| Pc::new(i)).collect());
        }
        asm.accept();
    })
}

fn any_epsilon_graph() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..8).prop_flat_map(|n| proptest::collection::vec(proptest::collection::vec(0..n, 0..3), n))
}

proptest! {
    /// However the jump graph is wired, self-loops and mutual cycles included,
    /// `execute` returns rather than looping forever: `VisitedSet` lets a lineage
    /// cross any given pc only once per generation.
    #[test]
    fn epsilon_cycles_terminate(targets in any_epsilon_graph()) {
        let vm = epsilon_graph(&targets);
        let mut chars = std::iter::empty::<char>();
        let outcome = vm.execute(|| chars.next(), &RunOptions::new(()));
        prop_assert!(outcome.is_ok());
    }
}
