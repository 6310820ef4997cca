//! Stack behavior of the machine evaluator at full scale.
//!
//! These run in their own process with no tracing subscriber installed, so
//! per-step traces cost nothing and the timings reflect evaluation alone.

use symex::env::Binding;
use symex::machine::Machine;
use symex::parser::parse;
use symex::primitives::bootstrap_env;
use symex::{SAtom, Symex};

fn items(len: usize) -> Symex {
    Symex::list((0..len).map(|_| Symex::atom(":item")))
}

/// A tail-recursive walk over a 100,000-element list: the frame stack must
/// stay bounded by a small constant, and releasing the list afterwards must
/// not exhaust the host stack either.
#[test]
fn tail_calls_run_in_constant_stack_space() {
    let env = bootstrap_env().extend_with(vec![Binding::new(
        SAtom::new("items"),
        items(100_000),
    )]);
    let program = parse(
        "(Where (Walk items)
            (Walk (Function Walk (list)
                (Cond ((= list Nil)
                        :done)
                      (:true
                        (Walk (Tail list)))))))",
    )
    .unwrap();

    let mut machine = Machine::new();
    assert_eq!(machine.eval_in(&program, &env), Ok(Symex::atom(":done")));
    assert!(
        machine.max_stack_depth() < 32,
        "stack grew to {} frames",
        machine.max_stack_depth()
    );
    drop(env);
}

/// A non-tail recursion keeps one pending call frame per level, so the frame
/// stack is allowed to track the input size.
#[test]
fn non_tail_recursion_grows_the_frame_stack() {
    let env = bootstrap_env().extend_with(vec![Binding::new(
        SAtom::new("items"),
        items(500),
    )]);
    let program = parse(
        "(Where (Laugh items)
            (Laugh (Function Laugh (list)
                (Cond ((= list Nil)
                        Nil)
                      (:true
                        (Cons :ha (Laugh (Tail list))))))))",
    )
    .unwrap();

    let mut machine = Machine::new();
    let result = machine.eval_in(&program, &env).unwrap();
    assert_eq!(result.as_list().unwrap().len(), 500);
    assert!(
        machine.max_stack_depth() >= 500,
        "expected the stack to track recursion depth, saw {}",
        machine.max_stack_depth()
    );
}

/// Building a 100,000-element list inside the language and letting the
/// result go out of scope must not overflow the stack on teardown.
#[test]
fn large_results_are_released_without_overflow() {
    let env = bootstrap_env().extend_with(vec![Binding::new(
        SAtom::new("items"),
        items(100_000),
    )]);
    let program = parse(
        "(Where (Copy items)
            (Copy (Function Copy (list)
                (Cond ((= list Nil)
                        Nil)
                      (:true
                        (Cons :ha (Copy (Tail list))))))))",
    )
    .unwrap();

    let result = Machine::new().eval_in(&program, &env).unwrap();
    assert_eq!(result.as_list().unwrap().len(), 100_000);
    drop(result);
    drop(env);
}
