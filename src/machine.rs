//! The stack-machine evaluator.
//!
//! Produces the same results and errors as [`crate::eval`], but drives the
//! evaluation with an explicit frame stack instead of host recursion. Each
//! loop iteration pops one frame, steps it, and pushes the frames it
//! schedules; a frame may instead produce a value, which the next popped
//! frame consumes. Applying a closure pushes a single frame for its body in
//! place of the call frame, so calls in tail position run in constant stack
//! space no matter how deep the language-level recursion goes.

use crate::env::{Binding, Environment};
use crate::eval::SymexError;
use crate::function::Function;
use crate::primitives::bootstrap_env;
use crate::special_forms;
use crate::symex::{SAtom, SList, Symex};
use tracing::{instrument, trace};

/// Evaluates `expr` in the bootstrap environment on a fresh machine.
pub fn evaluate(expr: &Symex) -> Result<Symex, SymexError> {
    Machine::new().eval_in(expr, &bootstrap_env())
}

/// One unit of pending work.
///
/// `Evaluate` is the only frame that inspects an expression; every other
/// frame is a continuation that consumes the value produced by the frames
/// stacked above it.
#[derive(Debug, Clone)]
enum Frame {
    /// Evaluate an expression in an environment.
    Evaluate { expr: Symex, env: Environment },
    /// Collect evaluated call elements; apply once none remain.
    Call {
        remaining: SList,
        values: Vec<Symex>,
        env: Environment,
    },
    /// Received one `And` argument's value; short-circuit or continue.
    AndStep { remaining: SList, env: Environment },
    /// Received one `Or` argument's value; short-circuit or continue.
    OrStep { remaining: SList, env: Environment },
    /// Received a `Cond` condition's value; pick the outcome or move on.
    CondStep {
        outcome: Symex,
        remaining: SList,
        env: Environment,
    },
    /// Received a `Where` binding's value; bind it and continue.
    WhereStep {
        name: SAtom,
        remaining: SList,
        body: Symex,
        env: Environment,
    },
}

impl Frame {
    fn and_step(remaining: SList, env: Environment) -> Frame {
        Frame::AndStep { remaining, env }
    }

    fn or_step(remaining: SList, env: Environment) -> Frame {
        Frame::OrStep { remaining, env }
    }
}

/// What stepping one frame produced: frames to push (in push order, so the
/// last one runs first) and/or a value for the next frame down.
struct FrameResult {
    new_frames: Vec<Frame>,
    result: Option<Symex>,
}

impl FrameResult {
    fn push(new_frames: Vec<Frame>) -> FrameResult {
        FrameResult {
            new_frames,
            result: None,
        }
    }

    fn value(result: Symex) -> FrameResult {
        FrameResult {
            new_frames: Vec::new(),
            result: Some(result),
        }
    }
}

/// The evaluator itself. Reusable across evaluations; records the deepest
/// frame stack it ever needed, which is how the tail-call guarantee is
/// observed from the outside.
#[derive(Debug, Default)]
pub struct Machine {
    stack: Vec<Frame>,
    max_stack_depth: usize,
}

impl Machine {
    pub fn new() -> Machine {
        Machine::default()
    }

    /// The deepest the frame stack has grown since construction.
    pub fn max_stack_depth(&self) -> usize {
        self.max_stack_depth
    }

    /// Evaluates `expr` in the bootstrap environment.
    pub fn evaluate(&mut self, expr: &Symex) -> Result<Symex, SymexError> {
        self.eval_in(expr, &bootstrap_env())
    }

    /// Runs the frame loop to completion.
    #[instrument(level = "trace", skip(self, expr, env), fields(expr = %expr))]
    pub fn eval_in(&mut self, expr: &Symex, env: &Environment) -> Result<Symex, SymexError> {
        self.stack.clear();
        self.stack.push(Frame::Evaluate {
            expr: expr.clone(),
            env: env.clone(),
        });
        self.max_stack_depth = self.max_stack_depth.max(self.stack.len());

        let mut last: Option<Symex> = None;
        while let Some(frame) = self.stack.pop() {
            let step = step(frame, last)?;
            self.stack.extend(step.new_frames);
            self.max_stack_depth = self.max_stack_depth.max(self.stack.len());
            last = step.result;
        }

        last.ok_or(SymexError::MissingFrameResult)
    }
}

fn step(frame: Frame, value: Option<Symex>) -> Result<FrameResult, SymexError> {
    match frame {
        Frame::Evaluate { expr, env } => step_evaluate(expr, env),
        Frame::Call {
            remaining,
            values,
            env,
        } => step_call(remaining, values, env, take_value(value)?),
        Frame::AndStep { remaining, env } => {
            let value = take_value(value)?;
            match remaining.split_first() {
                Some((next, rest)) if value.is_truthy() => {
                    Ok(schedule_junction(next, rest, env, Frame::and_step))
                }
                _ => Ok(FrameResult::value(value)),
            }
        }
        Frame::OrStep { remaining, env } => {
            let value = take_value(value)?;
            match remaining.split_first() {
                Some((next, rest)) if !value.is_truthy() => {
                    Ok(schedule_junction(next, rest, env, Frame::or_step))
                }
                _ => Ok(FrameResult::value(value)),
            }
        }
        Frame::CondStep {
            outcome,
            remaining,
            env,
        } => {
            if take_value(value)?.is_truthy() {
                return Ok(FrameResult::push(vec![Frame::Evaluate {
                    expr: outcome,
                    env,
                }]));
            }
            schedule_cond(remaining, env)
        }
        Frame::WhereStep {
            name,
            remaining,
            body,
            env,
        } => {
            let value = take_value(value)?;
            let env = env.extend_with(vec![Binding::new(name, value)]);
            schedule_where(body, remaining, env)
        }
    }
}

fn take_value(value: Option<Symex>) -> Result<Symex, SymexError> {
    value.ok_or(SymexError::MissingFrameResult)
}

fn step_evaluate(expr: Symex, env: Environment) -> Result<FrameResult, SymexError> {
    match &expr {
        Symex::Atom(atom) if atom.is_data_atom() => Ok(FrameResult::value(expr)),
        Symex::Atom(atom) => Ok(FrameResult::value(env.lookup(atom)?)),
        Symex::List(list) => {
            let Some((head, args)) = list.split_first() else {
                return Err(SymexError::EmptyListEvaluation);
            };
            match head {
                Symex::Atom(name) if special_forms::is_special_form(name.text()) => {
                    step_special_form(name.text(), args, env)
                }
                _ => Ok(FrameResult::push(vec![
                    Frame::Call {
                        remaining: args,
                        values: Vec::new(),
                        env: env.clone(),
                    },
                    Frame::Evaluate {
                        expr: head.clone(),
                        env,
                    },
                ])),
            }
        }
    }
}

fn step_special_form(
    name: &str,
    args: SList,
    env: Environment,
) -> Result<FrameResult, SymexError> {
    trace!(form = name, "Scheduling special form");
    match name {
        special_forms::QUOTE => Ok(FrameResult::value(special_forms::quote_argument(&args)?)),
        special_forms::LAMBDA => Ok(FrameResult::value(special_forms::make_lambda(&args, &env)?)),
        special_forms::FUNCTION => {
            Ok(FrameResult::value(special_forms::make_function(&args, &env)?))
        }
        special_forms::AND => match args.split_first() {
            None => Ok(FrameResult::value(Symex::truthy())),
            Some((next, rest)) => Ok(schedule_junction(next, rest, env, Frame::and_step)),
        },
        special_forms::OR => match args.split_first() {
            None => Ok(FrameResult::value(Symex::falsy())),
            Some((next, rest)) => Ok(schedule_junction(next, rest, env, Frame::or_step)),
        },
        special_forms::COND => schedule_cond(args, env),
        special_forms::WHERE => {
            let (body, bindings) = special_forms::split_where(&args)?;
            schedule_where(body, bindings, env)
        }
        _ => unreachable!("dispatch covers every special form"),
    }
}

/// Schedules the next `And`/`Or` argument together with the continuation
/// that will inspect its value.
fn schedule_junction(
    next: &Symex,
    rest: SList,
    env: Environment,
    make_frame: fn(SList, Environment) -> Frame,
) -> FrameResult {
    FrameResult::push(vec![
        make_frame(rest, env.clone()),
        Frame::Evaluate {
            expr: next.clone(),
            env,
        },
    ])
}

fn schedule_cond(cases: SList, env: Environment) -> Result<FrameResult, SymexError> {
    let Some((case, remaining)) = cases.split_first() else {
        return Err(SymexError::NoMatchingCondition);
    };
    let (condition, outcome) = special_forms::split_case(case)?;
    Ok(FrameResult::push(vec![
        Frame::CondStep {
            outcome,
            remaining,
            env: env.clone(),
        },
        Frame::Evaluate {
            expr: condition,
            env,
        },
    ]))
}

fn schedule_where(
    body: Symex,
    bindings: SList,
    env: Environment,
) -> Result<FrameResult, SymexError> {
    let Some((binding_expr, remaining)) = bindings.split_first() else {
        return Ok(FrameResult::push(vec![Frame::Evaluate { expr: body, env }]));
    };
    let (name, value_expr) = special_forms::split_binding(binding_expr)?;
    Ok(FrameResult::push(vec![
        Frame::WhereStep {
            name,
            remaining,
            body,
            env: env.clone(),
        },
        Frame::Evaluate {
            expr: value_expr,
            env,
        },
    ]))
}

fn step_call(
    remaining: SList,
    mut values: Vec<Symex>,
    env: Environment,
    value: Symex,
) -> Result<FrameResult, SymexError> {
    values.push(value);

    if let Some((next, rest)) = remaining.split_first() {
        return Ok(FrameResult::push(vec![
            Frame::Call {
                remaining: rest,
                values,
                env: env.clone(),
            },
            Frame::Evaluate {
                expr: next.clone(),
                env,
            },
        ]));
    }

    // Non-empty: the function's own value was pushed before any arguments.
    let (func_value, args) = values
        .split_first()
        .ok_or(SymexError::MissingFrameResult)?;

    match Function::from_symex(func_value)? {
        Function::Primitive(primitive) => Ok(FrameResult::value(primitive.apply(args)?)),
        Function::Closure(closure) => {
            // The call frame is already popped, so the body's frame replaces
            // it. Tail calls therefore reuse the same stack slot.
            let call_env = closure.build_env(args)?;
            Ok(FrameResult::push(vec![Frame::Evaluate {
                expr: closure.body.clone(),
                env: call_env,
            }]))
        }
    }
}
