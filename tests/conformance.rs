//! The two evaluators define one language: for every program they must
//! produce the same value, or fail with the same error.

use symex::SymexError;
use symex::eval;
use symex::machine::Machine;
use symex::parser::parse;
use symex::primitives::bootstrap_env;

/// A mix of succeeding and failing programs covering every special form,
/// every primitive, and the error taxonomy.
const PROGRAMS: &[&str] = &[
    // Self-evaluating data and variable lookup.
    ":data",
    "Nil",
    "Head",
    "unbound-name",
    // Quoting.
    "(Quote hello)",
    "(Quote (a (b c)))",
    "(Quote)",
    "(Quote a b)",
    // Calls and primitives.
    "(List)",
    "(List :one :two :three)",
    "(Cons :a (List :b))",
    "(Cons :a :not-a-list)",
    "(Head (List :a :b))",
    "(Tail (List :a :b))",
    "(Head (List))",
    "(Tail (List))",
    "(Head :atom)",
    "(Not :false)",
    "(Not (List))",
    "(= :a :a :a)",
    "(= :a :b)",
    "(=)",
    "(Is-Data-Atom :yes)",
    "(Is-Data-Atom no)",
    "(Error :boom)",
    "(Head (List :a) :extra)",
    // Junctions.
    "(And)",
    "(Or)",
    "(And :one :two)",
    "(Or :false :two)",
    "(And :false (Error :unreachable))",
    "(Or :one (Error :unreachable))",
    "(And (List) :after-empty-list)",
    // Conditionals.
    "(Cond (:true :yes))",
    "(Cond (:false :no) (:true :yes))",
    "(Cond (:false :no))",
    "(Cond)",
    "(Cond :bare-case)",
    "(Cond (:only-a-condition))",
    // Bindings.
    "(Where color (color :blue))",
    "(Where :no-bindings)",
    "(Where second (first :one) (second first))",
    "(Where color (color :yellow) (color :blue))",
    "(Where (Where color (color :yellow)) (color :blue))",
    "(Where)",
    "(Where body ((not an atom) :value))",
    // Functions.
    "((Lambda (x) x) :value)",
    "((Lambda (x f) (f x)) (List :hello) Head)",
    "((Lambda (x) x))",
    "((Lambda (x) x) :a :b)",
    "(Lambda (x))",
    "(Function NoParams)",
    "(:data :arg)",
    "((List :not-a-function) :arg)",
    "()",
    "(())",
    // Recursion through a self-name.
    "(Where (Laugh (List :one :two :three))
        (Laugh (Function Laugh (list)
            (Cond ((= list Nil)
                    Nil)
                  (:true
                    (Cons :ha (Laugh (Tail list))))))))",
    // Closures capture their definition environment.
    "(Where (stored)
        (stored (Where (Lambda () color) (color :blue))))",
    // Functions are data: quote one, then apply it.
    "(Where (f :arg)
        (f (Lambda (x) (List x x))))",
];

#[test]
fn evaluators_agree_on_every_program() {
    for source in PROGRAMS {
        let expr = parse(source).unwrap_or_else(|err| panic!("bad program {source:?}: {err}"));
        let direct = eval::evaluate(&expr);
        let machined = Machine::new().eval_in(&expr, &bootstrap_env());
        assert_eq!(
            direct, machined,
            "evaluators disagree on {source:?}: direct={direct:?}, machine={machined:?}"
        );
    }
}

#[test]
fn evaluators_agree_on_the_quine() {
    let source = "((Lambda (expr)
            (List expr
                  (List (Quote Quote) expr)))
        (Quote (Lambda (expr)
                    (List expr
                          (List (Quote Quote) expr)))))";
    let expr = parse(source).unwrap();
    assert_eq!(eval::evaluate(&expr), Ok(expr.clone()));
    assert_eq!(Machine::new().evaluate(&expr), Ok(expr));
}

#[test]
fn reported_errors_carry_the_expected_kind() {
    let cases: &[(&str, SymexError)] = &[
        ("missing", SymexError::UnboundName("missing".to_string())),
        ("()", SymexError::EmptyListEvaluation),
        (
            "(Head (List))",
            SymexError::EmptyList("Head".to_string()),
        ),
        ("(Cond (:false :no))", SymexError::NoMatchingCondition),
        (
            "((Lambda (x) x))",
            SymexError::ArityMismatch {
                expected: 1,
                got: 0,
            },
        ),
        (
            "(Error :boom)",
            SymexError::UserError(symex::Symex::atom(":boom")),
        ),
    ];
    for (source, expected) in cases {
        let expr = parse(source).unwrap();
        assert_eq!(eval::evaluate(&expr), Err(expected.clone()), "on {source:?}");
        assert_eq!(
            Machine::new().evaluate(&expr),
            Err(expected.clone()),
            "on {source:?}"
        );
    }
}
