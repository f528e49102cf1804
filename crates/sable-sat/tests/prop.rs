//! End-to-end propositional scenarios: Tseitin + CDCL behind the facade.

use sable_core::prop::PropNode;
use sable_sat::{PropSolver, SatOutcome};
use std::collections::HashMap;

fn a() -> PropNode {
    PropNode::var("a")
}

fn b() -> PropNode {
    PropNode::var("b")
}

/// Brute-force satisfiability over the formula's own variables.
fn brute_force_sat(formula: &PropNode) -> bool {
    let vars = formula.variables();
    let n = vars.len();
    (0..1u32 << n).any(|bits| {
        let assignment: HashMap<String, bool> = vars
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), bits >> i & 1 == 1))
            .collect();
        formula.eval(&assignment) == Some(true)
    })
}

fn expect_model(formula: &PropNode) -> HashMap<String, bool> {
    match PropSolver::new().submit(formula) {
        SatOutcome::Sat(model) => model,
        SatOutcome::Unsat => panic!("expected SAT for {formula}"),
    }
}

#[test]
fn negated_conjunction_is_sat() {
    let formula = a().and(b()).not();
    let model = expect_model(&formula);
    // the assignment is total over {a, b} and falsifies at least one of them
    assert_eq!(model.len(), 2);
    assert!(!model["a"] || !model["b"]);
    assert_eq!(formula.eval(&model), Some(true));
}

#[test]
fn contradiction_is_unsat() {
    let formula = a().and(a().not());
    assert_eq!(PropSolver::new().submit(&formula), SatOutcome::Unsat);
}

#[test]
fn four_clause_contradiction_is_unsat() {
    let formula = a()
        .or(b())
        .and(a().not().or(b()))
        .and(a().or(b().not()))
        .and(a().not().or(b().not()));
    assert_eq!(PropSolver::new().submit(&formula), SatOutcome::Unsat);
}

#[test]
fn constants_are_meaningful() {
    let pinned_false = a().and(PropNode::constant(false));
    assert_eq!(PropSolver::new().submit(&pinned_false), SatOutcome::Unsat);

    let pinned_true = a().and(PropNode::constant(true));
    let model = expect_model(&pinned_true);
    assert_eq!(model["a"], true);
}

#[test]
fn returned_models_satisfy_the_formula() {
    let formulas = vec![
        a().or(b()),
        a().not().or(b().not()),
        a().and(b()).or(a().not().and(b().not())),
        a().or(b()).and(a().not().or(b())).and(PropNode::var("c").not()),
    ];
    for formula in formulas {
        let model = expect_model(&formula);
        assert_eq!(formula.eval(&model), Some(true), "model fails {formula}");
    }
}

#[test]
fn engine_agrees_with_brute_force() {
    let c = || PropNode::var("c");
    let formulas = vec![
        a().and(b()).not(),
        a().and(a().not()),
        a().or(b()).and(a().not().or(b()).and(a().or(b().not())).and(a().not().or(b().not()))),
        a().or(b().or(c())).and(a().not()).and(b().not()),
        a().and(b()).and(c()).not().and(a()).and(b()).and(c()),
        a().or(a().not()).and(b().or(c().not())),
    ];
    for formula in formulas {
        let expected = brute_force_sat(&formula);
        let got = PropSolver::new().submit(&formula).is_sat();
        assert_eq!(got, expected, "engine disagrees on {formula}");
    }
}

#[test]
fn deeper_formula_exercises_learning() {
    // an XOR-flavored chain: (a ∨ b) ∧ (¬a ∨ ¬b) ∧ (b ∨ c) ∧ (¬b ∨ ¬c) ∧ (a ∨ ¬c)
    let c = || PropNode::var("c");
    let formula = a()
        .or(b())
        .and(a().not().or(b().not()))
        .and(b().or(c()))
        .and(b().not().or(c().not()))
        .and(a().or(c().not()));
    let model = expect_model(&formula);
    assert_eq!(formula.eval(&model), Some(true));
}
