//! End-to-end bit-vector scenarios through the `BvSolver` facade.

use sable_core::expr::ExprNode;
use sable_ilp::{BvOutcome, BvSolver, ClarabelOracle, IlpError, LpOracle, LpRequest, LpStatus};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

fn bv(name: &str, w: u32) -> ExprNode {
    ExprNode::bitvec(name, w)
}

fn con(v: u64, w: u32) -> ExprNode {
    ExprNode::constant(v, w)
}

fn expect_model(solver: &BvSolver) -> HashMap<String, u64> {
    match solver.solve().expect("solve should not error") {
        BvOutcome::Sat(model) => model,
        BvOutcome::Unsat => panic!("expected SAT"),
    }
}

#[test]
fn modular_equation_width_4() {
    // A·7 = 3 over 4 bits: the solver must return some A with 7A ≡ 3 (mod 16)
    let mut solver = BvSolver::new();
    solver.add(bv("A", 4).mul(con(7, 4)).eq(con(3, 4)));
    let model = expect_model(&solver);
    let a = model["A"];
    assert!(a < 16);
    assert_eq!(a * 7 % 16, 3);
}

#[test]
fn bounded_sum_width_32() {
    // 2 ≤ A + B ≤ 5
    let mut solver = BvSolver::new();
    solver.add(bv("A", 32).add(bv("B", 32)).le(con(5, 32)));
    solver.add(bv("A", 32).add(bv("B", 32)).ge(con(2, 32)));
    let model = expect_model(&solver);
    let sum = model["A"] + model["B"];
    assert!((2..=5).contains(&sum));
}

#[test]
fn rank_one_row_width_32() {
    // 3A + 5B = 3·7 + 5·11 = 76, checked mod 2^32
    let mut solver = BvSolver::new();
    solver.add(
        bv("A", 32)
            .mul(con(3, 32))
            .add(bv("B", 32).mul(con(5, 32)))
            .eq(con(76, 32)),
    );
    let model = expect_model(&solver);
    let lhs = (3 * model["A"] as u128 + 5 * model["B"] as u128) % (1u128 << 32);
    assert_eq!(lhs, 76);
}

#[test]
fn contradictory_inequalities_are_unsat() {
    let mut solver = BvSolver::new();
    solver.add(bv("A", 8).le(con(1, 8)));
    solver.add(bv("A", 8).ge(con(3, 8)));
    assert_eq!(solver.solve().unwrap(), BvOutcome::Unsat);
}

#[test]
fn unsigned_below_zero_is_unsat() {
    let mut solver = BvSolver::new();
    solver.add(bv("A", 8).lt(con(0, 8)));
    assert_eq!(solver.solve().unwrap(), BvOutcome::Unsat);
}

#[test]
fn width_mismatch_is_an_error() {
    let mut solver = BvSolver::new();
    solver.add(bv("A", 4).ge(con(1, 8)));
    assert!(matches!(solver.solve(), Err(IlpError::Expr(_))));
}

#[test]
fn solutions_stay_inside_the_width_range() {
    // the only 4-bit value with A ≥ 15 is 15 itself
    let mut solver = BvSolver::new();
    solver.add(bv("A", 4).ge(con(15, 4)));
    let model = expect_model(&solver);
    assert_eq!(model["A"], 15);
}

#[test]
fn skewed_equation_with_terms_on_both_sides() {
    // A - 2 = 5 - B·4  (width 8)  →  A + 4B = 7
    let mut solver = BvSolver::new();
    solver.add(
        bv("A", 8)
            .sub(con(2, 8))
            .eq(con(5, 8).sub(bv("B", 8).mul(con(4, 8)))),
    );
    let model = expect_model(&solver);
    let lhs = (model["A"] as u128 + 4 * model["B"] as u128) % 256;
    assert_eq!(lhs, 7);
}

#[test]
fn variable_product_is_an_error() {
    let mut solver = BvSolver::new();
    solver.add(bv("A", 8).mul(bv("B", 8)).eq(con(3, 8)));
    assert!(matches!(solver.solve(), Err(IlpError::Expr(_))));
}

/// Oracle wrapper asserting the branch-and-bound invariant: bounds are
/// integral on every call.
struct IntegralBoundsOracle {
    inner: ClarabelOracle,
    calls: Rc<Cell<usize>>,
}

impl LpOracle for IntegralBoundsOracle {
    fn solve_lp(&self, request: &LpRequest<'_>) -> Result<LpStatus, IlpError> {
        self.calls.set(self.calls.get() + 1);
        for &(lo, hi) in request.bounds {
            assert_eq!(lo, lo.round(), "fractional lower bound {lo}");
            assert_eq!(hi, hi.round(), "fractional upper bound {hi}");
        }
        self.inner.solve_lp(request)
    }
}

#[test]
fn branch_and_bound_keeps_bounds_integral() {
    let calls = Rc::new(Cell::new(0));
    let oracle = Box::new(IntegralBoundsOracle {
        inner: ClarabelOracle,
        calls: Rc::clone(&calls),
    });
    let mut solver = BvSolver::with_oracle(oracle);
    solver.add(bv("A", 4).mul(con(7, 4)).eq(con(3, 4)));
    let model = expect_model(&solver);
    assert_eq!(model["A"] * 7 % 16, 3);
    assert!(calls.get() >= 1, "the oracle was never consulted");
}
