//! Conflict-driven clause learning over CNF.
//!
//! The engine keeps the classic CDCL state: the original clause set `δ`, the
//! learnt clause set, a total-or-partial assignment, the current decision
//! level, and an implication graph with one node per variable. The main loop
//! is
//!
//! 1. unit-propagate to fixpoint; on conflict, analyze (1-UIP style), learn,
//!    and backjump — or report UNSAT when the conflict is at level 0;
//! 2. if the assignment is total, report SAT;
//! 3. otherwise decide the lowest-id unassigned variable `true` and repeat.
//!
//! The implication graph is a [`StableDiGraph`] (stable indices survive edge
//! removal during backtracking); edges run from antecedent variables to the
//! implied variable. A node carries an antecedent clause exactly when the
//! variable was set by propagation rather than by a decision.
//!
//! Everything here is deterministic: clauses are scanned in input order then
//! learning order, decisions take the lowest unassigned id, and learnt
//! clauses are canonical literal sets, so re-running the same input gives the
//! same answer.

use hashbrown::{HashMap, HashSet};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use sable_core::cnf::{Clause, CnfFormula, Lit};
use tracing::{debug, info};

/// Outcome of a CDCL run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatResult {
    /// A total model, indexed `var - 1`.
    Sat(Vec<bool>),
    Unsat,
}

/// Per-variable record of why and when it was assigned.
#[derive(Debug, Default)]
struct ImplNode {
    value: Option<bool>,
    level: Option<usize>,
    /// Present exactly when the variable was set by unit propagation.
    antecedent: Option<Clause>,
}

/// A conflict-driven clause-learning solver for one CNF formula.
pub struct CdclSolver {
    clauses: Vec<Clause>,
    learnts: Vec<Clause>,
    learnt_set: HashSet<Clause>,
    num_vars: usize,
    assign: Vec<Option<bool>>,
    curr_level: usize,
    graph: StableDiGraph<ImplNode, ()>,
    node_of: Vec<NodeIndex>,
    branching_hist: HashMap<usize, usize>,
    propagate_hist: HashMap<usize, Vec<Lit>>,
    decisions: u64,
    conflicts: u64,
}

impl CdclSolver {
    pub fn new(formula: &CnfFormula) -> Self {
        let num_vars = formula.num_vars();
        let mut graph = StableDiGraph::with_capacity(num_vars, num_vars);
        // node_of is 1-based like variable ids; slot 0 is a placeholder
        let mut node_of = vec![NodeIndex::end(); num_vars + 1];
        for var in 1..=num_vars {
            node_of[var] = graph.add_node(ImplNode::default());
        }
        Self {
            clauses: formula.clauses().to_vec(),
            learnts: Vec::new(),
            learnt_set: HashSet::new(),
            num_vars,
            assign: vec![None; num_vars + 1],
            curr_level: 0,
            graph,
            node_of,
            branching_hist: HashMap::new(),
            propagate_hist: HashMap::new(),
            decisions: 0,
            conflicts: 0,
        }
    }

    /// Run the CDCL loop to completion.
    pub fn solve(&mut self) -> SatResult {
        loop {
            if let Some(conflict) = self.propagate() {
                self.conflicts += 1;
                let Some((level, learnt)) = self.analyze(&conflict) else {
                    info!(
                        decisions = self.decisions,
                        conflicts = self.conflicts,
                        "unsatisfiable"
                    );
                    return SatResult::Unsat;
                };
                debug!(level, clause = %learnt, "learnt");
                if self.learnt_set.insert(learnt.clone()) {
                    self.learnts.push(learnt);
                }
                self.backtrack(level);
                self.curr_level = level;
            } else if self.all_assigned() {
                info!(
                    decisions = self.decisions,
                    conflicts = self.conflicts,
                    learnt = self.learnts.len(),
                    "satisfiable"
                );
                let model = (1..=self.num_vars)
                    .map(|v| self.assign[v].unwrap_or(false))
                    .collect();
                return SatResult::Sat(model);
            } else {
                self.decide();
            }
        }
    }

    fn all_assigned(&self) -> bool {
        (1..=self.num_vars).all(|v| self.assign[v].is_some())
    }

    /// A literal's value under the current assignment, `None` if unassigned.
    fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.assign[lit.var()].map(|v| v != lit.is_negative())
    }

    /// A clause's value: true if any literal is true, false if all are false,
    /// unknown otherwise.
    fn clause_value(&self, clause: &Clause) -> Option<bool> {
        let mut all_false = true;
        for lit in clause.iter() {
            match self.lit_value(lit) {
                Some(true) => return Some(true),
                Some(false) => {}
                None => all_false = false,
            }
        }
        if all_false {
            Some(false)
        } else {
            None
        }
    }

    /// The unit literal of a clause: exactly one literal unassigned with all
    /// others false (a singleton clause with an unassigned literal counts).
    fn unit_literal(&self, clause: &Clause) -> Option<Lit> {
        let mut unassigned = None;
        let mut false_count = 0;
        for lit in clause.iter() {
            match self.lit_value(lit) {
                Some(true) => return None,
                Some(false) => false_count += 1,
                None => {
                    if unassigned.is_some() {
                        return None;
                    }
                    unassigned = Some(lit);
                }
            }
        }
        unassigned.filter(|_| false_count + 1 == clause.len())
    }

    /// Unit propagation to fixpoint; returns the conflicting clause if one is
    /// found.
    fn propagate(&mut self) -> Option<Clause> {
        loop {
            let mut queue: Vec<(Lit, Clause)> = Vec::new();
            let mut queued: HashSet<(Lit, Clause)> = HashSet::new();
            for clause in self.clauses.iter().chain(self.learnts.iter()) {
                match self.clause_value(clause) {
                    Some(true) => continue,
                    Some(false) => return Some(clause.clone()),
                    None => {
                        if let Some(lit) = self.unit_literal(clause) {
                            let pair = (lit, clause.clone());
                            if queued.insert(pair.clone()) {
                                queue.push(pair);
                            }
                        }
                    }
                }
            }
            if queue.is_empty() {
                return None;
            }
            for (lit, clause) in queue {
                self.set(lit, Some(&clause));
                if let Some(hist) = self.propagate_hist.get_mut(&self.curr_level) {
                    hist.push(lit);
                }
            }
        }
    }

    /// Assign a literal and update the implication graph. With an antecedent
    /// the node's parents become the clause's other variables; without one
    /// this records a decision.
    fn set(&mut self, lit: Lit, antecedent: Option<&Clause>) {
        let var = lit.var();
        let value = !lit.is_negative();
        self.assign[var] = Some(value);
        let idx = self.node_of[var];
        if let Some(clause) = antecedent {
            for other in clause.iter() {
                if other.var() != var {
                    self.graph.add_edge(self.node_of[other.var()], idx, ());
                }
            }
        }
        let node = &mut self.graph[idx];
        node.value = Some(value);
        node.level = Some(self.curr_level);
        node.antecedent = antecedent.cloned();
    }

    fn level_of(&self, var: usize) -> Option<usize> {
        self.graph[self.node_of[var]].level
    }

    /// 1-UIP-style conflict analysis.
    ///
    /// Returns the backjump level and the learnt clause, or `None` when the
    /// conflict is at decision level 0 (UNSAT).
    fn analyze(&self, conflict: &Clause) -> Option<(usize, Clause)> {
        if self.curr_level == 0 {
            return None;
        }

        // assignment order at the current level: the decision first, then the
        // propagated literals
        let mut history: Vec<usize> = Vec::new();
        if let Some(&decision) = self.branching_hist.get(&self.curr_level) {
            history.push(decision);
        }
        if let Some(props) = self.propagate_hist.get(&self.curr_level) {
            history.extend(props.iter().map(|l| l.var()));
        }

        let mut pool: Vec<Lit> = conflict.lits().to_vec();
        let mut done: HashSet<usize> = HashSet::new();
        let mut curr_lits: HashSet<Lit> = HashSet::new();
        let mut prev_lits: HashSet<Lit> = HashSet::new();

        loop {
            for &lit in &pool {
                if self.level_of(lit.var()) == Some(self.curr_level) {
                    curr_lits.insert(lit);
                } else {
                    prev_lits.insert(lit);
                }
            }
            if curr_lits.len() <= 1 {
                break;
            }

            // resolve on the most recently assigned current-level variable
            let Some(&last) = history
                .iter()
                .rev()
                .find(|v| curr_lits.iter().any(|l| l.var() == **v))
            else {
                break;
            };
            done.insert(last);
            curr_lits.retain(|l| l.var() != last);

            pool = match &self.graph[self.node_of[last]].antecedent {
                Some(clause) => clause
                    .iter()
                    .filter(|l| !done.contains(&l.var()))
                    .collect(),
                None => Vec::new(),
            };
        }

        let learnt = Clause::new(curr_lits.iter().chain(prev_lits.iter()).copied());
        let level = prev_lits
            .iter()
            .filter_map(|l| self.level_of(l.var()))
            .max()
            .unwrap_or(self.curr_level - 1);
        Some((level, learnt))
    }

    /// Unassign everything above `level` and drop the corresponding history.
    ///
    /// Detaching a cleared node removes all its incident edges, which also
    /// prunes it out of the children lists of the nodes that stay.
    fn backtrack(&mut self, level: usize) {
        for var in 1..=self.num_vars {
            let idx = self.node_of[var];
            let keep = match self.graph[idx].level {
                Some(l) => l <= level,
                None => true,
            };
            if keep {
                continue;
            }
            self.assign[var] = None;
            let node = &mut self.graph[idx];
            node.value = None;
            node.level = None;
            node.antecedent = None;
            let incident: Vec<_> = self
                .graph
                .edges_directed(idx, Direction::Incoming)
                .map(|e| e.id())
                .chain(
                    self.graph
                        .edges_directed(idx, Direction::Outgoing)
                        .map(|e| e.id()),
                )
                .collect();
            for edge in incident {
                let _ = self.graph.remove_edge(edge);
            }
        }
        self.branching_hist.retain(|&l, _| l <= level);
        self.propagate_hist.retain(|&l, _| l <= level);
    }

    /// Branch on the lowest-id unassigned variable, assigning it `true`.
    fn decide(&mut self) {
        let Some(var) = (1..=self.num_vars).find(|&v| self.assign[v].is_none()) else {
            return;
        };
        self.curr_level += 1;
        self.decisions += 1;
        self.branching_hist.insert(self.curr_level, var);
        self.propagate_hist.insert(self.curr_level, Vec::new());
        debug!(var, level = self.curr_level, "decision");
        self.set(Lit::positive(var), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(codes: &[i32]) -> Clause {
        Clause::new(codes.iter().map(|&c| Lit::new(c).unwrap()))
    }

    fn formula(clauses: &[&[i32]]) -> CnfFormula {
        let mut f = CnfFormula::new();
        for c in clauses {
            f.push(clause(c));
        }
        f
    }

    #[test]
    fn test_empty_formula_is_sat() {
        let f = CnfFormula::new();
        assert_eq!(CdclSolver::new(&f).solve(), SatResult::Sat(vec![]));
    }

    #[test]
    fn test_unit_propagation_chain() {
        // 1, then 1→2, then 2→3
        let f = formula(&[&[1], &[-1, 2], &[-2, 3]]);
        let mut solver = CdclSolver::new(&f);
        match solver.solve() {
            SatResult::Sat(model) => assert_eq!(model, vec![true, true, true]),
            SatResult::Unsat => panic!("expected SAT"),
        }
    }

    #[test]
    fn test_contradictory_units_unsat_at_level_zero() {
        let f = formula(&[&[1], &[-1]]);
        let mut solver = CdclSolver::new(&f);
        assert_eq!(solver.solve(), SatResult::Unsat);
        // the conflict never needed a decision
        assert_eq!(solver.decisions, 0);
    }

    #[test]
    fn test_four_clause_contradiction() {
        let f = formula(&[&[1, 2], &[-1, 2], &[1, -2], &[-1, -2]]);
        assert_eq!(CdclSolver::new(&f).solve(), SatResult::Unsat);
    }

    #[test]
    fn test_model_satisfies_formula() {
        let f = formula(&[&[1, 2, 3], &[-1, -2], &[-2, -3], &[2, 3]]);
        match CdclSolver::new(&f).solve() {
            SatResult::Sat(model) => assert!(f.satisfied_by(&model)),
            SatResult::Unsat => panic!("expected SAT"),
        }
    }

    #[test]
    fn test_learning_deduplicates_clauses() {
        let f = formula(&[&[-1, 2], &[-1, -2, 3], &[-3, 4], &[-3, -4]]);
        let mut solver = CdclSolver::new(&f);
        let result = solver.solve();
        assert!(matches!(result, SatResult::Sat(_)));
        assert_eq!(solver.learnts.len(), solver.learnt_set.len());
    }

    #[test]
    fn test_implication_graph_invariant() {
        // deciding 1 forces 2 through (-1 ∨ 2)
        let f = formula(&[&[-1, 2]]);
        let mut solver = CdclSolver::new(&f);
        assert!(matches!(solver.solve(), SatResult::Sat(_)));

        let decision = &solver.graph[solver.node_of[1]];
        assert!(decision.antecedent.is_none());
        assert_eq!(
            solver
                .graph
                .neighbors_directed(solver.node_of[1], Direction::Incoming)
                .count(),
            0
        );

        let implied = &solver.graph[solver.node_of[2]];
        assert!(implied.antecedent.is_some());
        assert_eq!(
            solver
                .graph
                .neighbors_directed(solver.node_of[2], Direction::Incoming)
                .count(),
            1
        );
    }

    #[test]
    fn test_backtrack_clears_graph_state() {
        let f = formula(&[&[-1, 2]]);
        let mut solver = CdclSolver::new(&f);
        assert!(matches!(solver.solve(), SatResult::Sat(_)));
        solver.backtrack(0);
        assert!(solver.assign[1].is_none());
        assert!(solver.assign[2].is_none());
        assert!(solver.graph[solver.node_of[2]].antecedent.is_none());
        assert_eq!(solver.graph.edge_count(), 0);
        assert!(solver.branching_hist.is_empty());
    }

    #[test]
    fn test_pigeonhole_two_pigeons_one_hole() {
        // p1 in hole, p2 in hole, never both: 1, 2, (¬1 ∨ ¬2)
        let f = formula(&[&[1], &[2], &[-1, -2]]);
        assert_eq!(CdclSolver::new(&f).solve(), SatResult::Unsat);
    }
}
