use crate::{
    encodings::SymbolicReachabilityFormula,
    sat::{Literal, SatSolver},
};
use log::debug;

/// Feeds an incremental SAT solver with a [SymbolicReachabilityFormula] unrolled over a growing number of steps.
///
/// At creation, the initial clauses and the universal clauses of step 0 are added to the solver.
/// Each call to [extend](Self::extend) adds the transition clauses from the current horizon to the next one,
/// and the universal clauses of the new horizon.
pub struct IncrementalUnroller<'a> {
    formula: &'a SymbolicReachabilityFormula,
    horizon: usize,
}

impl<'a> IncrementalUnroller<'a> {
    /// Builds a new unroller and adds the clauses of horizon 0 to the solver.
    pub fn new(formula: &'a SymbolicReachabilityFormula, solver: &mut dyn SatSolver) -> Self {
        solver.reserve(formula.step_vars());
        formula
            .initial_clauses()
            .iter()
            .for_each(|cl| solver.add_clause(cl.clone()));
        formula
            .universal_clauses_at(0)
            .for_each(|cl| solver.add_clause(cl));
        Self {
            formula,
            horizon: 0,
        }
    }

    /// Returns the current horizon, that is the index of the last step block added to the solver.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Returns the goal assumptions for the current horizon.
    pub fn goal_assumptions(&self) -> Vec<Literal> {
        self.formula.goal_assumptions_at(self.horizon)
    }

    /// Adds the clauses linking the current horizon to the next one, and increments the horizon.
    pub fn extend(&mut self, solver: &mut dyn SatSolver) {
        solver.reserve((self.horizon + 2) * self.formula.step_vars());
        self.formula
            .transition_clauses_at(self.horizon)
            .for_each(|cl| solver.add_clause(cl));
        self.formula
            .universal_clauses_at(self.horizon + 1)
            .for_each(|cl| solver.add_clause(cl));
        self.horizon += 1;
        debug!(
            "unrolled the formula up to horizon {} ({} variables)",
            self.horizon,
            solver.n_vars()
        );
    }
}
