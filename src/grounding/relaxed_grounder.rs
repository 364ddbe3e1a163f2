use super::{Grounder, Grounding};
use crate::{
    encodings::{ArgumentCombinations, EligibilityIndex},
    model::{split_condition, Condition, ConstantId, GroundAtom, LiftedProblem, Operator},
};
use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use std::collections::HashSet;

/// A grounder based on the delete relaxation of the problem.
///
/// Every type-compatible grounding of every operator is considered.
/// Starting from the initial state, a ground action becomes reachable as soon as all its positive preconditions are reachable,
/// and its positive effects become reachable in turn, until a fixpoint is reached.
/// Negative preconditions and delete effects are ignored.
///
/// The atom universe of the resulting [Grounding] contains the initial atoms, the goal atoms,
/// and every atom mentioned by a precondition or an effect of a reachable action.
///
/// Operators must have flat preconditions and effects (see [split_condition]); a disjunction results in an error.
#[derive(Default)]
pub struct RelaxedGrounder;

struct FlatOperator<'a> {
    operator: &'a Operator,
    preconditions: Vec<Condition>,
    effects: Vec<Condition>,
}

impl<'a> FlatOperator<'a> {
    fn new(problem: &LiftedProblem, operator: &'a Operator) -> Result<Self> {
        let context = || format!("while grounding operator {}", operator.name());
        let (preconditions, pre_residual) = split_condition(operator.precondition());
        if pre_residual.is_some() {
            return Err(anyhow!("the precondition is not a conjunction of literals"))
                .with_context(context);
        }
        let (effects, eff_residual) = split_condition(operator.effect());
        if eff_residual.is_some() {
            return Err(anyhow!("the effect is not a conjunction of literals")).with_context(context);
        }
        for c in preconditions.iter().chain(effects.iter()) {
            if c.variables().any(|v| operator.parameter_position(v).is_none()) {
                return Err(anyhow!(
                    "condition {} involves a variable that is not a parameter",
                    problem.condition_to_string(c)
                ))
                .with_context(context);
            }
        }
        Ok(Self {
            operator,
            preconditions,
            effects,
        })
    }

    fn ground(&self, c: &Condition, args: &[ConstantId]) -> Result<GroundAtom> {
        c.ground_with(|v| self.operator.parameter_position(v).map(|p| args[p]))
            .ok_or_else(|| anyhow!("cannot ground a condition of operator {}", self.operator.name()))
    }

    fn is_applicable(&self, reached: &HashSet<GroundAtom>, args: &[ConstantId]) -> Result<bool> {
        for c in self.preconditions.iter().filter(|c| !c.is_negated()) {
            if !reached.contains(&self.ground(c, args)?) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Grounder for RelaxedGrounder {
    fn ground(&self, problem: &LiftedProblem) -> Result<Grounding> {
        let operators = problem
            .operators()
            .iter()
            .map(|op| FlatOperator::new(problem, op))
            .collect::<Result<Vec<FlatOperator>>>()?;
        let eligibility = EligibilityIndex::lifted(problem);
        let candidates = operators
            .iter()
            .map(|op| {
                let eligible_sets = eligibility.eligible_sets(op.operator.id());
                ArgumentCombinations::new(&eligible_sets).collect::<Vec<Vec<ConstantId>>>()
            })
            .collect::<Vec<Vec<Vec<ConstantId>>>>();
        let mut reachable = candidates
            .iter()
            .map(|c| vec![false; c.len()])
            .collect::<Vec<Vec<bool>>>();
        let mut reached = problem.init().iter().cloned().collect::<HashSet<GroundAtom>>();
        let mut n_rounds = 0;
        loop {
            n_rounds += 1;
            let mut changed = false;
            for (i, op) in operators.iter().enumerate() {
                for (j, args) in candidates[i].iter().enumerate() {
                    if reachable[i][j] || !op.is_applicable(&reached, args)? {
                        continue;
                    }
                    reachable[i][j] = true;
                    changed = true;
                    for c in op.effects.iter().filter(|c| !c.is_negated()) {
                        reached.insert(op.ground(c, args)?);
                    }
                }
            }
            if !changed {
                break;
            }
        }
        debug!("relaxed reachability fixpoint reached after {} round(s)", n_rounds);
        let mut grounding = Grounding::default();
        problem.init().iter().for_each(|a| {
            grounding.add_atom(a.clone());
        });
        for c in problem.goal() {
            let atom = c
                .to_ground_atom()
                .ok_or_else(|| anyhow!("goal conditions must be ground"))?;
            grounding.add_atom(atom);
        }
        for (i, op) in operators.iter().enumerate() {
            for (j, args) in candidates[i].iter().enumerate() {
                if !reachable[i][j] {
                    continue;
                }
                grounding.add_action(problem, op.operator.id(), args.clone())?;
                for c in op.preconditions.iter().chain(op.effects.iter()) {
                    grounding.add_atom(op.ground(c, args)?);
                }
            }
        }
        info!(
            "relaxed grounding: {} reachable atom(s), {} reachable action(s)",
            grounding.n_atoms(),
            grounding.n_actions()
        );
        Ok(grounding)
    }
}
