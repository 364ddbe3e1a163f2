use super::Plan;
use crate::{
    encodings::ConditionRole,
    grounding::Action,
    model::{split_condition, Condition, GroundAtom, LiftedProblem},
};
use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;

/// Checks a plan by simulating it from the initial state.
///
/// Steps are applied in order.
/// The preconditions of all the actions of a step are checked against the state at the beginning of the step;
/// then the delete effects of all these actions are applied, followed by their add effects.
/// Finally, the goal is checked against the resulting state.
///
/// An error describing the first failure is returned if the plan is not valid.
pub fn check_plan(problem: &LiftedProblem, plan: &Plan) -> Result<()> {
    let mut state = problem.init().iter().cloned().collect::<HashSet<GroundAtom>>();
    for step in 0..plan.makespan() {
        let actions = plan.actions_at(step).collect::<Vec<&Action>>();
        let mut deleted = Vec::new();
        let mut added = Vec::new();
        for action in actions {
            let context = || format!("while checking action {} at step {}", action.name(), step);
            for (atom, negated) in ground_conditions(problem, action, ConditionRole::Precondition).with_context(context)? {
                if state.contains(&atom) == negated {
                    return Err(anyhow!(
                        "precondition {}{} does not hold",
                        if negated { "-" } else { "" },
                        problem.atom_to_string(&atom)
                    ))
                    .with_context(context);
                }
            }
            for (atom, negated) in ground_conditions(problem, action, ConditionRole::Effect).with_context(context)? {
                if negated {
                    deleted.push(atom);
                } else {
                    added.push(atom);
                }
            }
        }
        deleted.iter().for_each(|a| {
            state.remove(a);
        });
        state.extend(added);
    }
    for c in problem.goal() {
        let atom = c
            .to_ground_atom()
            .ok_or_else(|| anyhow!("goal conditions must be ground"))?;
        if state.contains(&atom) == c.is_negated() {
            return Err(anyhow!(
                "goal {} does not hold at the end of the plan",
                problem.condition_to_string(c)
            ));
        }
    }
    Ok(())
}

fn ground_conditions(
    problem: &LiftedProblem,
    action: &Action,
    role: ConditionRole,
) -> Result<Vec<(GroundAtom, bool)>> {
    let op = problem.operator(action.operator());
    let formula = match role {
        ConditionRole::Precondition => op.precondition(),
        ConditionRole::Effect => op.effect(),
    };
    let (flat, residual) = split_condition(formula);
    if residual.is_some() {
        return Err(anyhow!("operator {} has a complex condition", op.name()));
    }
    flat.iter()
        .map(|c: &Condition| {
            c.ground_with(|v| op.parameter_position(v).map(|p| action.args()[p]))
                .map(|atom| (atom, c.is_negated()))
                .ok_or_else(|| anyhow!("cannot ground {}", problem.condition_to_string(c)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        grounding::{Grounder, Grounding, RelaxedGrounder},
        io::ProblemReader,
    };

    const MOVE: &str = r#"
    type(loc).
    const(a, b, c, loc).
    pred(at, loc).
    op(move, ?from:loc, ?to:loc).
    pre(move, at(?from)).
    eff(move, -at(?from)).
    eff(move, at(?to)).
    init(at(a)).
    goal(at(c)).
    goal(-at(a)).
    "#;

    fn setup() -> (LiftedProblem, Grounding) {
        let problem = ProblemReader::default()
            .read(&mut MOVE.as_bytes())
            .unwrap();
        let grounding = RelaxedGrounder.ground(&problem).unwrap();
        (problem, grounding)
    }

    fn plan(problem: &LiftedProblem, grounding: &Grounding, steps: &[(usize, &str, &str)], makespan: usize) -> Plan {
        let mv = problem.get_operator("move").unwrap();
        let mut plan = Plan::new(makespan);
        for (step, from, to) in steps {
            let args = [problem.get_constant(from).unwrap(), problem.get_constant(to).unwrap()];
            plan.push(*step, grounding.lookup_action(mv, &args).unwrap().clone());
        }
        plan
    }

    #[test]
    fn test_valid_plans() {
        let (problem, grounding) = setup();
        check_plan(&problem, &plan(&problem, &grounding, &[(0, "a", "c")], 1)).unwrap();
        check_plan(
            &problem,
            &plan(&problem, &grounding, &[(0, "a", "b"), (2, "b", "c")], 3),
        )
        .unwrap();
    }

    #[test]
    fn test_unsatisfied_precondition() {
        let (problem, grounding) = setup();
        assert!(check_plan(&problem, &plan(&problem, &grounding, &[(0, "b", "c")], 1)).is_err());
    }

    #[test]
    fn test_same_step_actions_see_the_initial_state() {
        let (problem, grounding) = setup();
        assert!(check_plan(
            &problem,
            &plan(&problem, &grounding, &[(0, "a", "b"), (0, "b", "c")], 1)
        )
        .is_err());
    }

    #[test]
    fn test_unsatisfied_goal() {
        let (problem, grounding) = setup();
        assert!(check_plan(&problem, &plan(&problem, &grounding, &[(0, "a", "b")], 1)).is_err());
        assert!(check_plan(&problem, &Plan::new(0)).is_err());
    }
}
