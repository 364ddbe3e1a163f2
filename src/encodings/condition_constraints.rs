use super::{
    ArgumentAssignment, ArgumentCombinations, ArgumentMapping, ConditionRole, ConditionSupport,
    VariableLayout,
};
use crate::{
    grounding::Grounding,
    model::{split_condition, Condition, ConstantId, Formula, LiftedProblem, Operator},
    sat::Literal,
};
use anyhow::{anyhow, Context, Result};

/// Clause counters of [encode_conditions].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConditionClauseCounts {
    pub(crate) n_precondition_clauses: usize,
    pub(crate) n_effect_clauses: usize,
    pub(crate) n_forbidden_clauses: usize,
}

pub(crate) fn flat_conditions(
    op: &Operator,
    formula: &Formula,
    role: ConditionRole,
) -> Result<Vec<Condition>> {
    let (flat, residual) = split_condition(formula);
    match residual {
        None => Ok(flat),
        Some(_) => Err(anyhow!(
            "the {} of operator {} is not a conjunction of literals",
            match role {
                ConditionRole::Precondition => "precondition",
                ConditionRole::Effect => "effect",
            },
            op.name()
        )),
    }
}

/// Encodes the implications from the operator parameters to their preconditions and effects.
///
/// For each operator condition and each assignment of its mapped parameters to eligible constants,
/// the conjunction of the `active` and `selected` literals implies the ground condition:
/// preconditions at the current step, in the universal clauses, and effects at the next step, in the transition clauses.
/// Each such assignment is registered into the condition support index.
///
/// If the ground atom is not part of the universe given by the grounding,
/// the assignment is forbidden instead by a clause over the `selected` literals (or `active` if no parameter is involved).
pub(crate) fn encode_conditions(
    problem: &LiftedProblem,
    grounding: &Grounding,
    layout: &VariableLayout,
    support: &mut ConditionSupport,
    universal: &mut Vec<Vec<Literal>>,
    transition: &mut Vec<Vec<Literal>>,
) -> Result<ConditionClauseCounts> {
    let mut counts = ConditionClauseCounts::default();
    for op in problem.operators() {
        if !layout.eligibility().is_selectable(op.id()) {
            continue;
        }
        let roles = [
            (ConditionRole::Precondition, op.precondition()),
            (ConditionRole::Effect, op.effect()),
        ];
        for (role, formula) in roles {
            for condition in flat_conditions(op, formula, role)? {
                let mapping = ArgumentMapping::new(problem, op, &condition)
                    .with_context(|| format!("while encoding operator {}", op.name()))?;
                let candidates = mapping
                    .operator_slots()
                    .map(|slot| layout.eligibility().eligible(op.id(), slot))
                    .collect::<Vec<&[ConstantId]>>();
                for constants in ArgumentCombinations::new(&candidates) {
                    let assignment = ArgumentAssignment::new(&mapping, constants);
                    let atom = assignment.ground(op, &condition).ok_or_else(|| {
                        anyhow!(
                            "cannot ground condition {}",
                            problem.condition_to_string(&condition)
                        )
                    })?;
                    let conjunction = layout.assignment_conjunction(&assignment)?;
                    let mut cl = conjunction
                        .iter()
                        .map(|l| l.negate())
                        .collect::<Vec<Literal>>();
                    match grounding.atom_id(&atom) {
                        Some(atom_id) => {
                            let holds = if condition.is_negated() {
                                layout.holds(atom_id).negate()
                            } else {
                                layout.holds(atom_id)
                            };
                            match role {
                                ConditionRole::Precondition => {
                                    cl.push(holds);
                                    universal.push(cl);
                                    counts.n_precondition_clauses += 1;
                                }
                                ConditionRole::Effect => {
                                    cl.push(holds.shifted(layout.step_vars()));
                                    transition.push(cl);
                                    counts.n_effect_clauses += 1;
                                }
                            }
                            support.register(atom_id, !condition.is_negated(), role, assignment);
                        }
                        None => {
                            if !mapping.is_empty() {
                                cl.remove(0);
                            }
                            universal.push(cl);
                            counts.n_forbidden_clauses += 1;
                        }
                    }
                }
            }
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        encodings::EligibilityIndex,
        grounding::{Grounder, RelaxedGrounder},
        io::ProblemReader,
        model::{AtomId, OperatorId},
    };

    const DOMAIN: &str = r#"
    type(loc).
    const(a, b, c, loc).
    pred(at, loc).
    pred(road, loc, loc).
    op(move, ?from:loc, ?to:loc).
    pre(move, at(?from)).
    pre(move, road(?from, ?to)).
    eff(move, -at(?from)).
    eff(move, at(?to)).
    init(at(a)).
    init(road(a, b)).
    goal(at(b)).
    "#;

    #[test]
    fn test_conditions() {
        let problem = ProblemReader::default()
            .read(&mut DOMAIN.as_bytes())
            .unwrap();
        let grounding = RelaxedGrounder.ground(&problem).unwrap();
        let layout = VariableLayout::new(
            EligibilityIndex::lifted(&problem),
            problem.n_operators(),
            grounding.n_atoms(),
        );
        let mut support = ConditionSupport::default();
        let mut universal = vec![];
        let mut transition = vec![];
        let counts = encode_conditions(
            &problem,
            &grounding,
            &layout,
            &mut support,
            &mut universal,
            &mut transition,
        )
        .unwrap();
        // universe: at(a), road(a, b), at(b)
        assert_eq!(3, grounding.n_atoms());
        // at(?from): a and b are in the universe, c is not
        // road(?from, ?to): only (a, b) is in the universe
        assert_eq!(2 + 1, counts.n_precondition_clauses);
        assert_eq!(2 + 2, counts.n_effect_clauses);
        assert_eq!(1 + 8 + 1 + 1, counts.n_forbidden_clauses);
        assert_eq!(universal.len(), 3 + 11);
        assert_eq!(transition.len(), 4);
        let mv = OperatorId::new(0);
        let a = problem.get_constant("a").unwrap();
        let c = problem.get_constant("c").unwrap();
        let at_c_forbidden = vec![layout.selected_constant(mv, 0, c).unwrap().negate()];
        assert!(universal.contains(&at_c_forbidden));
        let at_a = AtomId::new(0);
        let delete_at_a = vec![
            layout.active(mv).negate(),
            layout.selected_constant(mv, 0, a).unwrap().negate(),
            layout.holds(at_a).negate().shifted(layout.step_vars()),
        ];
        assert!(transition.contains(&delete_at_a));
        assert_eq!(
            1,
            support
                .supporters_of(at_a, false, ConditionRole::Effect)
                .len()
        );
        assert_eq!(
            1,
            support
                .supporters_of(at_a, true, ConditionRole::Precondition)
                .len()
        );
    }
}
