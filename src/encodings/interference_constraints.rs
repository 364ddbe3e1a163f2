use super::{ConditionRole, ConditionSupport, VariableLayout};
use crate::sat::Literal;
use anyhow::Result;

/// Encodes the interference constraints between operators active in the same step.
///
/// An operator whose effect gives an atom some sign cannot be active together with
/// a different operator requiring the opposite sign as a precondition, for the exact parameter bindings involved.
pub(crate) fn encode_interference(
    layout: &VariableLayout,
    support: &ConditionSupport,
    clauses: &mut Vec<Vec<Literal>>,
) -> Result<usize> {
    let mut n_clauses = 0;
    for positive in [true, false] {
        for atom in support.supported_atoms(positive, ConditionRole::Effect) {
            let requirers = support.supporters_of(atom, !positive, ConditionRole::Precondition);
            if requirers.is_empty() {
                continue;
            }
            for effect in support.supporters_of(atom, positive, ConditionRole::Effect) {
                let effect_conjunction = layout.assignment_conjunction(effect)?;
                for precondition in requirers
                    .iter()
                    .filter(|p| p.operator() != effect.operator())
                {
                    let precondition_conjunction = layout.assignment_conjunction(precondition)?;
                    clauses.push(
                        effect_conjunction
                            .iter()
                            .chain(precondition_conjunction.iter())
                            .map(|l| l.negate())
                            .collect(),
                    );
                    n_clauses += 1;
                }
            }
        }
    }
    Ok(n_clauses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        encodings::{ArgumentAssignment, ArgumentMapping, EligibilityIndex},
        io::ProblemReader,
        model::{split_condition, AtomId, OperatorId},
    };

    #[test]
    fn test_interference() {
        let problem = ProblemReader::default()
            .read(
                &mut r#"
                type(loc).
                const(a, b, loc).
                pred(free, loc).
                op(fill, ?x:loc).
                eff(fill, -free(?x)).
                op(use, ?y:loc).
                pre(use, free(?y)).
                op(check, ?z:loc).
                pre(check, -free(?z)).
                "#
                .as_bytes(),
            )
            .unwrap();
        let layout = VariableLayout::new(EligibilityIndex::lifted(&problem), 3, 2);
        let a = problem.get_constant("a").unwrap();
        let atom = AtomId::new(0);
        let assignment = |op: usize, pre: bool| {
            let op = &problem.operators()[op];
            let f = if pre { op.precondition() } else { op.effect() };
            let condition = split_condition(f).0.remove(0);
            let mapping = ArgumentMapping::new(&problem, op, &condition).unwrap();
            ArgumentAssignment::new(&mapping, vec![a])
        };
        let mut support = ConditionSupport::default();
        support.register(atom, false, ConditionRole::Effect, assignment(0, false));
        support.register(atom, true, ConditionRole::Precondition, assignment(1, true));
        support.register(atom, false, ConditionRole::Precondition, assignment(2, true));
        let mut clauses = vec![];
        assert_eq!(1, encode_interference(&layout, &support, &mut clauses).unwrap());
        let fill = OperatorId::new(0);
        let use_op = OperatorId::new(1);
        assert_eq!(
            vec![
                layout.active(fill).negate(),
                layout.selected_constant(fill, 0, a).unwrap().negate(),
                layout.active(use_op).negate(),
                layout.selected_constant(use_op, 0, a).unwrap().negate(),
            ],
            clauses[0]
        );
    }
}
