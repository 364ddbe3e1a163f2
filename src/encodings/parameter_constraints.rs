use super::{StepSemantics, VariableLayout};
use crate::{model::OperatorId, sat::Literal};

/// Encodes the selection of the operator parameters.
///
/// For each operator and each of its parameter positions, an active operator selects exactly one eligible constant,
/// and a selected constant implies the operator is active.
/// If a position has no eligible constant, the operator is disabled.
///
/// Under sequential semantics, at most one operator may be active.
pub(crate) fn encode_parameter_selection(
    layout: &VariableLayout,
    semantics: StepSemantics,
    clauses: &mut Vec<Vec<Literal>>,
) {
    for op in (0..layout.n_operators()).map(OperatorId::new) {
        let active = layout.active(op);
        for position in 0..layout.eligibility().arity(op) {
            let selected = (0..layout.eligibility().eligible(op, position).len())
                .map(|i| layout.selected(op, position, i))
                .collect::<Vec<Literal>>();
            let mut some_value = Vec::with_capacity(1 + selected.len());
            some_value.push(active.negate());
            some_value.extend_from_slice(&selected);
            clauses.push(some_value);
            for (i, s) in selected.iter().enumerate() {
                clauses.push(vec![s.negate(), active]);
                for other in selected.iter().skip(i + 1) {
                    clauses.push(vec![s.negate(), other.negate()]);
                }
            }
        }
    }
    if semantics == StepSemantics::Sequential {
        let n_ops = layout.n_operators();
        for i in 0..n_ops {
            for j in i + 1..n_ops {
                clauses.push(vec![
                    layout.active(OperatorId::new(i)).negate(),
                    layout.active(OperatorId::new(j)).negate(),
                ]);
            }
        }
    }
}
