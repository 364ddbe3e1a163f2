use super::Plan;
use crate::{
    encodings::VariableLayout,
    grounding::Grounding,
    model::{ConstantId, OperatorId},
    sat::Assignment,
};
use anyhow::{anyhow, Context, Result};

/// Extracts a plan of `makespan` steps from a model of the unrolled formula.
///
/// For each step block in increasing order, and for each operator in declaration order,
/// an operator whose `active` variable is true is grounded by its `selected` variables.
/// Exactly one `selected` variable must be true per parameter position; otherwise, an error is returned.
/// Grounded operators are mapped to actions through the grounding.
pub fn decode_plan(
    layout: &VariableLayout,
    grounding: &Grounding,
    model: &Assignment,
    makespan: usize,
) -> Result<Plan> {
    let mut plan = Plan::new(makespan);
    for step in 0..makespan {
        let offset = step * layout.step_vars();
        for op in (0..layout.n_operators()).map(OperatorId::new) {
            if !model.satisfies(layout.active(op).shifted(offset)) {
                continue;
            }
            let args = (0..layout.eligibility().arity(op))
                .map(|position| decode_parameter(layout, model, offset, op, position))
                .collect::<Result<Vec<ConstantId>>>()
                .with_context(|| format!("while decoding step {}", step))?;
            let action = grounding
                .lookup_action(op, &args)
                .with_context(|| format!("while decoding step {}", step))?;
            plan.push(step, action.clone());
        }
    }
    Ok(plan)
}

fn decode_parameter(
    layout: &VariableLayout,
    model: &Assignment,
    offset: usize,
    op: OperatorId,
    position: usize,
) -> Result<ConstantId> {
    let eligible = layout.eligibility().eligible(op, position);
    let mut selected = eligible
        .iter()
        .enumerate()
        .filter(|(i, _)| model.satisfies(layout.selected(op, position, *i).shifted(offset)))
        .map(|(_, c)| *c);
    match (selected.next(), selected.next()) {
        (Some(c), None) => Ok(c),
        (None, _) => Err(anyhow!(
            "no constant selected for position {} of active operator {}",
            position,
            op
        )),
        (Some(_), Some(_)) => Err(anyhow!(
            "several constants selected for position {} of active operator {}",
            position,
            op
        )),
    }
}
