use super::{ConditionRole, ConditionSupport, VariableLayout};
use crate::{model::AtomId, sat::Literal};
use anyhow::Result;
use permutator::CartesianProduct;

/// Streams the CNF clauses of the disjunction `prefix ∨ branch_1 ∨ ... ∨ branch_n`, where each branch is a conjunction of literals.
///
/// Each CNF clause contains the literals of the prefix and one literal of each branch.
/// Single-literal branches are merged into the prefix, so that only the other branches are involved in the cartesian product.
/// If a branch is empty (and thus true), no clause is produced.
pub(crate) fn for_each_cnf_clause<F>(prefix: &[Literal], branches: &[Vec<Literal>], mut sink: F)
where
    F: FnMut(Vec<Literal>),
{
    if branches.iter().any(|b| b.is_empty()) {
        return;
    }
    let mut common = prefix.to_vec();
    let mut products = Vec::with_capacity(branches.len());
    for branch in branches {
        if branch.len() == 1 {
            common.push(branch[0]);
        } else {
            products.push(branch.as_slice());
        }
    }
    if products.is_empty() {
        sink(common);
        return;
    }
    products.cart_prod().for_each(|p| {
        let mut cl = Vec::with_capacity(common.len() + p.len());
        cl.extend_from_slice(&common);
        p.iter().for_each(|l| cl.push(**l));
        sink(cl);
    });
}

/// Encodes the frame axioms: an atom keeps its value between two steps unless some active effect changes it.
///
/// For each atom and each direction of change, the change implies the disjunction of the conjunctions
/// (`active` and `selected` literals) of the assignments producing the new value.
/// An atom with no such assignment persists unconditionally.
pub(crate) fn encode_frame_axioms(
    layout: &VariableLayout,
    support: &ConditionSupport,
    clauses: &mut Vec<Vec<Literal>>,
) -> Result<usize> {
    let mut n_clauses = 0;
    let next_offset = layout.step_vars();
    for atom in (0..layout.n_atoms()).map(AtomId::new) {
        let now = layout.holds(atom);
        let next = now.shifted(next_offset);
        for becomes_true in [true, false] {
            let branches = support
                .supporters_of(atom, becomes_true, ConditionRole::Effect)
                .iter()
                .map(|a| layout.assignment_conjunction(a))
                .collect::<Result<Vec<Vec<Literal>>>>()?;
            let prefix = if becomes_true {
                [now, next.negate()]
            } else {
                [now.negate(), next]
            };
            for_each_cnf_clause(&prefix, &branches, |cl| {
                clauses.push(cl);
                n_clauses += 1;
            });
        }
    }
    Ok(n_clauses)
}
