use super::{ArgumentAssignment, EligibilityIndex};
use crate::{
    model::{AtomId, ConstantId, OperatorId},
    sat::Literal,
};
use anyhow::{anyhow, Result};

/// Hands out fresh, consecutive SAT variables, starting at 1.
#[derive(Debug, Default)]
pub struct VariableAllocator {
    n_vars: usize,
}

impl VariableAllocator {
    /// Reserves `n` new variables and returns the first one.
    pub fn allocate(&mut self, n: usize) -> usize {
        let first = self.n_vars + 1;
        self.n_vars += n;
        first
    }

    /// Returns the number of variables allocated so far.
    pub fn n_vars(&self) -> usize {
        self.n_vars
    }
}

/// The layout of the SAT variables of one step of a plan.
///
/// A step block holds one `active` variable per operator,
/// one `selected` variable per (operator, parameter position, eligible constant),
/// and one `holds` variable per atom of the universe.
/// Variables of the block of step `k` are obtained by shifting the ones of this layout by `k * step_vars`.
#[derive(Debug)]
pub struct VariableLayout {
    eligibility: EligibilityIndex,
    active_vars: Vec<usize>,
    selected_vars: Vec<Vec<usize>>,
    first_atom_var: usize,
    n_atoms: usize,
    step_vars: usize,
}

impl VariableLayout {
    /// Builds the layout given the eligible constants and the size of the atom universe.
    pub fn new(eligibility: EligibilityIndex, n_operators: usize, n_atoms: usize) -> Self {
        let mut allocator = VariableAllocator::default();
        let active_vars = (0..n_operators).map(|_| allocator.allocate(1)).collect();
        let selected_vars = (0..n_operators)
            .map(|op| {
                let op = OperatorId::new(op);
                (0..eligibility.arity(op))
                    .map(|pos| allocator.allocate(eligibility.eligible(op, pos).len()))
                    .collect()
            })
            .collect();
        let first_atom_var = allocator.allocate(n_atoms);
        Self {
            eligibility,
            active_vars,
            selected_vars,
            first_atom_var,
            n_atoms,
            step_vars: allocator.n_vars(),
        }
    }

    /// Returns the eligible constants this layout was built with.
    pub fn eligibility(&self) -> &EligibilityIndex {
        &self.eligibility
    }

    /// Returns the number of variables of a step block.
    pub fn step_vars(&self) -> usize {
        self.step_vars
    }

    /// Returns the number of operators.
    pub fn n_operators(&self) -> usize {
        self.active_vars.len()
    }

    /// Returns the number of atoms.
    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    /// Returns the number of `selected` variables of a step block.
    pub fn n_selected_vars(&self) -> usize {
        self.step_vars - self.n_operators() - self.n_atoms
    }

    /// Returns the positive literal of the `active` variable of an operator.
    pub fn active(&self, op: OperatorId) -> Literal {
        Literal::from(self.active_vars[op.index()] as isize)
    }

    /// Returns the positive literal of the `selected` variable for the i-th eligible constant of a parameter position.
    pub fn selected(&self, op: OperatorId, position: usize, i: usize) -> Literal {
        Literal::from((self.selected_vars[op.index()][position] + i) as isize)
    }

    /// Returns the positive literal of the `selected` variable for a constant at a parameter position.
    ///
    /// An error is returned if the constant is not eligible at this position.
    pub fn selected_constant(&self, op: OperatorId, position: usize, c: ConstantId) -> Result<Literal> {
        self.eligibility
            .index_of(op, position, c)
            .map(|i| self.selected(op, position, i))
            .ok_or_else(|| {
                anyhow!(
                    "{} is not eligible at position {} of {}",
                    c,
                    position,
                    op
                )
            })
    }

    /// Returns the positive literal of the `holds` variable of an atom.
    pub fn holds(&self, atom: AtomId) -> Literal {
        Literal::from((self.first_atom_var + atom.index()) as isize)
    }

    /// Returns the positive literals of the conjunction `active(op) ∧ selected(op, slot, c)...` of an assignment.
    pub fn assignment_conjunction(&self, assignment: &ArgumentAssignment) -> Result<Vec<Literal>> {
        let mut conjunction = Vec::with_capacity(1 + assignment.slots().len());
        conjunction.push(self.active(assignment.operator()));
        for (slot, c) in assignment.iter() {
            conjunction.push(self.selected_constant(assignment.operator(), slot, c)?);
        }
        Ok(conjunction)
    }
}
