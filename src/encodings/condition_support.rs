use super::ArgumentAssignment;
use crate::model::AtomId;
use std::collections::HashMap;

/// The role of a condition in an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionRole {
    /// The condition is a precondition.
    Precondition,
    /// The condition is an effect.
    Effect,
}

/// An index from ground atoms to the argument assignments realizing them.
///
/// Assignments are indexed by the sign and the role of the condition they ground.
/// The index is populated while encoding conditions, and read afterward by the interference and frame axiom encoders.
#[derive(Debug, Default)]
pub struct ConditionSupport {
    positive_preconditions: HashMap<AtomId, Vec<ArgumentAssignment>>,
    negative_preconditions: HashMap<AtomId, Vec<ArgumentAssignment>>,
    positive_effects: HashMap<AtomId, Vec<ArgumentAssignment>>,
    negative_effects: HashMap<AtomId, Vec<ArgumentAssignment>>,
}

impl ConditionSupport {
    fn map(&self, positive: bool, role: ConditionRole) -> &HashMap<AtomId, Vec<ArgumentAssignment>> {
        match (positive, role) {
            (true, ConditionRole::Precondition) => &self.positive_preconditions,
            (false, ConditionRole::Precondition) => &self.negative_preconditions,
            (true, ConditionRole::Effect) => &self.positive_effects,
            (false, ConditionRole::Effect) => &self.negative_effects,
        }
    }

    fn map_mut(
        &mut self,
        positive: bool,
        role: ConditionRole,
    ) -> &mut HashMap<AtomId, Vec<ArgumentAssignment>> {
        match (positive, role) {
            (true, ConditionRole::Precondition) => &mut self.positive_preconditions,
            (false, ConditionRole::Precondition) => &mut self.negative_preconditions,
            (true, ConditionRole::Effect) => &mut self.positive_effects,
            (false, ConditionRole::Effect) => &mut self.negative_effects,
        }
    }

    /// Registers an assignment as a supporter of a ground atom.
    ///
    /// Returns `false` if this assignment was already registered for this atom, sign and role.
    pub fn register(
        &mut self,
        atom: AtomId,
        positive: bool,
        role: ConditionRole,
        assignment: ArgumentAssignment,
    ) -> bool {
        let supporters = self.map_mut(positive, role).entry(atom).or_default();
        if supporters.contains(&assignment) {
            return false;
        }
        supporters.push(assignment);
        true
    }

    /// Returns the assignments supporting an atom for a given sign and role, in registration order.
    pub fn supporters_of(&self, atom: AtomId, positive: bool, role: ConditionRole) -> &[ArgumentAssignment] {
        self.map(positive, role)
            .get(&atom)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the atoms having at least one supporter for a given sign and role, sorted by handle.
    pub fn supported_atoms(&self, positive: bool, role: ConditionRole) -> Vec<AtomId> {
        let mut atoms = self.map(positive, role).keys().copied().collect::<Vec<AtomId>>();
        atoms.sort_unstable();
        atoms
    }

    /// Returns the total number of registered (atom, sign, role, assignment) entries.
    pub fn n_entries(&self) -> usize {
        [
            &self.positive_preconditions,
            &self.negative_preconditions,
            &self.positive_effects,
            &self.negative_effects,
        ]
        .iter()
        .map(|m| m.values().map(|v| v.len()).sum::<usize>())
        .sum()
    }
}
