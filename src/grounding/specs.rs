use crate::model::{AtomId, ConstantId, GroundAtom, LiftedProblem, OperatorId};
use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// A trait implemented by objects able to compute the reachable part of a lifted problem.
///
/// The returned [Grounding] gives the universe of ground atoms that may hold in some reachable state,
/// and the ground actions that may be applied in some reachable state.
pub trait Grounder {
    /// Computes the grounding of a problem.
    fn ground(&self, problem: &LiftedProblem) -> Result<Grounding>;
}

/// A ground action: an operator and one constant per parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    id: usize,
    operator: OperatorId,
    args: Vec<ConstantId>,
    name: String,
}

impl Action {
    /// Returns the index of this action in its [Grounding].
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the operator this action is an instance of.
    pub fn operator(&self) -> OperatorId {
        self.operator
    }

    /// Returns the constants bound to the operator parameters.
    pub fn args(&self) -> &[ConstantId] {
        &self.args
    }

    /// Returns the textual representation of this action, like `move(a, c)`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The result of a [Grounder]: a universe of ground atoms and a set of ground actions.
///
/// Atoms and actions get dense identifiers in insertion order.
#[derive(Debug, Default, Clone)]
pub struct Grounding {
    atoms: Vec<GroundAtom>,
    atom_ids: HashMap<GroundAtom, AtomId>,
    actions: Vec<Action>,
    action_ids: HashMap<(OperatorId, Vec<ConstantId>), usize>,
}

impl Grounding {
    /// Adds an atom to the universe and returns its handle.
    ///
    /// If the atom is already in the universe, its existing handle is returned.
    pub fn add_atom(&mut self, atom: GroundAtom) -> AtomId {
        if let Some(id) = self.atom_ids.get(&atom) {
            return *id;
        }
        let id = AtomId::new(self.atoms.len());
        self.atoms.push(atom.clone());
        self.atom_ids.insert(atom, id);
        id
    }

    /// Returns the handle of an atom, or `None` if it is not part of the universe.
    pub fn atom_id(&self, atom: &GroundAtom) -> Option<AtomId> {
        self.atom_ids.get(atom).copied()
    }

    /// Returns an atom given its handle.
    pub fn atom(&self, id: AtomId) -> &GroundAtom {
        &self.atoms[id.index()]
    }

    /// Returns the atoms of the universe.
    pub fn atoms(&self) -> &[GroundAtom] {
        &self.atoms
    }

    /// Returns the number of atoms in the universe.
    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Adds a ground action and returns its index.
    ///
    /// The arity of the action is checked against the operator.
    /// If the action is already present, its existing index is returned.
    pub fn add_action(
        &mut self,
        problem: &LiftedProblem,
        operator: OperatorId,
        args: Vec<ConstantId>,
    ) -> Result<usize> {
        let op = problem.operator(operator);
        if op.arity() != args.len() {
            return Err(anyhow!(
                "operator {} expects {} argument(s), got {}",
                op.name(),
                op.arity(),
                args.len()
            ));
        }
        let key = (operator, args);
        if let Some(id) = self.action_ids.get(&key) {
            return Ok(*id);
        }
        let name = format!(
            "{}({})",
            op.name(),
            key.1
                .iter()
                .map(|c| problem.constant_name(*c))
                .collect::<Vec<&str>>()
                .join(", ")
        );
        let id = self.actions.len();
        self.actions.push(Action {
            id,
            operator,
            args: key.1.clone(),
            name,
        });
        self.action_ids.insert(key, id);
        Ok(id)
    }

    /// Returns the ground actions.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Returns the number of ground actions.
    pub fn n_actions(&self) -> usize {
        self.actions.len()
    }

    /// Returns the action corresponding to an operator and its arguments.
    ///
    /// An error is returned if no such action was proved reachable.
    pub fn lookup_action(&self, operator: OperatorId, args: &[ConstantId]) -> Result<&Action> {
        self.action_ids
            .get(&(operator, args.to_vec()))
            .map(|id| &self.actions[*id])
            .ok_or_else(|| {
                anyhow!(
                    "no reachable action for operator {} and arguments {:?}",
                    operator,
                    args.iter().map(|c| c.to_string()).collect::<Vec<String>>()
                )
            })
    }
}
