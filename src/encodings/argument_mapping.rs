use crate::model::{Condition, ConstantId, GroundAtom, LiftedProblem, Operator, OperatorId, Term};
use anyhow::{anyhow, Result};

/// The correspondence between the variable slots of a condition and the parameter slots of an operator.
///
/// The mapping is a list of (condition slot, operator slot) couples, one per operator parameter occurring in the condition.
/// Couples are sorted by operator slot, following the declaration order of the parameters;
/// for a parameter occurring several times in the condition, the first slot is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentMapping {
    operator: OperatorId,
    pairs: Vec<(usize, usize)>,
}

impl ArgumentMapping {
    /// Computes the mapping between an operator and one of its conditions.
    ///
    /// An error is returned if the condition involves a variable that is not a parameter of the operator.
    pub fn new(problem: &LiftedProblem, operator: &Operator, condition: &Condition) -> Result<Self> {
        if let Some(v) = condition
            .variables()
            .find(|v| operator.parameter_position(*v).is_none())
        {
            return Err(anyhow!(
                "variable ?{} of condition {} is not a parameter of operator {}",
                problem.variable_name(v),
                problem.condition_to_string(condition),
                operator.name()
            ));
        }
        let pairs = operator
            .parameters()
            .iter()
            .enumerate()
            .filter_map(|(op_slot, p)| {
                condition
                    .args()
                    .iter()
                    .position(|t| *t == Term::Variable(*p))
                    .map(|cond_slot| (cond_slot, op_slot))
            })
            .collect();
        Ok(Self {
            operator: operator.id(),
            pairs,
        })
    }

    /// Returns the operator of this mapping.
    pub fn operator(&self) -> OperatorId {
        self.operator
    }

    /// Returns the (condition slot, operator slot) couples.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Iterates over the mapped operator slots, in increasing order.
    pub fn operator_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.pairs.iter().map(|(_, p)| *p)
    }

    /// Returns the number of mapped slots.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` iff the condition involves no operator parameter.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// A binding of the operator slots of an [ArgumentMapping] to constants.
///
/// Two assignments are equal iff they share their operator, their slots and their constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArgumentAssignment {
    operator: OperatorId,
    slots: Vec<usize>,
    constants: Vec<ConstantId>,
}

impl ArgumentAssignment {
    /// Builds an assignment given one constant per mapped slot.
    ///
    /// # Panics
    ///
    /// Panics if the number of constants differs from the number of mapped slots.
    pub fn new(mapping: &ArgumentMapping, constants: Vec<ConstantId>) -> Self {
        assert_eq!(
            mapping.len(),
            constants.len(),
            "wrong number of constants for an argument assignment"
        );
        Self {
            operator: mapping.operator,
            slots: mapping.operator_slots().collect(),
            constants,
        }
    }

    /// Returns the operator of this assignment.
    pub fn operator(&self) -> OperatorId {
        self.operator
    }

    /// Returns the assigned operator slots.
    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    /// Returns the constants bound to the slots.
    pub fn constants(&self) -> &[ConstantId] {
        &self.constants
    }

    /// Iterates over the (operator slot, constant) couples of this assignment.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ConstantId)> + '_ {
        self.slots.iter().copied().zip(self.constants.iter().copied())
    }

    /// Returns the constant bound to an operator slot, if this slot is assigned.
    pub fn constant_at(&self, slot: usize) -> Option<ConstantId> {
        self.slots
            .iter()
            .position(|s| *s == slot)
            .map(|i| self.constants[i])
    }

    /// Substitutes the variables of a condition of the operator by the assigned constants.
    ///
    /// `None` is returned if the condition involves a variable whose slot is not assigned.
    pub fn ground(&self, operator: &Operator, condition: &Condition) -> Option<GroundAtom> {
        condition.ground_with(|v| {
            operator
                .parameter_position(v)
                .and_then(|slot| self.constant_at(slot))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{io::ProblemReader, model::split_condition};

    const DOMAIN: &str = r#"
    type(loc).
    const(a, b, loc).
    pred(at, loc).
    pred(road, loc, loc).
    op(move, ?from:loc, ?via:loc, ?to:loc).
    pre(move, road(?to, ?from)).
    pre(move, road(?via, ?via)).
    pre(move, road(a, ?to)).
    "#;

    fn preconditions(problem: &LiftedProblem) -> Vec<Condition> {
        split_condition(problem.operators()[0].precondition()).0
    }

    #[test]
    fn test_mapping_follows_parameter_order() {
        let problem = ProblemReader::default()
            .read(&mut DOMAIN.as_bytes())
            .unwrap();
        let op = &problem.operators()[0];
        let pre = preconditions(&problem);
        let mapping = ArgumentMapping::new(&problem, op, &pre[0]).unwrap();
        assert_eq!(&[(1, 0), (0, 2)], mapping.pairs());
        let mapping = ArgumentMapping::new(&problem, op, &pre[1]).unwrap();
        assert_eq!(&[(0, 1)], mapping.pairs());
        let mapping = ArgumentMapping::new(&problem, op, &pre[2]).unwrap();
        assert_eq!(&[(1, 2)], mapping.pairs());
    }

    #[test]
    fn test_assignment_ground() {
        let problem = ProblemReader::default()
            .read(&mut DOMAIN.as_bytes())
            .unwrap();
        let op = &problem.operators()[0];
        let pre = preconditions(&problem);
        let a = problem.get_constant("a").unwrap();
        let b = problem.get_constant("b").unwrap();
        let mapping = ArgumentMapping::new(&problem, op, &pre[1]).unwrap();
        let assignment = ArgumentAssignment::new(&mapping, vec![b]);
        let atom = assignment.ground(op, &pre[1]).unwrap();
        assert_eq!("road(b, b)", problem.atom_to_string(&atom));
        assert_eq!(None, assignment.ground(op, &pre[0]));
        let mapping = ArgumentMapping::new(&problem, op, &pre[0]).unwrap();
        let assignment = ArgumentAssignment::new(&mapping, vec![a, b]);
        assert_eq!(
            "road(b, a)",
            problem.atom_to_string(&assignment.ground(op, &pre[0]).unwrap())
        );
        assert_eq!(vec![(0, a), (2, b)], assignment.iter().collect::<Vec<_>>());
        assert_ne!(assignment, ArgumentAssignment::new(&mapping, vec![b, a]));
        assert_eq!(assignment, ArgumentAssignment::new(&mapping, vec![a, b]));
    }

    #[test]
    fn test_foreign_variable() {
        let mut problem = ProblemReader::default()
            .read(&mut DOMAIN.as_bytes())
            .unwrap();
        let other = problem.new_operator("other", &[("x", "loc")]).unwrap();
        let x = problem.operator_variable(other, "x").unwrap();
        let at = problem.get_predicate("at").unwrap();
        let foreign = Condition::positive(at, vec![Term::Variable(x)]);
        assert!(ArgumentMapping::new(&problem, &problem.operators()[0], &foreign).is_err());
    }
}
