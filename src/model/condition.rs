use super::{ConstantId, PredicateId, VariableId};

/// An argument of a condition: either a constant or a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    /// A bound argument.
    Constant(ConstantId),
    /// An unbound argument, scoped to an operator.
    Variable(VariableId),
}

/// An atomic condition: a predicate applied to terms, possibly negated.
///
/// Conditions are immutable; [negate](Self::negate) builds a sign-flipped copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    predicate: PredicateId,
    args: Vec<Term>,
    negated: bool,
}

impl Condition {
    /// Builds a new condition.
    pub fn new(predicate: PredicateId, args: Vec<Term>, negated: bool) -> Self {
        Self {
            predicate,
            args,
            negated,
        }
    }

    /// Builds a positive condition.
    pub fn positive(predicate: PredicateId, args: Vec<Term>) -> Self {
        Self::new(predicate, args, false)
    }

    /// Builds a negative condition.
    pub fn negative(predicate: PredicateId, args: Vec<Term>) -> Self {
        Self::new(predicate, args, true)
    }

    /// Returns the predicate of this condition.
    pub fn predicate(&self) -> PredicateId {
        self.predicate
    }

    /// Returns the arguments of this condition.
    pub fn args(&self) -> &[Term] {
        &self.args
    }

    /// Returns `true` iff this condition is negated.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Returns a copy of this condition with the opposite sign.
    pub fn negate(&self) -> Self {
        Self {
            predicate: self.predicate,
            args: self.args.clone(),
            negated: !self.negated,
        }
    }

    /// Returns `true` iff both conditions share their predicate and arguments, whatever their signs.
    pub fn is_same_atom(&self, other: &Condition) -> bool {
        self.predicate == other.predicate && self.args == other.args
    }

    /// Iterates over the variables of this condition, in argument order (repetitions included).
    pub fn variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.args.iter().filter_map(|t| match t {
            Term::Variable(v) => Some(*v),
            Term::Constant(_) => None,
        })
    }

    /// Returns `true` iff this condition has no variable.
    pub fn is_ground(&self) -> bool {
        self.variables().next().is_none()
    }

    /// Returns the atom of this condition with its variables replaced by constants.
    ///
    /// `None` is returned if the binding function does not bind some variable.
    pub fn ground_with<F>(&self, binding: F) -> Option<GroundAtom>
    where
        F: Fn(VariableId) -> Option<ConstantId>,
    {
        let args = self
            .args
            .iter()
            .map(|t| match t {
                Term::Constant(c) => Some(*c),
                Term::Variable(v) => binding(*v),
            })
            .collect::<Option<Vec<ConstantId>>>()?;
        Some(GroundAtom::new(self.predicate, args))
    }

    /// Returns the atom of this condition if it is ground.
    pub fn to_ground_atom(&self) -> Option<GroundAtom> {
        self.ground_with(|_| None)
    }
}

/// A ground atom: a predicate applied to constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroundAtom {
    predicate: PredicateId,
    args: Vec<ConstantId>,
}

impl GroundAtom {
    /// Builds a new ground atom.
    pub fn new(predicate: PredicateId, args: Vec<ConstantId>) -> Self {
        Self { predicate, args }
    }

    /// Returns the predicate of this atom.
    pub fn predicate(&self) -> PredicateId {
        self.predicate
    }

    /// Returns the arguments of this atom.
    pub fn args(&self) -> &[ConstantId] {
        &self.args
    }
}

/// A formula over conditions, as given by operator preconditions and effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// An atomic condition.
    Literal(Condition),
    /// A conjunction; the empty conjunction is `true`.
    And(Vec<Formula>),
    /// A disjunction; the empty disjunction is `false`.
    Or(Vec<Formula>),
}

impl Default for Formula {
    fn default() -> Self {
        Formula::And(vec![])
    }
}

impl Formula {
    /// Builds the conjunction of a list of conditions.
    pub fn conjunction(conditions: Vec<Condition>) -> Self {
        Formula::And(conditions.into_iter().map(Formula::Literal).collect())
    }

    /// Returns the conjunction of this formula and another one.
    pub fn and(self, other: Formula) -> Self {
        match self {
            Formula::And(mut v) => {
                v.push(other);
                Formula::And(v)
            }
            f => Formula::And(vec![f, other]),
        }
    }
}

/// Splits a formula into its flat conjunction of atomic conditions and a residual part.
///
/// Nested conjunctions are flattened.
/// Disjunctions (except the ones with a single operand) cannot be expressed as atomic conditions and are moved into the residual.
/// The residual is `None` iff the formula is a conjunction of atomic conditions.
///
/// # Example
///
/// ```
/// # use liftsat::model::{split_condition, Condition, Formula, PredicateId};
/// let p = Condition::positive(PredicateId::new(0), vec![]);
/// let q = Condition::negative(PredicateId::new(1), vec![]);
/// let f = Formula::And(vec![
///     Formula::Literal(p.clone()),
///     Formula::And(vec![Formula::Literal(q.clone())]),
/// ]);
/// assert_eq!((vec![p.clone(), q.clone()], None), split_condition(&f));
/// let g = Formula::Or(vec![Formula::Literal(p), Formula::Literal(q)]);
/// assert!(split_condition(&g).1.is_some());
/// ```
pub fn split_condition(formula: &Formula) -> (Vec<Condition>, Option<Formula>) {
    fn split_into(formula: &Formula, flat: &mut Vec<Condition>, residual: &mut Vec<Formula>) {
        match formula {
            Formula::Literal(c) => flat.push(c.clone()),
            Formula::And(v) => v.iter().for_each(|f| split_into(f, flat, residual)),
            Formula::Or(v) if v.len() == 1 => split_into(&v[0], flat, residual),
            Formula::Or(_) => residual.push(formula.clone()),
        }
    }
    let mut flat = Vec::new();
    let mut residual = Vec::new();
    split_into(formula, &mut flat, &mut residual);
    let residual = match residual.len() {
        0 => None,
        1 => residual.pop(),
        _ => Some(Formula::And(residual)),
    };
    (flat, residual)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(v: usize) -> Condition {
        Condition::positive(PredicateId::new(0), vec![Term::Variable(VariableId::new(v))])
    }

    #[test]
    fn test_negate() {
        let c = at(0);
        let n = c.negate();
        assert!(n.is_negated());
        assert!(!c.is_negated());
        assert!(c.is_same_atom(&n));
        assert_ne!(c, n);
        assert_eq!(c, n.negate());
    }

    #[test]
    fn test_ground_with() {
        let c = Condition::positive(
            PredicateId::new(1),
            vec![
                Term::Variable(VariableId::new(2)),
                Term::Constant(ConstantId::new(7)),
                Term::Variable(VariableId::new(2)),
            ],
        );
        assert!(!c.is_ground());
        assert_eq!(None, c.to_ground_atom());
        let atom = c
            .ground_with(|v| if v.index() == 2 { Some(ConstantId::new(4)) } else { None })
            .unwrap();
        assert_eq!(
            &[ConstantId::new(4), ConstantId::new(7), ConstantId::new(4)],
            atom.args()
        );
        assert_eq!(2, c.variables().count());
    }

    #[test]
    fn test_split_single_operand_disjunction() {
        let f = Formula::Or(vec![Formula::Literal(at(0))]).and(Formula::Literal(at(1)));
        assert_eq!((vec![at(0), at(1)], None), split_condition(&f));
    }

    #[test]
    fn test_split_residual() {
        let or = Formula::Or(vec![Formula::Literal(at(0)), Formula::Literal(at(1))]);
        let f = Formula::conjunction(vec![at(2)]).and(or.clone());
        assert_eq!((vec![at(2)], Some(or.clone())), split_condition(&f));
        let g = f.and(Formula::Or(vec![]));
        let (flat, residual) = split_condition(&g);
        assert_eq!(vec![at(2)], flat);
        assert_eq!(Some(Formula::And(vec![or, Formula::Or(vec![])])), residual);
    }

    #[test]
    fn test_split_empty() {
        assert_eq!((vec![], None), split_condition(&Formula::default()));
    }
}
