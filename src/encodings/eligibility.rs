use crate::{
    grounding::Grounding,
    model::{ConstantId, LiftedProblem, OperatorId},
};
use log::debug;

/// For each operator and each of its parameter positions, the ordered set of constants that may be bound at this position.
///
/// Constant sets are sorted by constant handle.
/// An empty set at some position is valid: the corresponding operator can never be selected.
#[derive(Debug, Clone)]
pub struct EligibilityIndex {
    eligible: Vec<Vec<Vec<ConstantId>>>,
}

impl EligibilityIndex {
    /// Builds the index from the type hierarchy only.
    ///
    /// A constant is eligible at a position if its type is the type of the parameter or one of its subtypes.
    pub fn lifted(problem: &LiftedProblem) -> Self {
        let eligible = problem
            .operators()
            .iter()
            .map(|op| {
                op.parameters()
                    .iter()
                    .map(|v| {
                        let param_type = problem.variable_type(*v);
                        problem
                            .iter_constants()
                            .filter(|c| {
                                problem
                                    .types()
                                    .is_supertype_of(param_type, problem.constant_type(*c))
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();
        let index = Self { eligible };
        index.log_sizes(problem, "type-based");
        index
    }

    /// Builds the index from the ground actions proved reachable by a grounder.
    ///
    /// A constant is eligible at a position if some reachable action of the operator binds it at this position.
    pub fn grounded(problem: &LiftedProblem, grounding: &Grounding) -> Self {
        let mut eligible: Vec<Vec<Vec<ConstantId>>> = problem
            .operators()
            .iter()
            .map(|op| vec![vec![]; op.arity()])
            .collect();
        grounding.actions().iter().for_each(|a| {
            let positions = &mut eligible[a.operator().index()];
            a.args()
                .iter()
                .enumerate()
                .for_each(|(i, c)| positions[i].push(*c));
        });
        eligible.iter_mut().flatten().for_each(|set| {
            set.sort_unstable();
            set.dedup();
        });
        let index = Self { eligible };
        index.log_sizes(problem, "reachability-based");
        index
    }

    fn log_sizes(&self, problem: &LiftedProblem, kind: &str) {
        problem.operators().iter().for_each(|op| {
            debug!(
                "{} eligible constants for {}: {:?}",
                kind,
                op.name(),
                self.eligible[op.id().index()]
                    .iter()
                    .map(|s| s.len())
                    .collect::<Vec<usize>>()
            )
        });
    }

    /// Returns the constants eligible at a parameter position of an operator.
    pub fn eligible(&self, op: OperatorId, position: usize) -> &[ConstantId] {
        &self.eligible[op.index()][position]
    }

    /// Returns the constants eligible at each parameter position of an operator.
    pub fn eligible_sets(&self, op: OperatorId) -> Vec<&[ConstantId]> {
        self.eligible[op.index()]
            .iter()
            .map(|s| s.as_slice())
            .collect()
    }

    /// Returns the index of a constant in the set of eligible constants of a parameter position, if it is eligible.
    pub fn index_of(&self, op: OperatorId, position: usize, c: ConstantId) -> Option<usize> {
        self.eligible(op, position).binary_search(&c).ok()
    }

    /// Returns the number of parameter positions of an operator.
    pub fn arity(&self, op: OperatorId) -> usize {
        self.eligible[op.index()].len()
    }

    /// Returns `false` iff some parameter position of the operator has no eligible constant.
    pub fn is_selectable(&self, op: OperatorId) -> bool {
        self.eligible[op.index()].iter().all(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ProblemReader;

    const DOMAIN: &str = r#"
    type(object).
    type(loc, object).
    type(city, loc).
    type(truck, object).
    type(empty).
    const(a, loc).
    const(b, city).
    const(t, truck).
    pred(at, object, loc).
    op(drive, ?t:truck, ?from:loc, ?to:city).
    pre(drive, at(?t, ?from)).
    op(nothing, ?e:empty).
    init(at(t, a)).
    goal(at(t, b)).
    "#;

    #[test]
    fn test_lifted() {
        let problem = ProblemReader::default()
            .read(&mut DOMAIN.as_bytes())
            .unwrap();
        let index = EligibilityIndex::lifted(&problem);
        let drive = problem.get_operator("drive").unwrap();
        let c = |n| problem.get_constant(n).unwrap();
        assert_eq!(&[c("t")], index.eligible(drive, 0));
        assert_eq!(&[c("a"), c("b")], index.eligible(drive, 1));
        assert_eq!(&[c("b")], index.eligible(drive, 2));
        assert_eq!(Some(1), index.index_of(drive, 1, c("b")));
        assert_eq!(None, index.index_of(drive, 2, c("a")));
        assert!(index.is_selectable(drive));
        let nothing = problem.get_operator("nothing").unwrap();
        assert!(index.eligible(nothing, 0).is_empty());
        assert!(!index.is_selectable(nothing));
    }
}
