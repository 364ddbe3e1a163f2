use super::cadical_solver::CadicalSolver;
use std::{
    fmt::Display,
    num::{NonZeroIsize, NonZeroUsize},
};

/// A variable in a SAT solver.
///
/// A variable is represented by a non-null positive integer.
/// It can be obtained through the [From] trait from an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable(NonZeroUsize);

macro_rules! impl_var_from {
    ($t: ty) => {
        impl From<$t> for Variable {
            fn from(v: $t) -> Self {
                Self(NonZeroUsize::try_from(v as usize).unwrap())
            }
        }
    };
}
impl_var_from!(usize);
impl_var_from!(u64);
impl_var_from!(u32);

macro_rules! impl_var_from_neg {
    ($t: ty) => {
        impl From<$t> for Variable {
            fn from(v: $t) -> Self {
                if v < 0 {
                    panic!("cannot build a variable from a negative integer")
                }
                Self(NonZeroUsize::try_from(v as usize).unwrap())
            }
        }
    };
}
impl_var_from_neg!(isize);
impl_var_from_neg!(i64);
impl_var_from_neg!(i32);

impl From<Variable> for usize {
    fn from(v: Variable) -> Self {
        v.0.into()
    }
}

/// A literal in a SAT solver.
///
/// A literal is represented by a non-null integer.
/// It can be obtained through the [From] trait from a signed integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal(NonZeroIsize);

impl Literal {
    /// Returns the opposite literal.
    pub fn negate(self) -> Self {
        Self::from(-self.0.get())
    }

    /// Returns the variable of this literal.
    pub fn var(&self) -> Variable {
        Variable(self.0.unsigned_abs())
    }

    /// Returns `true` iff this literal is positive.
    pub fn is_positive(&self) -> bool {
        self.0.get() > 0
    }

    /// Returns the literal of the same polarity, with a variable moved `offset` positions forward.
    pub fn shifted(self, offset: usize) -> Self {
        let v = self.0.get();
        let offset = offset as isize;
        if v > 0 {
            Self::from(v + offset)
        } else {
            Self::from(v - offset)
        }
    }
}

macro_rules! impl_lit_from {
    ($t: ty) => {
        impl From<$t> for Literal {
            fn from(l: $t) -> Self {
                Self(NonZeroIsize::try_from(l as isize).unwrap())
            }
        }
    };
}
impl_lit_from!(isize);
impl_lit_from!(i64);
impl_lit_from!(i32);

impl From<Literal> for isize {
    fn from(l: Literal) -> Self {
        l.0.into()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds a clause from a list of integers.
#[cfg(test)]
macro_rules! clause {
    () => (
        vec![] as Vec<$crate::sat::Literal>
    );
    ($($x:expr),+ $(,)?) => (
        [$($x),+].into_iter().map($crate::sat::Literal::from).collect::<Vec<$crate::sat::Literal>>()
    );
}
#[cfg(test)]
pub(crate) use clause;

/// An assignment of a set of variables.
///
/// Inside the set of variables involved in the assignment, some may be unassigned.
/// This is the reason why accessors to assigned value returns an [Option<bool>].
#[derive(Debug, PartialEq, Eq)]
pub struct Assignment(Vec<Option<bool>>);

impl Assignment {
    pub(crate) fn new(assignment: Vec<Option<bool>>) -> Self {
        Self(assignment)
    }

    /// Returns the value potentially assigned to the variable.
    ///
    /// The result in an [Option].
    /// In case the variable is not assigned, or is out of the range of the assignment, [Option::None] is returned.
    /// Else, [Option::Some] is returned and contains the assigned value.
    pub fn value_of<T>(&self, v: T) -> Option<bool>
    where
        T: Into<Variable>,
    {
        self.0
            .get(usize::from(v.into()) - 1)
            .copied()
            .unwrap_or(None)
    }

    /// Returns `true` iff the literal is set to true by this assignment.
    pub fn satisfies(&self, l: Literal) -> bool {
        self.value_of(l.var()) == Some(l.is_positive())
    }

    /// Returns the number of variables covered by this assignment.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` iff this assignment covers no variable.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The result of a call to a SAT solver.
#[derive(Debug, PartialEq, Eq)]
pub enum SolvingResult {
    /// The problem is satisfiable; a model is provided.
    Satisfiable(Assignment),
    /// The problem is unsatisfiable.
    Unsatisfiable,
    /// The solver was not able to decide the problem.
    Unknown,
}

impl SolvingResult {
    /// Returns the underlying model if it exists, or [Option::None].
    ///
    /// # Panics
    ///
    /// If the solving result is set [SolvingResult::Unknown], this function panics.
    pub fn unwrap_model(self) -> Option<Assignment> {
        match self {
            SolvingResult::Satisfiable(assignment) => Some(assignment),
            SolvingResult::Unsatisfiable => None,
            SolvingResult::Unknown => {
                panic!(r#"cannot unwrap solving result when the solver returned "Unknown""#)
            }
        }
    }
}

/// A trait for objects listening to the solving steps of a SAT solver.
pub trait SolvingListener {
    /// Called when a solving process begins.
    fn solving_start(&self, n_vars: usize, n_clauses: usize);

    /// Called when a solving process ends.
    fn solving_end(&self, result: &SolvingResult);
}

/// A trait for SAT solvers.
///
/// Solvers are incremental: clauses added before a call to a solving function persist for the next calls.
pub trait SatSolver {
    /// Adds a clause to this solver.
    fn add_clause(&mut self, cl: Vec<Literal>);

    /// Solves the problem formed by the clauses added so far.
    fn solve(&mut self) -> SolvingResult;

    /// Solves the problem formed by the clauses added so far and the provided assumptions.
    fn solve_under_assumptions(&mut self, assumptions: &[Literal]) -> SolvingResult;

    /// Returns the number of variables known by this solver.
    fn n_vars(&self) -> usize;

    /// Adds a listener that is triggered when a solving process begins and ends.
    fn add_listener(&mut self, listener: Box<dyn SolvingListener>);

    /// Ensures the variables up to `new_max_id` are part of the models returned by this solver.
    fn reserve(&mut self, new_max_id: usize);
}

/// A trait for objects building new SAT solvers.
pub trait SatSolverFactory {
    /// Builds a new SAT solver.
    fn new_solver(&self) -> Box<dyn SatSolver>;
}

/// The factory returning the default SAT solver (see [default_solver]).
#[derive(Default)]
pub struct DefaultSatSolverFactory;

impl SatSolverFactory for DefaultSatSolverFactory {
    fn new_solver(&self) -> Box<dyn SatSolver> {
        default_solver()
    }
}

/// The default SAT solver (Cadical).
pub fn default_solver() -> Box<dyn SatSolver> {
    Box::<CadicalSolver>::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_from_pos() {
        let v = Variable::from(1);
        assert_eq!(1, usize::from(v))
    }

    #[test]
    #[allow(unused_must_use)]
    #[should_panic]
    fn test_var_from_null() {
        Variable::from(0);
    } // kcov-ignore

    #[test]
    #[allow(unused_must_use)]
    #[should_panic]
    fn test_var_from_neg() {
        Variable::from(-1);
    } // kcov-ignore

    #[test]
    fn test_lit_from_neg() {
        let l = Literal::from(-1);
        assert_eq!(-1, isize::from(l))
    }

    #[test]
    #[allow(unused_must_use)]
    #[should_panic]
    fn test_lit_from_null() {
        Literal::from(0);
    } // kcov-ignore

    #[test]
    fn test_negate_lit() {
        assert_eq!(Literal::from(-1), Literal::from(1).negate());
        assert_eq!(Literal::from(1), Literal::from(-1).negate());
    }

    #[test]
    fn test_shift_lit() {
        assert_eq!(Literal::from(13), Literal::from(3).shifted(10));
        assert_eq!(Literal::from(-13), Literal::from(-3).shifted(10));
        assert_eq!(Literal::from(-3), Literal::from(-3).shifted(0));
    }

    #[test]
    fn test_clause_macro() {
        assert_eq!(
            vec![Literal::from(1), Literal::from(-2)],
            clause![1, -2]
        );
        assert!(clause![].is_empty());
    }

    #[test]
    fn test_assignment_out_of_range() {
        let assignment = Assignment::new(vec![Some(true), Some(false)]);
        assert_eq!(Some(true), assignment.value_of(1));
        assert_eq!(None, assignment.value_of(3));
        assert!(assignment.satisfies(Literal::from(-2)));
        assert!(!assignment.satisfies(Literal::from(3)));
    }

    #[test]
    fn test_solving_result_unwrap_model_none() {
        assert_eq!(None, SolvingResult::Unsatisfiable.unwrap_model());
    }

    #[test]
    #[should_panic]
    fn test_solving_result_unwrap_model_unknown() {
        SolvingResult::Unknown.unwrap_model();
    } // kcov-ignore
}
