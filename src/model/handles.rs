macro_rules! handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            /// Builds a handle from its index.
            pub fn new(index: usize) -> Self {
                Self(index)
            }

            /// Returns the index of this handle.
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

handle!(
    /// A handle to a type of a [LiftedProblem](crate::model::LiftedProblem).
    TypeId
);

handle!(
    /// A handle to a constant (an object) of a [LiftedProblem](crate::model::LiftedProblem).
    ConstantId
);

handle!(
    /// A handle to a predicate of a [LiftedProblem](crate::model::LiftedProblem).
    PredicateId
);

handle!(
    /// A handle to a variable (an operator parameter) of a [LiftedProblem](crate::model::LiftedProblem).
    ///
    /// Variables are scoped to the operator which declared them.
    VariableId
);

handle!(
    /// A handle to an operator of a [LiftedProblem](crate::model::LiftedProblem).
    ///
    /// Operator handles follow the declaration order of the operators.
    OperatorId
);

handle!(
    /// A handle to a ground atom of a [Grounding](crate::grounding::Grounding).
    AtomId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles() {
        let c = ConstantId::new(3);
        assert_eq!(3, c.index());
        assert_eq!("ConstantId#3", c.to_string());
        assert!(OperatorId::new(0) < OperatorId::new(1));
    }
}
