//! The lifted planning problem model.

mod condition;
pub use condition::split_condition;
pub use condition::Condition;
pub use condition::Formula;
pub use condition::GroundAtom;
pub use condition::Term;

mod handles;
pub use handles::AtomId;
pub use handles::ConstantId;
pub use handles::OperatorId;
pub use handles::PredicateId;
pub use handles::TypeId;
pub use handles::VariableId;

mod operator;
pub use operator::Operator;

mod problem;
pub use problem::LiftedProblem;

mod type_hierarchy;
pub use type_hierarchy::TypeHierarchy;
