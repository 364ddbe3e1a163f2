//! Encodings of lifted planning problems into SAT.

mod argument_combinations;
pub use argument_combinations::ArgumentCombinations;

mod argument_mapping;
pub use argument_mapping::ArgumentAssignment;
pub use argument_mapping::ArgumentMapping;

mod condition_constraints;

mod condition_support;
pub use condition_support::ConditionRole;
pub use condition_support::ConditionSupport;

mod eligibility;
pub use eligibility::EligibilityIndex;

mod frame_axioms;

mod interference_constraints;

mod parameter_constraints;

mod reachability_formula;
pub use reachability_formula::EncodingStatistics;
pub use reachability_formula::LiftedEncoding;
pub use reachability_formula::LiftedSatEncoder;
pub use reachability_formula::SymbolicReachabilityFormula;

mod strategy;
pub use strategy::EligibilityMode;
pub use strategy::EncodingStrategy;
pub use strategy::StepSemantics;

mod variables;
pub use variables::VariableAllocator;
pub use variables::VariableLayout;
