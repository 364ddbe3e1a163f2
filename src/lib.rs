//! Liftsat is a classical planner encoding lifted planning problems into SAT.
//!
//! Operators are never fully grounded: at each step of the plan, the SAT solver chooses which operators are active
//! and which constants are bound to their parameters.
//! The formula is unrolled step by step into an incremental SAT solver until a plan is found.

#![warn(missing_docs)]

pub mod encodings;

pub mod grounding;

pub mod io;

pub mod model;

pub mod sat;

pub mod solvers;

pub mod utils;
