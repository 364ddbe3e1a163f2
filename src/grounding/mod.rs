//! Grounders computing the reachable part of lifted problems.

mod relaxed_grounder;
pub use relaxed_grounder::RelaxedGrounder;

mod specs;
pub use specs::Action;
pub use specs::Grounder;
pub use specs::Grounding;
