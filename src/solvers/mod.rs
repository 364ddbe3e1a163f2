//! Planners and their auxiliary objects.

mod bounds;
pub use bounds::ComputationalBounds;
pub use bounds::SearchLimits;

mod plan;
pub use plan::Plan;
pub use plan::PlanningResult;

mod plan_checker;
pub use plan_checker::check_plan;

mod plan_decoder;
pub use plan_decoder::decode_plan;

mod sat_planner;
pub use sat_planner::SatPlanner;

mod specs;
pub use specs::PlanComputer;

mod unroller;
pub use unroller::IncrementalUnroller;
