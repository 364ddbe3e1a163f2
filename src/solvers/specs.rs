use super::{ComputationalBounds, PlanningResult};
use anyhow::Result;

/// A trait for planners able to compute a plan.
pub trait PlanComputer {
    /// Computes a plan.
    ///
    /// The search stops when a plan is found or when the provided bounds are exceeded;
    /// in the latter case, [PlanningResult::BoundReached] is returned.
    /// Errors denote malformed inputs, solver failures or internal inconsistencies.
    fn compute_plan(&mut self, bounds: &dyn ComputationalBounds) -> Result<PlanningResult>;
}
