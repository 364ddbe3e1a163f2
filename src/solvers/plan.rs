use crate::grounding::Action;

/// A parallel plan: a sequence of steps, each step containing a set of actions.
///
/// Actions are stored in non-decreasing step order.
/// The makespan of a plan is its number of steps, some of which may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    actions: Vec<(usize, Action)>,
    makespan: usize,
}

impl Plan {
    /// Builds an empty plan with the given makespan.
    pub fn new(makespan: usize) -> Self {
        Self {
            actions: vec![],
            makespan,
        }
    }

    /// Appends an action at a step.
    ///
    /// # Panics
    ///
    /// Panics if the step is lower than the one of the last action or not lower than the makespan.
    pub fn push(&mut self, step: usize, action: Action) {
        assert!(step < self.makespan, "step out of the plan makespan");
        if let Some((last, _)) = self.actions.last() {
            assert!(*last <= step, "actions must be pushed in step order");
        }
        self.actions.push((step, action));
    }

    /// Returns the number of steps of this plan.
    pub fn makespan(&self) -> usize {
        self.makespan
    }

    /// Returns the number of actions of this plan.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` iff this plan contains no action.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterates over the (step, action) couples of this plan, in step order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Action)> + '_ {
        self.actions.iter().map(|(s, a)| (*s, a))
    }

    /// Returns the actions of a step.
    pub fn actions_at(&self, step: usize) -> impl Iterator<Item = &Action> + '_ {
        self.actions
            .iter()
            .filter(move |(s, _)| *s == step)
            .map(|(_, a)| a)
    }
}

/// The outcome of a planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanningResult {
    /// A plan was found.
    Plan(Plan),
    /// The computational bounds were reached before a plan was found.
    ///
    /// This does not mean the problem has no solution.
    BoundReached {
        /// The number of steps that were explored.
        steps: usize,
    },
}

impl PlanningResult {
    /// Returns the plan, if one was found.
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            PlanningResult::Plan(p) => Some(p),
            PlanningResult::BoundReached { .. } => None,
        }
    }
}
