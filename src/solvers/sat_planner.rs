use super::{
    decode_plan, ComputationalBounds, IncrementalUnroller, PlanComputer, PlanningResult,
};
use crate::{
    encodings::{EncodingStrategy, LiftedSatEncoder},
    grounding::Grounding,
    model::LiftedProblem,
    sat::{DefaultSatSolverFactory, SatSolverFactory, SolvingResult},
};
use anyhow::{anyhow, Result};
use log::{debug, info};

/// A SAT-based planner working on a lifted encoding of the problem.
///
/// The formula given by a [LiftedSatEncoder] is unrolled step by step into an incremental SAT solver.
/// At each horizon, the solver checks whether the goal can hold at the last step;
/// if so, a plan is decoded from the model, else the formula is extended by one step,
/// until the computational bounds are reached.
///
/// # Example
///
/// ```
/// # use liftsat::encodings::{EligibilityMode, EncodingStrategy, StepSemantics};
/// # use liftsat::grounding::{Grounder, RelaxedGrounder};
/// # use liftsat::io::ProblemReader;
/// # use liftsat::solvers::{PlanComputer, SatPlanner, SearchLimits};
/// let problem = ProblemReader::default().read(&mut r#"
///     type(loc).
///     const(a, b, loc).
///     pred(at, loc).
///     op(move, ?from:loc, ?to:loc).
///     pre(move, at(?from)).
///     eff(move, -at(?from)).
///     eff(move, at(?to)).
///     init(at(a)).
///     goal(at(b)).
/// "#.as_bytes()).unwrap();
/// let grounding = RelaxedGrounder.ground(&problem).unwrap();
/// let strategy = EncodingStrategy::new(StepSemantics::Sequential, EligibilityMode::Lifted);
/// let mut planner = SatPlanner::new(&problem, &grounding, strategy);
/// let result = planner.compute_plan(&SearchLimits::default().with_max_iterations(10)).unwrap();
/// assert_eq!(1, result.plan().unwrap().makespan());
/// ```
pub struct SatPlanner<'a> {
    problem: &'a LiftedProblem,
    grounding: &'a Grounding,
    strategy: EncodingStrategy,
    solver_factory: Box<dyn SatSolverFactory>,
}

impl<'a> SatPlanner<'a> {
    /// Builds a new SAT based planner.
    ///
    /// The underlying SAT solver is one returned by [default_solver](crate::sat::default_solver).
    pub fn new(problem: &'a LiftedProblem, grounding: &'a Grounding, strategy: EncodingStrategy) -> Self {
        Self::new_with_sat_solver_factory(problem, grounding, strategy, Box::new(DefaultSatSolverFactory))
    }

    /// Builds a new SAT based planner.
    ///
    /// The SAT solver to use in given through the solver factory.
    pub fn new_with_sat_solver_factory(
        problem: &'a LiftedProblem,
        grounding: &'a Grounding,
        strategy: EncodingStrategy,
        solver_factory: Box<dyn SatSolverFactory>,
    ) -> Self {
        Self {
            problem,
            grounding,
            strategy,
            solver_factory,
        }
    }
}

impl PlanComputer for SatPlanner<'_> {
    fn compute_plan(&mut self, bounds: &dyn ComputationalBounds) -> Result<PlanningResult> {
        let encoding = LiftedSatEncoder::new(self.problem, self.grounding, self.strategy).encode()?;
        let mut solver = self.solver_factory.new_solver();
        let mut unroller = IncrementalUnroller::new(encoding.formula(), solver.as_mut());
        loop {
            let horizon = unroller.horizon();
            info!("looking for a plan with {} step(s)", horizon);
            let assumptions = unroller.goal_assumptions();
            match solver.solve_under_assumptions(&assumptions) {
                SolvingResult::Satisfiable(model) => {
                    let plan = decode_plan(encoding.layout(), self.grounding, &model, horizon)?;
                    info!(
                        "found a plan with {} action(s) in {} step(s)",
                        plan.len(),
                        plan.makespan()
                    );
                    return Ok(PlanningResult::Plan(plan));
                }
                SolvingResult::Unsatisfiable => {
                    debug!("no plan with {} step(s)", horizon);
                    unroller.extend(solver.as_mut());
                    if !bounds.within_bounds(unroller.horizon()) {
                        return Ok(PlanningResult::BoundReached { steps: horizon });
                    }
                }
                SolvingResult::Unknown => {
                    return Err(anyhow!(
                        "the SAT solver was not able to decide the formula for {} step(s)",
                        horizon
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        encodings::{ConditionRole, EligibilityMode, LiftedEncoding, StepSemantics},
        grounding::{Grounder, RelaxedGrounder},
        io::ProblemReader,
        model::{AtomId, OperatorId},
        sat::{self, Assignment, Literal, SatSolver},
        solvers::{check_plan, SearchLimits},
    };
    use paste::paste;

    const MOVE: &str = r#"
    type(loc).
    const(a, b, c, loc).
    pred(at, loc).
    op(move, ?from:loc, ?to:loc).
    pre(move, at(?from)).
    eff(move, -at(?from)).
    eff(move, at(?to)).
    init(at(a)).
    goal(at(c)).
    "#;

    const TWO_VEHICLES: &str = r#"
    type(loc).
    type(obj).
    const(a, b, loc).
    const(p, q, obj).
    pred(at, obj, loc).
    op(drive, ?o:obj, ?from:loc, ?to:loc).
    pre(drive, at(?o, ?from)).
    eff(drive, -at(?o, ?from)).
    eff(drive, at(?o, ?to)).
    op(fly, ?o:obj, ?from:loc, ?to:loc).
    pre(fly, at(?o, ?from)).
    eff(fly, -at(?o, ?from)).
    eff(fly, at(?o, ?to)).
    init(at(p, a)).
    init(at(q, a)).
    goal(at(p, b)).
    goal(at(q, b)).
    "#;

    const TAKE_AFTER_USE: &str = r#"
    type(obj).
    const(a, obj).
    pred(free, obj).
    pred(held, obj).
    pred(used, obj).
    op(take, ?x:obj).
    pre(take, free(?x)).
    eff(take, -free(?x)).
    eff(take, held(?x)).
    op(use, ?y:obj).
    pre(use, free(?y)).
    eff(use, used(?y)).
    init(free(a)).
    goal(held(a)).
    goal(used(a)).
    "#;

    fn read(content: &str) -> (LiftedProblem, Grounding) {
        let problem = ProblemReader::default()
            .read(&mut content.as_bytes())
            .unwrap();
        let grounding = RelaxedGrounder.ground(&problem).unwrap();
        (problem, grounding)
    }

    fn plan(content: &str, strategy: EncodingStrategy, max_steps: usize) -> (LiftedProblem, PlanningResult) {
        let (problem, grounding) = read(content);
        let mut planner = SatPlanner::new(&problem, &grounding, strategy);
        let result = planner
            .compute_plan(&SearchLimits::default().with_max_iterations(max_steps))
            .unwrap();
        (problem, result)
    }

    fn solve_at(
        encoding: &LiftedEncoding,
        solver: &mut dyn SatSolver,
        horizon: usize,
        forced: &[Literal],
    ) -> Option<Assignment> {
        let mut unroller = IncrementalUnroller::new(encoding.formula(), solver);
        (0..horizon).for_each(|_| unroller.extend(solver));
        forced.iter().for_each(|l| solver.add_clause(vec![*l]));
        solver
            .solve_under_assumptions(&unroller.goal_assumptions())
            .unwrap_model()
    }

    macro_rules! planner_tests {
        ($semantics:ident, $eligibility:ident) => {
            paste! {
                fn [<strategy_ $semantics:lower _ $eligibility:lower>]() -> EncodingStrategy {
                    EncodingStrategy::new(StepSemantics::$semantics, EligibilityMode::$eligibility)
                }

                #[test]
                fn [<test_move_ $semantics:lower _ $eligibility:lower>]() {
                    let (problem, result) = plan(MOVE, [<strategy_ $semantics:lower _ $eligibility:lower>](), 10);
                    let plan = result.plan().unwrap();
                    assert_eq!(1, plan.makespan());
                    assert_eq!(
                        vec![(0, "move(a, c)")],
                        plan.iter().map(|(s, a)| (s, a.name())).collect::<Vec<(usize, &str)>>()
                    );
                    check_plan(&problem, plan).unwrap();
                }

                #[test]
                fn [<test_move_unreachable_goal_ $semantics:lower _ $eligibility:lower>]() {
                    let content = format!("{}\ngoal(at(b)).", MOVE);
                    let (_, result) = plan(&content, [<strategy_ $semantics:lower _ $eligibility:lower>](), 3);
                    assert_eq!(PlanningResult::BoundReached { steps: 3 }, result);
                }

                #[test]
                fn [<test_goal_holds_initially_ $semantics:lower _ $eligibility:lower>]() {
                    let content = MOVE.replace("goal(at(c))", "goal(at(a))");
                    let (_, result) = plan(&content, [<strategy_ $semantics:lower _ $eligibility:lower>](), 3);
                    let plan = result.plan().unwrap();
                    assert_eq!(0, plan.makespan());
                    assert!(plan.is_empty());
                }

                #[test]
                fn [<test_two_vehicles_ $semantics:lower _ $eligibility:lower>]() {
                    let (problem, result) = plan(TWO_VEHICLES, [<strategy_ $semantics:lower _ $eligibility:lower>](), 10);
                    let plan = result.plan().unwrap();
                    let expected_makespan = match StepSemantics::$semantics {
                        StepSemantics::Sequential => 2,
                        StepSemantics::Parallel => 1,
                    };
                    assert_eq!(expected_makespan, plan.makespan());
                    assert_eq!(2, plan.len());
                    check_plan(&problem, plan).unwrap();
                }

                #[test]
                fn [<test_deleting_effect_waits_for_user_ $semantics:lower _ $eligibility:lower>]() {
                    let (problem, result) = plan(TAKE_AFTER_USE, [<strategy_ $semantics:lower _ $eligibility:lower>](), 10);
                    let plan = result.plan().unwrap();
                    assert_eq!(2, plan.makespan());
                    assert_eq!(
                        vec![(0, "use(a)"), (1, "take(a)")],
                        plan.iter().map(|(s, a)| (s, a.name())).collect::<Vec<(usize, &str)>>()
                    );
                    check_plan(&problem, plan).unwrap();
                }

                #[test]
                fn [<test_models_respect_selection_and_frame_ $semantics:lower _ $eligibility:lower>]() {
                    let (problem, grounding) = read(TWO_VEHICLES);
                    let encoding = LiftedSatEncoder::new(&problem, &grounding, [<strategy_ $semantics:lower _ $eligibility:lower>]())
                        .encode()
                        .unwrap();
                    let mut solver = sat::default_solver();
                    let horizon = 3;
                    let model = solve_at(&encoding, solver.as_mut(), horizon, &[]).unwrap();
                    let layout = encoding.layout();
                    let sv = layout.step_vars();
                    for step in 0..=horizon {
                        for op in (0..layout.n_operators()).map(OperatorId::new) {
                            for position in 0..layout.eligibility().arity(op) {
                                let n_selected = (0..layout.eligibility().eligible(op, position).len())
                                    .filter(|i| model.satisfies(layout.selected(op, position, *i).shifted(step * sv)))
                                    .count();
                                assert!(n_selected <= 1);
                            }
                        }
                    }
                    for step in 0..horizon {
                        for atom in (0..layout.n_atoms()).map(AtomId::new) {
                            let now = model.satisfies(layout.holds(atom).shifted(step * sv));
                            let next = model.satisfies(layout.holds(atom).shifted((step + 1) * sv));
                            if now == next {
                                continue;
                            }
                            let supported = encoding
                                .support()
                                .supporters_of(atom, next, ConditionRole::Effect)
                                .iter()
                                .any(|a| {
                                    layout
                                        .assignment_conjunction(a)
                                        .unwrap()
                                        .iter()
                                        .all(|l| model.satisfies(l.shifted(step * sv)))
                                });
                            assert!(supported);
                        }
                    }
                }

                #[test]
                fn [<test_forced_sequence_round_trip_ $semantics:lower _ $eligibility:lower>]() {
                    let (problem, grounding) = read(MOVE);
                    let encoding = LiftedSatEncoder::new(&problem, &grounding, [<strategy_ $semantics:lower _ $eligibility:lower>]())
                        .encode()
                        .unwrap();
                    let layout = encoding.layout();
                    let sv = layout.step_vars();
                    let mv = OperatorId::new(0);
                    let c = |n| problem.get_constant(n).unwrap();
                    let sequence = [("a", "b"), ("b", "a"), ("a", "c")];
                    let mut forced = vec![];
                    for (step, (from, to)) in sequence.iter().enumerate() {
                        forced.push(layout.active(mv).shifted(step * sv));
                        forced.push(layout.selected_constant(mv, 0, c(from)).unwrap().shifted(step * sv));
                        forced.push(layout.selected_constant(mv, 1, c(to)).unwrap().shifted(step * sv));
                    }
                    let mut solver = sat::default_solver();
                    let model = solve_at(&encoding, solver.as_mut(), sequence.len(), &forced).unwrap();
                    let plan = decode_plan(layout, &grounding, &model, sequence.len()).unwrap();
                    assert_eq!(
                        vec![(0, "move(a, b)"), (1, "move(b, a)"), (2, "move(a, c)")],
                        plan.iter().map(|(s, a)| (s, a.name())).collect::<Vec<(usize, &str)>>()
                    );
                    check_plan(&problem, &plan).unwrap();
                }

                #[test]
                fn [<test_forced_inapplicable_action_ $semantics:lower _ $eligibility:lower>]() {
                    let (problem, grounding) = read(MOVE);
                    let encoding = LiftedSatEncoder::new(&problem, &grounding, [<strategy_ $semantics:lower _ $eligibility:lower>]())
                        .encode()
                        .unwrap();
                    let layout = encoding.layout();
                    let mv = OperatorId::new(0);
                    let b = problem.get_constant("b").unwrap();
                    let forced = [
                        layout.active(mv),
                        layout.selected_constant(mv, 0, b).unwrap(),
                    ];
                    let mut solver = sat::default_solver();
                    assert!(solve_at(&encoding, solver.as_mut(), 1, &forced).is_none());
                }
            }
        };
    }

    planner_tests!(Sequential, Lifted);
    planner_tests!(Sequential, Grounded);
    planner_tests!(Parallel, Lifted);
    planner_tests!(Parallel, Grounded);

    #[test]
    fn test_unknown_solver_status_is_an_error() {
        let (problem, grounding) = read(MOVE);
        let strategy = EncodingStrategy::new(StepSemantics::Parallel, EligibilityMode::Lifted);
        let factory = sat::ExternalSatSolverFactory::new("/nonexistent/solver".to_string(), vec![]);
        let mut planner =
            SatPlanner::new_with_sat_solver_factory(&problem, &grounding, strategy, Box::new(factory));
        assert!(planner.compute_plan(&SearchLimits::default()).is_err());
    }
}
