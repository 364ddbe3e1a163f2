use super::{
    condition_constraints::encode_conditions, frame_axioms::encode_frame_axioms,
    interference_constraints::encode_interference, parameter_constraints::encode_parameter_selection,
    ConditionSupport, EligibilityIndex, EligibilityMode, EncodingStrategy, StepSemantics,
    VariableLayout,
};
use crate::{
    grounding::Grounding,
    model::{AtomId, LiftedProblem},
    sat::Literal,
};
use anyhow::{anyhow, Context, Result};
use log::info;
use std::{collections::HashSet, fmt::Display};

/// The clauses encoding the reachability of the goal, expressed over the variables of a single step block.
///
/// The formula is made of four groups:
/// * the initial clauses, fixing the value of every atom at step 0;
/// * the goal assumptions, expressed over the atoms of the final step;
/// * the universal clauses, which hold at every step;
/// * the transition clauses, linking a step to the next one (their effect literals are one block ahead).
///
/// The clauses for the step `k` are obtained by shifting the literals by `k * step_vars` (see [Literal::shifted]).
#[derive(Debug)]
pub struct SymbolicReachabilityFormula {
    initial: Vec<Vec<Literal>>,
    goal: Vec<Literal>,
    universal: Vec<Vec<Literal>>,
    transition: Vec<Vec<Literal>>,
    step_vars: usize,
}

fn shift_clauses(clauses: &[Vec<Literal>], offset: usize) -> impl Iterator<Item = Vec<Literal>> + '_ {
    clauses
        .iter()
        .map(move |cl| cl.iter().map(|l| l.shifted(offset)).collect())
}

impl SymbolicReachabilityFormula {
    /// Returns the number of variables of a step block.
    pub fn step_vars(&self) -> usize {
        self.step_vars
    }

    /// Returns the initial clauses.
    pub fn initial_clauses(&self) -> &[Vec<Literal>] {
        &self.initial
    }

    /// Returns the goal assumptions, for step 0.
    pub fn goal_assumptions(&self) -> &[Literal] {
        &self.goal
    }

    /// Returns the universal clauses, for step 0.
    pub fn universal_clauses(&self) -> &[Vec<Literal>] {
        &self.universal
    }

    /// Returns the transition clauses, between steps 0 and 1.
    pub fn transition_clauses(&self) -> &[Vec<Literal>] {
        &self.transition
    }

    /// Returns the goal assumptions for a given step.
    pub fn goal_assumptions_at(&self, step: usize) -> Vec<Literal> {
        let offset = step * self.step_vars;
        self.goal.iter().map(|l| l.shifted(offset)).collect()
    }

    /// Iterates over the universal clauses for a given step.
    pub fn universal_clauses_at(&self, step: usize) -> impl Iterator<Item = Vec<Literal>> + '_ {
        shift_clauses(&self.universal, step * self.step_vars)
    }

    /// Iterates over the transition clauses between a given step and the next one.
    pub fn transition_clauses_at(&self, step: usize) -> impl Iterator<Item = Vec<Literal>> + '_ {
        shift_clauses(&self.transition, step * self.step_vars)
    }
}

/// Statistics about a [LiftedEncoding].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EncodingStatistics {
    /// The number of variables of a step block.
    pub step_vars: usize,
    /// The number of `active` variables of a step block.
    pub n_active_vars: usize,
    /// The number of `selected` variables of a step block.
    pub n_selected_vars: usize,
    /// The number of `holds` variables of a step block.
    pub n_atom_vars: usize,
    /// The number of initial clauses.
    pub n_initial_clauses: usize,
    /// The number of goal assumptions.
    pub n_goal_literals: usize,
    /// The number of parameter selection clauses, in the universal clauses.
    pub n_parameter_clauses: usize,
    /// The number of precondition clauses, in the universal clauses.
    pub n_precondition_clauses: usize,
    /// The number of forbidden assignment clauses, in the universal clauses.
    pub n_forbidden_clauses: usize,
    /// The number of interference clauses, in the universal clauses.
    pub n_interference_clauses: usize,
    /// The number of effect clauses, in the transition clauses.
    pub n_effect_clauses: usize,
    /// The number of frame axiom clauses, in the transition clauses.
    pub n_frame_clauses: usize,
    /// The number of entries of the condition support index.
    pub n_support_entries: usize,
}

impl EncodingStatistics {
    /// Returns the number of universal clauses.
    pub fn n_universal_clauses(&self) -> usize {
        self.n_parameter_clauses
            + self.n_precondition_clauses
            + self.n_forbidden_clauses
            + self.n_interference_clauses
    }

    /// Returns the number of transition clauses.
    pub fn n_transition_clauses(&self) -> usize {
        self.n_effect_clauses + self.n_frame_clauses
    }
}

impl Display for EncodingStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} vars/step ({} active, {} selected, {} holds); {} initial clauses, {} goal literals; {} universal clauses ({} parameters, {} preconditions, {} forbidden, {} interference); {} transition clauses ({} effects, {} frame); {} support entries",
            self.step_vars,
            self.n_active_vars,
            self.n_selected_vars,
            self.n_atom_vars,
            self.n_initial_clauses,
            self.n_goal_literals,
            self.n_universal_clauses(),
            self.n_parameter_clauses,
            self.n_precondition_clauses,
            self.n_forbidden_clauses,
            self.n_interference_clauses,
            self.n_transition_clauses(),
            self.n_effect_clauses,
            self.n_frame_clauses,
            self.n_support_entries,
        )
    }
}

/// The result of a [LiftedSatEncoder]: the variable layout, the formula and the support index used to build it.
#[derive(Debug)]
pub struct LiftedEncoding {
    layout: VariableLayout,
    formula: SymbolicReachabilityFormula,
    support: ConditionSupport,
    statistics: EncodingStatistics,
}

impl LiftedEncoding {
    /// Returns the variable layout.
    pub fn layout(&self) -> &VariableLayout {
        &self.layout
    }

    /// Returns the formula.
    pub fn formula(&self) -> &SymbolicReachabilityFormula {
        &self.formula
    }

    /// Returns the condition support index.
    pub fn support(&self) -> &ConditionSupport {
        &self.support
    }

    /// Returns the statistics of the encoding.
    pub fn statistics(&self) -> &EncodingStatistics {
        &self.statistics
    }
}

/// Encodes a lifted problem into a [SymbolicReachabilityFormula].
///
/// The operators are never fully grounded: each step block holds one `active` variable per operator
/// and one `selected` variable per (operator, parameter position, eligible constant).
/// The atoms of the universe computed by the grounding get a `holds` variable;
/// parameter bindings producing an atom out of this universe are forbidden.
///
/// # Example
///
/// ```
/// # use liftsat::encodings::{EligibilityMode, EncodingStrategy, LiftedSatEncoder, StepSemantics};
/// # use liftsat::grounding::{Grounder, RelaxedGrounder};
/// # use liftsat::io::ProblemReader;
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
/// let strategy = EncodingStrategy::new(StepSemantics::Parallel, EligibilityMode::Lifted);
/// let encoding = LiftedSatEncoder::new(&problem, &grounding, strategy).encode().unwrap();
/// assert_eq!(1 + 4 + 2, encoding.formula().step_vars());
/// ```
pub struct LiftedSatEncoder<'a> {
    problem: &'a LiftedProblem,
    grounding: &'a Grounding,
    strategy: EncodingStrategy,
}

impl<'a> LiftedSatEncoder<'a> {
    /// Builds a new encoder.
    pub fn new(problem: &'a LiftedProblem, grounding: &'a Grounding, strategy: EncodingStrategy) -> Self {
        Self {
            problem,
            grounding,
            strategy,
        }
    }

    /// Computes the encoding.
    pub fn encode(&self) -> Result<LiftedEncoding> {
        let eligibility = match self.strategy.eligibility() {
            EligibilityMode::Lifted => EligibilityIndex::lifted(self.problem),
            EligibilityMode::Grounded => EligibilityIndex::grounded(self.problem, self.grounding),
        };
        let layout = VariableLayout::new(
            eligibility,
            self.problem.n_operators(),
            self.grounding.n_atoms(),
        );
        let mut statistics = EncodingStatistics {
            step_vars: layout.step_vars(),
            n_active_vars: layout.n_operators(),
            n_selected_vars: layout.n_selected_vars(),
            n_atom_vars: layout.n_atoms(),
            ..Default::default()
        };
        let initial = self.encode_initial_state(&layout);
        statistics.n_initial_clauses = initial.len();
        let goal = self.encode_goal(&layout).context("while encoding the goal")?;
        statistics.n_goal_literals = goal.len();
        let mut universal = Vec::new();
        let mut transition = Vec::new();
        encode_parameter_selection(&layout, self.strategy.semantics(), &mut universal);
        statistics.n_parameter_clauses = universal.len();
        let mut support = ConditionSupport::default();
        let condition_counts = encode_conditions(
            self.problem,
            self.grounding,
            &layout,
            &mut support,
            &mut universal,
            &mut transition,
        )?;
        statistics.n_precondition_clauses = condition_counts.n_precondition_clauses;
        statistics.n_forbidden_clauses = condition_counts.n_forbidden_clauses;
        statistics.n_effect_clauses = condition_counts.n_effect_clauses;
        if self.strategy.semantics() == StepSemantics::Parallel {
            statistics.n_interference_clauses =
                encode_interference(&layout, &support, &mut universal)?;
        }
        statistics.n_frame_clauses = encode_frame_axioms(&layout, &support, &mut transition)?;
        statistics.n_support_entries = support.n_entries();
        info!("encoding ({}): {}", self.strategy, statistics);
        Ok(LiftedEncoding {
            formula: SymbolicReachabilityFormula {
                initial,
                goal,
                universal,
                transition,
                step_vars: layout.step_vars(),
            },
            layout,
            support,
            statistics,
        })
    }

    fn encode_initial_state(&self, layout: &VariableLayout) -> Vec<Vec<Literal>> {
        let init = self.problem.init().iter().collect::<HashSet<_>>();
        self.grounding
            .atoms()
            .iter()
            .enumerate()
            .map(|(i, atom)| {
                let holds = layout.holds(AtomId::new(i));
                if init.contains(atom) {
                    vec![holds]
                } else {
                    vec![holds.negate()]
                }
            })
            .collect()
    }

    fn encode_goal(&self, layout: &VariableLayout) -> Result<Vec<Literal>> {
        self.problem
            .goal()
            .iter()
            .map(|c| {
                let atom = c
                    .to_ground_atom()
                    .ok_or_else(|| anyhow!("goal conditions must be ground"))?;
                let id = self.grounding.atom_id(&atom).ok_or_else(|| {
                    anyhow!(
                        "goal atom {} is not part of the atom universe",
                        self.problem.atom_to_string(&atom)
                    )
                })?;
                Ok(if c.is_negated() {
                    layout.holds(id).negate()
                } else {
                    layout.holds(id)
                })
            })
            .collect()
    }
}
