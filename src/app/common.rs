use super::{
    app_helper::AppHelper, command::Command, AuthorsCommand, CheckCommand, EncodeToSatCommand,
    SolveCommand,
};
use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches};
use liftsat::{
    encodings::{EligibilityMode, EncodingStrategy, StepSemantics},
    grounding::{Grounder, Grounding, RelaxedGrounder},
    io::ProblemReader,
    model::LiftedProblem,
    sat::{
        DefaultSatSolverFactory, ExternalSatSolverFactory, SatSolverFactory, SolvingListener,
        SolvingResult,
    },
};
use log::{info, warn};
use std::{
    fs::{self, File},
    io::BufReader,
    path::PathBuf,
};

pub(crate) fn create_app_helper() -> AppHelper<'static> {
    let app_name = option_env!("CARGO_PKG_NAME").unwrap_or("unknown app name");
    let app_version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown version");
    let authors = option_env!("CARGO_PKG_AUTHORS").unwrap_or("unknown authors");
    let mut app = AppHelper::new(
        app_name,
        app_version,
        authors,
        "Liftsat, a SAT-based planner working on lifted operators.",
    );
    let commands: Vec<Box<dyn Command>> = vec![
        Box::new(AuthorsCommand::new(app_name, app_version, authors)),
        Box::new(CheckCommand::new()),
        Box::new(EncodeToSatCommand::new()),
        Box::new(SolveCommand::new()),
    ];
    for c in commands {
        app.add_command(c);
    }
    app
}

pub(crate) const ARG_INPUT: &str = "INPUT";

pub(crate) fn input_args() -> Arg<'static, 'static> {
    Arg::with_name(ARG_INPUT)
        .short("f")
        .empty_values(false)
        .multiple(false)
        .help("the input file that contains the planning problem")
        .required(true)
}

const ARG_STRATEGY: &str = "STRATEGY";
const ARG_ELIGIBILITY: &str = "ELIGIBILITY";

pub(crate) fn strategy_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name(ARG_STRATEGY)
            .long("strategy")
            .empty_values(false)
            .multiple(false)
            .possible_values(&["sequential", "parallel"])
            .default_value("parallel")
            .help("the step semantics (one action per step, or non-interfering actions in parallel)")
            .required(false),
        Arg::with_name(ARG_ELIGIBILITY)
            .long("eligibility")
            .empty_values(false)
            .multiple(false)
            .possible_values(&["lifted", "grounded"])
            .default_value("lifted")
            .help("the source of the constants a parameter may take (types only, or reachable actions)")
            .required(false),
    ]
}

pub(crate) fn read_strategy(arg_matches: &ArgMatches<'_>) -> Result<EncodingStrategy> {
    let semantics = StepSemantics::try_from(arg_matches.value_of(ARG_STRATEGY).unwrap_or_default())?;
    let eligibility =
        EligibilityMode::try_from(arg_matches.value_of(ARG_ELIGIBILITY).unwrap_or_default())?;
    let strategy = EncodingStrategy::new(semantics, eligibility);
    info!("using the {} encoding strategy", strategy);
    Ok(strategy)
}

pub(crate) fn input_file<'a>(arg_matches: &'a ArgMatches<'a>) -> Result<&'a str> {
    arg_matches
        .value_of(ARG_INPUT)
        .ok_or_else(|| anyhow!("missing input file"))
}

/// Reads and validates the problem contained in a file.
pub(crate) fn read_problem(file_path: &str) -> Result<LiftedProblem> {
    let canonicalized = canonicalize_file_path(file_path)?;
    info!("reading input file {:?}", canonicalized);
    let mut file_reader = BufReader::new(
        File::open(&canonicalized)
            .with_context(|| format!(r#"while opening file "{}""#, file_path))?,
    );
    let mut reader = ProblemReader::default();
    reader.add_warning_handler(Box::new(|line, msg| warn!("at line {}: {}", line, msg)));
    let problem = reader.read(&mut file_reader)?;
    problem.validate()?;
    info!(
        "the problem has {} constant(s), {} predicate(s), {} operator(s), {} initial atom(s) and {} goal condition(s)",
        problem.n_constants(),
        problem.n_predicates(),
        problem.n_operators(),
        problem.init().len(),
        problem.goal().len(),
    );
    Ok(problem)
}

pub(crate) fn ground_problem(problem: &LiftedProblem) -> Result<Grounding> {
    let grounding = RelaxedGrounder.ground(problem)?;
    info!(
        "relaxed reachability found {} atom(s) and {} action(s)",
        grounding.n_atoms(),
        grounding.n_actions()
    );
    Ok(grounding)
}

/// Canonicalize a path given by the user.
pub(crate) fn canonicalize_file_path(file_path: &str) -> Result<PathBuf> {
    fs::canonicalize(PathBuf::from(file_path))
        .with_context(|| format!(r#"while opening file "{}""#, file_path))
}

const ARG_EXTERNAL_SAT_SOLVER: &str = "EXTERNAL_SAT_SOLVER";
const ARG_EXTERNAL_SAT_SOLVER_OPTIONS: &str = "EXTERNAL_SAT_SOLVER_OPTIONS";

pub(crate) fn external_sat_solver_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name(ARG_EXTERNAL_SAT_SOLVER)
            .long("external-sat-solver")
            .empty_values(false)
            .multiple(false)
            .help("a path to an external SAT solver to replace the embedded one")
            .required(false),
        Arg::with_name(ARG_EXTERNAL_SAT_SOLVER_OPTIONS)
            .long("external-sat-solver-opt")
            .requires(ARG_EXTERNAL_SAT_SOLVER)
            .empty_values(false)
            .multiple(true)
            .number_of_values(1)
            .allow_hyphen_values(true)
            .help("a option to give to the external SAT solver")
            .required(false),
    ]
}

pub(crate) fn create_sat_solver_factory(
    arg_matches: &ArgMatches<'_>,
) -> Result<Box<dyn SatSolverFactory>> {
    let external_solver = arg_matches.value_of(ARG_EXTERNAL_SAT_SOLVER);
    let external_solver_options = arg_matches
        .values_of(ARG_EXTERNAL_SAT_SOLVER_OPTIONS)
        .map(|v| v.map(|o| o.to_string()).collect::<Vec<String>>())
        .unwrap_or_default();
    if let Some(s) = external_solver {
        let path = canonicalize_file_path(s)?;
        info!("using {:?} as SAT solver", path);
        let mut factory =
            ExternalSatSolverFactory::new(path.to_string_lossy().to_string(), external_solver_options);
        factory.add_solver_listener(Box::new(|| {
            Box::<SatSolvingLogger>::default() as Box<dyn SolvingListener>
        }));
        Ok(Box::new(factory))
    } else {
        info!("using the default SAT solver");
        Ok(Box::new(DefaultSatSolverFactory))
    }
}

#[derive(Default)]
struct SatSolvingLogger;

impl SolvingListener for SatSolvingLogger {
    fn solving_start(&self, n_vars: usize, n_clauses: usize) {
        info!(
            "launching SAT solver on an instance with {} variables and {} clauses",
            n_vars, n_clauses
        );
    }

    fn solving_end(&self, result: &SolvingResult) {
        let r = match result {
            SolvingResult::Satisfiable(_) => "SAT",
            SolvingResult::Unsatisfiable => "UNSAT",
            SolvingResult::Unknown => "UNKNOWN",
        };
        info!("SAT solver ended with result {}", r);
    }
}
