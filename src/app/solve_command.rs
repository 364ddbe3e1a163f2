use super::{cli_manager, command::Command, common};
use anyhow::{Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use liftsat::{
    io::PlanWriter,
    solvers::{check_plan, PlanComputer, PlanningResult, SatPlanner, SearchLimits},
};
use log::{info, warn};
use std::{
    str::FromStr,
    time::{Duration, Instant},
};

const CMD_NAME: &str = "solve";

const ARG_MAX_STEPS: &str = "MAX_STEPS";
const ARG_MAX_SEARCH_TIME: &str = "MAX_SEARCH_TIME";
const ARG_MAX_TOTAL_TIME: &str = "MAX_TOTAL_TIME";
const ARG_CHECK_PLAN: &str = "CHECK_PLAN";

pub(crate) struct SolveCommand;

impl SolveCommand {
    pub(crate) fn new() -> Self {
        SolveCommand
    }
}

impl<'a> Command<'a> for SolveCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Computes a plan for a planning problem")
            .setting(AppSettings::DisableVersion)
            .arg(common::input_args())
            .args(&common::strategy_args())
            .arg(
                Arg::with_name(ARG_MAX_STEPS)
                    .long("max-steps")
                    .empty_values(false)
                    .multiple(false)
                    .help("the maximal number of steps of the plan; with no step or time limit, the search never ends on unsolvable problems")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_MAX_SEARCH_TIME)
                    .long("max-search-time")
                    .empty_values(false)
                    .multiple(false)
                    .help("the maximal time spent in the search, in seconds")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_MAX_TOTAL_TIME)
                    .long("max-total-time")
                    .empty_values(false)
                    .multiple(false)
                    .help("the maximal time spent by the command, in seconds")
                    .required(false),
            )
            .arg(
                Arg::with_name(ARG_CHECK_PLAN)
                    .long("check-plan")
                    .takes_value(false)
                    .help("simulates the plan found to check its validity")
                    .required(false),
            )
            .args(&common::external_sat_solver_args())
            .arg(cli_manager::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let total_start = Instant::now();
        let problem = common::read_problem(common::input_file(arg_matches)?)?;
        let grounding = common::ground_problem(&problem)?;
        let strategy = common::read_strategy(arg_matches)?;
        let limits = read_limits(arg_matches, total_start)?;
        let mut planner = SatPlanner::new_with_sat_solver_factory(
            &problem,
            &grounding,
            strategy,
            common::create_sat_solver_factory(arg_matches)?,
        );
        let result = planner.compute_plan(&limits)?;
        match &result {
            PlanningResult::Plan(plan) if arg_matches.is_present(ARG_CHECK_PLAN) => {
                check_plan(&problem, plan).context("while checking the plan")?;
                info!("the plan is valid");
            }
            PlanningResult::Plan(_) => {}
            PlanningResult::BoundReached { steps } => {
                info!("no plan found with up to {} step(s)", steps)
            }
        }
        PlanWriter.write_result(&mut std::io::stdout(), &result)
    }
}

fn read_limits(arg_matches: &ArgMatches<'_>, total_start: Instant) -> Result<SearchLimits> {
    let mut limits = SearchLimits::default().with_total_start(total_start);
    if [ARG_MAX_STEPS, ARG_MAX_SEARCH_TIME, ARG_MAX_TOTAL_TIME]
        .iter()
        .all(|a| !arg_matches.is_present(a))
    {
        warn!("no step or time limit given; the search will not end if the problem is unsolvable");
    }
    if let Some(n) = parse_arg::<usize>(arg_matches, ARG_MAX_STEPS)? {
        limits = limits.with_max_iterations(n);
    }
    if let Some(s) = parse_arg::<f64>(arg_matches, ARG_MAX_SEARCH_TIME)? {
        limits = limits.with_max_search_time(seconds(s, "--max-search-time")?);
    }
    if let Some(s) = parse_arg::<f64>(arg_matches, ARG_MAX_TOTAL_TIME)? {
        limits = limits.with_max_total_time(seconds(s, "--max-total-time")?);
    }
    Ok(limits)
}

fn parse_arg<T>(arg_matches: &ArgMatches<'_>, arg_name: &str) -> Result<Option<T>>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    arg_matches
        .value_of(arg_name)
        .map(|v| {
            v.parse::<T>()
                .with_context(|| format!(r#"while parsing the value "{}""#, v))
        })
        .transpose()
}

fn seconds(s: f64, arg: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(s).with_context(|| format!("invalid duration for {}: {}", arg, s))
}
