use super::{cli_manager, command::Command, common};
use anyhow::{anyhow, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use liftsat::{
    encodings::LiftedSatEncoder,
    sat::{BufferedSatSolver, SatSolver, SolvingResult},
    solvers::IncrementalUnroller,
};
use log::info;
use std::{cell::RefCell, fs, io::Read, rc::Rc};

const CMD_NAME: &str = "encode-to-sat";

const ARG_STEPS: &str = "STEPS";
const ARG_OUT: &str = "OUT";

pub(crate) struct EncodeToSatCommand;

impl EncodeToSatCommand {
    pub(crate) fn new() -> Self {
        EncodeToSatCommand
    }
}

impl<'a> Command<'a> for EncodeToSatCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Writes the DIMACS formula stating a plan exists with a given number of steps")
            .setting(AppSettings::DisableVersion)
            .arg(common::input_args())
            .args(&common::strategy_args())
            .arg(
                Arg::with_name(ARG_STEPS)
                    .long("steps")
                    .empty_values(false)
                    .multiple(false)
                    .help("the number of steps of the plan")
                    .required(true),
            )
            .arg(
                Arg::with_name(ARG_OUT)
                    .short("o")
                    .long("output")
                    .empty_values(false)
                    .multiple(false)
                    .help("the output file for the encoding (defaults to the standard output)")
                    .required(false),
            )
            .arg(cli_manager::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let str_steps = arg_matches
            .value_of(ARG_STEPS)
            .ok_or_else(|| anyhow!("missing number of steps"))?;
        let steps = str_steps
            .parse::<usize>()
            .with_context(|| format!(r#"while parsing the number of steps "{}""#, str_steps))?;
        let problem = common::read_problem(common::input_file(arg_matches)?)?;
        let grounding = common::ground_problem(&problem)?;
        let strategy = common::read_strategy(arg_matches)?;
        let encoding = LiftedSatEncoder::new(&problem, &grounding, strategy).encode()?;
        let instance = Rc::new(RefCell::new(Vec::new()));
        let mut solver = capturing_solver(Rc::clone(&instance));
        solver.add_comment(&format!("strategy {}", strategy));
        solver.add_comment(&format!("steps {}", steps));
        solver.add_comment(&encoding.statistics().to_string());
        let mut unroller = IncrementalUnroller::new(encoding.formula(), &mut solver);
        for _ in 0..steps {
            unroller.extend(&mut solver);
        }
        let assumptions = unroller.goal_assumptions();
        if let SolvingResult::Unknown = solver.solve_under_assumptions(&assumptions) {
            return Err(anyhow!("the formula could not be written"));
        }
        let instance_content = String::from_utf8(instance.take())
            .context("while converting the formula to a string")?;
        info!(
            "the formula for {} step(s) has {} variables",
            steps,
            solver.n_vars()
        );
        match arg_matches.value_of(ARG_OUT) {
            Some(output_file) => fs::write(output_file, instance_content)
                .with_context(|| format!(r#"while writing file "{}""#, output_file)),
            None => {
                print!("{}", instance_content);
                Ok(())
            }
        }
    }
}

fn capturing_solver(instance: Rc<RefCell<Vec<u8>>>) -> BufferedSatSolver {
    BufferedSatSolver::new(Box::new(move |mut r| {
        match r.read_to_end(&mut instance.borrow_mut()) {
            Ok(_) => Box::new("s UNSATISFIABLE".as_bytes()),
            Err(_) => Box::new("".as_bytes()),
        }
    }))
}
