use super::{
    buffered_sat_solver::{BufferedSatSolver, DimacsInstanceRead},
    sat_solver::{SolvingListener, SolvingResult},
    Literal, SatSolver, SatSolverFactory,
};
use anyhow::{anyhow, Context, Result};
use log::error;
use std::{
    io::{Cursor, Read, Write},
    process::{Command, Stdio},
};

/// A SAT solver which execution is made by a system command.
///
/// The system command is composed by an executable program, and a potential list of CLI arguments.
///
/// The SAT solver must read from the standard input (if it does not by default, this may be possible with the right CLI arguments).
/// The input and output formats must follow the ones from the SAT competitions.
/// Since such programs are not incremental, the whole instance is given to the program at each call.
pub struct ExternalSatSolver {
    buffered_sat_solver: BufferedSatSolver,
}

impl ExternalSatSolver {
    /// Builds a new external SAT solver.
    ///
    /// The `program` argument is the path from a directory in execution path to the software to execute.
    /// The `options` parameter is the CLI options to provide to the software under execution.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use liftsat::sat::{ExternalSatSolver, Literal, SatSolver};
    /// let mut solver = ExternalSatSolver::new(
    ///     "/home/me/my_solver".to_string(),
    ///     vec!["-i".to_string(), "/dev/stdin".to_string()],
    /// );
    /// solver.add_clause(vec![Literal::from(-1), Literal::from(-2)]);
    /// solver.add_clause(vec![Literal::from(-1), Literal::from(2)]);
    /// let model = solver.solve().unwrap_model().unwrap();
    /// assert_eq!(Some(false), model.value_of(1));
    /// ```
    pub fn new(program: String, options: Vec<String>) -> Self {
        Self {
            buffered_sat_solver: BufferedSatSolver::new(Box::new(move |r| {
                match exec_solver(r, &program, &options) {
                    Ok(output) => output,
                    Err(e) => {
                        error!("{:#}", e);
                        Box::new(Cursor::new(Vec::new()))
                    }
                }
            })),
        }
    }
}

impl SatSolver for ExternalSatSolver {
    fn add_clause(&mut self, cl: Vec<Literal>) {
        self.buffered_sat_solver.add_clause(cl)
    }

    fn solve(&mut self) -> SolvingResult {
        self.buffered_sat_solver.solve()
    }

    fn solve_under_assumptions(&mut self, assumptions: &[Literal]) -> SolvingResult {
        self.buffered_sat_solver
            .solve_under_assumptions(assumptions)
    }

    fn n_vars(&self) -> usize {
        self.buffered_sat_solver.n_vars()
    }

    fn add_listener(&mut self, listener: Box<dyn SolvingListener>) {
        self.buffered_sat_solver.add_listener(listener);
    }

    fn reserve(&mut self, new_max_id: usize) {
        self.buffered_sat_solver.reserve(new_max_id)
    }
}

fn exec_solver(
    mut reader: DimacsInstanceRead,
    program: &str,
    options: &[String],
) -> Result<Box<dyn Read>> {
    let context = || format!(r#"while executing the external SAT solver "{}""#, program);
    let mut child = Command::new(program)
        .args(options)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .with_context(context)?;
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("cannot open the solver standard input"))
        .with_context(context)?;
    let writer = std::thread::spawn(move || -> std::io::Result<()> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        stdin.write_all(&buffer)?;
        stdin.flush()
    });
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("cannot open the solver standard output"))
        .with_context(context)?;
    let mut output = Vec::new();
    stdout.read_to_end(&mut output).with_context(context)?;
    child.wait().with_context(context)?;
    if let Ok(Err(e)) = writer.join() {
        // solvers may stop reading their input early
        log::debug!("error while writing the instance to the solver: {}", e);
    }
    Ok(Box::new(Cursor::new(output)))
}

/// The type of the functions building new solving listeners.
pub type SolvingListenerFactory = dyn Fn() -> Box<dyn SolvingListener>;

/// A factory building [ExternalSatSolver] instances.
///
/// Listeners built by the registered listener factories are attached to each new solver.
pub struct ExternalSatSolverFactory {
    program: String,
    options: Vec<String>,
    listener_factories: Vec<Box<SolvingListenerFactory>>,
}

impl ExternalSatSolverFactory {
    /// Builds a new factory given the program to execute and its options (see [ExternalSatSolver::new]).
    pub fn new(program: String, options: Vec<String>) -> Self {
        Self {
            program,
            options,
            listener_factories: vec![],
        }
    }

    /// Adds a listener factory.
    pub fn add_solver_listener(&mut self, listener_factory: Box<SolvingListenerFactory>) {
        self.listener_factories.push(listener_factory);
    }
}

impl SatSolverFactory for ExternalSatSolverFactory {
    fn new_solver(&self) -> Box<dyn SatSolver> {
        let mut solver = ExternalSatSolver::new(self.program.clone(), self.options.clone());
        self.listener_factories
            .iter()
            .for_each(|f| solver.add_listener((f)()));
        Box::new(solver)
    }
}
