use anyhow::Result;
use clap::{App, ArgMatches};

/// A subcommand of the planner application.
///
/// Each command declares its own clap subcommand and runs itself from the matched arguments.
/// Command names must be unique.
pub(crate) trait Command<'a> {
    /// Returns the name of the command, as typed on the command line.
    fn name(&self) -> &str;

    /// Returns the clap description of the command arguments.
    fn clap_subcommand(&self) -> App<'a, 'a>;

    /// Executes the command.
    ///
    /// An `Err` makes the application exit with a failure status.
    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()>;
}
