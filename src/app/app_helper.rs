use super::{cli_manager::CliManager, command::Command};
use anyhow::Result;
use log::{error, info};
use std::{ffi::OsString, sync::Once, time::Instant};

static LOGGER_INIT: Once = Once::new();

/// The entry point of the planner application.
///
/// Commands are registered with [add_command](Self::add_command), then [launch_app](Self::launch_app) parses the CLI arguments,
/// initializes the logger and runs the selected command.
/// When a command fails, the whole error chain is logged and the process exits with status 1.
pub(crate) struct AppHelper<'a> {
    cli_manager: CliManager<'a>,
}

impl<'a> AppHelper<'a> {
    pub(crate) fn new(app_name: &'a str, version: &'a str, author: &'a str, about: &'a str) -> Self {
        AppHelper {
            cli_manager: CliManager::new(app_name, version, author, about),
        }
    }

    pub(crate) fn add_command(&mut self, command: Box<dyn Command<'a>>) {
        self.cli_manager.add_command(command);
    }

    /// Runs the app on the process arguments.
    pub(crate) fn launch_app(self) {
        self.launch_app_with_args(std::env::args_os())
    }

    pub(crate) fn launch_app_with_args<I, T>(self, args: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        if let Err(e) = self.execute_app(args) {
            error!("an error occurred: {}", e);
            e.chain()
                .skip(1)
                .for_each(|err| error!("caused by: {}", err));
            std::process::exit(1);
        }
    }

    fn execute_app<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let start_time = Instant::now();
        let result = self.cli_manager.parse_cli(args);
        if result.is_ok() {
            info!("exiting successfully after {:?}", start_time.elapsed());
        }
        result
    }
}

pub(crate) fn init_logger() {
    init_logger_with_level(log::LevelFilter::Info)
}

/// Installs the colored logger on standard error.
///
/// Only the first call has an effect.
pub(crate) fn init_logger_with_level(level: log::LevelFilter) {
    LOGGER_INIT.call_once(|| {
        let colors = fern::colors::ColoredLevelConfig::new().info(fern::colors::Color::Cyan);
        fern::Dispatch::new()
            .format(move |out, message, record| {
                out.finish(format_args!(
                    "[{:5}] {} {}",
                    colors.color(record.level()),
                    chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                    message
                ))
            })
            .level(level)
            .chain(std::io::stderr())
            .apply()
            .unwrap_or(());
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{App, Arg, ArgMatches, SubCommand};

    struct FailingCommand;

    impl<'a> Command<'a> for FailingCommand {
        fn name(&self) -> &str {
            "run"
        }

        fn clap_subcommand(&self) -> App<'a, 'a> {
            SubCommand::with_name("run").arg(Arg::with_name("fail").long("fail"))
        }

        fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
            if arg_matches.is_present("fail") {
                Err(anyhow::anyhow!("asked to fail"))
            } else {
                Ok(())
            }
        }
    }

    fn helper() -> AppHelper<'static> {
        init_logger();
        let mut h = AppHelper::new("liftsat", "0.0.0", "authors", "about");
        h.add_command(Box::new(FailingCommand));
        h
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(helper().execute_app(vec!["liftsat"]).is_err());
    }

    #[test]
    fn test_command_ok() {
        helper().execute_app(vec!["liftsat", "run"]).unwrap();
    }

    #[test]
    fn test_command_err() {
        let err = helper()
            .execute_app(vec!["liftsat", "run", "--fail"])
            .unwrap_err();
        assert_eq!("asked to fail", err.to_string());
    }
}
