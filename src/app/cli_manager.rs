use super::{app_helper, command::Command, writable_string::WritableString};
use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg};
use log::info;
use std::{ffi::OsString, str::FromStr};
use sysinfo::System;

/// Handles the set of commands and dispatches the CLI arguments to the selected one.
pub(crate) struct CliManager<'a> {
    app_name: &'a str,
    version: &'a str,
    author: &'a str,
    about: &'a str,
    commands: Vec<Box<dyn Command<'a>>>,
}

const ARG_LOGGING_LEVEL: &str = "LOGGING_LEVEL";

pub(crate) fn logging_level_cli_arg<'a>() -> Arg<'a, 'a> {
    Arg::with_name(ARG_LOGGING_LEVEL)
        .long("logging-level")
        .multiple(false)
        .default_value("info")
        .possible_values(&["trace", "debug", "info", "warn", "error", "off"])
        .help("set the minimal logging level")
}

impl<'a> CliManager<'a> {
    pub(crate) fn new(app_name: &'a str, version: &'a str, author: &'a str, about: &'a str) -> Self {
        CliManager {
            app_name,
            version,
            author,
            about,
            commands: vec![],
        }
    }

    pub(crate) fn add_command(&mut self, command: Box<dyn Command<'a>>) {
        self.commands.push(command);
    }

    pub(crate) fn parse_cli<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<T> = args.into_iter().collect();
        let mut app = App::new(self.app_name)
            .global_setting(AppSettings::DisableVersion)
            .global_setting(AppSettings::VersionlessSubcommands)
            .setting(AppSettings::NeedsSubcommandHelp)
            .setting(AppSettings::SubcommandRequired)
            .version(self.version)
            .author(self.author)
            .about(self.about);
        for c in self.commands.iter() {
            app = app.subcommand(c.clap_subcommand());
        }
        match app.clone().get_matches_from_safe(args.clone()) {
            Ok(matches) => {
                let (name, sub_matches) = matches.subcommand();
                let command = self.commands.iter().find(|c| c.name() == name);
                match (command, sub_matches) {
                    (Some(c), Some(sub_matches)) => {
                        let log_level = sub_matches
                            .value_of(ARG_LOGGING_LEVEL)
                            .and_then(|l| log::LevelFilter::from_str(l).ok())
                            .unwrap_or(log::LevelFilter::Info);
                        app_helper::init_logger_with_level(log_level);
                        info!("{} {}", self.app_name, self.version);
                        sys_info();
                        c.execute(sub_matches)
                    }
                    _ => Err(anyhow!("no command named {:?}", name)),
                }
            }
            Err(clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            }) => {
                app_helper::init_logger();
                self.print_help(&mut app, args.as_slice())
            }
            Err(e) => {
                app_helper::init_logger();
                info!("{} {}", self.app_name, self.version);
                Err(anyhow!("{}", e))
            }
        }
    }

    fn print_help<T>(&self, app: &mut App, args: &[T]) -> Result<()>
    where
        T: Into<OsString> + Clone,
    {
        const HELP_STRINGS: [&str; 3] = ["help", "-h", "--help"];
        let str_args = args
            .iter()
            .skip(1)
            .map(|a| a.clone().into().to_string_lossy().to_string())
            .collect::<Vec<String>>();
        let subcommand_name = match str_args.as_slice() {
            [first, ..] if !HELP_STRINGS.contains(&first.as_str()) => Some(first.as_str()),
            [_, second, ..] => Some(second.as_str()),
            _ => None,
        };
        let mut message = WritableString::default();
        match subcommand_name.and_then(|n| self.commands.iter().find(|c| c.name() == n)) {
            Some(c) => c.clap_subcommand().write_long_help(&mut message)?,
            None => app.write_long_help(&mut message)?,
        }
        message.to_string().split('\n').for_each(|s| info!("{}", s));
        info!("");
        Ok(())
    }
}

fn sys_info() {
    info!("----------------------------------------");
    let sys = System::new_all();
    let unknown = || "[unknown]".to_string();
    info!("running on {}", System::host_name().unwrap_or_else(unknown));
    info!(
        "OS is {} {} with kernel {}",
        System::name().unwrap_or_else(unknown),
        System::os_version().unwrap_or_else(unknown),
        System::kernel_version().unwrap_or_else(unknown)
    );
    let mut cpu_kinds: Vec<&str> = sys.cpus().iter().map(|p| p.brand()).collect();
    cpu_kinds.sort_unstable();
    cpu_kinds.dedup();
    info!(
        "physical core count: {} {:?}",
        sys.physical_core_count()
            .map(|n| n.to_string())
            .unwrap_or_else(unknown),
        cpu_kinds
    );
    info!("total memory: {} KB", sys.total_memory() / 1024);
    info!("----------------------------------------");
}
