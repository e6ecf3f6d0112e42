//! Command-line front end over [`Planner`](crate::core::Planner).

pub mod commands;
pub mod output;

use std::sync::Arc;

use chrono::Datelike;

use crate::calendar::from_iso;
use crate::config::ConfigManager;
use crate::core::{Planner, SystemClock};
use crate::errors::{PlannerError, Result};
use crate::schedule::Priority;
use crate::storage::JsonFileStore;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Agenda(Option<String>),
    Bills,
    Ledger(Option<i32>),
    Goals(Option<String>),
    GoalAdd { title: String, priority: Priority },
    TaskAdd { due: String, kind: String, title: String },
    Watch,
    Version,
    Help,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut iter = args.iter().map(String::as_str);
        let name = iter.next().unwrap_or("help");
        let rest: Vec<&str> = iter.collect();
        let command = match name {
            "agenda" => Command::Agenda(rest.first().map(|s| s.to_string())),
            "bills" => Command::Bills,
            "ledger" => Command::Ledger(
                rest.first()
                    .map(|year| {
                        year.parse::<i32>().map_err(|_| {
                            PlannerError::Validation(format!("`{year}` is not a year"))
                        })
                    })
                    .transpose()?,
            ),
            "goals" => Command::Goals(rest.first().map(|s| s.to_string())),
            "goal-add" => {
                let title = rest
                    .first()
                    .ok_or_else(|| PlannerError::Validation("goal-add needs a title".into()))?;
                let priority = match rest.get(1) {
                    Some(value) => value.parse()?,
                    None => Priority::default(),
                };
                Command::GoalAdd {
                    title: title.to_string(),
                    priority,
                }
            }
            "task-add" => {
                let [due, kind, title @ ..] = rest.as_slice() else {
                    return Err(PlannerError::Validation(
                        "task-add needs a date, a kind and a title".into(),
                    ));
                };
                if title.is_empty() {
                    return Err(PlannerError::Validation("task-add needs a title".into()));
                }
                Command::TaskAdd {
                    due: due.to_string(),
                    kind: kind.to_string(),
                    title: title.join(" "),
                }
            }
            "watch" => Command::Watch,
            "version" | "--version" | "-V" => Command::Version,
            "help" | "--help" | "-h" => Command::Help,
            other => {
                return Err(PlannerError::Validation(format!(
                    "unknown command `{other}` (try `help`)"
                )))
            }
        };
        Ok(command)
    }

    fn needs_planner(&self) -> bool {
        !matches!(self, Command::Version | Command::Help)
    }
}

/// Parses the process arguments and runs one command.
pub fn run_cli() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;
    if !command.needs_planner() {
        crate::init();
        return dispatch_static(&command);
    }
    run_command(open_planner()?, command)
}

fn dispatch_static(command: &Command) -> Result<()> {
    match command {
        Command::Version => commands::show_version(),
        _ => commands::show_help(),
    }
    Ok(())
}

/// Opens the planner over the JSON store under the configured base dir.
fn open_planner() -> Result<Planner> {
    let manager = ConfigManager::new()?;
    let config = manager.load()?;
    crate::init_with_filter(&config.log_filter);
    let store = JsonFileStore::new(config.store_dir(manager.base_dir()))?;
    Planner::open(Arc::new(store), Arc::new(SystemClock), config)
}

/// Runs `command` against an opened planner. `watch` keeps it until Ctrl+C.
pub fn run_command(mut planner: Planner, command: Command) -> Result<()> {
    let today = planner.today();
    match command {
        Command::Agenda(date) => {
            let date = date.as_deref().map(from_iso).transpose()?.unwrap_or(today);
            commands::show_agenda(&planner, date);
        }
        Command::Bills => commands::show_bills(&planner),
        Command::Ledger(year) => commands::show_ledger(&mut planner, year.unwrap_or(today.year()))?,
        Command::Goals(date) => {
            let date = date.as_deref().map(from_iso).transpose()?.unwrap_or(today);
            commands::show_goals(&planner, date);
        }
        Command::GoalAdd { title, priority } => commands::add_goal(&mut planner, &title, priority)?,
        Command::TaskAdd { due, kind, title } => {
            commands::add_task(&mut planner, from_iso(&due)?, &kind, &title)?
        }
        Command::Watch => commands::watch(planner)?,
        other @ (Command::Version | Command::Help) => dispatch_static(&other)?,
    }
    Ok(())
}
