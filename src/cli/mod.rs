//! Command-line interface for habitviz
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::calendar;
use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::output::OutputOptions;
use crate::session::SessionOptions;

mod days;
mod grid;
mod init;
mod show;
mod week;

/// habitviz - habit heat-map
///
/// Calendar heat-map of completed tasks, built from a Habitica history
/// export and a local archive of the same format.
#[derive(Parser, Debug)]
#[command(name = "habitviz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ./.habitviz.toml, then the user config dir)
    #[arg(long, global = true, env = "HABITVIZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Render as of this day (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// Skip the remote export; use the local archive only
    #[arg(long, global = true)]
    pub offline: bool,

    /// Habitica user id for the remote export
    #[arg(long, global = true, env = "HABITVIZ_API_USER", hide_env_values = true)]
    pub api_user: Option<String>,

    /// Habitica API key for the remote export
    #[arg(long, global = true, env = "HABITVIZ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive heat-map in the terminal
    Show {
        /// Number of weeks to show
        #[arg(long)]
        weeks: Option<u32>,
    },

    /// Print the heat-map (text) or its cells (--json)
    Grid {
        /// Number of weeks to show
        #[arg(long)]
        weeks: Option<u32>,
    },

    /// List days with completed tasks, newest first
    Days {
        /// Maximum days to list
        #[arg(long, default_value = "14")]
        limit: usize,
    },

    /// Show the ISO week number and keys of a date
    Week {
        /// Date (YYYY-MM-DD); defaults to today
        date: Option<String>,
    },

    /// Write a default config file
    Init {
        /// Where to write it (defaults to ./.habitviz.toml)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        match &self.command {
            Commands::Init { path, force } => init::run(init::InitOptions {
                path: path.clone(),
                force: *force,
                output,
            }),
            Commands::Week { date } => {
                let date = match date {
                    Some(raw) => parse_date_arg(raw)?,
                    None => self.resolve_today()?,
                };
                week::run(date, output)
            }
            Commands::Grid { weeks } => {
                let session = self.session_options(*weeks)?;
                grid::run(session, output)
            }
            Commands::Days { limit } => {
                let session = self.session_options(None)?;
                days::run(session, *limit, output)
            }
            Commands::Show { weeks } => {
                let session = self.session_options(*weeks)?;
                show::run(session)
            }
        }
    }

    fn resolve_today(&self) -> Result<NaiveDate> {
        match self.today.as_deref() {
            Some(raw) => parse_date_arg(raw),
            None => Ok(chrono::Local::now().date_naive()),
        }
    }

    fn session_options(&self, weeks: Option<u32>) -> Result<SessionOptions> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let config = Config::resolve(self.config.as_deref(), &cwd)?;
        let weeks = weeks.unwrap_or(config.grid.weeks);
        config::validate_weeks(weeks, "--weeks").map_err(|err| match err {
            Error::InvalidConfig(message) => Error::InvalidArgument(message),
            other => other,
        })?;
        let credentials = config
            .credentials
            .clone()
            .overridden(self.api_user.as_deref(), self.api_key.as_deref());

        Ok(SessionOptions {
            credentials,
            offline: self.offline,
            today: self.resolve_today()?,
            weeks,
            config,
        })
    }
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.len() != 10 {
        return Err(Error::InvalidArgument(format!(
            "invalid date '{raw}': expected YYYY-MM-DD"
        )));
    }
    calendar::parse_day(trimmed)
        .ok_or_else(|| Error::InvalidArgument(format!("invalid date '{raw}': expected YYYY-MM-DD")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_date_arguments() {
        assert_eq!(
            parse_date_arg("2024-06-12").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
        );
        assert!(parse_date_arg("2024-06-12T10:00").is_err());
        assert!(parse_date_arg("12/06/2024").is_err());
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
