//! Command line handling.

use std::{fmt, path::PathBuf, str::FromStr};

use crate::{Result, StatsError};

pub const USAGE: &str = "\
usage: brc-stats [-v VERSION | -s STRATEGY] <measurements-file | ->

options:
  -v, --version N      1 = copy, 2 = general, 3 = custom, 4 = fixed (default 1)
  -s, --strategy NAME  copy | general | custom | fixed
  -h, --help           print this message

Log verbosity is read from RUST_LOG (default: info, written to stderr).";

/// Which decoder and table update path a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Standard float parser, reducer copied out and stored back per line.
    #[default]
    Copy,
    /// Standard float parser, reducer updated in place.
    General,
    /// Hand-rolled float decoder, reducer updated in place.
    Custom,
    /// Tenths as integers, reducer updated in place.
    Fixed,
}

impl Strategy {
    pub fn from_version(version: u32) -> Option<Strategy> {
        match version {
            1 => Some(Strategy::Copy),
            2 => Some(Strategy::General),
            3 => Some(Strategy::Custom),
            4 => Some(Strategy::Fixed),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Copy => "copy",
            Strategy::General => "general",
            Strategy::Custom => "custom",
            Strategy::Fixed => "fixed",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Strategy> {
        match s {
            "copy" => Ok(Strategy::Copy),
            "general" => Ok(Strategy::General),
            "custom" => Ok(Strategy::Custom),
            "fixed" => Ok(Strategy::Fixed),
            _ => Err(StatsError::InvalidArgument(format!("unknown strategy '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    Path(PathBuf),
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Stdin => f.write_str("<stdin>"),
            Input::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: Input,
    pub strategy: Strategy,
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Config),
    Help,
}

impl Config {
    /// Parses arguments, not including the program name.
    pub fn from_args<I, S>(args: I) -> Result<Command>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let mut strategy = None;
        let mut input = None;
        let mut positional_only = false;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" if !positional_only => return Ok(Command::Help),
                "-v" | "--version" if !positional_only => {
                    let value = flag_value(&arg, args.next())?;
                    let selected = value
                        .parse()
                        .ok()
                        .and_then(Strategy::from_version)
                        .ok_or_else(|| {
                            StatsError::InvalidArgument(format!("invalid version '{value}'"))
                        })?;
                    set_strategy(&mut strategy, selected)?;
                }
                "-s" | "--strategy" if !positional_only => {
                    let selected = flag_value(&arg, args.next())?.parse()?;
                    set_strategy(&mut strategy, selected)?;
                }
                "--" if !positional_only => positional_only = true,
                flag if flag.starts_with('-') && flag != "-" && !positional_only => {
                    return Err(StatsError::InvalidArgument(format!("unknown option '{flag}'")));
                }
                _ => {
                    if input.is_some() {
                        return Err(StatsError::InvalidArgument(format!(
                            "unexpected argument '{arg}'"
                        )));
                    }
                    input = Some(if arg == "-" {
                        Input::Stdin
                    } else {
                        Input::Path(PathBuf::from(arg))
                    });
                }
            }
        }
        let input = input.ok_or_else(|| {
            StatsError::InvalidArgument("missing measurements file".to_string())
        })?;
        Ok(Command::Run(Config {
            input,
            strategy: strategy.unwrap_or_default(),
        }))
    }
}

fn flag_value(flag: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| StatsError::InvalidArgument(format!("{flag} needs a value")))
}

fn set_strategy(slot: &mut Option<Strategy>, strategy: Strategy) -> Result<()> {
    match slot {
        Some(existing) if *existing != strategy => Err(StatsError::InvalidArgument(format!(
            "conflicting strategies '{existing}' and '{strategy}'"
        ))),
        _ => {
            *slot = Some(strategy);
            Ok(())
        }
    }
}
