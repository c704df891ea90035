//! How the options for svcmon are set up: arguments merged over the
//! config file, with built-in role tables filling in the defaults.

pub mod args;
pub mod config;
mod error;
mod roles;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use hashbrown::HashMap;
use indoc::indoc;

pub use self::error::{OptionError, OptionResult};
use self::{
    args::SvcmonArgs,
    config::{Config, StringOrNum},
};
use crate::tracking::TrackerConfig;

/// The poll rate if neither the arguments nor the config set one.
const DEFAULT_RATE: Duration = Duration::from_secs(5);

/// The lowest poll rate we accept.
const MIN_RATE: Duration = Duration::from_millis(250);

/// Written out on first run when no config file exists yet.
const DEFAULT_CONFIG_CONTENT: &str = indoc! {r##"
    # This is a default config file for svcmon. Uncomment what you need.

    # [tracker]
    # Time between polls, in milliseconds or a human duration.
    # rate = "5s"
    # Built-in role table that seeds the watch list.
    # role = "config"
    # Subset of units to watch.
    # units = ["contrail-api", "contrail-schema"]
    # Fire a process list update event after every state change.
    # list_updates = false

    # Maps a unit to the process name it runs as. Entries here are merged
    # over the role table, overriding same-named units.
    # [process_names]
    # contrail-api = "contrail-api"
"##};

/// Everything resolved and ready to start with.
#[derive(Debug)]
pub struct Options {
    /// Time between polls.
    pub rate: Duration,

    /// What the tracker watches.
    pub tracker: TrackerConfig,
}

/// Builds [`Options`] from the parsed arguments and the config file they
/// point at.
pub fn init_options(args: &SvcmonArgs) -> OptionResult<Options> {
    let config = create_or_get_config(args.general_args.config_location.as_deref())?;

    Ok(Options {
        rate: get_rate(args, &config)?,
        tracker: get_tracker_config(args, &config)?,
    })
}

/// Resolves just the poll rate, for modes that never build a tracker and
/// so shouldn't trip over an empty watch list.
pub fn init_rate(args: &SvcmonArgs) -> OptionResult<Duration> {
    let config = create_or_get_config(args.general_args.config_location.as_deref())?;

    get_rate(args, &config)
}

/// The default config location: `svcmon/svcmon.toml` under the platform
/// config directory.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|path| path.join("svcmon").join("svcmon.toml"))
}

/// Reads the config at `path`, or at the default location if `None`. A
/// missing file is created with commented defaults first.
fn create_or_get_config(path: Option<&Path>) -> OptionResult<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) => path,
            // No home or config directory to speak of; just run on
            // defaults.
            None => return Ok(Config::default()),
        },
    };

    if path.exists() {
        let contents = fs::read_to_string(&path)?;
        Ok(toml_edit::de::from_str(&contents)?)
    } else {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, DEFAULT_CONFIG_CONTENT)?;

        Ok(Config::default())
    }
}

/// Parses a duration from either a number in milliseconds or a human
/// duration string.
fn try_parse_duration(value: &str) -> Result<Duration, String> {
    if let Ok(ms) = value.parse::<u64>() {
        Ok(Duration::from_millis(ms))
    } else {
        humantime::parse_duration(value)
            .map_err(|_| format!("'{value}' is not a valid time value."))
    }
}

fn get_rate(args: &SvcmonArgs, config: &Config) -> OptionResult<Duration> {
    let rate = if let Some(rate) = &args.general_args.rate {
        try_parse_duration(rate).map_err(OptionError::arg)?
    } else if let Some(rate) = config.tracker.as_ref().and_then(|t| t.rate.as_ref()) {
        match rate {
            StringOrNum::String(value) => {
                try_parse_duration(value).map_err(OptionError::config)?
            }
            StringOrNum::Num(ms) => Duration::from_millis(*ms),
        }
    } else {
        DEFAULT_RATE
    };

    if rate < MIN_RATE {
        return Err(OptionError::other(
            "set your poll rate to be at least 250 milliseconds.",
        ));
    }

    Ok(rate)
}

fn get_tracker_config(args: &SvcmonArgs, config: &Config) -> OptionResult<TrackerConfig> {
    let section = config.tracker.as_ref();

    let mut process_names: HashMap<String, String> = HashMap::new();
    let mut table_units: Vec<String> = Vec::new();

    let role = args
        .tracker_args
        .role
        .as_deref()
        .or_else(|| section.and_then(|t| t.role.as_deref()));

    if let Some(role) = role {
        // Argument values are validated by clap, so an unknown name here
        // must have come from the config file.
        let Some(table) = roles::builtin(role) else {
            return Err(OptionError::config(format!(
                "'{role}' is not a built-in role."
            )));
        };

        for (unit, process) in table.units {
            table_units.push((*unit).to_owned());
            process_names.insert((*unit).to_owned(), (*process).to_owned());
        }
    }

    if let Some(overrides) = &config.process_names {
        for (unit, process) in overrides {
            if !process_names.contains_key(unit) {
                table_units.push(unit.clone());
            }
            process_names.insert(unit.clone(), process.clone());
        }
    }

    let units = if !args.tracker_args.units.is_empty() {
        args.tracker_args.units.clone()
    } else if let Some(units) = section.and_then(|t| t.units.clone()) {
        units
    } else {
        table_units
    };

    if units.is_empty() {
        return Err(OptionError::other(
            "nothing to watch; set a role or fill in '[process_names]'.",
        ));
    }

    let update_process_list = args.tracker_args.list_updates
        || section.and_then(|t| t.list_updates).unwrap_or(false);

    Ok(TrackerConfig {
        units,
        process_names,
        update_process_list,
    })
}
