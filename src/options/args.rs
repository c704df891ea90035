// Argument parsing via clap.
//
// Note that this file is included by the build script to generate
// completions and the manpage, so keep it a single file with no inner
// doc comments, or the include site won't parse.

use std::path::PathBuf;

use clap::*;
use indoc::indoc;

const TEMPLATE: &str = indoc! {
    "{name} {version}

    {about}

    {usage-heading} {usage}

    {all-args}"
};

const USAGE: &str = "svcmon [OPTIONS]";

/// Returns the parsed [`SvcmonArgs`].
pub fn get_args() -> SvcmonArgs {
    SvcmonArgs::parse()
}

/// The arguments for svcmon.
#[derive(Parser, Debug)]
#[command(
    name = crate_name!(),
    version = crate_version!(),
    about = crate_description!(),
    disable_help_flag = true,
    disable_version_flag = true,
    color = ColorChoice::Auto,
    help_template = TEMPLATE,
    override_usage = USAGE,
)]
pub struct SvcmonArgs {
    #[command(flatten)]
    pub(crate) general_args: GeneralArgs,

    #[command(flatten)]
    pub(crate) tracker_args: TrackerArgs,

    #[command(flatten)]
    pub(crate) other_args: OtherArgs,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "General Options", rename_all = "snake_case")]
pub(crate) struct GeneralArgs {
    #[arg(
        short = 'C',
        long,
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        help = "Sets the location of the config file.",
        long_help = "Sets the location of the config file. Expects a config file in the TOML format. \
                    If it doesn't exist, a default config file is created at the path."
    )]
    pub(crate) config_location: Option<PathBuf>,

    #[arg(
        short = 'r',
        long,
        value_name = "TIME",
        help = "Sets how often units are polled.",
        long_help = "Sets how often units are polled. Takes a number in milliseconds or a human \
                    duration (e.g. 5s). The minimum is 250ms, and the default is 5s."
    )]
    pub(crate) rate: Option<String>,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Probes every unit once, prints the records, and exits."
    )]
    pub(crate) once: bool,

    #[arg(
        long,
        value_name = "PID",
        help = "Samples CPU and memory for one pid over a poll interval, then exits.",
        long_help = "Samples CPU and memory for one pid over a poll interval, then exits. The CPU \
                    share is measured between two samples taken one rate apart."
    )]
    pub(crate) sample: Option<i32>,

    #[arg(
        long,
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        help = "Writes logs to the given file rather than stderr."
    )]
    pub(crate) log_file: Option<PathBuf>,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Enables debug logging."
    )]
    pub(crate) debug: bool,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Tracker Options", rename_all = "snake_case")]
pub(crate) struct TrackerArgs {
    #[arg(
        long,
        value_name = "ROLE",
        value_parser = [
            "analytics",
            "analytics-alarm",
            "analytics-snmp",
            "compute",
            "config",
            "config-database",
            "control",
            "database",
        ],
        help = "Seeds the watch list from a built-in role table.",
        long_help = "Seeds the watch list from a built-in role table. Entries under \
                    '[process_names]' in the config file are merged over the table."
    )]
    pub(crate) role: Option<String>,

    #[arg(
        short = 'u',
        long = "unit",
        value_name = "NAME",
        action = ArgAction::Append,
        help = "Watches only this unit; repeat the flag for more than one.",
        long_help = "Watches only this unit; repeat the flag for more than one. Defaults to every \
                    unit that has a process name configured."
    )]
    pub(crate) units: Vec<String>,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Also fires a process list update event after every state change."
    )]
    pub(crate) list_updates: bool,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Other Options")]
pub(crate) struct OtherArgs {
    #[arg(short = 'h', long, action = ArgAction::Help, help = "Prints help info (use `--help` for more details).")]
    help: (),

    #[arg(short = 'v', long, action = ArgAction::Version, help = "Prints version information.")]
    version: (),
}
