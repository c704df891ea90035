use std::{
    ffi::OsString,
    path::Path,
    process::Command,
};

pub fn abs_path(path: &str) -> OsString {
    let path = Path::new(path);

    if path.exists() {
        path.canonicalize().unwrap().into_os_string()
    } else {
        // We are going to trust that the path given is valid...
        path.to_owned().into_os_string()
    }
}

const SVCMON_EXE_PATH: &str = env!("CARGO_BIN_EXE_svcmon");
const DEFAULT_CFG: [&str; 2] = ["-C", "./tests/valid_configs/empty_config.toml"];

/// Returns the [`Command`] of a binary invocation of svcmon.
pub fn svcmon_command(args: &[&str]) -> Command {
    let mut cmd = Command::new(SVCMON_EXE_PATH);

    let mut prev = "";
    for arg in args.iter() {
        if prev == "-C" {
            // This is the config file; make sure we set it to absolute path!
            cmd.arg(abs_path(arg));
        } else {
            cmd.arg(arg);
        }

        prev = arg;
    }

    cmd
}

/// Returns the [`Command`] of a binary invocation of svcmon with the
/// default, empty config file, so a test can't touch (or create) the
/// user's real one.
pub fn no_cfg_svcmon_command() -> Command {
    svcmon_command(&DEFAULT_CFG)
}
