//! Command line interface

pub mod types;

use std::ffi::OsStr;

pub use types::{Cli, SettingsArgs};

const VERSION_FLAG: &str = "--version";

/// Build identifier printed by `--version`
pub fn version_string() -> String {
    let build = option_env!("SPOTSWAP_BUILD_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    format!("spotswap build: {build}")
}

/// Whether `--version` appears among the arguments, program name excluded
///
/// Scanned before clap parses anything so that malformed settings in flags
/// or the environment cannot prevent printing the version. Arguments after
/// a bare `--` are not flags.
pub fn version_requested<I, T>(args: I) -> bool
where
    I: IntoIterator<Item = T>,
    T: AsRef<OsStr>,
{
    args.into_iter()
        .map(|arg| arg.as_ref().to_owned())
        .take_while(|arg| arg != "--")
        .any(|arg| arg == VERSION_FLAG)
}
