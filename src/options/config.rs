//! The on-disk configuration.

use indexmap::IndexMap;
use serde::Deserialize;

/// The parsed config file.
#[derive(Debug, Default, Deserialize)]
#[cfg_attr(test, serde(deny_unknown_fields), derive(PartialEq, Eq))]
pub struct Config {
    pub(crate) tracker: Option<TrackerConfigFile>,

    /// Maps a unit to the process name it runs as. Merged over whatever
    /// the selected role table provides, overriding same-named units. An
    /// [`IndexMap`] so units keep their file order.
    pub(crate) process_names: Option<IndexMap<String, String>>,
}

/// The `[tracker]` section.
#[derive(Debug, Default, Deserialize)]
#[cfg_attr(test, serde(deny_unknown_fields), derive(PartialEq, Eq))]
pub struct TrackerConfigFile {
    /// Time between polls, either a number in milliseconds or a human
    /// duration (e.g. "5s").
    pub(crate) rate: Option<StringOrNum>,

    /// Built-in role whose unit table seeds the watch list.
    pub(crate) role: Option<String>,

    /// Subset of units to watch; defaults to every unit with a process
    /// name.
    pub(crate) units: Option<Vec<String>>,

    /// Fire a process list update event after every state change.
    pub(crate) list_updates: Option<bool>,
}

/// A field that can be either a string or a number.
#[derive(Clone, Debug, Deserialize)]
#[cfg_attr(test, derive(PartialEq, Eq))]
#[serde(untagged)]
pub(crate) enum StringOrNum {
    String(String),
    Num(u64),
}

impl From<String> for StringOrNum {
    fn from(value: String) -> Self {
        StringOrNum::String(value)
    }
}

impl From<u64> for StringOrNum {
    fn from(value: u64) -> Self {
        StringOrNum::Num(value)
    }
}
