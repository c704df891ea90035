//! Service liveness tracking.
//!
//! A [`ServiceTracker`] watches a configured set of units. Each poll pass
//! looks every unit up in a fresh process snapshot and reports pid or
//! state transitions through a [`TrackerEvents`] sink, deduplicated
//! against what was last reported. Resource usage is sampled separately
//! and on demand; see [`usage`].

pub mod cache;
pub mod matcher;
pub mod snapshot;
pub mod usage;

use std::fmt;

use cfg_if::cfg_if;
use hashbrown::HashMap;

use self::{
    cache::StateCache,
    matcher::find_process,
    snapshot::{SnapshotEntry, SnapshotSource},
};

cfg_if! {
    if #[cfg(target_family = "unix")] {
        /// Process ID.
        pub type Pid = libc::pid_t;
    } else {
        /// Process ID.
        pub type Pid = i32;
    }
}

/// The pid reported for units with no live process.
pub const NO_PID: Pid = -1;

/// Liveness state of a unit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProcessState {
    Running,
    Exited,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` rather than `write_str` so width specifiers apply; the
        // record printer lays these out in columns.
        match self {
            ProcessState::Running => f.pad("RUNNING"),
            ProcessState::Exited => f.pad("EXITED"),
        }
    }
}

/// What the tracker last saw for one unit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcessRecord {
    /// The unit this record describes.
    pub name: String,
    /// Grouping label, currently always the unit name.
    pub group: String,
    /// Live pid, or [`NO_PID`] when exited.
    pub pid: Pid,
    pub state: ProcessState,
    /// Process start in microseconds since the unix epoch; only set while
    /// running.
    pub start_us: Option<u64>,
}

impl ProcessRecord {
    /// An exited record for `unit`.
    pub fn exited(unit: &str) -> Self {
        Self {
            name: unit.to_owned(),
            group: unit.to_owned(),
            pid: NO_PID,
            state: ProcessState::Exited,
            start_us: None,
        }
    }

    fn running(unit: &str, entry: &SnapshotEntry) -> Self {
        Self {
            name: unit.to_owned(),
            group: unit.to_owned(),
            pid: entry.pid,
            state: ProcessState::Running,
            start_us: Some(entry.start_us),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ProcessState::Running
    }
}

/// Receives tracker notifications.
///
/// Both hooks fire from inside [`ServiceTracker::poll_once`], once per
/// detected change, in unit order.
pub trait TrackerEvents {
    /// A unit's pid or state changed; `record` is the new record.
    fn on_state_change(&mut self, record: &ProcessRecord);

    /// Fired after every state change when list updates are enabled.
    fn on_list_update(&mut self) {}
}

/// Static configuration for a [`ServiceTracker`].
#[derive(Clone, Debug, Default)]
pub struct TrackerConfig {
    /// Units to watch, in poll order.
    pub units: Vec<String>,
    /// Maps a unit to the process name it runs as.
    pub process_names: HashMap<String, String>,
    /// Fire [`TrackerEvents::on_list_update`] after each state change.
    pub update_process_list: bool,
}

/// Watches units and reports their liveness transitions.
///
/// ```no_run
/// use svcmon::tracking::{
///     snapshot::SysinfoSource, ProcessRecord, ServiceTracker, TrackerConfig, TrackerEvents,
/// };
///
/// struct Print;
///
/// impl TrackerEvents for Print {
///     fn on_state_change(&mut self, record: &ProcessRecord) {
///         println!("{} is now {}", record.name, record.state);
///     }
/// }
///
/// let mut config = TrackerConfig::default();
/// config.units.push("sshd".to_owned());
/// config.process_names.insert("sshd".to_owned(), "sshd".to_owned());
///
/// let mut tracker = ServiceTracker::new(config, SysinfoSource::new(), Print);
/// tracker.poll_once();
/// ```
pub struct ServiceTracker<S: SnapshotSource, E: TrackerEvents> {
    config: TrackerConfig,
    cache: StateCache,
    source: S,
    events: E,
}

impl<S: SnapshotSource, E: TrackerEvents> ServiceTracker<S, E> {
    /// Builds a tracker. Units without a process name mapping are kept but
    /// never match anything; each one is called out here once rather than
    /// on every poll.
    pub fn new(config: TrackerConfig, source: S, events: E) -> Self {
        for unit in &config.units {
            if !config.process_names.contains_key(unit) {
                warn!("no process name configured for unit '{unit}', it will not be probed");
            }
        }

        Self {
            config,
            cache: StateCache::new(),
            source,
            events,
        }
    }

    /// One poll pass: probe every unit and dispatch events for whatever
    /// changed since the last report.
    pub fn poll_once(&mut self) {
        for index in 0..self.config.units.len() {
            let Some(record) = Self::probe(&mut self.source, &self.config, index) else {
                continue;
            };

            if self.cache.update(&record.name, &record) {
                self.events.on_state_change(&record);
                if self.config.update_process_list {
                    self.events.on_list_update();
                }
            }
        }
    }

    /// Probes every unit and returns the records without dispatching
    /// events. The change cache is still brought up to date, so a
    /// following [`poll_once`](Self::poll_once) stays quiet about
    /// anything already reported here.
    pub fn get_all(&mut self) -> Vec<ProcessRecord> {
        let mut records = Vec::with_capacity(self.config.units.len());

        for index in 0..self.config.units.len() {
            if let Some(record) = Self::probe(&mut self.source, &self.config, index) {
                self.cache.update(&record.name, &record);
                records.push(record);
            }
        }

        records
    }

    /// The last recorded state for `unit`, if it has been probed.
    pub fn last_record(&self, unit: &str) -> Option<&ProcessRecord> {
        self.cache.get(unit)
    }

    /// Looks one unit up in a fresh snapshot. `None` when the unit has no
    /// process name mapping.
    fn probe(source: &mut S, config: &TrackerConfig, index: usize) -> Option<ProcessRecord> {
        let unit = &config.units[index];
        let target = config.process_names.get(unit)?;

        debug!("probing unit '{unit}' for process '{target}'");
        let entries = source.snapshot();

        Some(match find_process(target, &entries) {
            Some(entry) => ProcessRecord::running(unit, entry),
            None => ProcessRecord::exited(unit),
        })
    }
}
