//! Process table snapshots.
//!
//! A [`SnapshotSource`] hands the tracker a point-in-time view of every
//! process it can see. The shipped implementation sits on top of
//! `sysinfo`; tests swap in scripted sources.

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

use super::Pid;

/// One process out of a snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SnapshotEntry {
    pub pid: Pid,
    /// Short executable name, without a path.
    pub name: String,
    /// Full command line. May be empty, kernel threads have none.
    pub cmd: Vec<String>,
    /// Process start in microseconds since the unix epoch.
    pub start_us: u64,
}

/// Provides process table snapshots.
///
/// A snapshot is taken per lookup, so two probes within the same poll
/// pass may see different tables. Processes that vanish or deny access
/// mid-read are left out of the returned set entirely.
pub trait SnapshotSource {
    fn snapshot(&mut self) -> Vec<SnapshotEntry>;
}

/// The sysinfo-backed [`SnapshotSource`] the binary runs with.
pub struct SysinfoSource {
    system: System,
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl SnapshotSource for SysinfoSource {
    fn snapshot(&mut self) -> Vec<SnapshotEntry> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cmd(UpdateKind::Always),
        );

        self.system
            .processes()
            .values()
            .map(|process| SnapshotEntry {
                pid: process.pid().as_u32() as Pid,
                name: process.name().to_string_lossy().into_owned(),
                cmd: process
                    .cmd()
                    .iter()
                    .map(|part| part.to_string_lossy().into_owned())
                    .collect(),
                start_us: process.start_time().saturating_mul(1_000_000),
            })
            .collect()
    }
}
