//! Matching a configured process name against snapshot entries.
//!
//! Interpreter-hosted services don't show up under their own name: a
//! python service is some `python` process whose script argument carries
//! the real name, and a JVM service is buried somewhere in `java`'s
//! argument list. Which rule applies is decided per entry, from its
//! `argv[0]` alone.

use itertools::Itertools;

use super::snapshot::SnapshotEntry;

/// How a snapshot entry hosts the process we're looking for.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RuntimeKind {
    /// Python interpreter; the script path in the second argument names
    /// the service.
    Python,
    /// JVM launcher; the service name can appear anywhere in the argument
    /// list.
    Jvm,
    /// Anything else; the executable name is the service name.
    #[default]
    Native,
}

/// Substring markers checked against `argv[0]`, in order. First hit wins.
const RUNTIME_MARKERS: &[(&str, RuntimeKind)] = &[
    ("python", RuntimeKind::Python),
    ("java", RuntimeKind::Jvm),
];

impl RuntimeKind {
    /// Classifies an entry from its `argv[0]`. An empty command line
    /// classifies as [`RuntimeKind::Native`].
    pub fn classify(argv0: &str) -> Self {
        for (marker, kind) in RUNTIME_MARKERS {
            if argv0.contains(marker) {
                return *kind;
            }
        }

        RuntimeKind::Native
    }

    fn matches(self, target: &str, entry: &SnapshotEntry) -> bool {
        match self {
            RuntimeKind::Python => match entry.cmd.get(1) {
                Some(script) => script.contains(target),
                // A bare interpreter carries no script to inspect; treat
                // it like a native process.
                None => entry.name == target,
            },
            RuntimeKind::Jvm => entry.cmd.iter().any(|arg| arg.contains(target)),
            RuntimeKind::Native => entry.name == target,
        }
    }
}

/// Finds the first snapshot entry hosting `target`, scanning in snapshot
/// order. No attempt is made to detect further matches.
pub fn find_process<'e>(target: &str, entries: &'e [SnapshotEntry]) -> Option<&'e SnapshotEntry> {
    let found = entries.iter().find(|entry| {
        let argv0 = entry.cmd.first().map(String::as_str).unwrap_or_default();
        RuntimeKind::classify(argv0).matches(target, entry)
    });

    if let Some(entry) = found {
        debug!(
            "matched '{target}' to pid {} ({})",
            entry.pid,
            entry.cmd.iter().join(" ")
        );
    }

    found
}
