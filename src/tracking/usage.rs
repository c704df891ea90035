//! Per-process CPU and memory sampling.
//!
//! CPU share needs two looks at the clocks: a [`UsageTracker`] keeps the
//! previous sample per pid and reports the share of one core-normalized
//! CPU spent between it and the current one. The first sample after
//! construction therefore always reports zero.
//!
//! For Linux, readings come straight out of procfs. Other platforms fall
//! back to empty readings for now.

use cfg_if::cfg_if;

use super::Pid;

cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod linux;
        use linux as imp;
    } else {
        mod fallback;
        use fallback as imp;
    }
}

/// CPU clock readings for one process, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CpuSample {
    /// Time spent in user mode.
    pub user: f64,
    /// Time spent in kernel mode.
    pub system: f64,
    /// Machine-wide elapsed time reference taken alongside the CPU times.
    pub wall: f64,
}

/// One resource usage reading.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UsageReading {
    /// Share of one core-normalized CPU in percent, rounded to two
    /// decimal places. Zero until a second sample exists.
    pub cpu_share: f64,
    /// Virtual memory size in KiB.
    pub mem_virt_kib: u64,
    /// Resident set size in KiB.
    pub mem_res_kib: u64,
}

/// Samples CPU share and memory for one process.
#[derive(Debug)]
pub struct UsageTracker {
    pid: Pid,
    last: Option<CpuSample>,
}

impl UsageTracker {
    /// A tracker with no baseline; the first [`sample`](Self::sample)
    /// reports a zero CPU share.
    pub fn new(pid: Pid) -> Self {
        Self { pid, last: None }
    }

    /// Resumes from a previously taken sample, for embedders persisting
    /// the baseline across restarts.
    pub fn resume(pid: Pid, last: CpuSample) -> Self {
        Self {
            pid,
            last: Some(last),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// The most recent CPU sample, if one was taken.
    pub fn last_sample(&self) -> Option<CpuSample> {
        self.last
    }

    /// Takes a usage reading.
    ///
    /// CPU and memory are read independently, so one failing still leaves
    /// the other half of the reading filled in. A process that is gone or
    /// unreadable yields all zeroes, and the stored baseline is left
    /// alone.
    pub fn sample(&mut self) -> UsageReading {
        let cpu_share = match imp::cpu_sample(self.pid) {
            Some(current) => {
                let share = cpu_share_between(self.last.as_ref(), &current, imp::logical_cores());
                self.last = Some(current);
                share
            }
            None => 0.0,
        };

        let (mem_virt_kib, mem_res_kib) = imp::memory_kib(self.pid).unwrap_or_default();

        UsageReading {
            cpu_share,
            mem_virt_kib,
            mem_res_kib,
        }
    }
}

/// Share of one core-normalized CPU spent between `prev` and `current`,
/// in percent. Zero without a baseline, or when no wall time passed
/// between the two. A baseline with a zero wall clock never came from a
/// real reading and counts as no baseline.
fn cpu_share_between(prev: Option<&CpuSample>, current: &CpuSample, cores: u32) -> f64 {
    let Some(prev) = prev else {
        return 0.0;
    };
    if prev.wall == 0.0 {
        return 0.0;
    }

    let interval = current.wall - prev.wall;
    if interval <= 0.0 {
        return 0.0;
    }

    let used = (current.system - prev.system) + (current.user - prev.user);

    round_hundredths(100.0 * used / interval / f64::from(cores.max(1)))
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
