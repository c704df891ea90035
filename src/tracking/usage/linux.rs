//! Linux readers, straight out of `/proc/`.
//!
//! CPU and memory go through separate `/proc/<pid>/stat` reads so that a
//! process vanishing between the two only empties the half it raced.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Read},
    sync::OnceLock,
};

use anyhow::anyhow;
use concat_string::concat_string;

use super::CpuSample;
use crate::tracking::Pid;

static PAGESIZE: OnceLock<u64> = OnceLock::new();

fn pagesize() -> u64 {
    *PAGESIZE.get_or_init(|| rustix::param::page_size() as u64)
}

#[inline]
fn next_part<'a>(iter: &mut impl Iterator<Item = &'a str>) -> Result<&'a str, io::Error> {
    iter.next()
        .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData))
}

/// The fields we use out of `/proc/<pid>/stat`. For documentation, see
/// <https://man7.org/linux/man-pages/man5/proc_pid_stat.5.html>.
struct Stat {
    /// Time scheduled in user mode, in clock ticks.
    utime: u64,

    /// Time scheduled in kernel mode, in clock ticks.
    stime: u64,

    /// The virtual memory size in bytes.
    vsize: u64,

    /// The resident set size, in pages.
    rss: u64,
}

impl Stat {
    fn from_file(path: &str) -> anyhow::Result<Stat> {
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;
        Self::from_line(contents.trim())
    }

    fn from_line(line: &str) -> anyhow::Result<Stat> {
        // The comm field is the only one that can contain spaces or
        // parentheses, so everything after its last closing paren splits
        // cleanly on spaces.
        let rest = line
            .rsplit_once(')')
            .map(|(_, rest)| rest)
            .ok_or_else(|| anyhow!("end paren missing"))?;

        let rest = rest.split_whitespace();

        // Skip to utime (state, ppid, pgrp, session, tty_nr, tpgid, flags,
        // minflt, cminflt, majflt, cmajflt).
        let mut rest = rest.skip(11);
        let utime: u64 = next_part(&mut rest)?.parse()?;
        let stime: u64 = next_part(&mut rest)?.parse()?;

        // Skip to vsize (cutime, cstime, priority, nice, num_threads,
        // itrealvalue, starttime).
        let mut rest = rest.skip(7);
        let vsize: u64 = next_part(&mut rest)?.parse()?;
        let rss: u64 = next_part(&mut rest)?.parse()?;

        Ok(Stat {
            utime,
            stime,
            vsize,
            rss,
        })
    }

    /// Returns the resident set size in bytes.
    fn rss_bytes(&self) -> u64 {
        self.rss * pagesize()
    }
}

fn stat_path(pid: Pid) -> String {
    concat_string!("/proc/", pid.to_string(), "/stat")
}

/// Seconds the machine has been up, from `/proc/uptime`.
fn uptime_secs() -> anyhow::Result<f64> {
    let mut line = String::new();
    BufReader::new(File::open("/proc/uptime")?).read_line(&mut line)?;

    Ok(line
        .split_whitespace()
        .next()
        .ok_or_else(|| anyhow!("empty uptime file"))?
        .parse()?)
}

/// Online core count, queried each time so CPU hotplug is picked up.
pub(super) fn logical_cores() -> u32 {
    // SAFETY: `sysconf` with a valid name has no other preconditions.
    let count = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };

    if count > 0 {
        count as u32
    } else {
        1
    }
}

pub(super) fn cpu_sample(pid: Pid) -> Option<CpuSample> {
    let stat = Stat::from_file(&stat_path(pid)).ok()?;
    let wall = uptime_secs().ok()?;
    let ticks = rustix::param::clock_ticks_per_second() as f64;

    Some(CpuSample {
        user: stat.utime as f64 / ticks,
        system: stat.stime as f64 / ticks,
        wall,
    })
}

/// Virtual and resident memory in KiB.
pub(super) fn memory_kib(pid: Pid) -> Option<(u64, u64)> {
    let stat = Stat::from_file(&stat_path(pid)).ok()?;

    Some((stat.vsize / 1024, stat.rss_bytes() / 1024))
}
