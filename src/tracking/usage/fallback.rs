//! Stub readers for platforms without per-process clock sources wired
//! up. Everything comes back empty, which callers already report as a
//! zero reading.

use super::CpuSample;
use crate::tracking::Pid;

pub(super) fn logical_cores() -> u32 {
    1
}

pub(super) fn cpu_sample(_pid: Pid) -> Option<CpuSample> {
    None
}

pub(super) fn memory_kib(_pid: Pid) -> Option<(u64, u64)> {
    None
}
