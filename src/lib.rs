//! A service process liveness tracker and per-process resource usage
//! sampler.
//!
//! The library surface lives in [`tracking`]; [`run`] is the entry point
//! the `svcmon` binary wraps, wiring a tracker up to a poll loop, the
//! config file, and the logger.

#![warn(rust_2018_idioms)]

#[macro_use]
extern crate log;

pub mod options;
pub mod tracking;
pub mod utils {
    pub mod logging;
}

use std::{
    sync::{Arc, Condvar, Mutex},
    thread,
    time::Duration,
};

use anyhow::Context;

use crate::{
    options::{args, Options},
    tracking::{
        snapshot::{SnapshotSource, SysinfoSource},
        usage::UsageTracker,
        Pid, ProcessRecord, ServiceTracker, TrackerEvents,
    },
};

/// The event sink the binary runs with: every transition goes to the log
/// at info level.
struct LogEvents;

impl TrackerEvents for LogEvents {
    fn on_state_change(&mut self, record: &ProcessRecord) {
        if record.is_running() {
            info!("{} is now {} (pid {})", record.name, record.state, record.pid);
        } else {
            info!("{} is now {}", record.name, record.state);
        }
    }

    fn on_list_update(&mut self) {
        info!("process list updated");
    }
}

/// Parses the arguments and runs until interrupted (or immediately for
/// the one-shot modes).
pub fn run() -> anyhow::Result<()> {
    let args = args::get_args();

    let min_level = if args.general_args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    utils::logging::init_logger(min_level, args.general_args.log_file.as_deref())
        .context("unable to initialize the logger")?;

    if let Some(pid) = args.general_args.sample {
        return sample_pid(pid, options::init_rate(&args)?);
    }

    let options = options::init_options(&args)?;

    let mut tracker = ServiceTracker::new(options.tracker, SysinfoSource::new(), LogEvents);

    if args.general_args.once {
        for record in tracker.get_all() {
            print_record(&record);
        }

        return Ok(());
    }

    poll_loop(&mut tracker, options.rate)
}

fn print_record(record: &ProcessRecord) {
    match record.start_us {
        Some(start_us) => println!(
            "{:<32} {:<8} pid={} start_us={start_us}",
            record.name, record.state, record.pid
        ),
        None => println!("{:<32} {:<8}", record.name, record.state),
    }
}

/// Takes a usage baseline for `pid`, waits one interval, then prints the
/// reading.
fn sample_pid(pid: Pid, rate: Duration) -> anyhow::Result<()> {
    let mut usage = UsageTracker::new(pid);

    usage.sample();
    thread::sleep(rate);
    let reading = usage.sample();

    println!(
        "pid={pid} cpu_share={:.2}% mem_res={} KiB mem_virt={} KiB",
        reading.cpu_share, reading.mem_res_kib, reading.mem_virt_kib
    );

    Ok(())
}

/// Polls at `rate` until a termination signal comes in.
fn poll_loop<S, E>(tracker: &mut ServiceTracker<S, E>, rate: Duration) -> anyhow::Result<()>
where
    S: SnapshotSource,
    E: TrackerEvents,
{
    let termination = Arc::new((Mutex::new(false), Condvar::new()));

    let handler_termination = termination.clone();
    ctrlc::set_handler(move || {
        let (lock, cvar) = &*handler_termination;
        if let Ok(mut terminated) = lock.lock() {
            *terminated = true;
        }
        cvar.notify_all();
    })
    .context("unable to set the termination handler")?;

    info!("polling every {}", humantime::format_duration(rate));

    let (lock, cvar) = &*termination;
    loop {
        tracker.poll_once();

        let Ok(guard) = lock.lock() else {
            break;
        };
        let Ok((terminated, _)) = cvar.wait_timeout(guard, rate) else {
            break;
        };
        if *terminated {
            break;
        }
    }

    info!("shutting down");

    Ok(())
}
