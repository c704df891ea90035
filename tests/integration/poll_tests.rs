//! Tests the tracker poll cycle end to end against a scripted snapshot
//! source, checking the event stream it produces.

use std::sync::{Arc, Mutex};

use svcmon::tracking::{
    snapshot::{SnapshotEntry, SnapshotSource},
    Pid, ProcessRecord, ProcessState, ServiceTracker, TrackerConfig, TrackerEvents, NO_PID,
};

/// A snapshot source a test can steer while the tracker owns it.
#[derive(Clone, Default)]
struct SharedSource {
    entries: Arc<Mutex<Vec<SnapshotEntry>>>,
}

impl SharedSource {
    fn set(&self, entries: Vec<SnapshotEntry>) {
        *self.entries.lock().unwrap() = entries;
    }
}

impl SnapshotSource for SharedSource {
    fn snapshot(&mut self) -> Vec<SnapshotEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Event {
    State(ProcessRecord),
    ListUpdate,
}

/// Records every event the tracker fires.
#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl TrackerEvents for Recorder {
    fn on_state_change(&mut self, record: &ProcessRecord) {
        self.events.lock().unwrap().push(Event::State(record.clone()));
    }

    fn on_list_update(&mut self) {
        self.events.lock().unwrap().push(Event::ListUpdate);
    }
}

fn entry(pid: Pid, name: &str, cmd: &[&str]) -> SnapshotEntry {
    SnapshotEntry {
        pid,
        name: name.to_owned(),
        cmd: cmd.iter().map(|part| (*part).to_owned()).collect(),
        start_us: 1_700_000_000_000_000,
    }
}

fn tracker_for(
    units: &[(&str, &str)], update_process_list: bool,
) -> (ServiceTracker<SharedSource, Recorder>, SharedSource, Recorder) {
    let mut config = TrackerConfig {
        update_process_list,
        ..TrackerConfig::default()
    };
    for (unit, process) in units {
        config.units.push((*unit).to_owned());
        config
            .process_names
            .insert((*unit).to_owned(), (*process).to_owned());
    }

    let source = SharedSource::default();
    let recorder = Recorder::default();
    let tracker = ServiceTracker::new(config, source.clone(), recorder.clone());

    (tracker, source, recorder)
}

fn single_state_change(events: Vec<Event>) -> ProcessRecord {
    assert_eq!(events.len(), 1, "expected exactly one event: {events:?}");
    match events.into_iter().next().unwrap() {
        Event::State(record) => record,
        other => panic!("expected a state change, got {other:?}"),
    }
}

#[test]
fn first_poll_reports_a_running_unit() {
    let (mut tracker, source, recorder) =
        tracker_for(&[("contrail-api", "contrail-api")], false);

    source.set(vec![entry(4242, "contrail-api", &["/usr/bin/contrail-api"])]);
    tracker.poll_once();

    let record = single_state_change(recorder.take());
    assert_eq!(record.name, "contrail-api");
    assert_eq!(record.group, "contrail-api");
    assert_eq!(record.state, ProcessState::Running);
    assert_eq!(record.pid, 4242);
    assert_eq!(record.start_us, Some(1_700_000_000_000_000));
}

#[test]
fn repeat_polls_stay_quiet() {
    let (mut tracker, source, recorder) =
        tracker_for(&[("contrail-api", "contrail-api")], false);

    source.set(vec![entry(4242, "contrail-api", &["/usr/bin/contrail-api"])]);
    tracker.poll_once();
    recorder.take();

    tracker.poll_once();
    tracker.poll_once();
    assert!(recorder.take().is_empty());
}

#[test]
fn an_exit_clears_the_pid_and_start() {
    let (mut tracker, source, recorder) =
        tracker_for(&[("contrail-api", "contrail-api")], false);

    source.set(vec![entry(4242, "contrail-api", &["/usr/bin/contrail-api"])]);
    tracker.poll_once();
    recorder.take();

    source.set(vec![]);
    tracker.poll_once();

    let record = single_state_change(recorder.take());
    assert_eq!(record.state, ProcessState::Exited);
    assert_eq!(record.pid, NO_PID);
    assert_eq!(record.start_us, None);
}

#[test]
fn first_poll_of_a_dead_unit_still_reports() {
    let (mut tracker, _source, recorder) =
        tracker_for(&[("contrail-api", "contrail-api")], false);

    tracker.poll_once();

    let record = single_state_change(recorder.take());
    assert_eq!(record.state, ProcessState::Exited);
    assert_eq!(record.pid, NO_PID);
}

#[test]
fn a_restart_fires_with_the_new_pid() {
    let (mut tracker, source, recorder) =
        tracker_for(&[("contrail-api", "contrail-api")], false);

    source.set(vec![entry(100, "contrail-api", &["/usr/bin/contrail-api"])]);
    tracker.poll_once();
    recorder.take();

    // Supervisor restarted it between polls: same unit, new pid.
    source.set(vec![entry(200, "contrail-api", &["/usr/bin/contrail-api"])]);
    tracker.poll_once();

    let record = single_state_change(recorder.take());
    assert_eq!(record.state, ProcessState::Running);
    assert_eq!(record.pid, 200);
}

#[test]
fn unmapped_units_are_never_probed() {
    let config = TrackerConfig {
        units: vec!["mystery".to_owned()],
        ..TrackerConfig::default()
    };
    let source = SharedSource::default();
    let recorder = Recorder::default();
    let mut tracker = ServiceTracker::new(config, source.clone(), recorder.clone());

    tracker.poll_once();
    assert!(recorder.take().is_empty());
    assert!(tracker.get_all().is_empty());
    assert!(tracker.last_record("mystery").is_none());
}

#[test]
fn list_updates_follow_every_state_change() {
    let (mut tracker, _source, recorder) = tracker_for(
        &[("contrail-api", "contrail-api"), ("cassandra", "cassandra")],
        true,
    );

    tracker.poll_once();

    let events = recorder.take();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], Event::State(_)));
    assert_eq!(events[1], Event::ListUpdate);
    assert!(matches!(events[2], Event::State(_)));
    assert_eq!(events[3], Event::ListUpdate);
}

#[test]
fn no_list_updates_when_disabled() {
    let (mut tracker, _source, recorder) = tracker_for(
        &[("contrail-api", "contrail-api"), ("cassandra", "cassandra")],
        false,
    );

    tracker.poll_once();

    assert!(recorder.take().iter().all(|event| matches!(event, Event::State(_))));
}

#[test]
fn get_all_returns_records_without_events() {
    let (mut tracker, source, recorder) = tracker_for(
        &[("contrail-api", "contrail-api"), ("cassandra", "cassandra")],
        true,
    );

    source.set(vec![entry(7, "cassandra", &[])]);

    let records = tracker.get_all();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "contrail-api");
    assert_eq!(records[0].state, ProcessState::Exited);
    assert_eq!(records[1].name, "cassandra");
    assert_eq!(records[1].state, ProcessState::Running);
    assert_eq!(records[1].pid, 7);

    assert!(recorder.take().is_empty());
}

#[test]
fn get_all_primes_the_change_cache() {
    let (mut tracker, source, recorder) =
        tracker_for(&[("cassandra", "cassandra")], false);

    source.set(vec![entry(7, "cassandra", &[])]);
    tracker.get_all();

    // Nothing changed since the batch read, so the poll has nothing to
    // say.
    tracker.poll_once();
    assert!(recorder.take().is_empty());

    source.set(vec![]);
    tracker.poll_once();
    let record = single_state_change(recorder.take());
    assert_eq!(record.state, ProcessState::Exited);
}

#[test]
fn interpreter_hosted_units_are_found() {
    let (mut tracker, source, recorder) = tracker_for(
        &[("contrail-schema", "contrail-schema"), ("kafka", "kafka")],
        false,
    );

    source.set(vec![
        entry(
            31,
            "python3",
            &["/usr/bin/python3", "/usr/bin/contrail-schema", "--conf_file", "/etc/x.conf"],
        ),
        entry(
            32,
            "java",
            &["/usr/bin/java", "-Xmx4g", "-cp", "/opt/kafka/libs/*", "kafka.Kafka"],
        ),
    ]);
    tracker.poll_once();

    let events = recorder.take();
    assert_eq!(events.len(), 2);

    let Event::State(schema) = &events[0] else {
        panic!("expected a state change");
    };
    assert_eq!(schema.name, "contrail-schema");
    assert_eq!(schema.pid, 31);

    let Event::State(kafka) = &events[1] else {
        panic!("expected a state change");
    };
    assert_eq!(kafka.name, "kafka");
    assert_eq!(kafka.pid, 32);
}

#[test]
fn last_record_reflects_the_cache() {
    let (mut tracker, source, _recorder) =
        tracker_for(&[("contrail-api", "contrail-api")], false);

    assert!(tracker.last_record("contrail-api").is_none());

    source.set(vec![entry(4242, "contrail-api", &["/usr/bin/contrail-api"])]);
    tracker.poll_once();

    let record = tracker.last_record("contrail-api").unwrap();
    assert_eq!(record.pid, 4242);
    assert!(record.is_running());
}
