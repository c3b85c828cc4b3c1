// Headless integration across store, planner, and runner using a real file
// store in a tempdir and explicit instants instead of sleeping.

use std::fs;
use std::time::{Duration, Instant};

use watr::planner::{self, MAX_WORDS_PER_SESSION};
use watr::runner::{CueEvent, Phase, SessionRunner};
use watr::store::WordStore;

const DURATION: Duration = Duration::from_secs(17);

fn store_of(dir: &tempfile::TempDir, unshown: usize, shown: usize) -> WordStore {
    let path = dir.path().join("wat.csv");
    let mut table = String::from("word,best_response,shown\n");
    for i in 0..unshown {
        table.push_str(&format!("FRESH{i},some response,false\n"));
    }
    for i in 0..shown {
        table.push_str(&format!("SPENT{i},some response,true\n"));
    }
    fs::write(&path, table).unwrap();
    WordStore::load(&path).unwrap()
}

fn run_to_completion(runner: &mut SessionRunner, store: &mut WordStore, mut now: Instant) -> Instant {
    runner.start(now);
    loop {
        now += DURATION;
        let report = runner.tick(now, store);
        assert!(report.persist_error.is_none());
        if report.cues.contains(&CueEvent::SessionCompleted) {
            return now;
        }
    }
}

#[test]
fn short_store_completes_and_plans_a_reset_cycle() {
    // Scenario A: 3 unshown records, cap 60
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_of(&dir, 3, 0);
    let queue = planner::build_session(&mut store, MAX_WORDS_PER_SESSION).unwrap();
    assert_eq!(queue.len(), 3);

    let mut runner = SessionRunner::new(queue, DURATION, MAX_WORDS_PER_SESSION);
    run_to_completion(&mut runner, &mut store, Instant::now());

    // the completed session exhausted the set, so the automatic reset left
    // every flag clear and the next planned queue is full again
    assert_eq!(store.count_shown(), 0);
    assert_eq!(runner.queue().len(), 3);
    assert_eq!(runner.phase(), Phase::Idle);
}

#[test]
fn large_store_splits_into_capped_sessions() {
    // Scenario B: 90 unshown records, cap 60 -> 60 then 30, no reset between
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_of(&dir, 90, 0);
    let queue = planner::build_session(&mut store, MAX_WORDS_PER_SESSION).unwrap();
    assert_eq!(queue.len(), 60);

    let mut runner = SessionRunner::new(queue, DURATION, MAX_WORDS_PER_SESSION);
    let now = run_to_completion(&mut runner, &mut store, Instant::now());

    assert_eq!(store.count_shown(), 60);
    assert_eq!(runner.queue().len(), 30);

    run_to_completion(&mut runner, &mut store, now + Duration::from_secs(5));

    // second completion spends the set; the planner starts a fresh cycle
    assert_eq!(store.count_shown(), 0);
    assert_eq!(runner.queue().len(), 60);
}

#[test]
fn absent_table_is_seeded_with_the_default_set() {
    // Scenario D: no file at startup
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wat.csv");
    assert!(!path.exists());

    let mut store = WordStore::open_or_seed(&path).unwrap();
    let total = store.count_total();
    assert!(total >= 50);
    assert_eq!(store.count_shown(), 0);

    let queue = planner::build_session(&mut store, MAX_WORDS_PER_SESSION).unwrap();
    assert_eq!(queue.len(), total.min(MAX_WORDS_PER_SESSION));
}

#[test]
fn completed_words_are_marked_in_queue_order() {
    // every word of a session transitions unshown -> shown exactly once,
    // in queue order, with no skips
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_of(&dir, 5, 2);
    let queue = planner::build_session(&mut store, 3).unwrap();
    let expected: Vec<usize> = queue.entries().iter().map(|e| e.position).collect();

    let mut runner = SessionRunner::new(queue, DURATION, 3);
    let mut now = Instant::now();
    runner.start(now);

    let mut marked = Vec::new();
    loop {
        now += DURATION;
        let before: Vec<usize> = store
            .records()
            .iter()
            .filter(|r| r.shown)
            .map(|r| r.position)
            .collect();
        let report = runner.tick(now, &mut store);
        let after: Vec<usize> = store
            .records()
            .iter()
            .filter(|r| r.shown)
            .map(|r| r.position)
            .collect();
        for pos in &after {
            if !before.contains(pos) {
                marked.push(*pos);
            }
        }
        if report.cues.contains(&CueEvent::SessionCompleted) {
            break;
        }
    }

    assert_eq!(marked, expected);
}

#[test]
fn progress_survives_a_restart_mid_run() {
    // every mark is flushed synchronously, so dropping everything at any
    // point (a quit, once or many times) leaves the same table behind
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wat.csv");
    {
        let mut store = store_of(&dir, 4, 0);
        let queue = planner::build_session(&mut store, 60).unwrap();
        let mut runner = SessionRunner::new(queue, DURATION, 60);
        let now = Instant::now();
        runner.start(now);
        runner.tick(now + DURATION, &mut store);
        runner.tick(now + DURATION * 2, &mut store);
        // quit here: runner and store are simply dropped
    }

    let snapshot = fs::read_to_string(&path).unwrap();

    // "quitting again" changes nothing on disk
    let reloaded = WordStore::load(&path).unwrap();
    drop(reloaded);
    assert_eq!(fs::read_to_string(&path).unwrap(), snapshot);

    // a new process picks up where the last one stopped
    let mut store = WordStore::load(&path).unwrap();
    assert_eq!(store.count_shown(), 2);
    let queue = planner::build_session(&mut store, 60).unwrap();
    assert_eq!(queue.len(), 2);
}

#[test]
fn pause_wait_resume_is_invisible_to_the_countdown() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_of(&dir, 2, 0);
    let queue = planner::build_session(&mut store, 60).unwrap();
    let mut runner = SessionRunner::new(queue, DURATION, 60);

    let now = Instant::now();
    runner.start(now);

    runner.pause(now + Duration::from_secs(10));
    let resumed_at = now + Duration::from_secs(1000);
    runner.resume(resumed_at);

    // 7 seconds were left at pause time, no matter how long the wait was
    assert_eq!(runner.remaining(resumed_at), Duration::from_secs(7));

    let report = runner.tick(resumed_at + Duration::from_secs(7), &mut store);
    assert_eq!(report.cues, vec![CueEvent::WordAdvanced]);
}
