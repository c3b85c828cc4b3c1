use std::time::{Duration, Instant};

use crate::planner::{self, SessionQueue};
use crate::store::{StoreError, WordStore};

/// Resting states of the session state machine. Completion is transient: it
/// is observed as a [`CueEvent::SessionCompleted`] and folds straight back
/// into `Idle` with the next queue already planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
}

/// Named cue points the presentation layer turns into audio/visual feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueEvent {
    SessionStarted,
    WordAdvanced,
    Paused,
    Resumed,
    SessionCompleted,
}

/// Outcome of one tick evaluation. A persistence failure does not roll back
/// in-memory state; it is carried here so the caller can surface it without
/// interrupting the session.
#[derive(Debug, Default)]
pub struct TickReport {
    pub cues: Vec<CueEvent>,
    pub persist_error: Option<StoreError>,
}

/// Drives one session at a time through its word queue on a wall-clock
/// countdown. All transitions take an explicit `now` so time is an input,
/// not an ambient effect.
#[derive(Debug)]
pub struct SessionRunner {
    queue: SessionQueue,
    current_index: usize,
    word_duration: Duration,
    max_words_per_session: usize,
    phase: Phase,
    // anchor is Some iff Running; frozen_remaining is Some iff Paused
    anchor: Option<Instant>,
    frozen_remaining: Option<Duration>,
    last_completed: Option<usize>,
}

impl SessionRunner {
    pub fn new(queue: SessionQueue, word_duration: Duration, max_words_per_session: usize) -> Self {
        Self {
            queue,
            current_index: 0,
            word_duration,
            max_words_per_session,
            phase: Phase::Idle,
            anchor: None,
            frozen_remaining: None,
            last_completed: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn queue(&self) -> &SessionQueue {
        &self.queue
    }

    pub fn word_duration(&self) -> Duration {
        self.word_duration
    }

    pub fn current_word(&self) -> Option<&str> {
        match self.phase {
            Phase::Running | Phase::Paused => {
                self.queue.get(self.current_index).map(|e| e.word.as_str())
            }
            Phase::Idle => None,
        }
    }

    /// Session position as `(index + 1, total)`.
    pub fn position(&self) -> (usize, usize) {
        (self.current_index + 1, self.queue.len())
    }

    /// Size of the most recently finished session, cleared on the next start.
    pub fn last_completed(&self) -> Option<usize> {
        self.last_completed
    }

    /// Idle → Running when the queue has words; a no-op otherwise.
    pub fn start(&mut self, now: Instant) -> Option<CueEvent> {
        if self.phase != Phase::Idle || self.queue.is_empty() {
            return None;
        }
        self.phase = Phase::Running;
        self.current_index = 0;
        self.anchor = Some(now);
        self.frozen_remaining = None;
        self.last_completed = None;
        Some(CueEvent::SessionStarted)
    }

    /// Running → Paused, freezing the remaining time for the current word.
    pub fn pause(&mut self, now: Instant) -> Option<CueEvent> {
        if self.phase != Phase::Running {
            return None;
        }
        self.frozen_remaining = Some(self.remaining(now));
        self.anchor = None;
        self.phase = Phase::Paused;
        Some(CueEvent::Paused)
    }

    /// Paused → Running, re-anchoring the clock so the remaining time equals
    /// what was frozen, independent of how long the pause lasted.
    pub fn resume(&mut self, now: Instant) -> Option<CueEvent> {
        if self.phase != Phase::Paused {
            return None;
        }
        let frozen = self.frozen_remaining.take().unwrap_or(self.word_duration);
        let elapsed = self.word_duration.saturating_sub(frozen);
        // a monotonic clock younger than the elapsed offset can't back-date
        self.anchor = Some(now.checked_sub(elapsed).unwrap_or(now));
        self.phase = Phase::Running;
        Some(CueEvent::Resumed)
    }

    pub fn toggle_suspend(&mut self, now: Instant) -> Option<CueEvent> {
        match self.phase {
            Phase::Running => self.pause(now),
            Phase::Paused => self.resume(now),
            Phase::Idle => None,
        }
    }

    /// Remaining time for the current word, clamped to non-negative.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.phase {
            Phase::Running => {
                let anchor = self.anchor.unwrap_or(now);
                self.word_duration
                    .saturating_sub(now.duration_since(anchor))
            }
            Phase::Paused => self.frozen_remaining.unwrap_or(self.word_duration),
            Phase::Idle => self.word_duration,
        }
    }

    /// Remaining time rounded down to whole seconds, for display.
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        self.remaining(now).as_secs()
    }

    /// Evaluates the countdown. When the current word's time is up it is
    /// marked shown in the store and the cursor advances; exhausting the
    /// queue completes the session and immediately plans the next one (which
    /// may reset the store), so the runner is ready for the next `start`.
    pub fn tick(&mut self, now: Instant, store: &mut WordStore) -> TickReport {
        let mut report = TickReport::default();
        if self.phase != Phase::Running {
            return report;
        }
        if self.remaining(now) > Duration::ZERO {
            return report;
        }

        if let Some(entry) = self.queue.get(self.current_index) {
            if let Err(err) = store.mark_shown(entry.position) {
                report.persist_error = Some(err);
            }
        }
        self.current_index += 1;

        if self.current_index < self.queue.len() {
            self.anchor = Some(now);
            report.cues.push(CueEvent::WordAdvanced);
            return report;
        }

        self.phase = Phase::Idle;
        self.anchor = None;
        self.frozen_remaining = None;
        self.last_completed = Some(self.queue.len());
        report.cues.push(CueEvent::SessionCompleted);

        match planner::build_session(store, self.max_words_per_session) {
            Ok(next) => self.queue = next,
            Err(err) => {
                self.queue = SessionQueue::default();
                if report.persist_error.is_none() {
                    report.persist_error = Some(err);
                }
            }
        }
        report
    }
}
