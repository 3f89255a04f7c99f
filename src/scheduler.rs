use crate::gradient::LinearGradient;
use std::time::Duration;

/// A unit of deferred work.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Task {
    /// Start a new animation cycle.
    Cycle,

    /// Apply a cycle's gradient once its fade out delay elapsed.
    Reveal(LinearGradient),

    /// Fade back in after `deferrals` more animation frames.
    FadeIn { deferrals: u8 },
}

#[derive(Debug)]
struct Timer {
    due: Duration,
    sequence: u64,
    period: Option<Duration>,
    task: Task,
}

/// A virtual time scheduler offering repeating timers, one shot timers, and animation frame
/// callbacks.
///
/// Time only moves when the owner says so, which makes it equally usable by a host driven by a
/// wall clock and by tests.
#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    now: Duration,
    timers: Vec<Timer>,
    next_sequence: u64,
    frame_callbacks: Vec<Task>,
}

impl Scheduler {
    const MIN_INTERVAL: Duration = Duration::from_millis(1);

    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The current virtual time.
    pub(crate) fn now(&self) -> Duration {
        self.now
    }

    /// Run `task` every `period`, starting one period from now.
    pub(crate) fn set_interval(&mut self, period: Duration, task: Task) {
        let period = period.max(Self::MIN_INTERVAL);
        self.push(self.now + period, Some(period), task);
    }

    /// Run `task` once, `delay` from now.
    pub(crate) fn set_timeout(&mut self, delay: Duration, task: Task) {
        self.push(self.now + delay, None, task);
    }

    /// Run `task` during the next animation frame.
    pub(crate) fn request_animation_frame(&mut self, task: Task) {
        self.frame_callbacks.push(task);
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to its due time.
    ///
    /// Timers due at the same time fire in the order they were registered. Intervals are re-armed
    /// relative to their due time so they don't drift.
    pub(crate) fn next_due(&mut self, until: Duration) -> Option<Task> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= until)
            .min_by_key(|(_, timer)| (timer.due, timer.sequence))
            .map(|(index, _)| index)?;
        let timer = self.timers.swap_remove(index);
        self.now = self.now.max(timer.due);
        if let Some(period) = timer.period {
            self.push(timer.due + period, Some(period), timer.task.clone());
        }
        Some(timer.task)
    }

    /// Drop the interval runs that were missed while the owner wasn't advancing the clock.
    ///
    /// An interval that is more than a full period behind `until` fires only once, at its latest
    /// slot before `until`. Slots stay aligned to the original start time.
    pub(crate) fn skip_missed(&mut self, until: Duration) {
        for timer in &mut self.timers {
            let Some(period) = timer.period else {
                continue;
            };
            if timer.due + period > until {
                continue;
            }
            let behind = (until - timer.due).as_nanos();
            let skipped = behind - behind % period.as_nanos();
            timer.due += Duration::from_nanos(skipped as u64);
        }
    }

    /// Move the clock forward to `until`. The clock never goes backwards.
    pub(crate) fn advance(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Take the callbacks for the current frame.
    ///
    /// Anything requested while these run belongs to the following frame.
    pub(crate) fn take_frame(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.frame_callbacks)
    }

    /// The time the next timer is due, if any.
    pub(crate) fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|timer| timer.due).min()
    }

    pub(crate) fn pending_frame_callbacks(&self) -> usize {
        self.frame_callbacks.len()
    }

    fn push(&mut self, due: Duration, period: Option<Duration>, task: Task) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.timers.push(Timer { due, sequence, period, task });
    }
}
