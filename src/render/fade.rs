use crate::document::Opacity;
use std::time::Duration;

/// The result of polling something that changes over time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PollableState {
    Unmodified,
    Modified,
    Done,
}

/// Something that needs to be polled to make progress.
pub(crate) trait Pollable {
    fn poll(&mut self, now: Duration) -> PollableState;
}

/// Eases the opacity shown on screen towards the opacity an element is styled with, like a CSS
/// `transition: opacity` does.
#[derive(Debug)]
pub(crate) struct OpacityFade {
    from: f32,
    to: f32,
    current: f32,
    started: Duration,
    duration: Duration,
    settled: bool,
}

impl OpacityFade {
    pub(crate) fn new(initial: Opacity, duration: Duration) -> Self {
        let value = initial.value();
        Self { from: value, to: value, current: value, started: Duration::ZERO, duration, settled: true }
    }

    /// Start fading towards `target` from wherever the fade currently is.
    pub(crate) fn retarget(&mut self, target: Opacity, now: Duration) {
        let target = target.value();
        if target == self.to {
            return;
        }
        self.from = self.current;
        self.to = target;
        self.started = now;
        self.settled = false;
    }

    pub(crate) fn current(&self) -> Opacity {
        Opacity::new(self.current)
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.settled
    }
}

impl Pollable for OpacityFade {
    fn poll(&mut self, now: Duration) -> PollableState {
        if self.settled {
            return PollableState::Unmodified;
        }
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            (now.saturating_sub(self.started).as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        };
        self.current = self.from + (self.to - self.from) * progress;
        if progress >= 1.0 {
            self.current = self.to;
            self.settled = true;
            PollableState::Done
        } else {
            PollableState::Modified
        }
    }
}
