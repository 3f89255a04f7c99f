use crate::{
    color::Color,
    config::AnimatorConfig,
    document::{Document, Element, Opacity, Surface},
    gradient::{Angle, LinearGradient},
    scheduler::{Scheduler, Task},
};
use std::time::Duration;
use tracing::{debug, info};

/// The delays that make up an animation cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Timing {
    /// Time between the start of two consecutive cycles.
    pub(crate) period: Duration,

    /// Time between fading out and applying the new gradient.
    pub(crate) fade_delay: Duration,

    /// Number of animation frames to wait after applying the gradient before fading back in.
    pub(crate) fade_in_frames: u8,
}

impl Default for Timing {
    fn default() -> Self {
        Self { period: Duration::from_millis(5000), fade_delay: Duration::from_millis(2000), fade_in_frames: 2 }
    }
}

impl From<&AnimatorConfig> for Timing {
    fn from(config: &AnimatorConfig) -> Self {
        Self {
            period: Duration::from_millis(config.period_millis),
            fade_delay: Duration::from_millis(config.fade_delay_millis),
            fade_in_frames: config.fade_in_frames,
        }
    }
}

/// The animator's mutable state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct AnimatorState {
    /// The gradient angle of the most recent cycle.
    pub(crate) angle: Angle,

    /// Cycles that have faded out.
    pub(crate) cycles_started: u64,

    /// Cycles that have faded back in.
    pub(crate) cycles_completed: u64,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AnimatorError {
    #[error("element '{0}' not found in document")]
    ElementNotFound(String),
}

/// Crossfades a surface between random linear gradients.
///
/// Every cycle the angle moves one degree, the surface fades out, the new gradient is applied
/// after the fade delay, and the surface fades back in a few animation frames later.
pub(crate) struct BackgroundAnimator<S> {
    surface: S,
    state: AnimatorState,
    timing: Timing,
    rng: fastrand::Rng,
}

impl BackgroundAnimator<Element> {
    /// Start animating the element named by `config.target`.
    ///
    /// Nothing is scheduled if the element doesn't exist.
    pub(crate) fn attach(
        document: &Document,
        config: &AnimatorConfig,
        scheduler: &mut Scheduler,
    ) -> Result<Self, AnimatorError> {
        let target = &config.target;
        let element = document.element_by_id(target).ok_or_else(|| AnimatorError::ElementNotFound(target.clone()))?;
        let rng = config.seed.map(fastrand::Rng::with_seed).unwrap_or_else(fastrand::Rng::new);
        let state = AnimatorState { angle: Angle::new(config.initial_angle), ..Default::default() };
        Ok(Self::start(element, state, Timing::from(config), rng, scheduler))
    }
}

impl<S: Surface> BackgroundAnimator<S> {
    pub(crate) fn start(
        surface: S,
        state: AnimatorState,
        timing: Timing,
        rng: fastrand::Rng,
        scheduler: &mut Scheduler,
    ) -> Self {
        info!(
            period = ?timing.period,
            fade_delay = ?timing.fade_delay,
            angle = %state.angle,
            "starting background animation"
        );
        scheduler.set_interval(timing.period, Task::Cycle);
        Self { surface, state, timing, rng }
    }

    pub(crate) fn state(&self) -> AnimatorState {
        self.state
    }

    /// Execute a single task.
    pub(crate) fn handle(&mut self, task: Task, scheduler: &mut Scheduler) {
        debug!(?task, now = ?scheduler.now(), "running task");
        match task {
            Task::Cycle => self.tick(scheduler),
            Task::Reveal(gradient) => self.reveal(gradient, scheduler),
            Task::FadeIn { deferrals } => self.fade_in(deferrals, scheduler),
        }
    }

    /// Run every timer that is due at or before `until`, in due order.
    pub(crate) fn run_until(&mut self, scheduler: &mut Scheduler, until: Duration) {
        while let Some(task) = scheduler.next_due(until) {
            self.handle(task, scheduler);
        }
        scheduler.advance(until);
    }

    /// Run the callbacks registered for the current animation frame.
    pub(crate) fn run_frame(&mut self, scheduler: &mut Scheduler) {
        for task in scheduler.take_frame() {
            self.handle(task, scheduler);
        }
    }

    fn tick(&mut self, scheduler: &mut Scheduler) {
        self.state.angle = self.state.angle.next();
        self.state.cycles_started += 1;
        let from = Color::random(&mut self.rng);
        let to = Color::random(&mut self.rng);
        let gradient = LinearGradient::new(self.state.angle, from, to);

        self.surface.set_opacity(Opacity::TRANSPARENT);
        scheduler.set_timeout(self.timing.fade_delay, Task::Reveal(gradient));
    }

    fn reveal(&mut self, gradient: LinearGradient, scheduler: &mut Scheduler) {
        debug!(%gradient, "applying gradient");
        self.surface.set_background_image(gradient);
        self.surface.set_opacity(Opacity::TRANSPARENT);
        self.fade_in(self.timing.fade_in_frames, scheduler);
    }

    fn fade_in(&mut self, deferrals: u8, scheduler: &mut Scheduler) {
        match deferrals {
            0 => {
                self.surface.set_opacity(Opacity::OPAQUE);
                self.state.cycles_completed += 1;
            }
            n => scheduler.request_animation_frame(Task::FadeIn { deferrals: n - 1 }),
        }
    }
}
