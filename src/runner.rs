use crate::{
    animator::{AnimatorState, BackgroundAnimator},
    document::{Document, Element},
    scheduler::Scheduler,
};
use std::{
    io::{self, Write},
    thread,
    time::{Duration, Instant},
};
use tracing::info;

/// The environment an animation runs in.
pub(crate) trait Host {
    /// Show the document as it is at time `now`.
    fn present(&mut self, now: Duration) -> io::Result<()>;

    /// Whether the host needs frames even if no animation frame callbacks are pending.
    fn is_animating(&self) -> bool;

    /// Wait for up to `timeout`. Returns `true` if the user asked to quit.
    fn wait(&mut self, timeout: Duration) -> io::Result<bool>;
}

/// Drives an animator from the wall clock.
pub(crate) struct Runner {
    scheduler: Scheduler,
    animator: BackgroundAnimator<Element>,
    frame_interval: Duration,
    max_cycles: Option<u64>,
}

impl Runner {
    pub(crate) fn new(
        scheduler: Scheduler,
        animator: BackgroundAnimator<Element>,
        frame_interval: Duration,
        max_cycles: Option<u64>,
    ) -> Self {
        Self { scheduler, animator, frame_interval, max_cycles }
    }

    /// Run until the user quits or the configured number of cycles completes.
    pub(crate) fn run<H: Host>(&mut self, host: &mut H) -> io::Result<AnimatorState> {
        let started = Instant::now().checked_sub(self.scheduler.now()).unwrap_or_else(Instant::now);
        loop {
            let now = started.elapsed();
            self.step(now);
            host.present(now)?;
            if self.is_finished() {
                info!(cycles = self.animator.state().cycles_completed, "requested cycles completed");
                break;
            }
            let timeout = self.wait_timeout(host, now);
            if host.wait(timeout)? {
                info!("quit requested");
                break;
            }
        }
        Ok(self.animator.state())
    }

    /// Run everything that is due at `now` followed by one animation frame.
    ///
    /// Interval runs missed while the process was not scheduled are skipped rather than replayed.
    pub(crate) fn step(&mut self, now: Duration) {
        self.scheduler.skip_missed(now);
        self.animator.run_until(&mut self.scheduler, now);
        self.animator.run_frame(&mut self.scheduler);
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.max_cycles.is_some_and(|max| self.animator.state().cycles_completed >= max)
    }

    fn wait_timeout<H: Host>(&self, host: &H, now: Duration) -> Duration {
        if host.is_animating() || self.scheduler.pending_frame_callbacks() > 0 {
            return self.frame_interval;
        }
        match self.scheduler.next_deadline() {
            Some(deadline) => deadline.saturating_sub(now),
            None => self.frame_interval,
        }
    }
}

/// A host that prints every style assignment instead of drawing anything.
pub(crate) struct PrintHost<W: Write> {
    elements: Vec<Element>,
    writer: W,
}

impl<W: Write> PrintHost<W> {
    pub(crate) fn new(document: &Document, writer: W) -> Self {
        Self { elements: document.elements().to_vec(), writer }
    }
}

impl<W: Write> Host for PrintHost<W> {
    fn present(&mut self, now: Duration) -> io::Result<()> {
        for element in &self.elements {
            for mutation in element.take_mutations() {
                writeln!(self.writer, "{:>8} {} {mutation}", now.as_millis(), element.id())?;
            }
        }
        self.writer.flush()
    }

    fn is_animating(&self) -> bool {
        false
    }

    fn wait(&mut self, timeout: Duration) -> io::Result<bool> {
        thread::sleep(timeout);
        Ok(false)
    }
}
