//! Frame-ticked reference driver.
//!
//! `TimedDriver` keeps the panel's visible fraction (`position`, 0.0 hidden
//! to 1.0 shown) and advances it when the host calls [`TimedDriver::tick`]
//! once per frame. Hosts read [`TimedDriver::frame`] to place the panel.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::{
    AlongsideFn, AnimationDriver, CompletionSink, DriverContext, DriverHandle, TransitionOutcome,
    TransitionRequest,
};
use crate::animation::{lerp, CompletionCurve};
use crate::config::MenuConfig;
use crate::transition::TransitionSide;

/// Horizontal placement of the panel in host coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanelFrame {
    pub x: f32,
    pub width: f32,
}

/// A time-based animation from one position to another.
#[derive(Debug, Clone)]
struct Segment {
    from: f32,
    to: f32,
    elapsed: Duration,
    duration: Duration,
    curve: CompletionCurve,
}

impl Segment {
    /// Segment whose duration scales with the distance left to travel, so a
    /// half-open panel closes in half the configured time.
    fn scaled(from: f32, to: f32, full_duration: Duration, curve: CompletionCurve) -> Self {
        let distance = (to - from).abs().min(1.0);
        let duration = Duration::try_from_secs_f32(full_duration.as_secs_f32() * distance)
            .unwrap_or(Duration::MAX);
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
            curve,
        }
    }

    fn fraction(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    fn position(&self) -> f32 {
        let t = self.fraction();
        if t >= 1.0 {
            return self.to;
        }
        lerp(self.from, self.to, self.curve.evaluate(t))
    }
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    /// Waiting for gesture progress. `origin` is where a cancel returns to.
    Interactive { start: f32, target: f32, origin: f32 },
    Animating(Segment),
}

struct DriverState {
    position: f32,
    bounds_width: Option<f32>,
    frame: PanelFrame,
    phase: Phase,
    alongside: Option<AlongsideFn>,
}

impl DriverState {
    /// Add a block; blocks already attached keep running first.
    fn attach_alongside(&mut self, added: AlongsideFn) {
        self.alongside = Some(match self.alongside.take() {
            Some(mut existing) => {
                let mut added = added;
                Box::new(move |position| {
                    existing(position);
                    added(position);
                })
            }
            None => added,
        });
    }
}

/// Reference [`AnimationDriver`] advanced by [`tick`](Self::tick).
pub struct TimedDriver {
    side: TransitionSide,
    config: MenuConfig,
    sink: CompletionSink,
    state: RefCell<DriverState>,
}

impl TimedDriver {
    pub fn new(context: DriverContext) -> Rc<Self> {
        let DriverContext { side, config, sink } = context;
        let driver = Rc::new(Self {
            side,
            config,
            sink,
            state: RefCell::new(DriverState {
                position: 0.0,
                bounds_width: None,
                frame: PanelFrame::default(),
                phase: Phase::Idle,
                alongside: None,
            }),
        });
        driver.layout();
        driver
    }

    /// Factory for `TransitionController::new` that also hands every created
    /// driver to `slot`, so the host can keep ticking it.
    pub fn tracking_factory(
        slot: Rc<RefCell<Option<Rc<TimedDriver>>>>,
    ) -> impl Fn(DriverContext) -> DriverHandle {
        move |context| {
            let driver = TimedDriver::new(context);
            *slot.borrow_mut() = Some(driver.clone());
            let handle: DriverHandle = driver;
            handle
        }
    }

    /// Visible fraction of the panel.
    pub fn position(&self) -> f32 {
        self.state.borrow().position
    }

    pub fn frame(&self) -> PanelFrame {
        self.state.borrow().frame
    }

    pub fn side(&self) -> TransitionSide {
        self.side
    }

    /// True while a committed or completion animation is running.
    pub fn is_animating(&self) -> bool {
        matches!(self.state.borrow().phase, Phase::Animating(_))
    }

    /// True while waiting for gesture progress.
    pub fn is_interactive(&self) -> bool {
        matches!(self.state.borrow().phase, Phase::Interactive { .. })
    }

    /// Offset of the panel from its fully open placement, signed by side.
    pub fn translation(&self) -> f32 {
        let state = self.state.borrow();
        self.side.sign() * (1.0 - state.position) * state.frame.width
    }

    /// Update the host's width and lay the panel out again.
    pub fn resize(&self, bounds_width: f32) {
        self.state.borrow_mut().bounds_width = Some(bounds_width);
        self.layout();
    }

    /// Advance the running animation by `dt`.
    ///
    /// Returns true while more frames are needed.
    pub fn tick(&self, dt: Duration) -> bool {
        let finished = {
            let mut state = self.state.borrow_mut();
            let Phase::Animating(segment) = &mut state.phase else {
                return false;
            };
            segment.elapsed = segment.elapsed.saturating_add(dt);
            let position = segment.position();
            let done = segment.fraction() >= 1.0;
            state.position = position;
            if done {
                state.phase = Phase::Idle;
            }
            done
        };
        self.relayout_and_notify();
        if finished {
            self.settle();
        }
        !finished
    }

    fn start_segment(&self, segment: Segment) {
        log::trace!(
            "{:?} driver animating {:.3} -> {:.3} over {:?}",
            self.side,
            segment.from,
            segment.to,
            segment.duration
        );
        let immediate = segment.duration.is_zero();
        {
            let mut state = self.state.borrow_mut();
            if immediate {
                state.position = segment.to;
                state.phase = Phase::Idle;
            } else {
                state.phase = Phase::Animating(segment);
            }
        }
        if immediate {
            self.relayout_and_notify();
            self.settle();
        }
    }

    /// Report the end of the transition. Never called with the state borrowed.
    fn settle(&self) {
        let (position, alongside) = {
            let mut state = self.state.borrow_mut();
            (state.position, state.alongside.take())
        };
        drop(alongside);
        let outcome = TransitionOutcome::from_visible(position >= 0.5);
        log::debug!("{:?} driver settled: {:?}", self.side, outcome);
        self.sink.complete(outcome);
    }

    fn relayout_and_notify(&self) {
        self.layout();
        // Run the alongside block without a borrow, it may query the driver.
        let (position, alongside) = {
            let mut state = self.state.borrow_mut();
            (state.position, state.alongside.take())
        };
        if let Some(mut alongside) = alongside {
            alongside(position);
            let mut state = self.state.borrow_mut();
            // Blocks attached while this one ran go after it.
            let attached = state.alongside.take();
            state.alongside = Some(alongside);
            if let Some(attached) = attached {
                state.attach_alongside(attached);
            }
        }
    }
}

impl AnimationDriver for TimedDriver {
    fn begin_transition(&self, request: TransitionRequest) {
        log::debug!("{:?} driver begin {:?}", self.side, request);
        let TransitionRequest {
            presenting,
            animated,
            interactive,
            alongside,
        } = request;
        let target = if presenting { 1.0 } else { 0.0 };

        let start = {
            let mut state = self.state.borrow_mut();
            if let Some(alongside) = alongside {
                state.attach_alongside(alongside);
            }
            state.position
        };

        if interactive && animated {
            let origin = 1.0 - target;
            self.state.borrow_mut().phase = Phase::Interactive {
                start,
                target,
                origin,
            };
            return;
        }

        let duration = if animated {
            self.config.duration_for(presenting)
        } else {
            Duration::ZERO
        };
        self.start_segment(Segment::scaled(
            start,
            target,
            duration,
            self.config.animation_curve,
        ));
    }

    fn set_interactive_progress(&self, fraction: f32) {
        if !fraction.is_finite() {
            return;
        }
        {
            let mut state = self.state.borrow_mut();
            let Phase::Interactive { start, target, .. } = state.phase else {
                log::trace!("ignoring interactive progress outside a gesture");
                return;
            };
            state.position = lerp(start, target, fraction.clamp(0.0, 1.0));
        }
        self.relayout_and_notify();
    }

    fn complete_interactive(&self, forward: bool, curve: CompletionCurve) {
        let (from, to) = {
            let state = self.state.borrow();
            let Phase::Interactive { target, origin, .. } = state.phase else {
                log::trace!("ignoring interactive completion outside a gesture");
                return;
            };
            (state.position, if forward { target } else { origin })
        };
        self.start_segment(Segment::scaled(
            from,
            to,
            self.config.complete_gesture_duration,
            curve,
        ));
    }

    fn attach_alongside(&self, alongside: AlongsideFn) {
        self.state.borrow_mut().attach_alongside(alongside);
    }

    fn layout(&self) {
        let mut state = self.state.borrow_mut();
        let width = match state.bounds_width {
            Some(bounds) => self.config.menu_width.min(bounds),
            None => self.config.menu_width,
        };
        let bounds = state.bounds_width.unwrap_or(width);
        let visible = width * state.position;
        let x = match self.side {
            TransitionSide::Left => visible - width,
            TransitionSide::Right => bounds - visible,
        };
        state.frame = PanelFrame { x, width };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const FRAME: Duration = Duration::from_millis(16);

    fn driver_with_log(
        side: TransitionSide,
    ) -> (Rc<TimedDriver>, Rc<RefCell<Vec<TransitionOutcome>>>) {
        let outcomes = Rc::new(RefCell::new(Vec::new()));
        let outcomes_clone = outcomes.clone();
        let driver = TimedDriver::new(DriverContext {
            side,
            config: MenuConfig::default(),
            sink: CompletionSink::new(move |outcome| outcomes_clone.borrow_mut().push(outcome)),
        });
        (driver, outcomes)
    }

    fn request(presenting: bool, animated: bool, interactive: bool) -> TransitionRequest {
        TransitionRequest {
            presenting,
            animated,
            interactive,
            alongside: None,
        }
    }

    fn run_to_end(driver: &TimedDriver) -> usize {
        let mut frames = 0;
        while driver.tick(FRAME) {
            frames += 1;
            assert!(frames < 1000, "animation never settled");
        }
        frames
    }

    #[test]
    fn test_non_animated_completes_synchronously() {
        let (driver, outcomes) = driver_with_log(TransitionSide::Left);
        driver.begin_transition(request(true, false, false));
        assert_eq!(driver.position(), 1.0);
        assert_eq!(*outcomes.borrow(), vec![TransitionOutcome::Presented]);
        assert!(!driver.is_animating());
    }

    #[test]
    fn test_committed_animation_reports_once() {
        let (driver, outcomes) = driver_with_log(TransitionSide::Left);
        driver.begin_transition(request(true, true, false));
        assert!(driver.is_animating());
        assert!(outcomes.borrow().is_empty());

        let frames = run_to_end(&driver);
        // 350ms at 16ms per frame
        assert!(frames >= 20, "finished too early after {frames} frames");
        assert_eq!(driver.position(), 1.0);
        assert_eq!(*outcomes.borrow(), vec![TransitionOutcome::Presented]);

        assert!(!driver.tick(FRAME));
        assert_eq!(outcomes.borrow().len(), 1);
    }

    #[test]
    fn test_reversal_reports_final_outcome_only() {
        let (driver, outcomes) = driver_with_log(TransitionSide::Left);
        driver.begin_transition(request(true, true, false));
        for _ in 0..5 {
            driver.tick(FRAME);
        }
        assert!(driver.position() > 0.0);

        driver.begin_transition(request(false, true, false));
        run_to_end(&driver);
        assert_eq!(driver.position(), 0.0);
        assert_eq!(*outcomes.borrow(), vec![TransitionOutcome::Dismissed]);
    }

    #[test]
    fn test_interactive_scrub_and_cancel() {
        let (driver, outcomes) = driver_with_log(TransitionSide::Left);
        driver.begin_transition(request(true, true, true));
        assert!(driver.is_interactive());

        driver.set_interactive_progress(0.4);
        assert!((driver.position() - 0.4).abs() < 1e-6);
        assert!(outcomes.borrow().is_empty());

        driver.complete_interactive(false, CompletionCurve::EaseIn);
        run_to_end(&driver);
        assert_eq!(driver.position(), 0.0);
        assert_eq!(*outcomes.borrow(), vec![TransitionOutcome::Dismissed]);
    }

    #[test]
    fn test_interactive_dismissal_finish() {
        let (driver, outcomes) = driver_with_log(TransitionSide::Right);
        driver.begin_transition(request(true, false, false));
        outcomes.borrow_mut().clear();

        driver.begin_transition(request(false, true, true));
        driver.set_interactive_progress(0.75);
        assert!((driver.position() - 0.25).abs() < 1e-6);

        driver.complete_interactive(true, CompletionCurve::Linear);
        run_to_end(&driver);
        assert_eq!(*outcomes.borrow(), vec![TransitionOutcome::Dismissed]);
    }

    #[test]
    fn test_progress_ignored_when_not_interactive() {
        let (driver, outcomes) = driver_with_log(TransitionSide::Left);
        driver.set_interactive_progress(0.5);
        driver.complete_interactive(true, CompletionCurve::Linear);
        assert_eq!(driver.position(), 0.0);
        assert!(outcomes.borrow().is_empty());
    }

    #[test]
    fn test_frame_left_and_right() {
        let (left, _) = driver_with_log(TransitionSide::Left);
        left.resize(400.0);
        assert_eq!(left.frame(), PanelFrame { x: -240.0, width: 240.0 });
        left.begin_transition(request(true, false, false));
        assert_eq!(left.frame(), PanelFrame { x: 0.0, width: 240.0 });
        assert_eq!(left.translation(), 0.0);

        let (right, _) = driver_with_log(TransitionSide::Right);
        right.resize(400.0);
        assert_eq!(right.frame(), PanelFrame { x: 400.0, width: 240.0 });
        assert_eq!(right.translation(), 240.0);
        right.begin_transition(request(true, false, false));
        assert_eq!(right.frame(), PanelFrame { x: 160.0, width: 240.0 });
    }

    #[test]
    fn test_huge_durations_do_not_panic() {
        let outcomes = Rc::new(RefCell::new(Vec::new()));
        let outcomes_clone = outcomes.clone();
        let driver = TimedDriver::new(DriverContext {
            side: TransitionSide::Left,
            config: MenuConfig::default().present_duration(Duration::MAX),
            sink: CompletionSink::new(move |outcome| outcomes_clone.borrow_mut().push(outcome)),
        });
        driver.begin_transition(request(true, true, false));
        assert!(driver.tick(Duration::from_secs(u64::MAX / 4)));
        assert!(outcomes.borrow().is_empty());

        // elapsed saturates instead of overflowing
        assert!(!driver.tick(Duration::MAX));
        assert_eq!(*outcomes.borrow(), vec![TransitionOutcome::Presented]);
    }

    #[test]
    fn test_attached_blocks_all_run() {
        let (driver, _) = driver_with_log(TransitionSide::Left);
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let (first_clone, second_clone) = (first.clone(), second.clone());
        driver.begin_transition(TransitionRequest {
            presenting: true,
            animated: true,
            interactive: false,
            alongside: Some(Box::new(move |_| first_clone.set(first_clone.get() + 1))),
        });
        driver.tick(FRAME);
        driver.attach_alongside(Box::new(move |_| second_clone.set(second_clone.get() + 1)));
        run_to_end(&driver);
        assert!(first.get() > second.get());
        assert!(second.get() > 0);
    }

    #[test]
    fn test_width_capped_by_bounds() {
        let (driver, _) = driver_with_log(TransitionSide::Left);
        driver.resize(200.0);
        assert_eq!(driver.frame().width, 200.0);
    }

    #[test]
    fn test_alongside_runs_in_lockstep() {
        let (driver, _) = driver_with_log(TransitionSide::Left);
        let calls = Rc::new(Cell::new(0));
        let last = Rc::new(Cell::new(-1.0f32));
        let (calls_clone, last_clone) = (calls.clone(), last.clone());
        driver.begin_transition(TransitionRequest {
            presenting: true,
            animated: true,
            interactive: false,
            alongside: Some(Box::new(move |position| {
                calls_clone.set(calls_clone.get() + 1);
                last_clone.set(position);
            })),
        });
        let frames = run_to_end(&driver);
        // one call per tick, including the final one
        assert_eq!(calls.get(), frames + 1);
        assert_eq!(last.get(), 1.0);
    }
}
