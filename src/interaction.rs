//! Progress sink for one gesture-driven transition.
//!
//! An [`InteractionController`] receives drag progress and forwards it to
//! the driver until it reaches a terminal state. The first terminal call
//! (`finish`, `cancel`, or a background notification) wins; everything
//! after it is ignored.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::animation::CompletionCurve;
use crate::driver::DriverHandle;
use crate::lifecycle::{self, LifecycleEvent, Subscription};

/// Terminal classification of an interactive transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProgressState {
    #[default]
    Active,
    Finished,
    Cancelled,
}

impl ProgressState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ProgressState::Active)
    }
}

/// Gesture vocabulary fed to an interaction controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEvent {
    /// Drag moved; fraction of the way to the target
    Update(f32),
    /// Drag released past the threshold
    Finish,
    /// Drag released short of the threshold, or aborted
    Cancel,
}

/// Construction parameters for an [`InteractionController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionOptions {
    /// Cancel when the host application enters the background
    pub cancel_when_backgrounded: bool,
    /// Curve for the animation that runs once the gesture is released
    pub completion_curve: CompletionCurve,
}

impl Default for InteractionOptions {
    fn default() -> Self {
        Self {
            cancel_when_backgrounded: true,
            completion_curve: CompletionCurve::EaseIn,
        }
    }
}

/// Tracks the progress of exactly one interactive transition.
pub struct InteractionController {
    state: Cell<ProgressState>,
    progress: Cell<f32>,
    options: InteractionOptions,
    driver: RefCell<Option<DriverHandle>>,
    background: RefCell<Option<Subscription>>,
}

impl InteractionController {
    pub fn new(driver: DriverHandle, options: InteractionOptions) -> Rc<Self> {
        let controller = Rc::new(Self {
            state: Cell::new(ProgressState::Active),
            progress: Cell::new(0.0),
            options,
            driver: RefCell::new(Some(driver)),
            background: RefCell::new(None),
        });

        if options.cancel_when_backgrounded {
            let weak = Rc::downgrade(&controller);
            let subscription = lifecycle::subscribe(move |event| match event {
                LifecycleEvent::DidEnterBackground => {
                    if let Some(controller) = weak.upgrade() {
                        log::debug!("application backgrounded, cancelling interactive transition");
                        controller.cancel();
                    }
                }
            });
            *controller.background.borrow_mut() = Some(subscription);
        }

        controller
    }

    pub fn state(&self) -> ProgressState {
        self.state.get()
    }

    /// Last accepted progress value.
    pub fn progress(&self) -> f32 {
        self.progress.get()
    }

    pub fn completion_curve(&self) -> CompletionCurve {
        self.options.completion_curve
    }

    pub fn is_finished(&self) -> bool {
        self.state.get() == ProgressState::Finished
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.get() == ProgressState::Cancelled
    }

    pub fn is_terminal(&self) -> bool {
        self.state.get().is_terminal()
    }

    pub fn update(&self, progress: f32) {
        if self.is_terminal() {
            log::trace!("ignoring progress {} after {:?}", progress, self.state());
            return;
        }
        if !progress.is_finite() {
            log::debug!("ignoring non-finite progress {}", progress);
            return;
        }
        let progress = progress.clamp(0.0, 1.0);
        self.progress.set(progress);

        let driver = self.driver.borrow().clone();
        if let Some(driver) = driver {
            driver.set_interactive_progress(progress);
        }
    }

    pub fn finish(&self) {
        if let Some(driver) = self.terminate(ProgressState::Finished) {
            driver.complete_interactive(true, self.options.completion_curve);
        }
    }

    pub fn cancel(&self) {
        if let Some(driver) = self.terminate(ProgressState::Cancelled) {
            driver.complete_interactive(false, self.options.completion_curve);
        }
    }

    pub fn handle(&self, event: InteractionEvent) {
        match event {
            InteractionEvent::Update(progress) => self.update(progress),
            InteractionEvent::Finish => self.finish(),
            InteractionEvent::Cancel => self.cancel(),
        }
    }

    /// Cancel without touching the driver, for when a newer transition has
    /// taken the driver over.
    pub(crate) fn detach(&self) {
        self.release(ProgressState::Cancelled);
    }

    /// Move to a terminal `state` without touching the driver, for when the
    /// caller drives it directly.
    pub(crate) fn release(&self, state: ProgressState) {
        if self.terminate(state).is_some() {
            log::debug!("released interaction controller as {:?} at progress {}", state, self.progress());
        }
    }

    /// Move to `state` if still active, releasing the driver and the
    /// background subscription. Returns the driver to notify.
    fn terminate(&self, state: ProgressState) -> Option<DriverHandle> {
        if self.is_terminal() {
            log::trace!("ignoring {:?}, already {:?}", state, self.state());
            return None;
        }
        self.state.set(state);
        drop(self.background.borrow_mut().take());
        self.driver.borrow_mut().take()
    }
}

impl std::fmt::Debug for InteractionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionController")
            .field("state", &self.state.get())
            .field("progress", &self.progress.get())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{AlongsideFn, AnimationDriver, TransitionRequest};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Progress(f32),
        Complete(bool, CompletionCurve),
    }

    #[derive(Default)]
    struct RecordingDriver {
        calls: RefCell<Vec<Call>>,
    }

    impl AnimationDriver for RecordingDriver {
        fn begin_transition(&self, _request: TransitionRequest) {}

        fn set_interactive_progress(&self, fraction: f32) {
            self.calls.borrow_mut().push(Call::Progress(fraction));
        }

        fn complete_interactive(&self, forward: bool, curve: CompletionCurve) {
            self.calls.borrow_mut().push(Call::Complete(forward, curve));
        }

        fn attach_alongside(&self, _alongside: AlongsideFn) {}

        fn layout(&self) {}
    }

    fn controller(options: InteractionOptions) -> (Rc<InteractionController>, Rc<RecordingDriver>) {
        let driver = Rc::new(RecordingDriver::default());
        let controller = InteractionController::new(driver.clone(), options);
        (controller, driver)
    }

    #[test]
    fn test_updates_forward_to_driver() {
        let (controller, driver) = controller(InteractionOptions::default());
        controller.update(0.25);
        controller.update(0.5);
        assert_eq!(controller.progress(), 0.5);
        assert_eq!(controller.state(), ProgressState::Active);
        assert_eq!(
            *driver.calls.borrow(),
            vec![Call::Progress(0.25), Call::Progress(0.5)]
        );
    }

    #[test]
    fn test_update_clamps_and_skips_nan() {
        let (controller, driver) = controller(InteractionOptions::default());
        controller.update(1.7);
        controller.update(f32::NAN);
        controller.update(-3.0);
        assert_eq!(
            *driver.calls.borrow(),
            vec![Call::Progress(1.0), Call::Progress(0.0)]
        );
    }

    #[test]
    fn test_finish_is_terminal_and_idempotent() {
        let (controller, driver) = controller(InteractionOptions::default());
        controller.update(0.6);
        controller.finish();
        controller.update(0.9);
        controller.finish();
        controller.cancel();

        assert_eq!(controller.state(), ProgressState::Finished);
        assert_eq!(controller.progress(), 0.6);
        assert_eq!(
            *driver.calls.borrow(),
            vec![
                Call::Progress(0.6),
                Call::Complete(true, CompletionCurve::EaseIn)
            ]
        );
    }

    #[test]
    fn test_cancel_before_finish_wins() {
        let (controller, driver) = controller(InteractionOptions::default());
        controller.cancel();
        controller.finish();
        assert!(controller.is_cancelled());
        assert!(!controller.is_finished());
        assert_eq!(
            *driver.calls.borrow(),
            vec![Call::Complete(false, CompletionCurve::EaseIn)]
        );
    }

    #[test]
    fn test_handle_dispatches_events() {
        let options = InteractionOptions {
            completion_curve: CompletionCurve::Linear,
            ..InteractionOptions::default()
        };
        let (controller, driver) = controller(options);
        controller.handle(InteractionEvent::Update(0.3));
        controller.handle(InteractionEvent::Finish);
        controller.handle(InteractionEvent::Cancel);
        assert!(controller.is_finished());
        assert_eq!(
            *driver.calls.borrow(),
            vec![
                Call::Progress(0.3),
                Call::Complete(true, CompletionCurve::Linear)
            ]
        );
    }

    #[test]
    fn test_background_cancels() {
        let (controller, driver) = controller(InteractionOptions::default());
        controller.update(0.5);
        lifecycle::post(LifecycleEvent::DidEnterBackground);

        assert_eq!(controller.state(), ProgressState::Cancelled);
        controller.finish();
        assert_eq!(controller.state(), ProgressState::Cancelled);
        assert_eq!(
            *driver.calls.borrow(),
            vec![
                Call::Progress(0.5),
                Call::Complete(false, CompletionCurve::EaseIn)
            ]
        );
    }

    #[test]
    fn test_background_ignored_when_disabled() {
        let options = InteractionOptions {
            cancel_when_backgrounded: false,
            ..InteractionOptions::default()
        };
        let (controller, _driver) = controller(options);
        assert_eq!(lifecycle::subscriber_count(), 0);
        lifecycle::post(LifecycleEvent::DidEnterBackground);
        assert_eq!(controller.state(), ProgressState::Active);
    }

    #[test]
    fn test_subscription_released_on_drop_and_terminal() {
        let (first, _d1) = controller(InteractionOptions::default());
        let (second, _d2) = controller(InteractionOptions::default());
        assert_eq!(lifecycle::subscriber_count(), 2);

        first.finish();
        assert_eq!(lifecycle::subscriber_count(), 1);

        drop(second);
        assert_eq!(lifecycle::subscriber_count(), 0);
        drop(first);
    }

    #[test]
    fn test_release_as_finished_skips_driver() {
        let (controller, driver) = controller(InteractionOptions::default());
        controller.update(0.2);
        controller.release(ProgressState::Finished);
        controller.cancel();
        assert!(controller.is_finished());
        assert_eq!(lifecycle::subscriber_count(), 0);
        assert_eq!(*driver.calls.borrow(), vec![Call::Progress(0.2)]);
    }

    #[test]
    fn test_detach_skips_driver() {
        let (controller, driver) = controller(InteractionOptions::default());
        controller.detach();
        controller.update(0.4);
        controller.finish();
        assert!(controller.is_cancelled());
        assert!(driver.calls.borrow().is_empty());
    }
}
