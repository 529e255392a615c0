//! Transition controller: owns the driver of one side menu and arbitrates
//! between command-driven and gesture-driven transitions.
//!
//! A host animation system drives it in this order:
//!
//! 1. `animation_controller_for_presented()` / `_for_dismissed()` to get the
//!    driver for the direction being animated,
//! 2. `interaction_controller_for_presentation(&driver)` (or the dismissal
//!    variant), which hands out an [`InteractionController`] only when the
//!    controller was armed with `set_interactive(true)`,
//! 3. `transition(...)` to start the animation.
//!
//! The driver reports how the transition ended; the controller clears its
//! in-flight record and tells its delegate whether the panel ended up
//! presented or dismissed. A cancelled dismissal is reported as a
//! presentation: the delegate always learns the panel's real visibility.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::MenuConfig;
use crate::driver::{
    AlongsideFn, CompletionSink, DriverContext, DriverFactory, DriverHandle, TransitionOutcome,
    TransitionRequest,
};
use crate::interaction::{
    InteractionController, InteractionEvent, InteractionOptions, ProgressState,
};

/// Which screen edge the panel slides in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TransitionSide {
    Left,
    Right,
}

impl TransitionSide {
    /// Direction a hidden panel is offset in: -1.0 for left, 1.0 for right.
    pub fn sign(self) -> f32 {
        match self {
            TransitionSide::Left => -1.0,
            TransitionSide::Right => 1.0,
        }
    }
}

/// Observer of completed transitions. Held weakly.
pub trait TransitionControllerDelegate {
    fn did_present(&self, controller: &TransitionController);
    fn did_dismiss(&self, controller: &TransitionController);
}

/// Called once with the outcome of the transition it was registered with.
pub type CompletionCallback = Box<dyn FnOnce(TransitionOutcome)>;

/// Parameters of a command-driven transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOptions {
    pub presenting: bool,
    pub animated: bool,
    pub interactive: bool,
    /// When false the delegate is not told about this transition; the
    /// completion callback still runs.
    pub complete: bool,
}

impl TransitionOptions {
    pub fn present() -> Self {
        Self {
            presenting: true,
            animated: true,
            interactive: false,
            complete: true,
        }
    }

    pub fn dismiss() -> Self {
        Self {
            presenting: false,
            ..Self::present()
        }
    }

    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn complete(mut self, complete: bool) -> Self {
        self.complete = complete;
        self
    }
}

/// The transition currently in flight.
struct ActiveTransition {
    presenting: bool,
    notify_delegate: bool,
    completions: Vec<CompletionCallback>,
}

struct Shared {
    side: TransitionSide,
    config: MenuConfig,
    factory: DriverFactory,
    /// One-shot: the next interaction request gets a controller
    interactive: Cell<bool>,
    presented: Cell<bool>,
    /// Bumped per driver; reports from older drivers are dropped
    generation: Cell<u64>,
    animator: RefCell<Option<DriverHandle>>,
    active: RefCell<Option<ActiveTransition>>,
    interaction: RefCell<Weak<InteractionController>>,
    delegate: RefCell<Option<Weak<dyn TransitionControllerDelegate>>>,
}

/// Owns the animation of one side menu.
///
/// No method fails: calls that make no sense at the moment (gesture events
/// with no live gesture, layout with no driver, completion reports with
/// nothing in flight) are ignored. They happen routinely when UI events
/// interleave.
pub struct TransitionController {
    shared: Rc<Shared>,
}

impl TransitionController {
    pub fn new<F>(side: TransitionSide, config: MenuConfig, factory: F) -> Self
    where
        F: Fn(DriverContext) -> DriverHandle + 'static,
    {
        Self {
            shared: Rc::new(Shared {
                side,
                config,
                factory: Box::new(factory),
                interactive: Cell::new(false),
                presented: Cell::new(false),
                generation: Cell::new(0),
                animator: RefCell::new(None),
                active: RefCell::new(None),
                interaction: RefCell::new(Weak::new()),
                delegate: RefCell::new(None),
            }),
        }
    }

    pub fn side(&self) -> TransitionSide {
        self.shared.side
    }

    pub fn config(&self) -> &MenuConfig {
        &self.shared.config
    }

    pub fn set_delegate<D>(&self, delegate: &Rc<D>)
    where
        D: TransitionControllerDelegate + 'static,
    {
        let weak = Rc::downgrade(delegate);
        let weak: Weak<dyn TransitionControllerDelegate> = weak;
        *self.shared.delegate.borrow_mut() = Some(weak);
    }

    /// Arm (or disarm) interactive mode for the next transition only.
    pub fn set_interactive(&self, interactive: bool) {
        self.shared.interactive.set(interactive);
    }

    pub fn is_interactive(&self) -> bool {
        self.shared.interactive.get()
    }

    /// True while a transition is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.shared.active.borrow().is_some()
    }

    /// Visibility reported by the last completed transition.
    pub fn is_presented(&self) -> bool {
        self.shared.presented.get()
    }

    /// The live interaction controller, if a gesture is attached.
    pub fn active_interaction(&self) -> Option<Rc<InteractionController>> {
        self.shared.interaction.borrow().upgrade()
    }

    /// Driver for a presentation.
    ///
    /// A new driver is built unless a transition is already in flight, in
    /// which case that transition's driver keeps governing it.
    pub fn animation_controller_for_presented(&self) -> Option<DriverHandle> {
        if self.is_transitioning() {
            log::debug!("presentation requested mid-transition, reusing driver");
            if let Some(driver) = self.shared.animator.borrow().clone() {
                return Some(driver);
            }
        }
        Some(self.make_driver())
    }

    /// Driver for a dismissal: the one that presented the panel.
    pub fn animation_controller_for_dismissed(&self) -> Option<DriverHandle> {
        self.shared.animator.borrow().clone()
    }

    pub fn interaction_controller_for_presentation(
        &self,
        driver: &DriverHandle,
    ) -> Option<Rc<InteractionController>> {
        self.interaction_controller(driver)
    }

    pub fn interaction_controller_for_dismissal(
        &self,
        driver: &DriverHandle,
    ) -> Option<Rc<InteractionController>> {
        self.interaction_controller(driver)
    }

    /// Hand out a fresh interaction controller if interactive mode is armed.
    ///
    /// Consumes the armed flag. Any previous controller is detached so stale
    /// handles to it cannot reach the driver again.
    pub fn interaction_controller(&self, driver: &DriverHandle) -> Option<Rc<InteractionController>> {
        if !self.shared.interactive.replace(false) {
            return None;
        }

        let previous = self.shared.interaction.borrow().upgrade();
        if let Some(previous) = previous {
            previous.detach();
        }

        let controller = InteractionController::new(
            driver.clone(),
            InteractionOptions {
                cancel_when_backgrounded: self.shared.config.dismiss_when_backgrounded,
                completion_curve: self.shared.config.completion_curve,
            },
        );
        *self.shared.interaction.borrow_mut() = Rc::downgrade(&controller);
        log::debug!("{:?} interaction controller armed", self.shared.side);
        Some(controller)
    }

    /// Forward a gesture event to the live interaction controller.
    pub fn handle(&self, event: InteractionEvent) {
        match self.active_interaction() {
            Some(controller) => controller.handle(event),
            None => log::trace!("no live interaction for {:?}", event),
        }
    }

    /// Lay the panel out again after the host's geometry changed.
    pub fn layout(&self) {
        let driver = self.shared.animator.borrow().clone();
        if let Some(driver) = driver {
            driver.layout();
        }
    }

    /// Host rotated: dismiss a settled, visible panel when configured to,
    /// otherwise lay it out again.
    pub fn host_did_rotate(&self) {
        if self.shared.config.dismiss_on_rotation && self.is_presented() && !self.is_transitioning()
        {
            self.transition(TransitionOptions::dismiss().animated(false), None, None);
        } else {
            self.layout();
        }
    }

    pub fn present(&self, animated: bool) {
        self.transition(TransitionOptions::present().animated(animated), None, None);
    }

    pub fn dismiss(&self, animated: bool) {
        self.transition(TransitionOptions::dismiss().animated(animated), None, None);
    }

    /// Start, reverse or resolve a transition.
    ///
    /// A command that arrives while a gesture is driving the panel resolves
    /// the gesture instead: it finishes it when both point the same way and
    /// cancels it otherwise. An animated command lets the driver run its
    /// completion animation with `alongside` attached; a non-animated one
    /// jumps straight to the target. `completion` runs exactly once with the
    /// final outcome, even when a later command retargets the transition.
    /// The latest command's `complete` flag decides whether the delegate is
    /// told.
    pub fn transition(
        &self,
        options: TransitionOptions,
        alongside: Option<AlongsideFn>,
        completion: Option<CompletionCallback>,
    ) {
        let mut completion = completion;
        let live = self
            .active_interaction()
            .filter(|controller| !controller.is_terminal());

        if !options.interactive {
            if let Some(live) = &live {
                let same_direction = {
                    let mut active = self.shared.active.borrow_mut();
                    let same = active.as_mut().map(|record| {
                        let same = record.presenting == options.presenting;
                        record.presenting = options.presenting;
                        record.notify_delegate = options.complete;
                        record.completions.extend(completion.take());
                        same
                    });
                    same
                };
                if let Some(same_direction) = same_direction {
                    log::debug!(
                        "command resolves live gesture ({}, animated {})",
                        if same_direction { "finish" } else { "cancel" },
                        options.animated
                    );
                    let driver = self.ensure_driver();
                    if !options.animated {
                        // Jump to the target; the driver completes synchronously.
                        live.release(if same_direction {
                            ProgressState::Finished
                        } else {
                            ProgressState::Cancelled
                        });
                        driver.begin_transition(TransitionRequest {
                            presenting: options.presenting,
                            animated: false,
                            interactive: false,
                            alongside,
                        });
                        return;
                    }
                    if let Some(alongside) = alongside {
                        driver.attach_alongside(alongside);
                    }
                    if same_direction {
                        live.finish();
                    } else {
                        live.cancel();
                    }
                    return;
                }
            }
        }

        let interactive = options.interactive && live.is_some();
        if options.interactive && !interactive {
            log::debug!("interactive transition requested without a gesture, animating instead");
        }

        let driver = self.ensure_driver();
        {
            let mut active = self.shared.active.borrow_mut();
            match active.as_mut() {
                Some(record) => {
                    log::debug!(
                        "retargeting in-flight transition: presenting {} -> {}",
                        record.presenting,
                        options.presenting
                    );
                    record.presenting = options.presenting;
                    record.notify_delegate = options.complete;
                    record.completions.extend(completion);
                }
                None => {
                    *active = Some(ActiveTransition {
                        presenting: options.presenting,
                        notify_delegate: options.complete,
                        completions: completion.into_iter().collect(),
                    });
                }
            }
        }

        driver.begin_transition(TransitionRequest {
            presenting: options.presenting,
            animated: options.animated,
            interactive,
            alongside,
        });
    }

    fn ensure_driver(&self) -> DriverHandle {
        let existing = self.shared.animator.borrow().clone();
        match existing {
            Some(driver) => driver,
            None => self.make_driver(),
        }
    }

    fn make_driver(&self) -> DriverHandle {
        let generation = self.shared.generation.get() + 1;
        self.shared.generation.set(generation);

        let weak = Rc::downgrade(&self.shared);
        let sink = CompletionSink::new(move |outcome| {
            if let Some(shared) = weak.upgrade() {
                deliver(&shared, generation, outcome);
            }
        });
        let driver = (self.shared.factory)(DriverContext {
            side: self.shared.side,
            config: self.shared.config.clone(),
            sink,
        });
        *self.shared.animator.borrow_mut() = Some(driver.clone());
        driver
    }
}

/// Completion path shared by every transition.
fn deliver(shared: &Rc<Shared>, generation: u64, outcome: TransitionOutcome) {
    if generation != shared.generation.get() {
        log::debug!("dropping {:?} from a replaced driver", outcome);
        return;
    }
    let Some(record) = shared.active.borrow_mut().take() else {
        log::debug!("dropping {:?}, no transition in flight", outcome);
        return;
    };

    shared.presented.set(outcome.is_visible());

    let interaction = std::mem::take(&mut *shared.interaction.borrow_mut());
    if let Some(interaction) = interaction.upgrade() {
        interaction.detach();
    }

    log::debug!("{:?} transition completed: {:?}", shared.side, outcome);

    // Callbacks first: a re-entrant delegate may start the next transition.
    for completion in record.completions {
        completion(outcome);
    }

    let controller = TransitionController {
        shared: shared.clone(),
    };
    if record.notify_delegate {
        let delegate = shared.delegate.borrow().as_ref().and_then(Weak::upgrade);
        if let Some(delegate) = delegate {
            match outcome {
                TransitionOutcome::Presented => delegate.did_present(&controller),
                TransitionOutcome::Dismissed => delegate.did_dismiss(&controller),
            }
        }
    }
}

impl fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionController")
            .field("side", &self.shared.side)
            .field("interactive", &self.shared.interactive.get())
            .field("presented", &self.shared.presented.get())
            .field("transitioning", &self.is_transitioning())
            .finish()
    }
}
