//! Presentation engine for a slide-in side menu.
//!
//! The crate coordinates the animated transitions of a panel hosted above an
//! application's main content:
//!
//! - committed open/close animations started by a command,
//! - interactive transitions whose progress comes from a drag gesture and
//!   which resolve into a completed or reversed animation,
//! - interruptions: the host going to the background, a second gesture, a
//!   command arriving mid-gesture.
//!
//! [`TransitionController`](transition::TransitionController) owns one
//! menu's [`AnimationDriver`](driver::AnimationDriver) and reports completed
//! transitions to its delegate. Gesture-driven transitions get a fresh
//! [`InteractionController`](interaction::InteractionController) each time.
//!
//! ```ignore
//! let slot = Rc::new(RefCell::new(None));
//! let controller = TransitionController::new(
//!     TransitionSide::Left,
//!     MenuConfig::for_screen(390.0, 844.0),
//!     TimedDriver::tracking_factory(slot.clone()),
//! );
//! controller.present(true);
//! while let Some(driver) = slot.borrow().clone() {
//!     if !driver.tick(Duration::from_millis(16)) { break; }
//! }
//! ```

pub mod animation;
pub mod config;
pub mod driver;
pub mod interaction;
pub mod lifecycle;
pub mod transition;

pub mod prelude {
    pub use crate::animation::CompletionCurve;
    pub use crate::config::{ConfigError, MenuConfig};
    pub use crate::driver::{
        AlongsideFn, AnimationDriver, CompletionSink, DriverContext, DriverHandle, PanelFrame,
        TimedDriver, TransitionOutcome, TransitionRequest,
    };
    pub use crate::interaction::{
        InteractionController, InteractionEvent, InteractionOptions, ProgressState,
    };
    pub use crate::lifecycle::LifecycleEvent;
    pub use crate::transition::{
        CompletionCallback, TransitionController, TransitionControllerDelegate, TransitionOptions,
        TransitionSide,
    };
}
