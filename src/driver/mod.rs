//! The animation driver seam.
//!
//! The transition engine never moves pixels itself. It talks to an
//! [`AnimationDriver`], which animates the panel however the host renders it
//! and reports the final outcome through the [`CompletionSink`] it was built
//! with. [`TimedDriver`] is a frame-ticked implementation for hosts that just
//! want a panel position to render.

mod timed;

pub use timed::{PanelFrame, TimedDriver};

use std::fmt;
use std::rc::Rc;

use crate::animation::CompletionCurve;
use crate::config::MenuConfig;
use crate::transition::TransitionSide;

/// Shared handle to the driver of one menu.
///
/// Drivers are called re-entrantly (the completion sink may call back into
/// the engine, which may call the driver again), so every method takes
/// `&self` and implementations keep their state behind `Cell`/`RefCell`
/// without holding a borrow across a sink call.
pub type DriverHandle = Rc<dyn AnimationDriver>;

/// Block run in lockstep with a transition, receiving the panel's visible
/// fraction (0.0 hidden, 1.0 fully shown) each time it changes.
pub type AlongsideFn = Box<dyn FnMut(f32)>;

/// Builds a driver for a transition controller.
pub type DriverFactory = Box<dyn Fn(DriverContext) -> DriverHandle>;

/// Final visibility of the panel once a transition has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionOutcome {
    /// The panel ended fully visible
    Presented,
    /// The panel ended hidden
    Dismissed,
}

impl TransitionOutcome {
    /// Outcome for a panel that ends at the given visibility.
    pub fn from_visible(visible: bool) -> Self {
        if visible {
            TransitionOutcome::Presented
        } else {
            TransitionOutcome::Dismissed
        }
    }

    pub fn is_visible(self) -> bool {
        matches!(self, TransitionOutcome::Presented)
    }
}

/// Parameters for starting (or retargeting) a transition.
pub struct TransitionRequest {
    /// Target visibility: true to show the panel, false to hide it
    pub presenting: bool,
    /// False jumps straight to the target and completes synchronously
    pub animated: bool,
    /// Progress will be supplied through `set_interactive_progress`
    pub interactive: bool,
    /// Caller block to run in lockstep with the animation
    pub alongside: Option<AlongsideFn>,
}

impl fmt::Debug for TransitionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionRequest")
            .field("presenting", &self.presenting)
            .field("animated", &self.animated)
            .field("interactive", &self.interactive)
            .field("alongside", &self.alongside.is_some())
            .finish()
    }
}

/// Where a driver reports how a transition ended.
///
/// A driver must call [`complete`](Self::complete) exactly once per
/// transition. Reports the receiver does not expect are dropped.
#[derive(Clone)]
pub struct CompletionSink {
    callback: Rc<dyn Fn(TransitionOutcome)>,
}

impl CompletionSink {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(TransitionOutcome) + 'static,
    {
        Self {
            callback: Rc::new(callback),
        }
    }

    pub fn complete(&self, outcome: TransitionOutcome) {
        (self.callback)(outcome);
    }
}

impl fmt::Debug for CompletionSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CompletionSink")
    }
}

/// Everything a driver is configured with.
#[derive(Debug, Clone)]
pub struct DriverContext {
    pub side: TransitionSide,
    pub config: MenuConfig,
    pub sink: CompletionSink,
}

/// Animates the panel and reports completion.
pub trait AnimationDriver {
    /// Start a transition towards `request.presenting`, or retarget the one
    /// currently running.
    fn begin_transition(&self, request: TransitionRequest);

    /// Scrub an interactive transition to `fraction` of the way to its target.
    fn set_interactive_progress(&self, fraction: f32);

    /// Release an interactive transition: run it to its target when
    /// `forward`, back to where it started otherwise, using `curve`.
    fn complete_interactive(&self, forward: bool, curve: CompletionCurve);

    /// Run `alongside` in lockstep with the rest of the current transition,
    /// in addition to any block already attached.
    fn attach_alongside(&self, alongside: AlongsideFn);

    /// Re-apply geometry after the host's bounds changed.
    fn layout(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_outcome_visibility() {
        assert!(TransitionOutcome::Presented.is_visible());
        assert!(!TransitionOutcome::Dismissed.is_visible());
        assert_eq!(
            TransitionOutcome::from_visible(true),
            TransitionOutcome::Presented
        );
        assert_eq!(
            TransitionOutcome::from_visible(false),
            TransitionOutcome::Dismissed
        );
    }

    #[test]
    fn test_sink_forwards_outcome() {
        let seen = Rc::new(Cell::new(None));
        let seen_clone = seen.clone();
        let sink = CompletionSink::new(move |outcome| seen_clone.set(Some(outcome)));

        sink.clone().complete(TransitionOutcome::Dismissed);
        assert_eq!(seen.get(), Some(TransitionOutcome::Dismissed));
    }
}
