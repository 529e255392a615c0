//! Read-only configuration consumed by the transition engine.
//!
//! `MenuConfig` follows the same pattern as the rest of the crate's options:
//! a plain struct with sensible defaults and consuming setters.
//!
//! ```ignore
//! let config = MenuConfig::for_screen(390.0, 844.0)
//!     .completion_curve(CompletionCurve::EaseOut)
//!     .dismiss_when_backgrounded(false);
//! config.validate()?;
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::animation::CompletionCurve;

/// Upper bound for a screen-derived menu width.
const MAX_DERIVED_WIDTH: f32 = 240.0;

/// Share of the shorter screen edge a screen-derived menu occupies.
const DERIVED_WIDTH_RATIO: f32 = 0.75;

const DEFAULT_DURATION: Duration = Duration::from_millis(350);

/// Rejected configuration values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("menu width must be a positive finite length, got {0}")]
    InvalidMenuWidth(f32),
    #[error("complete gesture duration must be non-zero")]
    ZeroGestureDuration,
}

/// Panel and animation settings shared by every transition of one menu.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MenuConfig {
    /// Width of the panel in logical pixels
    pub menu_width: f32,
    /// Duration of a committed presentation
    pub present_duration: Duration,
    /// Duration of a committed dismissal
    pub dismiss_duration: Duration,
    /// Duration of the animation that runs once a gesture is released
    pub complete_gesture_duration: Duration,
    /// Curve for committed presentations and dismissals
    pub animation_curve: CompletionCurve,
    /// Curve for the animation that completes or reverses a gesture
    pub completion_curve: CompletionCurve,
    /// Cancel live gestures when the host application is backgrounded
    pub dismiss_when_backgrounded: bool,
    /// Dismiss the panel when the host rotates instead of laying it out again
    pub dismiss_on_rotation: bool,
}

impl MenuConfig {
    /// Configuration whose width is derived from the host screen size:
    /// three quarters of the shorter edge, capped at 240.
    pub fn for_screen(width: f32, height: f32) -> Self {
        let derived = (width.min(height) * DERIVED_WIDTH_RATIO).round();
        Self {
            menu_width: derived.min(MAX_DERIVED_WIDTH),
            ..Self::default()
        }
    }

    pub fn menu_width(mut self, width: f32) -> Self {
        self.menu_width = width;
        self
    }

    pub fn present_duration(mut self, duration: Duration) -> Self {
        self.present_duration = duration;
        self
    }

    pub fn dismiss_duration(mut self, duration: Duration) -> Self {
        self.dismiss_duration = duration;
        self
    }

    pub fn complete_gesture_duration(mut self, duration: Duration) -> Self {
        self.complete_gesture_duration = duration;
        self
    }

    pub fn animation_curve(mut self, curve: CompletionCurve) -> Self {
        self.animation_curve = curve;
        self
    }

    pub fn completion_curve(mut self, curve: CompletionCurve) -> Self {
        self.completion_curve = curve;
        self
    }

    pub fn dismiss_when_backgrounded(mut self, dismiss: bool) -> Self {
        self.dismiss_when_backgrounded = dismiss;
        self
    }

    pub fn dismiss_on_rotation(mut self, dismiss: bool) -> Self {
        self.dismiss_on_rotation = dismiss;
        self
    }

    /// Check the values a driver cannot work with.
    ///
    /// Zero present/dismiss durations are allowed and behave like
    /// non-animated transitions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.menu_width.is_finite() || self.menu_width <= 0.0 {
            return Err(ConfigError::InvalidMenuWidth(self.menu_width));
        }
        if self.complete_gesture_duration.is_zero() {
            return Err(ConfigError::ZeroGestureDuration);
        }
        Ok(())
    }

    /// Duration of a committed transition in the given direction.
    pub(crate) fn duration_for(&self, presenting: bool) -> Duration {
        if presenting {
            self.present_duration
        } else {
            self.dismiss_duration
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            menu_width: MAX_DERIVED_WIDTH,
            present_duration: DEFAULT_DURATION,
            dismiss_duration: DEFAULT_DURATION,
            complete_gesture_duration: DEFAULT_DURATION,
            animation_curve: CompletionCurve::EaseInOut,
            completion_curve: CompletionCurve::EaseIn,
            dismiss_when_backgrounded: true,
            dismiss_on_rotation: true,
        }
    }
}
