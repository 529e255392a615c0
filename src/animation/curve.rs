//! Easing curves for panel animations.
//!
//! A [`CompletionCurve`] maps linear time in `[0, 1]` to eased progress in
//! `[0, 1]`. The same curve type is used for committed open/close animations
//! (`MenuConfig::animation_curve`) and for the animation that runs after an
//! interactive gesture is released (`MenuConfig::completion_curve`).

/// Easing curve applied to a panel animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CompletionCurve {
    /// Constant speed
    Linear,
    /// Starts slow, ends fast
    #[default]
    EaseIn,
    /// Starts fast, ends slow
    EaseOut,
    /// Slow start and end, fast middle
    EaseInOut,
}

impl CompletionCurve {
    /// Evaluate the curve at time `t`.
    ///
    /// `t` is clamped to `[0, 1]`, so the result never overshoots: the panel
    /// must not travel past its open or closed edge.
    pub fn evaluate(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            CompletionCurve::Linear => t,
            CompletionCurve::EaseIn => t * t,
            CompletionCurve::EaseOut => t * (2.0 - t),
            CompletionCurve::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}
