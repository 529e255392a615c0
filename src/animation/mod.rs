mod curve;

pub use curve::CompletionCurve;

/// Linear interpolation between two panel positions.
/// t = 0.0 returns `from`, t = 1.0 returns `to`
#[inline]
pub(crate) fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
