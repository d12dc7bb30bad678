//! Perceptual volume curve.
//!
//! Sliders work in a linear 0-100 percentage; mixers take gain in decibels. The curve
//! uses a factor of 40 rather than the physical amplitude factor of 20, which makes it
//! twice as steep as amplitude dB. Stored mixer values depend on the exact constant.

/// Lowest percentage ever passed into the logarithm. Maps to -240 dB.
pub const MIN_PERCENT: f32 = 0.0001;

/// Highest percentage. Maps to 0 dB (unity gain).
pub const MAX_PERCENT: f32 = 100.0;

const CURVE_FACTOR: f32 = 40.0;

/// Stateless conversion between slider percentage and mixer gain.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeCurve;

impl VolumeCurve {
    /// Clamp a slider value into the curve's domain.
    ///
    /// NaN is treated as the floor so it never reaches the mixer.
    pub fn clamp_percent(percent: f32) -> f32 {
        if percent.is_nan() {
            return MIN_PERCENT;
        }
        percent.clamp(MIN_PERCENT, MAX_PERCENT)
    }

    /// Percentage to decibels: `40 * log10(p / 100)` after clamping.
    pub fn to_gain(percent: f32) -> f32 {
        let percent = Self::clamp_percent(percent);
        CURVE_FACTOR * (percent / MAX_PERCENT).log10()
    }

    /// Decibels to percentage: `100 * 10^(dB / 40)`.
    pub fn to_percent(decibels: f32) -> f32 {
        MAX_PERCENT * 10f32.powf(decibels / CURVE_FACTOR)
    }
}
