//! Bounded numeric inputs for a generation request.
//!
//! Both parameters are driven by range sliders, so every constructor clamps
//! into range and snaps to the slider step. There is no way to hold an
//! out-of-range value.

use std::fmt;

/// Number of generation steps, always within `[StepCount::MIN, StepCount::MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepCount(u16);

impl StepCount {
    pub const MIN: u16 = 4;
    pub const MAX: u16 = 100;
    pub const DEFAULT: u16 = 8;

    pub fn new(steps: u16) -> Self {
        Self(steps.clamp(Self::MIN, Self::MAX))
    }

    /// Maps a raw slider position onto the nearest whole step.
    pub fn from_slider(position: f32) -> Self {
        if position.is_nan() {
            return Self::default();
        }
        let snapped = position
            .round()
            .clamp(f32::from(Self::MIN), f32::from(Self::MAX));
        Self(snapped as u16)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn label(self) -> String {
        format!("Step: {}", self.0)
    }

    /// Decimal text sent as the `num_steps` form field.
    pub fn form_value(self) -> String {
        self.0.to_string()
    }
}

impl Default for StepCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for StepCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Guidance scale in `[1.0, 10.0]` with a resolution of one tenth.
///
/// Stored as whole tenths so the displayed and submitted values never pick up
/// float noise from the slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GuidanceScale(u8);

impl GuidanceScale {
    pub const MIN_TENTHS: u8 = 10;
    pub const MAX_TENTHS: u8 = 100;
    pub const DEFAULT_TENTHS: u8 = 25;
    pub const MIN: f32 = 1.0;
    pub const MAX: f32 = 10.0;
    pub const STEP: f32 = 0.1;

    pub fn from_tenths(tenths: u8) -> Self {
        Self(tenths.clamp(Self::MIN_TENTHS, Self::MAX_TENTHS))
    }

    /// Snaps a raw slider value to the nearest tenth inside the range.
    pub fn from_value(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        let tenths = (value * 10.0).round().clamp(
            f32::from(Self::MIN_TENTHS),
            f32::from(Self::MAX_TENTHS),
        );
        Self(tenths as u8)
    }

    pub fn tenths(self) -> u8 {
        self.0
    }

    pub fn value(self) -> f32 {
        f32::from(self.0) / 10.0
    }

    /// Fixed one-decimal rendering, e.g. `2.5` or `3.0`.
    pub fn display(self) -> String {
        format!("{}.{}", self.0 / 10, self.0 % 10)
    }

    pub fn label(self) -> String {
        format!("Scale: {}", self.display())
    }

    /// Shortest decimal text sent as the `guidance` form field, e.g. `2.5` or `3`.
    pub fn form_value(self) -> String {
        (f64::from(self.0) / 10.0).to_string()
    }
}

impl Default for GuidanceScale {
    fn default() -> Self {
        Self(Self::DEFAULT_TENTHS)
    }
}

impl fmt::Display for GuidanceScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}
