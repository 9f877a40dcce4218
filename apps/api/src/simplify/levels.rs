//! Level mapping — turns the 0–100 simplification slider into generation parameters.
//!
//! Three contiguous bands, upper bound exclusive. A LOWER level means a LONGER
//! and more literal rewrite; a higher level trades length for freer rewording.
//! Do not "fix" this into higher = longer.

use std::fmt;

use serde::Serialize;

use crate::errors::AppError;

/// Upper bound (exclusive) of the Basic band.
const BASIC_UPPER: u8 = 33;
/// Upper bound (exclusive) of the Standard band.
const STANDARD_UPPER: u8 = 66;
pub const MAX_LEVEL: u8 = 100;

/// A simplification level, guaranteed to lie in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Level(u8);

impl Level {
    pub fn new(value: u8) -> Option<Self> {
        (value <= MAX_LEVEL).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Level {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Level::new)
            .ok_or_else(|| out_of_range(&value.to_string()))
    }
}

/// JSON numbers arrive as `f64`; only whole values are accepted.
impl TryFrom<f64> for Level {
    type Error = AppError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(AppError::InvalidInput(format!(
                "Level must be a whole number between 0 and {MAX_LEVEL}."
            )));
        }
        if !(0.0..=f64::from(MAX_LEVEL)).contains(&value) {
            return Err(out_of_range(&value.to_string()));
        }
        Ok(Level(value as u8))
    }
}

fn out_of_range(shown: &str) -> AppError {
    AppError::InvalidInput(format!(
        "Level {shown} is out of range: it must be between 0 and {MAX_LEVEL}."
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StyleLabel {
    Basic,
    Standard,
    Advanced,
}

impl StyleLabel {
    /// Lowercase form used inside the model instruction.
    pub fn as_prompt_word(self) -> &'static str {
        match self {
            StyleLabel::Basic => "basic",
            StyleLabel::Standard => "standard",
            StyleLabel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for StyleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StyleLabel::Basic => "Basic",
            StyleLabel::Standard => "Standard",
            StyleLabel::Advanced => "Advanced",
        };
        f.write_str(label)
    }
}

/// Authoritative generation parameters. Only ever derived from a `Level`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParameters {
    pub max_output_tokens: u32,
    pub min_output_tokens: u32,
    pub temperature: f32,
    pub style: StyleLabel,
}

/// Maps a level onto its band's parameters. Pure: same level, same output.
pub fn parameters_for(level: Level) -> GenerationParameters {
    match level.value() {
        v if v < BASIC_UPPER => GenerationParameters {
            max_output_tokens: 300,
            min_output_tokens: 120,
            temperature: 0.3,
            style: StyleLabel::Basic,
        },
        v if v < STANDARD_UPPER => GenerationParameters {
            max_output_tokens: 220,
            min_output_tokens: 80,
            temperature: 0.7,
            style: StyleLabel::Standard,
        },
        _ => GenerationParameters {
            max_output_tokens: 160,
            min_output_tokens: 40,
            temperature: 1.0,
            style: StyleLabel::Advanced,
        },
    }
}
