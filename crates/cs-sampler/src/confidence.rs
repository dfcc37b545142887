use crate::error::{Result, SamplerError};
use std::fmt;

/// How sure the model was about a step, bucketed from the top probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Confidence {
    Low,
    Medium,
    High,
    Highest,
}

/// `(exclusive lower bound, bucket)`, checked top-down. Anything that clears
/// none of the bounds is `Low`.
const THRESHOLDS: [(f32, Confidence); 3] = [
    (0.95, Confidence::Highest),
    (0.70, Confidence::High),
    (0.30, Confidence::Medium),
];

const ANSI_RESET: &str = "\x1b[0m";

impl Confidence {
    /// Classify the probability of the top token.
    pub fn classify(t0: f32) -> Result<Confidence> {
        if !(0.0..=1.0).contains(&t0) {
            return Err(SamplerError::invalid(format!(
                "top probability must be within [0, 1], got {}",
                t0
            )));
        }
        Ok(THRESHOLDS
            .iter()
            .find(|(lower, _)| t0 > *lower)
            .map_or(Confidence::Low, |(_, bucket)| *bucket))
    }

    pub fn label(self) -> &'static str {
        match self {
            Confidence::Highest => "highest",
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }

    /// ANSI SGR foreground color used when output is colorized.
    pub fn ansi_color(self) -> &'static str {
        match self {
            Confidence::Highest => "\x1b[32m",
            Confidence::High => "\x1b[36m",
            Confidence::Medium => "\x1b[33m",
            Confidence::Low => "\x1b[31m",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Wrap `text` in the color of `confidence`, resetting afterwards.
pub fn paint(text: &str, confidence: Confidence) -> String {
    format!("{}{}{}", confidence.ansi_color(), text, ANSI_RESET)
}
