use cs_sampler::{Confidence, Sample, DEFAULT_CUTOFF};

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CSStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorInvalidInput = 2,
    ErrorInternal = 3,
}

/// Confidence bucket of a sampling step's top probability.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CSConfidence {
    Low = 0,
    Medium = 1,
    High = 2,
    Highest = 3,
}

impl From<Confidence> for CSConfidence {
    fn from(c: Confidence) -> Self {
        match c {
            Confidence::Low => CSConfidence::Low,
            Confidence::Medium => CSConfidence::Medium,
            Confidence::High => CSConfidence::High,
            Confidence::Highest => CSConfidence::Highest,
        }
    }
}

impl From<CSConfidence> for Confidence {
    fn from(c: CSConfidence) -> Self {
        match c {
            CSConfidence::Low => Confidence::Low,
            CSConfidence::Medium => Confidence::Medium,
            CSConfidence::High => Confidence::High,
            CSConfidence::Highest => Confidence::Highest,
        }
    }
}

/// Parameters for creating a sampler.
#[repr(C)]
#[derive(Debug, Clone)]
pub struct CSSamplerParams {
    /// Probability-ratio cutoff in [0, 1].
    pub cutoff: f32,
    /// Seed for the random source, used when `use_seed` is true.
    pub seed: u64,
    /// When false the sampler is seeded from OS entropy.
    pub use_seed: bool,
}

impl Default for CSSamplerParams {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            seed: 0,
            use_seed: false,
        }
    }
}

/// Result of one sampling step.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CSSample {
    pub token_id: u32,
    pub t0: f32,
    pub admissible: u32,
    pub confidence: CSConfidence,
}

impl From<Sample> for CSSample {
    fn from(s: Sample) -> Self {
        Self {
            token_id: s.token_id,
            t0: s.t0,
            admissible: s.admissible.min(u32::MAX as usize) as u32,
            confidence: s.confidence.into(),
        }
    }
}
