use crate::cutoff::{Cutoff, DEFAULT_CUTOFF};
use crate::error::{Result, SamplerError};

/// Option name for the cutoff, as a caller's CLI or config file spells it.
pub const OPT_SAMPLING_CUTOFF: &str = "sampling-cutoff";
/// Option name for confidence-colored output.
pub const OPT_COLORIZE: &str = "colorize";
/// Option name for a fixed random seed.
pub const OPT_SEED: &str = "seed";

/// Run configuration for a sampling stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    /// Probability-ratio cutoff in `[0, 1]`.
    pub cutoff: f32,
    /// Render emitted tokens in their confidence color.
    pub colorize: bool,
    /// Seed for the stream's random source. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            colorize: false,
            seed: None,
        }
    }
}

impl SamplingConfig {
    pub fn with_cutoff(mut self, cutoff: f32) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn with_colorize(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The validated cutoff.
    pub fn cutoff(&self) -> Result<Cutoff> {
        Cutoff::new(self.cutoff)
    }

    pub fn validate(&self) -> Result<()> {
        self.cutoff().map(|_| ())
    }

    /// Apply one `key = value` option given as raw strings.
    ///
    /// Recognized keys: `sampling-cutoff`, `colorize`, `seed`.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key.trim() {
            OPT_SAMPLING_CUTOFF => {
                let co: f32 = value.parse().map_err(|_| {
                    SamplerError::invalid(format!("{}: not a number: {:?}", key, value))
                })?;
                Cutoff::new(co)?;
                self.cutoff = co;
            }
            OPT_COLORIZE => self.colorize = parse_bool(key, value)?,
            OPT_SEED => {
                self.seed = Some(value.parse().map_err(|_| {
                    SamplerError::invalid(format!("{}: not an unsigned integer: {:?}", key, value))
                })?);
            }
            other => {
                return Err(SamplerError::invalid(format!("unknown option: {}", other)));
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(SamplerError::invalid(format!(
            "{}: not a boolean: {:?}",
            key, value
        ))),
    }
}
