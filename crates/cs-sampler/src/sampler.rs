use crate::config::SamplingConfig;
use crate::confidence::{paint, Confidence};
use crate::cutoff::Cutoff;
use crate::distribution::Distribution;
use crate::error::Result;
use crate::generate::{GenerateParams, Generation, LogitsSource};
use crate::weighted::draw;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

/// Outcome of one sampling step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// The drawn token.
    pub token_id: u32,
    /// Probability of the most likely token, whichever token was drawn.
    pub t0: f32,
    /// Size of the admissible set the token was drawn from.
    pub admissible: usize,
    pub confidence: Confidence,
}

impl Sample {
    /// Token text as it should be printed: painted in the confidence color
    /// when `colorize` is on, unchanged otherwise.
    pub fn render(&self, text: &str, colorize: bool) -> String {
        if colorize {
            paint(text, self.confidence)
        } else {
            text.to_string()
        }
    }
}

/// Run one sampling step with an explicit random source.
///
/// 1. Softmax the logits and sort descending.
/// 2. Keep the admissible prefix under `cutoff`.
/// 3. Draw from it in proportion to probability.
/// 4. Classify the top probability.
pub fn sample_with<R: Rng + ?Sized>(logits: &[f32], cutoff: Cutoff, rng: &mut R) -> Result<Sample> {
    let dist = Distribution::from_logits(logits)?;
    let admissible = cutoff.select(&dist)?;
    let token_id = draw(admissible.candidates(), rng)?;
    let confidence = Confidence::classify(admissible.t0())?;

    trace!(
        vocab = dist.len(),
        admissible = admissible.len(),
        t0 = admissible.t0(),
        token_id,
        %confidence,
        "sampled token"
    );

    Ok(Sample {
        token_id,
        t0: admissible.t0(),
        admissible: admissible.len(),
        confidence,
    })
}

/// Ratio-cutoff sampler for a single generation stream.
///
/// Owns its random source. Streams running side by side should each own a
/// sampler; one sampler shared across threads needs an outer lock.
#[derive(Debug, Clone)]
pub struct CutoffSampler {
    cutoff: Cutoff,
    rng: StdRng,
}

impl CutoffSampler {
    /// Create a sampler from run configuration.
    pub fn new(config: &SamplingConfig) -> Result<Self> {
        let cutoff = config.cutoff()?;
        let sampler = match config.seed {
            Some(seed) => Self::with_seed(cutoff, seed),
            None => {
                debug!(cutoff = cutoff.value(), "sampler seeded from entropy");
                Self::from_rng(cutoff, StdRng::from_entropy())
            }
        };
        Ok(sampler)
    }

    /// Create a sampler with a deterministic seed.
    pub fn with_seed(cutoff: Cutoff, seed: u64) -> Self {
        debug!(cutoff = cutoff.value(), seed, "sampler seeded");
        Self::from_rng(cutoff, StdRng::seed_from_u64(seed))
    }

    pub fn from_rng(cutoff: Cutoff, rng: StdRng) -> Self {
        Self { cutoff, rng }
    }

    pub fn cutoff(&self) -> Cutoff {
        self.cutoff
    }

    /// Change the cutoff between steps.
    pub fn set_cutoff(&mut self, cutoff: Cutoff) {
        debug!(from = self.cutoff.value(), to = cutoff.value(), "cutoff changed");
        self.cutoff = cutoff;
    }

    /// Sample the next token from one step's logits.
    pub fn sample(&mut self, logits: &[f32]) -> Result<Sample> {
        sample_with(logits, self.cutoff, &mut self.rng).inspect_err(|e| {
            warn!(error = %e, vocab = logits.len(), "sampling step failed");
        })
    }

    /// Drive a generation stream, feeding each drawn token back to `source`.
    pub fn generate<S: LogitsSource>(
        &mut self,
        source: S,
        params: GenerateParams,
    ) -> Generation<'_, S> {
        Generation::new(self, source, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SamplerError;
    use approx::assert_abs_diff_eq;

    const EXAMPLE: [f32; 4] = [2.0, 1.0, 0.1, 0.1];

    fn sampler(co: f32, seed: u64) -> CutoffSampler {
        CutoffSampler::with_seed(Cutoff::new(co).unwrap(), seed)
    }

    #[test]
    fn test_example_step() {
        let mut s = sampler(0.65, 3);
        for _ in 0..200 {
            let out = s.sample(&EXAMPLE).unwrap();
            assert!(out.token_id == 0 || out.token_id == 1);
            assert_eq!(out.admissible, 2);
            assert_abs_diff_eq!(out.t0, 0.5998, epsilon = 1e-3);
            assert_eq!(out.confidence, Confidence::Medium);
        }
    }

    #[test]
    fn test_zero_cutoff_is_greedy() {
        for seed in 0..20 {
            let mut s = sampler(0.0, seed);
            for _ in 0..20 {
                assert_eq!(s.sample(&EXAMPLE).unwrap().token_id, 0);
            }
        }
    }

    #[test]
    fn test_full_cutoff_admits_vocabulary() {
        let mut s = sampler(1.0, 5);
        let out = s.sample(&EXAMPLE).unwrap();
        assert_eq!(out.admissible, EXAMPLE.len());
    }

    #[test]
    fn test_same_seed_same_stream() {
        let logits: Vec<f32> = (0..32).map(|i| (i % 7) as f32 * 0.3).collect();
        let mut a = sampler(0.9, 11);
        let mut b = sampler(0.9, 11);
        for _ in 0..100 {
            assert_eq!(a.sample(&logits).unwrap(), b.sample(&logits).unwrap());
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let mut s = sampler(0.7, 0);
        assert!(matches!(s.sample(&[]), Err(SamplerError::InvalidInput(_))));
        assert!(s.sample(&[1.0, f32::NAN]).is_err());
        assert!(CutoffSampler::new(&SamplingConfig::default().with_cutoff(1.5)).is_err());
    }

    #[test]
    fn test_new_from_config() {
        let cfg = SamplingConfig::default().with_cutoff(0.0).with_seed(1);
        let mut s = CutoffSampler::new(&cfg).unwrap();
        assert_eq!(s.cutoff().value(), 0.0);
        assert_eq!(s.sample(&EXAMPLE).unwrap().token_id, 0);

        let mut unseeded = CutoffSampler::new(&SamplingConfig::default()).unwrap();
        assert!(unseeded.sample(&EXAMPLE).is_ok());
    }

    #[test]
    fn test_set_cutoff_between_steps() {
        let mut s = sampler(1.0, 2);
        assert_eq!(s.sample(&EXAMPLE).unwrap().admissible, 4);
        s.set_cutoff(Cutoff::new(0.0).unwrap());
        assert_eq!(s.sample(&EXAMPLE).unwrap().admissible, 1);
    }

    #[test]
    fn test_render() {
        let out = sampler(0.0, 0).sample(&EXAMPLE).unwrap();
        assert_eq!(out.render("tok", false), "tok");
        assert_eq!(out.render("tok", true), paint("tok", Confidence::Medium));
    }
}
