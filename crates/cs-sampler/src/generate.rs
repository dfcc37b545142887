use crate::error::Result;
use crate::sampler::{CutoffSampler, Sample};
use tracing::debug;

/// Produces one logits vector per generation step.
///
/// Implemented by the caller's model adapter. `last` is the token sampled in
/// the previous step, or `None` on the first step (the prompt is the
/// adapter's business).
pub trait LogitsSource {
    fn next_logits(&mut self, last: Option<u32>) -> Result<Vec<f32>>;
}

impl<S: LogitsSource + ?Sized> LogitsSource for &mut S {
    fn next_logits(&mut self, last: Option<u32>) -> Result<Vec<f32>> {
        (**self).next_logits(last)
    }
}

/// Adapter turning a closure into a [`LogitsSource`].
pub struct FnSource<F>(F);

/// Wrap a closure as a [`LogitsSource`].
pub fn from_fn<F>(f: F) -> FnSource<F>
where
    F: FnMut(Option<u32>) -> Result<Vec<f32>>,
{
    FnSource(f)
}

impl<F> LogitsSource for FnSource<F>
where
    F: FnMut(Option<u32>) -> Result<Vec<f32>>,
{
    fn next_logits(&mut self, last: Option<u32>) -> Result<Vec<f32>> {
        (self.0)(last)
    }
}

/// Limits for a generation stream.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateParams {
    /// Maximum number of sampling steps.
    pub max_tokens: usize,
    /// Stop as soon as this token is sampled. The stop token is not yielded.
    pub eos_token: Option<u32>,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            max_tokens: 100,
            eos_token: None,
        }
    }
}

/// Iterator over the samples of one generation stream.
///
/// Yields `Err` at most once, then ends.
pub struct Generation<'a, S> {
    sampler: &'a mut CutoffSampler,
    source: S,
    params: GenerateParams,
    steps: usize,
    last: Option<u32>,
    done: bool,
}

impl<'a, S: LogitsSource> Generation<'a, S> {
    pub(crate) fn new(sampler: &'a mut CutoffSampler, source: S, params: GenerateParams) -> Self {
        Self {
            sampler,
            source,
            params,
            steps: 0,
            last: None,
            done: false,
        }
    }

    /// Number of sampling steps taken so far, including a final stop token.
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn finish(&mut self, reason: &'static str) {
        self.done = true;
        debug!(reason, steps = self.steps, "generation finished");
    }
}

impl<S: LogitsSource> Iterator for Generation<'_, S> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.steps >= self.params.max_tokens {
            self.finish("max_tokens");
            return None;
        }

        let step = self
            .source
            .next_logits(self.last)
            .and_then(|logits| self.sampler.sample(&logits));
        self.steps += 1;

        match step {
            Ok(sample) if Some(sample.token_id) == self.params.eos_token => {
                self.finish("eos");
                None
            }
            Ok(sample) => {
                self.last = Some(sample.token_id);
                Some(Ok(sample))
            }
            Err(e) => {
                self.finish("error");
                Some(Err(e))
            }
        }
    }
}
