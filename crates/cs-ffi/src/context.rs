use crate::types::CSSamplerParams;
use cs_sampler::{CutoffSampler, SamplingConfig};

/// Opaque handle owning one stream's sampler and random source.
pub struct CSSampler {
    pub sampler: CutoffSampler,
}

impl CSSampler {
    pub fn new(params: &CSSamplerParams) -> cs_sampler::Result<Self> {
        let config = SamplingConfig {
            cutoff: params.cutoff,
            seed: params.use_seed.then_some(params.seed),
            ..SamplingConfig::default()
        };
        Ok(Self {
            sampler: CutoffSampler::new(&config)?,
        })
    }
}
