use crate::distribution::TokenProb;
use crate::error::{Result, SamplerError};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Draw one token from `candidates` in proportion to their probabilities.
///
/// Weights need not sum to 1; each candidate is drawn with probability
/// `p / sum(p)`. Exactly one value is taken from `rng` per call, including for
/// a single candidate, so a stream advances identically whatever the cutoff.
pub fn draw<R: Rng + ?Sized>(candidates: &[TokenProb], rng: &mut R) -> Result<u32> {
    if candidates.is_empty() {
        return Err(SamplerError::invalid("admissible set is empty"));
    }

    let total: f32 = candidates.iter().map(|t| t.probability).sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(SamplerError::invalid(format!(
            "admissible weights must have a finite positive total, got {}",
            total
        )));
    }

    let dist = WeightedIndex::new(candidates.iter().map(|t| t.probability))
        .map_err(|e| SamplerError::invalid(format!("invalid admissible weights: {}", e)))?;

    Ok(candidates[dist.sample(rng)].token_id)
}
