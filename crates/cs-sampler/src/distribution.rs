use crate::error::{Result, SamplerError};

/// A token ID paired with its probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenProb {
    pub token_id: u32,
    pub probability: f32,
}

/// Convert raw logits into probabilities with a numerically stable softmax.
///
/// The maximum logit is subtracted before exponentiating, so large logits do
/// not overflow and the top entry always gets `exp(0) = 1` before
/// normalization. Accumulation happens in `f64` to keep the sum within
/// rounding of 1 for large vocabularies.
///
/// The output is in vocabulary order (`token_id` = index).
pub fn softmax(logits: &[f32]) -> Result<Vec<TokenProb>> {
    if logits.is_empty() {
        return Err(SamplerError::invalid("logits vector is empty"));
    }
    if logits.len() > u32::MAX as usize {
        return Err(SamplerError::invalid(format!(
            "vocabulary of {} entries does not fit a u32 token id",
            logits.len()
        )));
    }
    if let Some((i, v)) = logits.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(SamplerError::invalid(format!(
            "logit at index {} is not finite ({})",
            i, v
        )));
    }

    let max_logit = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
    let exps: Vec<f64> = logits.iter().map(|&l| (l as f64 - max_logit).exp()).collect();
    let sum: f64 = exps.iter().sum();

    Ok(exps
        .iter()
        .enumerate()
        .map(|(i, e)| TokenProb {
            token_id: i as u32,
            probability: (e / sum) as f32,
        })
        .collect())
}

/// Sort descending by probability.
///
/// The sort is stable, so equal probabilities keep their incoming order. For
/// softmax output that is ascending token id, which keeps sampling
/// reproducible under a fixed seed.
pub fn sort_descending(probs: &mut [TokenProb]) {
    probs.sort_by(|a, b| b.probability.total_cmp(&a.probability));
}

/// A non-empty probability distribution sorted by probability, highest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    probs: Vec<TokenProb>,
}

impl Distribution {
    /// Build the sorted distribution for one generation step.
    pub fn from_logits(logits: &[f32]) -> Result<Self> {
        let mut probs = softmax(logits)?;
        sort_descending(&mut probs);
        Ok(Self { probs })
    }

    /// Wrap probabilities computed elsewhere, sorting them.
    ///
    /// Entries must be finite and non-negative. They are not renormalized.
    pub fn from_probs(mut probs: Vec<TokenProb>) -> Result<Self> {
        if probs.is_empty() {
            return Err(SamplerError::invalid("distribution is empty"));
        }
        if let Some(t) = probs
            .iter()
            .find(|t| !t.probability.is_finite() || t.probability < 0.0)
        {
            return Err(SamplerError::invalid(format!(
                "probability of token {} is not a finite non-negative value ({})",
                t.token_id, t.probability
            )));
        }
        sort_descending(&mut probs);
        Ok(Self { probs })
    }

    /// Number of entries (the vocabulary size).
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// The highest-probability entry.
    pub fn top(&self) -> &TokenProb {
        &self.probs[0]
    }

    pub fn as_slice(&self) -> &[TokenProb] {
        &self.probs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TokenProb> {
        self.probs.iter()
    }

    pub fn into_vec(self) -> Vec<TokenProb> {
        self.probs
    }

    /// Total probability mass, accumulated in `f64`.
    pub fn sum(&self) -> f64 {
        self.probs.iter().map(|t| t.probability as f64).sum()
    }

    /// Checks the descending-order invariant.
    pub fn is_sorted(&self) -> bool {
        self.probs
            .windows(2)
            .all(|w| w[0].probability >= w[1].probability)
    }
}

impl<'a> IntoIterator for &'a Distribution {
    type Item = &'a TokenProb;
    type IntoIter = std::slice::Iter<'a, TokenProb>;

    fn into_iter(self) -> Self::IntoIter {
        self.probs.iter()
    }
}
