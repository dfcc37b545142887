use crate::distribution::{Distribution, TokenProb};
use crate::error::{Result, SamplerError};

/// Cutoff used when the run configuration does not set `sampling-cutoff`.
pub const DEFAULT_CUTOFF: f32 = 0.7;

/// Relative shortfall of `probability` against the top probability `t0`.
///
/// `0.0` for a token as likely as the top one, approaching `1.0` as the token
/// becomes negligible.
pub fn shortfall(probability: f32, t0: f32) -> f32 {
    1.0 - probability / t0
}

/// Probability-ratio cutoff in `[0, 1]`.
///
/// A token is admissible when its shortfall against the top token is at most
/// the cutoff. `0.0` keeps only tokens tied with the top one; `1.0` keeps the
/// whole vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Cutoff(f32);

impl Cutoff {
    /// Validate and wrap a cutoff value.
    pub fn new(co: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&co) {
            return Err(SamplerError::invalid(format!(
                "cutoff must be within [0, 1], got {}",
                co
            )));
        }
        Ok(Self(co))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Select the admissible prefix of a sorted distribution.
    ///
    /// The shortfall is non-decreasing along a descending distribution, so the
    /// scan stops at the first token that fails the test.
    pub fn select<'a>(&self, dist: &'a Distribution) -> Result<Admissible<'a>> {
        let probs = dist.as_slice();
        let t0 = check_top(dist.top().probability)?;

        let end = probs[1..]
            .iter()
            .position(|t| shortfall(t.probability, t0) > self.0)
            .map_or(probs.len(), |i| i + 1);

        Ok(Admissible {
            candidates: &probs[..end],
            t0,
        })
    }
}

impl Default for Cutoff {
    fn default() -> Self {
        Self(DEFAULT_CUTOFF)
    }
}

impl TryFrom<f32> for Cutoff {
    type Error = SamplerError;

    fn try_from(co: f32) -> Result<Self> {
        Self::new(co)
    }
}

fn check_top(t0: f32) -> Result<f32> {
    if !t0.is_finite() || t0 <= 0.0 {
        return Err(SamplerError::invalid(format!(
            "top probability must be finite and positive, got {}",
            t0
        )));
    }
    Ok(t0)
}

/// Tokens that survived the cutoff, highest probability first.
///
/// Never empty: the top token always has a shortfall of zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Admissible<'a> {
    candidates: &'a [TokenProb],
    t0: f32,
}

impl<'a> Admissible<'a> {
    pub fn candidates(&self) -> &'a [TokenProb] {
        self.candidates
    }

    /// Probability of the top token in the full distribution.
    pub fn t0(&self) -> f32 {
        self.t0
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn token_ids(&self) -> Vec<u32> {
        self.candidates.iter().map(|t| t.token_id).collect()
    }
}

/// Full-scan selection over probabilities in arbitrary order.
///
/// Returns every token whose shortfall against the maximum is within the
/// cutoff, in input order, together with that maximum. Nothing about the
/// ordering of `probs` is assumed.
pub fn select_unsorted(probs: &[TokenProb], cutoff: Cutoff) -> Result<(Vec<TokenProb>, f32)> {
    if probs.is_empty() {
        return Err(SamplerError::invalid("distribution is empty"));
    }
    if probs.iter().any(|t| t.probability.is_nan()) {
        return Err(SamplerError::invalid("distribution contains NaN"));
    }
    let t0 = check_top(
        probs
            .iter()
            .map(|t| t.probability)
            .fold(f32::NEG_INFINITY, f32::max),
    )?;

    let kept = probs
        .iter()
        .filter(|t| shortfall(t.probability, t0) <= cutoff.value())
        .copied()
        .collect();
    Ok((kept, t0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn example() -> Distribution {
        Distribution::from_logits(&[2.0, 1.0, 0.1, 0.1]).unwrap()
    }

    #[test]
    fn test_cutoff_range() {
        assert!(Cutoff::new(0.0).is_ok());
        assert!(Cutoff::new(1.0).is_ok());
        assert!(matches!(Cutoff::new(1.5), Err(SamplerError::InvalidInput(_))));
        assert!(Cutoff::new(-0.01).is_err());
        assert!(Cutoff::new(f32::NAN).is_err());
        assert_eq!(Cutoff::default().value(), DEFAULT_CUTOFF);
    }

    #[test]
    fn test_select_ratio_example() {
        let dist = example();
        let adm = Cutoff::new(0.65).unwrap().select(&dist).unwrap();
        assert_eq!(adm.token_ids(), vec![0, 1]);
        assert_abs_diff_eq!(adm.t0(), dist.top().probability);
        assert_abs_diff_eq!(
            shortfall(dist.as_slice()[1].probability, adm.t0()),
            0.632,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_select_zero_cutoff_keeps_top() {
        let dist = example();
        let adm = Cutoff::new(0.0).unwrap().select(&dist).unwrap();
        assert_eq!(adm.token_ids(), vec![0]);
    }

    #[test]
    fn test_select_zero_cutoff_keeps_exact_ties() {
        let dist = Distribution::from_logits(&[1.0, 4.0, 4.0, 2.0]).unwrap();
        let adm = Cutoff::new(0.0).unwrap().select(&dist).unwrap();
        assert_eq!(adm.token_ids(), vec![1, 2]);
    }

    #[test]
    fn test_select_full_cutoff_keeps_everything() {
        let dist = Distribution::from_logits(&[10.0, 0.0, -80.0, -200.0]).unwrap();
        let adm = Cutoff::new(1.0).unwrap().select(&dist).unwrap();
        assert_eq!(adm.len(), 4);
    }

    #[test]
    fn test_select_zero_top_probability() {
        let dist = Distribution::from_probs(vec![
            TokenProb { token_id: 0, probability: 0.0 },
            TokenProb { token_id: 1, probability: 0.0 },
        ])
        .unwrap();
        assert!(Cutoff::default().select(&dist).is_err());
    }

    #[test]
    fn test_select_unsorted_matches_sorted() {
        let dist = example();
        let raw = crate::distribution::softmax(&[0.1, 1.0, 2.0, 0.1]).unwrap();
        let (kept, t0) = select_unsorted(&raw, Cutoff::new(0.65).unwrap()).unwrap();
        let ids: Vec<u32> = kept.iter().map(|t| t.token_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_abs_diff_eq!(t0, dist.top().probability);
    }

    #[test]
    fn test_select_unsorted_errors() {
        assert!(select_unsorted(&[], Cutoff::default()).is_err());
        let zero = [TokenProb { token_id: 0, probability: 0.0 }];
        assert!(select_unsorted(&zero, Cutoff::default()).is_err());
    }

    proptest! {
        #[test]
        fn prop_shortfall_non_decreasing(logits in prop::collection::vec(-30.0f32..30.0, 1..64)) {
            let dist = Distribution::from_logits(&logits).unwrap();
            let t0 = dist.top().probability;
            let r: Vec<f32> = dist.iter().map(|t| shortfall(t.probability, t0)).collect();
            prop_assert!(r.windows(2).all(|w| w[0] <= w[1]));
        }

        #[test]
        fn prop_admissible_is_prefix_matching_full_scan(
            logits in prop::collection::vec(-10.0f32..10.0, 1..64),
            co in 0.0f32..=1.0,
        ) {
            let cutoff = Cutoff::new(co).unwrap();
            let dist = Distribution::from_logits(&logits).unwrap();
            let adm = cutoff.select(&dist).unwrap();
            prop_assert!(!adm.is_empty());
            prop_assert_eq!(adm.candidates()[0], *dist.top());

            let (mut kept, t0) = select_unsorted(dist.as_slice(), cutoff).unwrap();
            crate::distribution::sort_descending(&mut kept);
            prop_assert_eq!(t0, adm.t0());
            prop_assert_eq!(kept.as_slice(), adm.candidates());
        }

        #[test]
        fn prop_full_cutoff_admits_all(logits in prop::collection::vec(-100.0f32..100.0, 1..64)) {
            let dist = Distribution::from_logits(&logits).unwrap();
            let adm = Cutoff::new(1.0).unwrap().select(&dist).unwrap();
            prop_assert_eq!(adm.len(), logits.len());
        }
    }
}
