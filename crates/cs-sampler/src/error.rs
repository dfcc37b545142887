use thiserror::Error;

/// Every failure in the sampler is a contract violation by the caller:
/// bad logits, a bad cutoff, or a degenerate distribution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SamplerError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SamplerError::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SamplerError>;
