//! `cs-sampler` - Probability-ratio cutoff token sampling.
//!
//! Each generation step turns a logits vector into a token:
//! - `distribution`: stable softmax, sorted highest first
//! - `cutoff`: keeps tokens whose shortfall `1 - p / t0` is within the cutoff
//! - `weighted`: draws from the kept tokens in proportion to probability
//! - `confidence`: buckets the top probability for colored display
//!
//! `CutoffSampler` wires the steps together and owns the stream's random source.

pub mod confidence;
pub mod config;
pub mod cutoff;
pub mod distribution;
pub mod error;
pub mod generate;
pub mod sampler;
pub mod weighted;

pub use confidence::{paint, Confidence};
pub use config::SamplingConfig;
pub use cutoff::{select_unsorted, shortfall, Admissible, Cutoff, DEFAULT_CUTOFF};
pub use distribution::{softmax, Distribution, TokenProb};
pub use error::{Result, SamplerError};
pub use generate::{from_fn, FnSource, GenerateParams, Generation, LogitsSource};
pub use sampler::{sample_with, CutoffSampler, Sample};
pub use weighted::draw;
