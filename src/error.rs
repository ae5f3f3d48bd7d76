use crate::buffer::ElementType;
use thiserror::Error;

/// The error type for simio
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid world size {0}")]
    InvalidWorldSize(usize),
    #[error("unresolvable runtime config: {0}")]
    Config(String),
    #[error("splitter produced {got} shares for world size {want}")]
    ShareCountMismatch { got: usize, want: usize },
    #[error("variable {name} missing from party {party}")]
    MissingVariable { name: String, party: usize },
    #[error("no shares to reconstruct from")]
    NoShares,
    #[error("shares have different types")]
    DifferentShareTypes,
    #[error("shares have different visibility")]
    DifferentShareVisibility,
    #[error("shares have different shapes")]
    DifferentShareShapes,
    #[error("invalid party id {0}")]
    InvalidPartyId(usize),
    #[error("buffer of {len} elements does not match shape {shape:?}")]
    ShapeMismatch { len: usize, shape: Vec<usize> },
    #[error("strides {strides:?} invalid for shape {shape:?}")]
    InvalidStrides { strides: Vec<usize>, shape: Vec<usize> },
    #[error("cannot store {got} scalar in {want} buffer")]
    ScalarTypeMismatch { want: ElementType, got: ElementType },
    #[error("error in fixed-point embedding")]
    FixedPointEmbedding,
}

/// [`Result`] type with simio [`enum@Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
