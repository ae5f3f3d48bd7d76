use crate::buffer::{numel, ElementType};
use serde::{Deserialize, Serialize};

/// [`Visibility`] of a value fed into the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    /// Every party holds an equivalent cleartext copy.
    Public,
    /// The value is split so that no single share reveals it.
    Secret,
}

/// One party's fragment of a fed value.
///
/// A share carries enough metadata (visibility, element type, shape) for a
/// combiner to validate consistency across parties. The payload is one
/// 64-bit ring word per element; how the words encode the plaintext is up
/// to the [`SharingScheme`] that produced them.
///
/// [`SharingScheme`]: crate::SharingScheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share {
    vtype: Visibility,
    dtype: ElementType,
    shape: Vec<usize>,
    words: Vec<u64>,
}

impl Share {
    /// Create a share from raw ring words.
    pub fn new(vtype: Visibility, dtype: ElementType, shape: Vec<usize>, words: Vec<u64>) -> Share {
        Share {
            vtype,
            dtype,
            shape,
            words,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.vtype
    }

    pub fn dtype(&self) -> ElementType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Raw ring words, one per element.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Number of elements the shape describes.
    pub fn len(&self) -> usize {
        numel(&self.shape)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
