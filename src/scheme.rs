use crate::{
    buffer::{BufferView, BufferViewMut, ElementType, Scalar},
    config::ResolvedConfig,
    error::{Error, Result},
    share::{Share, Visibility},
};
use itertools::Itertools;
use log::debug;
use rand::Rng;

/// Capability to split plaintext buffers into per-party shares and to
/// reconstruct plaintext from them.
///
/// The cluster depends on this trait rather than on a concrete scheme, so
/// tests can inject deterministic fakes.
pub trait SharingScheme {
    /// Split `view` into one [`Share`] per party.
    ///
    /// The meaning of `owner` is scheme-defined; schemes may ignore it.
    fn split(
        &self,
        view: &BufferView<'_>,
        vtype: Visibility,
        owner: Option<usize>,
    ) -> Result<Vec<Share>>;

    /// Reconstruct the plaintext from `shares` into `out`.
    ///
    /// All validation happens before the first element is written, so a
    /// failed combine leaves `out` untouched.
    fn combine(&self, shares: &[Share], out: &mut BufferViewMut<'_>) -> Result<()>;

    /// Infer the common plaintext element type of `shares`.
    fn element_type(&self, shares: &[Share]) -> Result<ElementType> {
        let first = shares.first().ok_or(Error::NoShares)?;
        if !shares.iter().map(|s| s.dtype()).all_equal() {
            return Err(Error::DifferentShareTypes);
        }
        Ok(first.dtype())
    }
}

/// Embed a float as a fixed-point ring word with `fxp_bits` fractional bits.
pub fn embed_fixed_point(x: f64, fxp_bits: u32) -> Result<u64> {
    let scale = (1u64 << fxp_bits) as f64;
    let scaled = x * scale;
    if !scaled.is_finite() || scaled >= i64::MAX as f64 || scaled <= i64::MIN as f64 {
        return Err(Error::FixedPointEmbedding);
    }
    Ok(scaled as i64 as u64)
}

/// Decode a fixed-point ring word back into a float.
pub fn to_fixed_point(word: u64, fxp_bits: u32) -> f64 {
    let scale = (1u64 << fxp_bits) as f64;
    word as i64 as f64 / scale
}

/// Encode one plaintext element as a ring word.
fn encode(scalar: Scalar, fxp_bits: u32) -> Result<u64> {
    match scalar {
        Scalar::I32(x) => Ok(x as u32 as u64),
        Scalar::I64(x) => Ok(x as u64),
        Scalar::U32(x) => Ok(x as u64),
        Scalar::U64(x) => Ok(x),
        Scalar::F32(x) => embed_fixed_point(x as f64, fxp_bits),
        Scalar::F64(x) => embed_fixed_point(x, fxp_bits),
    }
}

/// Decode one ring word back into a plaintext element.
fn decode(word: u64, dtype: ElementType, fxp_bits: u32) -> Scalar {
    match dtype {
        ElementType::I32 => Scalar::I32(word as u32 as i32),
        ElementType::I64 => Scalar::I64(word as i64),
        ElementType::U32 => Scalar::U32(word as u32),
        ElementType::U64 => Scalar::U64(word),
        ElementType::F32 => Scalar::F32(to_fixed_point(word, fxp_bits) as f32),
        ElementType::F64 => Scalar::F64(to_fixed_point(word, fxp_bits)),
    }
}

fn ring_mask(bits: u32) -> u64 {
    if bits == 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Additive secret sharing over power-of-two rings.
///
/// Secret values are split into `world_size` words per element: all but one
/// uniformly random, the remaining one the wrapping difference between the
/// plaintext and their sum. Public values are replicated to every party.
/// Integers are shared in the ring matching their width; floats are embedded
/// as fixed-point values and shared in the 64-bit ring.
#[derive(Debug, Clone)]
pub struct AdditiveScheme {
    world_size: usize,
    fxp_bits: u32,
}

impl AdditiveScheme {
    pub fn new(world_size: usize, config: &ResolvedConfig) -> AdditiveScheme {
        AdditiveScheme {
            world_size,
            fxp_bits: config.fxp_bits,
        }
    }
}

impl SharingScheme for AdditiveScheme {
    fn split(
        &self,
        view: &BufferView<'_>,
        vtype: Visibility,
        owner: Option<usize>,
    ) -> Result<Vec<Share>> {
        debug!(
            "split {} elements of {} as {vtype:?} owner = {owner:?}",
            view.len(),
            view.dtype()
        );
        let dtype = view.dtype();
        let shape = view.shape().to_vec();
        match vtype {
            Visibility::Public => {
                let words = view
                    .scalars()
                    .map(|s| encode(s, self.fxp_bits))
                    .collect::<Result<Vec<u64>>>()?;
                let share = Share::new(Visibility::Public, dtype, shape, words);
                Ok(vec![share; self.world_size])
            }
            Visibility::Secret => {
                // the owner holds the correction word, everyone else randomness
                let owner = owner.unwrap_or(self.world_size - 1);
                if owner >= self.world_size {
                    return Err(Error::InvalidPartyId(owner));
                }
                let mask = ring_mask(dtype.ring_bits());
                let mut rng = rand::thread_rng();
                let mut parts: Vec<Vec<u64>> = (0..self.world_size)
                    .map(|_| Vec::with_capacity(view.len()))
                    .collect();
                for scalar in view.scalars() {
                    let word = encode(scalar, self.fxp_bits)?;
                    let mut rest = 0u64;
                    for (rank, part) in parts.iter_mut().enumerate() {
                        if rank != owner {
                            let r = rng.gen::<u64>() & mask;
                            rest = rest.wrapping_add(r) & mask;
                            part.push(r);
                        }
                    }
                    parts[owner].push(word.wrapping_sub(rest) & mask);
                }
                Ok(parts
                    .into_iter()
                    .map(|words| Share::new(Visibility::Secret, dtype, shape.clone(), words))
                    .collect())
            }
        }
    }

    fn combine(&self, shares: &[Share], out: &mut BufferViewMut<'_>) -> Result<()> {
        let first = shares.first().ok_or(Error::NoShares)?;
        if !shares.iter().map(|s| s.dtype()).all_equal() {
            return Err(Error::DifferentShareTypes);
        }
        if !shares.iter().map(|s| s.visibility()).all_equal() {
            return Err(Error::DifferentShareVisibility);
        }
        if !shares.iter().map(|s| s.shape()).all_equal() {
            return Err(Error::DifferentShareShapes);
        }
        let dtype = first.dtype();
        if out.dtype() != dtype {
            return Err(Error::ScalarTypeMismatch {
                want: out.dtype(),
                got: dtype,
            });
        }
        if out.shape() != first.shape() {
            return Err(Error::ShapeMismatch {
                len: out.len(),
                shape: first.shape().to_vec(),
            });
        }
        let n = out.len();
        if shares.iter().any(|s| s.words().len() != n) {
            return Err(Error::ShapeMismatch {
                len: n,
                shape: first.shape().to_vec(),
            });
        }
        debug!("combine {} shares of {n} elements", shares.len());
        match first.visibility() {
            Visibility::Public => {
                for (i, word) in first.words().iter().enumerate() {
                    out.set(i, decode(*word, dtype, self.fxp_bits))?;
                }
            }
            Visibility::Secret => {
                let mask = ring_mask(dtype.ring_bits());
                for i in 0..n {
                    let sum = shares
                        .iter()
                        .fold(0u64, |acc, s| acc.wrapping_add(s.words()[i]))
                        & mask;
                    out.set(i, decode(sum, dtype, self.fxp_bits))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::NdBuffer;
    use crate::config::{resolve, RuntimeConfig};
    use approx::assert_relative_eq;

    fn scheme(world_size: usize) -> AdditiveScheme {
        let resolved = resolve(&RuntimeConfig::default()).unwrap();
        AdditiveScheme::new(world_size, &resolved)
    }

    #[test]
    fn fixed_point_round_trip() {
        let embedded = embed_fixed_point(-2.25, 16).unwrap();
        assert_relative_eq!(to_fixed_point(embedded, 16), -2.25, epsilon = 10e-3);
    }

    #[test]
    fn fixed_point_rejects_out_of_range() {
        assert!(matches!(
            embed_fixed_point(f64::MAX, 16),
            Err(Error::FixedPointEmbedding)
        ));
        assert!(matches!(
            embed_fixed_point(f64::NAN, 16),
            Err(Error::FixedPointEmbedding)
        ));
    }

    #[test]
    fn public_split_replicates() {
        let data = [7u64, 8];
        let view = BufferView::new(&data[..], &[2]).unwrap();
        let shares = scheme(3).split(&view, Visibility::Public, None).unwrap();
        assert_eq!(shares.len(), 3);
        assert!(shares.iter().all(|s| s.words() == shares[0].words()));
        assert!(shares.iter().all(|s| s.visibility() == Visibility::Public));
    }

    #[test]
    fn secret_split_sums_back() {
        let data = [123i64, -456];
        let view = BufferView::new(&data[..], &[2]).unwrap();
        let scheme = scheme(4);
        let shares = scheme.split(&view, Visibility::Secret, None).unwrap();
        assert_eq!(shares.len(), 4);
        let mut out = NdBuffer::zeros(ElementType::I64, &[2]);
        scheme.combine(&shares, &mut out.view_mut()).unwrap();
        assert_eq!(out.as_i64(), Some(&data[..]));
    }

    #[test]
    fn secret_split_wraps_in_narrow_ring() {
        let data = [i32::MIN, -1, i32::MAX];
        let view = BufferView::new(&data[..], &[3]).unwrap();
        let scheme = scheme(3);
        let shares = scheme.split(&view, Visibility::Secret, None).unwrap();
        let mut out = NdBuffer::zeros(ElementType::I32, &[3]);
        scheme.combine(&shares, &mut out.view_mut()).unwrap();
        assert_eq!(out.as_i32(), Some(&data[..]));
    }

    #[test]
    fn owner_rank_round_trips() {
        let data = [42u32];
        let view = BufferView::new(&data[..], &[1]).unwrap();
        let scheme = scheme(3);
        for owner in 0..3 {
            let shares = scheme.split(&view, Visibility::Secret, Some(owner)).unwrap();
            let mut out = NdBuffer::zeros(ElementType::U32, &[1]);
            scheme.combine(&shares, &mut out.view_mut()).unwrap();
            assert_eq!(out.as_u32(), Some(&data[..]));
        }
    }

    #[test]
    fn split_rejects_bad_owner() {
        let data = [1u64];
        let view = BufferView::new(&data[..], &[1]).unwrap();
        assert!(matches!(
            scheme(2).split(&view, Visibility::Secret, Some(5)),
            Err(Error::InvalidPartyId(5))
        ));
    }

    #[test]
    fn combine_rejects_mixed_types() {
        let a = Share::new(Visibility::Secret, ElementType::I32, vec![1], vec![1]);
        let b = Share::new(Visibility::Secret, ElementType::U64, vec![1], vec![1]);
        let mut out = NdBuffer::zeros(ElementType::I32, &[1]);
        assert!(matches!(
            scheme(2).combine(&[a, b], &mut out.view_mut()),
            Err(Error::DifferentShareTypes)
        ));
    }

    #[test]
    fn combine_rejects_mixed_visibility() {
        let a = Share::new(Visibility::Secret, ElementType::U64, vec![1], vec![1]);
        let b = Share::new(Visibility::Public, ElementType::U64, vec![1], vec![1]);
        let mut out = NdBuffer::zeros(ElementType::U64, &[1]);
        assert!(matches!(
            scheme(2).combine(&[a, b], &mut out.view_mut()),
            Err(Error::DifferentShareVisibility)
        ));
    }

    #[test]
    fn element_type_agrees() {
        let shares = vec![
            Share::new(Visibility::Public, ElementType::F64, vec![1], vec![0]),
            Share::new(Visibility::Public, ElementType::F64, vec![1], vec![0]),
        ];
        assert_eq!(
            scheme(2).element_type(&shares).unwrap(),
            ElementType::F64
        );
        assert!(matches!(scheme(2).element_type(&[]), Err(Error::NoShares)));
    }
}
