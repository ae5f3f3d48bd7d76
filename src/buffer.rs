use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Plaintext element types understood by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
}

impl ElementType {
    /// Width in bits of the sharing ring for this element type.
    ///
    /// Floats are embedded as fixed-point values and shared in the full
    /// 64-bit ring.
    pub fn ring_bits(&self) -> u32 {
        match self {
            ElementType::I32 | ElementType::U32 => 32,
            ElementType::I64 | ElementType::U64 | ElementType::F32 | ElementType::F64 => 64,
        }
    }

    /// Size of one element in bytes.
    pub fn size_of(&self) -> usize {
        match self {
            ElementType::I32 | ElementType::U32 | ElementType::F32 => 4,
            ElementType::I64 | ElementType::U64 | ElementType::F64 => 8,
        }
    }
}

impl Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
            ElementType::U32 => "u32",
            ElementType::U64 => "u64",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
        };
        write!(f, "{name}")
    }
}

/// A single plaintext element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl Scalar {
    /// [`ElementType`] of this scalar.
    pub fn dtype(&self) -> ElementType {
        match self {
            Scalar::I32(_) => ElementType::I32,
            Scalar::I64(_) => ElementType::I64,
            Scalar::U32(_) => ElementType::U32,
            Scalar::U64(_) => ElementType::U64,
            Scalar::F32(_) => ElementType::F32,
            Scalar::F64(_) => ElementType::F64,
        }
    }
}

/// Borrowed slice of plaintext elements.
#[derive(Debug, Clone, Copy)]
pub enum ElemSlice<'a> {
    I32(&'a [i32]),
    I64(&'a [i64]),
    U32(&'a [u32]),
    U64(&'a [u64]),
    F32(&'a [f32]),
    F64(&'a [f64]),
}

impl ElemSlice<'_> {
    pub fn len(&self) -> usize {
        match self {
            ElemSlice::I32(xs) => xs.len(),
            ElemSlice::I64(xs) => xs.len(),
            ElemSlice::U32(xs) => xs.len(),
            ElemSlice::U64(xs) => xs.len(),
            ElemSlice::F32(xs) => xs.len(),
            ElemSlice::F64(xs) => xs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> ElementType {
        match self {
            ElemSlice::I32(_) => ElementType::I32,
            ElemSlice::I64(_) => ElementType::I64,
            ElemSlice::U32(_) => ElementType::U32,
            ElemSlice::U64(_) => ElementType::U64,
            ElemSlice::F32(_) => ElementType::F32,
            ElemSlice::F64(_) => ElementType::F64,
        }
    }

    fn get(&self, i: usize) -> Scalar {
        match self {
            ElemSlice::I32(xs) => Scalar::I32(xs[i]),
            ElemSlice::I64(xs) => Scalar::I64(xs[i]),
            ElemSlice::U32(xs) => Scalar::U32(xs[i]),
            ElemSlice::U64(xs) => Scalar::U64(xs[i]),
            ElemSlice::F32(xs) => Scalar::F32(xs[i]),
            ElemSlice::F64(xs) => Scalar::F64(xs[i]),
        }
    }
}

impl<'a> From<&'a [i32]> for ElemSlice<'a> {
    fn from(xs: &'a [i32]) -> Self {
        ElemSlice::I32(xs)
    }
}

impl<'a> From<&'a [i64]> for ElemSlice<'a> {
    fn from(xs: &'a [i64]) -> Self {
        ElemSlice::I64(xs)
    }
}

impl<'a> From<&'a [u32]> for ElemSlice<'a> {
    fn from(xs: &'a [u32]) -> Self {
        ElemSlice::U32(xs)
    }
}

impl<'a> From<&'a [u64]> for ElemSlice<'a> {
    fn from(xs: &'a [u64]) -> Self {
        ElemSlice::U64(xs)
    }
}

impl<'a> From<&'a [f32]> for ElemSlice<'a> {
    fn from(xs: &'a [f32]) -> Self {
        ElemSlice::F32(xs)
    }
}

impl<'a> From<&'a [f64]> for ElemSlice<'a> {
    fn from(xs: &'a [f64]) -> Self {
        ElemSlice::F64(xs)
    }
}

/// Mutable slice of plaintext elements.
#[derive(Debug)]
pub enum ElemSliceMut<'a> {
    I32(&'a mut [i32]),
    I64(&'a mut [i64]),
    U32(&'a mut [u32]),
    U64(&'a mut [u64]),
    F32(&'a mut [f32]),
    F64(&'a mut [f64]),
}

impl ElemSliceMut<'_> {
    pub fn len(&self) -> usize {
        match self {
            ElemSliceMut::I32(xs) => xs.len(),
            ElemSliceMut::I64(xs) => xs.len(),
            ElemSliceMut::U32(xs) => xs.len(),
            ElemSliceMut::U64(xs) => xs.len(),
            ElemSliceMut::F32(xs) => xs.len(),
            ElemSliceMut::F64(xs) => xs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> ElementType {
        match self {
            ElemSliceMut::I32(_) => ElementType::I32,
            ElemSliceMut::I64(_) => ElementType::I64,
            ElemSliceMut::U32(_) => ElementType::U32,
            ElemSliceMut::U64(_) => ElementType::U64,
            ElemSliceMut::F32(_) => ElementType::F32,
            ElemSliceMut::F64(_) => ElementType::F64,
        }
    }
}

impl<'a> From<&'a mut [i32]> for ElemSliceMut<'a> {
    fn from(xs: &'a mut [i32]) -> Self {
        ElemSliceMut::I32(xs)
    }
}

impl<'a> From<&'a mut [i64]> for ElemSliceMut<'a> {
    fn from(xs: &'a mut [i64]) -> Self {
        ElemSliceMut::I64(xs)
    }
}

impl<'a> From<&'a mut [u32]> for ElemSliceMut<'a> {
    fn from(xs: &'a mut [u32]) -> Self {
        ElemSliceMut::U32(xs)
    }
}

impl<'a> From<&'a mut [u64]> for ElemSliceMut<'a> {
    fn from(xs: &'a mut [u64]) -> Self {
        ElemSliceMut::U64(xs)
    }
}

impl<'a> From<&'a mut [f32]> for ElemSliceMut<'a> {
    fn from(xs: &'a mut [f32]) -> Self {
        ElemSliceMut::F32(xs)
    }
}

impl<'a> From<&'a mut [f64]> for ElemSliceMut<'a> {
    fn from(xs: &'a mut [f64]) -> Self {
        ElemSliceMut::F64(xs)
    }
}

pub(crate) fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

fn contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut acc = 1;
    for (i, dim) in shape.iter().enumerate().rev() {
        strides[i] = acc;
        acc *= dim;
    }
    strides
}

/// Physical offset of the `linear`-th element in row-major order.
fn offset_of(shape: &[usize], strides: &[usize], mut linear: usize) -> usize {
    let mut offset = 0;
    for (dim, stride) in shape.iter().zip(strides).rev() {
        offset += (linear % dim) * stride;
        linear /= dim;
    }
    offset
}

fn validate_strides(len: usize, shape: &[usize], strides: &[usize]) -> Result<()> {
    if strides.len() != shape.len() {
        return Err(Error::InvalidStrides {
            strides: strides.to_vec(),
            shape: shape.to_vec(),
        });
    }
    if numel(shape) == 0 {
        return Ok(());
    }
    let max_offset: usize = shape.iter().zip(strides).map(|(d, s)| (d - 1) * s).sum();
    if max_offset >= len {
        return Err(Error::InvalidStrides {
            strides: strides.to_vec(),
            shape: shape.to_vec(),
        });
    }
    Ok(())
}

/// Non-owning, read-only descriptor of a plaintext multi-dimensional array.
///
/// Shape and strides are counted in elements. [`new`] lays the elements out
/// contiguously in row-major order; [`with_strides`] describes a window over
/// a larger allocation (a column, a transpose, ...).
///
/// [`new`]: BufferView::new
/// [`with_strides`]: BufferView::with_strides
#[derive(Debug, Clone)]
pub struct BufferView<'a> {
    elems: ElemSlice<'a>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl<'a> BufferView<'a> {
    /// Create a contiguous row-major view of `elems` with the given shape.
    pub fn new<E: Into<ElemSlice<'a>>>(elems: E, shape: &[usize]) -> Result<BufferView<'a>> {
        let elems = elems.into();
        if elems.len() != numel(shape) {
            return Err(Error::ShapeMismatch {
                len: elems.len(),
                shape: shape.to_vec(),
            });
        }
        Ok(BufferView {
            elems,
            shape: shape.to_vec(),
            strides: contiguous_strides(shape),
        })
    }

    /// Create a view with explicit strides (in elements).
    pub fn with_strides<E: Into<ElemSlice<'a>>>(
        elems: E,
        shape: &[usize],
        strides: &[usize],
    ) -> Result<BufferView<'a>> {
        let elems = elems.into();
        validate_strides(elems.len(), shape, strides)?;
        Ok(BufferView {
            elems,
            shape: shape.to_vec(),
            strides: strides.to_vec(),
        })
    }

    pub fn dtype(&self) -> ElementType {
        self.elems.dtype()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Number of logical elements described by the shape.
    pub fn len(&self) -> usize {
        numel(&self.shape)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the elements in logical row-major order.
    pub fn scalars(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).map(move |i| self.elems.get(offset_of(&self.shape, &self.strides, i)))
    }
}

/// Non-owning, writable descriptor of a plaintext multi-dimensional array.
///
/// The write target of a reconstruction.
#[derive(Debug)]
pub struct BufferViewMut<'a> {
    elems: ElemSliceMut<'a>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl<'a> BufferViewMut<'a> {
    /// Create a contiguous row-major view of `elems` with the given shape.
    pub fn new<E: Into<ElemSliceMut<'a>>>(elems: E, shape: &[usize]) -> Result<BufferViewMut<'a>> {
        let elems = elems.into();
        if elems.len() != numel(shape) {
            return Err(Error::ShapeMismatch {
                len: elems.len(),
                shape: shape.to_vec(),
            });
        }
        let strides = contiguous_strides(shape);
        Ok(BufferViewMut {
            elems,
            shape: shape.to_vec(),
            strides,
        })
    }

    /// Create a view with explicit strides (in elements).
    pub fn with_strides<E: Into<ElemSliceMut<'a>>>(
        elems: E,
        shape: &[usize],
        strides: &[usize],
    ) -> Result<BufferViewMut<'a>> {
        let elems = elems.into();
        validate_strides(elems.len(), shape, strides)?;
        Ok(BufferViewMut {
            elems,
            shape: shape.to_vec(),
            strides: strides.to_vec(),
        })
    }

    pub fn dtype(&self) -> ElementType {
        self.elems.dtype()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn len(&self) -> usize {
        numel(&self.shape)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `scalar` at logical `index` (row-major order).
    ///
    /// # Panics
    /// If `index` is not smaller than [`len`].
    ///
    /// [`len`]: BufferViewMut::len
    pub fn set(&mut self, index: usize, scalar: Scalar) -> Result<()> {
        let offset = offset_of(&self.shape, &self.strides, index);
        match (&mut self.elems, scalar) {
            (ElemSliceMut::I32(xs), Scalar::I32(v)) => xs[offset] = v,
            (ElemSliceMut::I64(xs), Scalar::I64(v)) => xs[offset] = v,
            (ElemSliceMut::U32(xs), Scalar::U32(v)) => xs[offset] = v,
            (ElemSliceMut::U64(xs), Scalar::U64(v)) => xs[offset] = v,
            (ElemSliceMut::F32(xs), Scalar::F32(v)) => xs[offset] = v,
            (ElemSliceMut::F64(xs), Scalar::F64(v)) => xs[offset] = v,
            (elems, scalar) => {
                return Err(Error::ScalarTypeMismatch {
                    want: elems.dtype(),
                    got: scalar.dtype(),
                })
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ElemVec {
    I32(Vec<i32>),
    I64(Vec<i64>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// Owned, contiguous, row-major multi-dimensional buffer.
///
/// What a reconstruction hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct NdBuffer {
    data: ElemVec,
    shape: Vec<usize>,
}

impl NdBuffer {
    /// Allocate a zero-filled buffer of the given type and shape.
    pub fn zeros(dtype: ElementType, shape: &[usize]) -> NdBuffer {
        let n = numel(shape);
        let data = match dtype {
            ElementType::I32 => ElemVec::I32(vec![0; n]),
            ElementType::I64 => ElemVec::I64(vec![0; n]),
            ElementType::U32 => ElemVec::U32(vec![0; n]),
            ElementType::U64 => ElemVec::U64(vec![0; n]),
            ElementType::F32 => ElemVec::F32(vec![0.0; n]),
            ElementType::F64 => ElemVec::F64(vec![0.0; n]),
        };
        NdBuffer {
            data,
            shape: shape.to_vec(),
        }
    }

    pub fn dtype(&self) -> ElementType {
        match &self.data {
            ElemVec::I32(_) => ElementType::I32,
            ElemVec::I64(_) => ElementType::I64,
            ElemVec::U32(_) => ElementType::U32,
            ElemVec::U64(_) => ElementType::U64,
            ElemVec::F32(_) => ElementType::F32,
            ElemVec::F64(_) => ElementType::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        numel(&self.shape)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_i32(&self) -> Option<&[i32]> {
        match &self.data {
            ElemVec::I32(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<&[i64]> {
        match &self.data {
            ElemVec::I64(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<&[u32]> {
        match &self.data {
            ElemVec::U32(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<&[u64]> {
        match &self.data {
            ElemVec::U64(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.data {
            ElemVec::F32(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match &self.data {
            ElemVec::F64(xs) => Some(xs),
            _ => None,
        }
    }

    /// Read-only view of the whole buffer.
    pub fn view(&self) -> BufferView<'_> {
        let elems = match &self.data {
            ElemVec::I32(xs) => ElemSlice::I32(xs),
            ElemVec::I64(xs) => ElemSlice::I64(xs),
            ElemVec::U32(xs) => ElemSlice::U32(xs),
            ElemVec::U64(xs) => ElemSlice::U64(xs),
            ElemVec::F32(xs) => ElemSlice::F32(xs),
            ElemVec::F64(xs) => ElemSlice::F64(xs),
        };
        BufferView {
            elems,
            shape: self.shape.clone(),
            strides: contiguous_strides(&self.shape),
        }
    }

    /// Mutable view of the whole buffer.
    pub fn view_mut(&mut self) -> BufferViewMut<'_> {
        let strides = contiguous_strides(&self.shape);
        let shape = self.shape.clone();
        let elems = match &mut self.data {
            ElemVec::I32(xs) => ElemSliceMut::I32(xs),
            ElemVec::I64(xs) => ElemSliceMut::I64(xs),
            ElemVec::U32(xs) => ElemSliceMut::U32(xs),
            ElemVec::U64(xs) => ElemSliceMut::U64(xs),
            ElemVec::F32(xs) => ElemSliceMut::F32(xs),
            ElemVec::F64(xs) => ElemSliceMut::F64(xs),
        };
        BufferViewMut {
            elems,
            shape,
            strides,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_must_match_len() {
        let data = [1i32, 2, 3];
        assert!(matches!(
            BufferView::new(&data[..], &[2, 2]),
            Err(Error::ShapeMismatch { len: 3, .. })
        ));
    }

    #[test]
    fn row_major_iteration() {
        let data = [1i32, 2, 3, 4, 5, 6];
        let view = BufferView::new(&data[..], &[2, 3]).unwrap();
        let scalars: Vec<Scalar> = view.scalars().collect();
        assert_eq!(scalars.len(), 6);
        assert_eq!(scalars[0], Scalar::I32(1));
        assert_eq!(scalars[4], Scalar::I32(5));
    }

    #[test]
    fn strided_column_view() {
        // second column of a 2x3 row-major matrix
        let data = [1i64, 2, 3, 4, 5, 6];
        let view = BufferView::with_strides(&data[1..], &[2], &[3]).unwrap();
        let scalars: Vec<Scalar> = view.scalars().collect();
        assert_eq!(scalars, vec![Scalar::I64(2), Scalar::I64(5)]);
    }

    #[test]
    fn strides_must_stay_in_bounds() {
        let data = [1u32, 2, 3, 4];
        assert!(matches!(
            BufferView::with_strides(&data[..], &[2, 2], &[3, 1]),
            Err(Error::InvalidStrides { .. })
        ));
    }

    #[test]
    fn set_rejects_wrong_scalar_type() {
        let mut data = [0i32; 2];
        let mut view = BufferViewMut::new(&mut data[..], &[2]).unwrap();
        assert!(matches!(
            view.set(0, Scalar::U64(1)),
            Err(Error::ScalarTypeMismatch { .. })
        ));
    }

    #[test]
    fn zeros_and_accessors() {
        let buf = NdBuffer::zeros(ElementType::F32, &[3]);
        assert_eq!(buf.dtype(), ElementType::F32);
        assert_eq!(buf.shape(), &[3]);
        assert_eq!(buf.as_f32(), Some(&[0.0f32, 0.0, 0.0][..]));
        assert_eq!(buf.as_i32(), None);
    }
}
