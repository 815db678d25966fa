// glzip is a graph compression library for graph learning systems
// Copyright (C) 2022 Jacob Konrad
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! A dynamically typed array with a shape and a memory residency class.

use crate::{
    dtype::{dispatch_numeric, CastTo, DType, Element},
    error::{Error, Result},
};

/// Where the bytes of a tensor live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Residency
{
    /// Ordinary pageable host memory.
    Host,
    /// Page-locked host memory the executor can address directly.
    Pinned,
    /// Executor memory.
    Device,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Storage
{
    Bool(Vec<bool>),
    U8(Vec<u8>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Storage
{
    pub fn dtype(&self) -> DType
    {
        match self {
            Self::Bool(_) => DType::Bool,
            Self::U8(_) => DType::U8,
            Self::I8(_) => DType::I8,
            Self::I16(_) => DType::I16,
            Self::I32(_) => DType::I32,
            Self::I64(_) => DType::I64,
            Self::U32(_) => DType::U32,
            Self::U64(_) => DType::U64,
            Self::F32(_) => DType::F32,
            Self::F64(_) => DType::F64,
        }
    }

    pub fn len(&self) -> usize
    {
        match self {
            Self::Bool(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }
}

/// Row-major array; the leading axis is the one every kernel indexes.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor
{
    storage: Storage,
    shape: Vec<usize>,
    residency: Residency,
}

impl Tensor
{
    /// A one dimensional host tensor.
    pub fn from_vec<T: Element>(data: Vec<T>) -> Self
    {
        let shape = vec![data.len()];
        Self {
            storage: T::into_storage(data),
            shape,
            residency: Residency::Host,
        }
    }

    pub fn from_shape_vec<T: Element>(shape: Vec<usize>, data: Vec<T>) -> Result<Self>
    {
        let fits = match shape.split_first() {
            Some((_, rows)) => checked_numel(rows).is_some() && checked_numel(&shape[..]) == Some(data.len()),
            None => false,
        };
        if !fits {
            return Err(Error::Shape {
                shape,
                len: data.len(),
            });
        }
        Ok(Self {
            storage: T::into_storage(data),
            shape,
            residency: Residency::Host,
        })
    }

    pub(crate) fn from_parts(storage: Storage, shape: Vec<usize>, residency: Residency) -> Self
    {
        debug_assert_eq!(checked_numel(&shape[..]), Some(storage.len()));
        Self {
            storage,
            shape,
            residency,
        }
    }

    /// Relabel the residency class. No bytes move on a host executor.
    pub fn with_residency(self, residency: Residency) -> Self
    {
        Self { residency, ..self }
    }

    pub fn pin(self) -> Self
    {
        self.with_residency(Residency::Pinned)
    }

    pub fn to_device(self) -> Self
    {
        self.with_residency(Residency::Device)
    }

    pub fn dtype(&self) -> DType
    {
        self.storage.dtype()
    }

    pub fn shape(&self) -> &[usize]
    {
        &self.shape[..]
    }

    pub fn residency(&self) -> Residency
    {
        self.residency
    }

    pub fn storage(&self) -> &Storage
    {
        &self.storage
    }

    /// Length of the leading axis.
    pub fn len(&self) -> usize
    {
        self.shape[0]
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    pub fn numel(&self) -> usize
    {
        self.storage.len()
    }

    /// Number of elements in one row, i.e. the product of the trailing dims.
    pub fn row_len(&self) -> usize
    {
        self.shape[1..].iter().product()
    }

    pub fn as_slice<T: Element>(&self) -> Result<&[T]>
    {
        T::from_storage(&self.storage).ok_or(Error::DTypeMismatch {
            op: "as_slice",
            array: "tensor",
            expected: T::DTYPE,
            got: self.dtype(),
        })
    }

    pub fn into_vec<T: Element>(self) -> Result<Vec<T>>
    {
        T::take_storage(self.storage).map_err(|storage| Error::DTypeMismatch {
            op: "into_vec",
            array: "tensor",
            expected: T::DTYPE,
            got: storage.dtype(),
        })
    }

    /// Convert every element with `as` semantics, keeping shape and residency.
    pub fn cast(&self, dtype: DType) -> Result<Self>
    {
        if dtype == self.dtype() {
            return Ok(self.clone());
        }
        let storage = dispatch_numeric!(self.dtype(), "cast", "tensor", T => {
            let data = self.as_slice::<T>()?;
            dispatch_numeric!(dtype, "cast", "dtype", U => {
                U::into_storage(cast_slice::<T, U>(data))
            })
        });
        Ok(Self::from_parts(storage, self.shape.clone(), self.residency))
    }
}

/// Product of `dims`, or `None` when it overflows `usize`.
fn checked_numel(dims: &[usize]) -> Option<usize>
{
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

fn cast_slice<T, U>(data: &[T]) -> Vec<U>
where
    T: CastTo<U> + Sync,
    U: Send,
{
    use rayon::prelude::*;

    data.par_iter().map(|&x| x.cast_to()).collect()
}

impl<T: Element> From<Vec<T>> for Tensor
{
    fn from(data: Vec<T>) -> Self
    {
        Self::from_vec(data)
    }
}

#[cfg(feature = "ndarray")]
impl<T: Element> From<ndarray::ArrayD<T>> for Tensor
{
    fn from(array: ndarray::ArrayD<T>) -> Self
    {
        let shape = array.shape().to_vec();
        let data: Vec<T> = match array.as_slice() {
            Some(contiguous) => contiguous.to_vec(),
            None => array.iter().copied().collect(),
        };
        if shape.is_empty() {
            return Self::from_vec(data);
        }
        Self::from_parts(T::into_storage(data), shape, Residency::Host)
    }
}

#[cfg(feature = "ndarray")]
impl Tensor
{
    pub fn to_array<T: Element>(&self) -> Result<ndarray::ArrayD<T>>
    {
        let data = self.as_slice::<T>()?.to_vec();
        ndarray::ArrayD::from_shape_vec(self.shape.clone(), data).map_err(|_| Error::Shape {
            shape: self.shape.clone(),
            len: self.numel(),
        })
    }
}
