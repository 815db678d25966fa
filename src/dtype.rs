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

//! Element types and the width polymorphism of the kernels.
//!
//! Kernels are written once against [`Element`] / [`IdType`] and instantiated
//! for the closed set of widths below. The tensor layer resolves the width of
//! an array once per call with the `dispatch_*` macros.

use std::{fmt::Debug, hash::Hash, ops::Add};

use crate::tensor::Storage;

/// The element type of a [`Tensor`](crate::tensor::Tensor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType
{
    Bool,
    U8,
    I8,
    I16,
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
}

impl DType
{
    pub fn size_in_bytes(self) -> usize
    {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::I16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    pub fn is_integer(self) -> bool
    {
        !matches!(self, Self::Bool | Self::F32 | Self::F64)
    }
}

/// Anything a tensor can hold.
pub trait Element: Copy + Debug + Default + PartialEq + Send + Sync + 'static
{
    const DTYPE: DType;

    fn into_storage(data: Vec<Self>) -> Storage;

    fn from_storage(storage: &Storage) -> Option<&[Self]>;

    fn take_storage(storage: Storage) -> Result<Vec<Self>, Storage>;
}

/// Integer element usable as a node id, an offset or an edge type tag.
///
/// Values are required to be non-negative; a negative id is a caller contract
/// violation and is treated as a very large unsigned value.
pub trait IdType: Element + Ord + Hash
{
    /// Wide enough to hold the sum of many values, e.g. a total edge count.
    type Accum: IdType + Add<Output = Self::Accum>;

    const BITS: u32;

    fn to_usize(self) -> usize;

    fn from_usize(value: usize) -> Self;

    /// The unsigned key the radix sort digs through.
    fn radix_key(self) -> u64;

    fn widen(self) -> Self::Accum;
}

/// `as` conversion between numeric element types.
pub trait CastTo<U>: Copy
{
    fn cast_to(self) -> U;
}

macro_rules! impl_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $ty
            {
                const DTYPE: DType = DType::$variant;

                fn into_storage(data: Vec<Self>) -> Storage
                {
                    Storage::$variant(data)
                }

                fn from_storage(storage: &Storage) -> Option<&[Self]>
                {
                    match storage {
                        Storage::$variant(data) => Some(&data[..]),
                        _ => None,
                    }
                }

                fn take_storage(storage: Storage) -> Result<Vec<Self>, Storage>
                {
                    match storage {
                        Storage::$variant(data) => Ok(data),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_element!(
    bool => Bool,
    u8 => U8,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);

macro_rules! impl_id_type {
    ($($ty:ty => $accum:ty),* $(,)?) => {
        $(
            impl IdType for $ty
            {
                type Accum = $accum;

                const BITS: u32 = <$ty>::BITS;

                #[inline]
                fn to_usize(self) -> usize
                {
                    self as usize
                }

                #[inline]
                fn from_usize(value: usize) -> Self
                {
                    value as Self
                }

                #[inline]
                fn radix_key(self) -> u64
                {
                    self as u64
                }

                #[inline]
                fn widen(self) -> Self::Accum
                {
                    self as $accum
                }
            }
        )*
    };
}

impl_id_type!(
    u8 => i64,
    i8 => i64,
    i16 => i64,
    i32 => i64,
    i64 => i64,
    u32 => i64,
    u64 => u64,
);

macro_rules! impl_cast {
    ($($from:ty),*) => {
        $( impl_cast!(@to $from; u8, i8, i16, i32, i64, u32, u64, f32, f64); )*
    };
    (@to $from:ty; $($to:ty),*) => {
        $(
            impl CastTo<$to> for $from
            {
                #[inline]
                fn cast_to(self) -> $to
                {
                    self as $to
                }
            }
        )*
    };
}

impl_cast!(u8, i8, i16, i32, i64, u32, u64, f32, f64);

/// Match a runtime [`DType`] against a list of variants, binding `$T` to the
/// concrete type inside `$body`. Unlisted variants return
/// [`Error::UnsupportedDType`](crate::error::Error::UnsupportedDType).
macro_rules! dispatch_dtype {
    ($dtype:expr, $op:expr, $array:expr, $T:ident => $body:block, [$($variant:ident => $ty:ty),*]) => {
        match $dtype {
            $(
                $crate::dtype::DType::$variant => {
                    type $T = $ty;
                    $body
                }
            )*
            #[allow(unreachable_patterns)]
            other => {
                return Err($crate::error::Error::UnsupportedDType {
                    op: $op,
                    array: $array,
                    dtype: other,
                })
            }
        }
    };
}

/// Node ids and offsets.
macro_rules! dispatch_ids {
    ($dtype:expr, $op:expr, $array:expr, $T:ident => $body:block) => {
        $crate::dtype::dispatch_dtype!(
            $dtype, $op, $array, $T => $body,
            [I32 => i32, I64 => i64, U32 => u32, U64 => u64]
        )
    };
}

/// Every integer width, e.g. edge type tags.
macro_rules! dispatch_ints {
    ($dtype:expr, $op:expr, $array:expr, $T:ident => $body:block) => {
        $crate::dtype::dispatch_dtype!(
            $dtype, $op, $array, $T => $body,
            [U8 => u8, I8 => i8, I16 => i16, I32 => i32, I64 => i64, U32 => u32, U64 => u64]
        )
    };
}

macro_rules! dispatch_numeric {
    ($dtype:expr, $op:expr, $array:expr, $T:ident => $body:block) => {
        $crate::dtype::dispatch_dtype!(
            $dtype, $op, $array, $T => $body,
            [
                U8 => u8, I8 => i8, I16 => i16, I32 => i32, I64 => i64,
                U32 => u32, U64 => u64, F32 => f32, F64 => f64
            ]
        )
    };
}

macro_rules! dispatch_all {
    ($dtype:expr, $op:expr, $array:expr, $T:ident => $body:block) => {
        $crate::dtype::dispatch_dtype!(
            $dtype, $op, $array, $T => $body,
            [
                Bool => bool, U8 => u8, I8 => i8, I16 => i16, I32 => i32, I64 => i64,
                U32 => u32, U64 => u64, F32 => f32, F64 => f64
            ]
        )
    };
}

pub(crate) use {dispatch_all, dispatch_dtype, dispatch_ids, dispatch_ints, dispatch_numeric};
