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

use thiserror::Error;

use crate::{dtype::DType, tensor::Residency};

pub type Result<T> = std::result::Result<T, Error>;

/// Everything a kernel call can report. Each variant names the operation and,
/// where one is at fault, the array.
#[derive(Error, Debug)]
pub enum Error
{
    #[error("{op}: `{array}` has length {got}, expected {expected}")]
    LengthMismatch
    {
        op: &'static str,
        array: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{op}: `{array}` holds index {index} but the indexed axis has length {len}")]
    IndexOutOfBounds
    {
        op: &'static str,
        array: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{op}: dtype {dtype:?} is not supported for `{array}`")]
    UnsupportedDType
    {
        op: &'static str,
        array: &'static str,
        dtype: DType,
    },

    #[error("{op}: `{array}` is {got:?}, expected {expected:?}")]
    DTypeMismatch
    {
        op: &'static str,
        array: &'static str,
        expected: DType,
        got: DType,
    },

    #[error("{op}: `{array}` must be {expected}, found {got:?}")]
    Residency
    {
        op: &'static str,
        array: &'static str,
        expected: &'static str,
        got: Residency,
    },

    #[error("{op}: invalid `{arg}`: {reason}")]
    InvalidArgument
    {
        op: &'static str,
        arg: &'static str,
        reason: String,
    },

    #[error("{op}: failed to allocate {len} elements for `{array}`")]
    Alloc
    {
        op: &'static str,
        array: &'static str,
        len: usize,
    },

    #[error("shape {shape:?} does not describe {len} elements")]
    Shape
    {
        shape: Vec<usize>,
        len: usize,
    },

    #[error("failed to build the thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
