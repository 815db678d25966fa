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

//! Row selection along the leading axis.
//!
//! Arrays are row-major with `row_len` elements per row, so a 1-D array is the
//! `row_len == 1` case and a feature matrix selects whole feature rows.

use log::debug;
use rayon::prelude::*;

use crate::{
    buffer,
    dtype::{CastTo, IdType},
    error::{Error, Result},
};

/// `out[k] = input[index[k]]` for every row.
///
/// # Examples
///
/// ```
/// use glzip_subgraph::gather::index_select;
///
/// let features = [0.0f32, 0.5, 1.0, 1.5, 2.0, 2.5];
/// let rows = index_select(&features, 2, &[2i64, 0]).unwrap();
/// assert_eq!(rows, vec![2.0, 2.5, 0.0, 0.5]);
/// ```
pub fn index_select<T, I>(input: &[T], row_len: usize, index: &[I]) -> Result<Vec<T>>
where
    T: Copy + Default + Send + Sync,
    I: IdType,
{
    select_rows("index_select", input, row_len, index, |x| x)
}

/// [`index_select`] with every selected element converted to `U`.
pub fn gather<T, U, I>(input: &[T], row_len: usize, index: &[I]) -> Result<Vec<U>>
where
    T: CastTo<U> + Send + Sync,
    U: Copy + Default + Send + Sync,
    I: IdType,
{
    select_rows("gather", input, row_len, index, <T as CastTo<U>>::cast_to)
}

/// [`index_select`] for an `input` living in page-locked host memory that the
/// executor reads in place, without staging the whole array first. Only the
/// selected rows are ever touched.
pub fn uva_index_select<T, I>(input: &[T], row_len: usize, index: &[I]) -> Result<Vec<T>>
where
    T: Copy + Default + Send + Sync,
    I: IdType,
{
    select_rows("uva_index_select", input, row_len, index, |x| x)
}

fn select_rows<T, U, I, F>(
    op: &'static str,
    input: &[T],
    row_len: usize,
    index: &[I],
    convert: F,
) -> Result<Vec<U>>
where
    T: Copy + Sync,
    U: Copy + Default + Send + Sync,
    I: IdType,
    F: Fn(T) -> U + Sync,
{
    if row_len == 0 {
        return Ok(Vec::new());
    }
    if input.len() % row_len != 0 {
        return Err(Error::InvalidArgument {
            op,
            arg: "row_len",
            reason: format!("{} elements do not split into rows of {}", input.len(), row_len),
        });
    }

    let num_rows = input.len() / row_len;
    let len = index.len().checked_mul(row_len).ok_or(Error::Alloc {
        op,
        array: "output",
        len: usize::MAX,
    })?;

    debug!("{}: {} of {} rows, {} elements per row", op, index.len(), num_rows, row_len);

    let mut out: Vec<U> = buffer::try_filled(len, op, "output")?;

    out.par_chunks_mut(row_len)
        .zip(index.par_iter())
        .try_for_each(|(row, &i)| {
            let i = i.to_usize();
            if i >= num_rows {
                return Err(Error::IndexOutOfBounds {
                    op,
                    array: "index",
                    index: i,
                    len: num_rows,
                });
            }
            let src = &input[i * row_len..(i + 1) * row_len];
            for (y, &x) in row.iter_mut().zip(src) {
                *y = convert(x);
            }
            Ok(())
        })?;

    Ok(out)
}
