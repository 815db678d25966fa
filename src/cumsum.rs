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

use log::debug;

use crate::{
    buffer,
    dtype::IdType,
    error::Result,
    par,
};

/// `r[0] = 0` and `r[i] = input[0] + .. + input[i - 1]`, accumulated in the
/// wider `T::Accum` so a total edge count cannot overflow a narrow degree type.
///
/// # Examples
///
/// ```
/// use glzip_subgraph::cumsum::exclusive_cumsum;
///
/// assert_eq!(exclusive_cumsum(&[3i32, 2, 0, 4]).unwrap(), vec![0i64, 3, 5, 5]);
/// ```
pub fn exclusive_cumsum<T: IdType>(input: &[T]) -> Result<Vec<T::Accum>>
{
    debug!("exclusive_cumsum: {} items", input.len());

    let mut out = buffer::try_filled(input.len(), "exclusive_cumsum", "output")?;
    par::exclusive_scan(input, &mut out[..], T::widen);
    Ok(out)
}

/// Like [`exclusive_cumsum`] but one longer: the grand total is appended, so
/// the result is directly the indptr of the segments whose lengths are `input`.
pub fn exclusive_cumsum_with_total<T: IdType>(input: &[T]) -> Result<Vec<T::Accum>>
{
    let mut out = buffer::try_filled(input.len() + 1, "exclusive_cumsum", "output")?;
    let total = par::exclusive_scan(input, &mut out[..input.len()], T::widen);
    out[input.len()] = total;
    Ok(out)
}
