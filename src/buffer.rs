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

//! Output buffers sized by data dependent totals. Allocation failure is
//! reported to the caller instead of aborting the process.

use crate::error::{Error, Result};

/// A `Vec` of `len` default values, or `Error::Alloc`.
pub(crate) fn try_filled<T>(len: usize, op: &'static str, array: &'static str) -> Result<Vec<T>>
where
    T: Default + Clone,
{
    let mut buf = try_with_capacity(len, op, array)?;
    buf.resize(len, T::default());
    Ok(buf)
}

pub(crate) fn try_with_capacity<T>(
    len: usize,
    op: &'static str,
    array: &'static str,
) -> Result<Vec<T>>
{
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::Alloc { op, array, len })?;
    Ok(buf)
}
