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
    error::{Error, Result},
    par,
};

/// Run-length decode an indptr: positions `indptr[i]..indptr[i + 1]` of the
/// output hold `i`, or `node_ids[i]` when ids are given. Turns a CSC column
/// pointer into the per edge column ids of a COO view.
///
/// `output_size` is `indptr[K]`; passing it only skips reading the last
/// offset, a mismatch is an error.
///
/// # Examples
///
/// ```
/// use glzip_subgraph::expand::expand_indptr;
///
/// let cols: Vec<i32> = expand_indptr(&[0i64, 2, 2, 5], None, None).unwrap();
/// assert_eq!(cols, vec![0, 0, 2, 2, 2]);
///
/// let ids = [7u64, 8, 9];
/// assert_eq!(expand_indptr(&[0i64, 1, 3, 3], Some(&ids[..]), Some(3)).unwrap(), vec![7, 8, 8]);
/// ```
pub fn expand_indptr<I, T>(indptr: &[I], node_ids: Option<&[T]>, output_size: Option<usize>) -> Result<Vec<T>>
where
    I: IdType,
    T: IdType,
{
    const OP: &str = "expand_indptr";

    let (first, last) = match (indptr.first(), indptr.last()) {
        (Some(first), Some(last)) => (first.to_usize(), last.to_usize()),
        _ => return Ok(Vec::new()),
    };
    let k = indptr.len() - 1;

    if first != 0 {
        return Err(Error::InvalidArgument {
            op: OP,
            arg: "indptr",
            reason: format!("starts at {} instead of 0", first),
        });
    }
    if let Some(ids) = node_ids {
        if ids.len() != k {
            return Err(Error::LengthMismatch {
                op: OP,
                array: "node_ids",
                expected: k,
                got: ids.len(),
            });
        }
    }
    if let Some(output_size) = output_size {
        if output_size != last {
            return Err(Error::LengthMismatch {
                op: OP,
                array: "output_size",
                expected: last,
                got: output_size,
            });
        }
    }

    if node_ids.is_none() && last > 0 {
        // Last segment that writes anything.
        let seg = indptr.partition_point(|x| x.to_usize() < last) - 1;
        if T::from_usize(seg).to_usize() != seg {
            return Err(Error::InvalidArgument {
                op: OP,
                arg: "indptr",
                reason: format!("segment {} does not fit {:?}", seg, T::DTYPE),
            });
        }
    }

    debug!("{}: {} segments, {} elements", OP, k, last);

    let mut out: Vec<T> = buffer::try_filled(last, OP, "output")?;

    par::segmented_fill(indptr, &mut out[..], |seg, _, piece| {
        piece.fill(node_ids.map_or_else(|| T::from_usize(seg), |ids| ids[seg]));
    });

    Ok(out)
}
