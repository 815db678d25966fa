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

//! Copy the neighbor lists of a node subset into a new, compact CSC.

use log::{debug, trace};
use rayon::prelude::*;

use super::slice::slice_csc_indptr;
use crate::{
    buffer, cumsum,
    dtype::IdType,
    error::{Error, Result},
    hints::Hints,
    par,
};

/// Select the columns `nodes` of the CSC `(indptr, indices)`.
///
/// Returns `(new_indptr, new_indices)` of lengths `nodes.len() + 1` and the
/// total degree of `nodes`, with the neighbor lists in frontier order.
///
/// # Examples
///
/// ```
/// use glzip_subgraph::{csc::index_select_csc, Hints};
///
/// let indptr = [0i64, 2, 2, 5];
/// let indices = [10i64, 11, 20, 21, 22];
/// let (new_indptr, new_indices) =
///     index_select_csc(&indptr, &indices, &[2i64, 0], Hints::new()).unwrap();
/// assert_eq!(new_indptr, vec![0, 3, 5]);
/// assert_eq!(new_indices, vec![20, 21, 22, 10, 11]);
/// ```
pub fn index_select_csc<T, I, N>(
    indptr: &[T],
    indices: &[I],
    nodes: &[N],
    hints: Hints,
) -> Result<(Vec<T::Accum>, Vec<I>)>
where
    T: IdType,
    I: IdType,
    N: IdType,
{
    let (in_degree, sliced_indptr) = slice_csc_indptr(indptr, Some(nodes))?;
    index_select_csc_sliced(&in_degree[..], &sliced_indptr[..], indices, nodes, hints)
}

/// The part of [`index_select_csc`] after slicing: `in_degree` and
/// `sliced_indptr` come from [`slice_csc_indptr`] or any other source that
/// gives the length and the start of every copied range.
///
/// `in_degree` may carry the trailing slot produced by the slicer. `nodes` is
/// only checked against `hints.nodes_max`. A `hints.output_size` that differs
/// from the real total is an error rather than a truncated copy.
pub fn index_select_csc_sliced<T, I, N>(
    in_degree: &[T],
    sliced_indptr: &[T],
    indices: &[I],
    nodes: &[N],
    hints: Hints,
) -> Result<(Vec<T::Accum>, Vec<I>)>
where
    T: IdType,
    I: IdType,
    N: IdType,
{
    const OP: &str = "index_select_csc";

    let m = sliced_indptr.len();

    if in_degree.len() != m && in_degree.len() != m + 1 {
        return Err(Error::LengthMismatch {
            op: OP,
            array: "in_degree",
            expected: m + 1,
            got: in_degree.len(),
        });
    }
    if nodes.len() != m {
        return Err(Error::LengthMismatch {
            op: OP,
            array: "nodes",
            expected: m,
            got: nodes.len(),
        });
    }
    if let Some(nodes_max) = hints.nodes_max {
        debug_assert!(nodes.par_iter().all(|n| n.radix_key() <= nodes_max));
    }

    let in_degree = &in_degree[..m];

    if let Some(end) = (0..m).into_par_iter().find_map_any(|i| {
        let end = sliced_indptr[i].to_usize() + in_degree[i].to_usize();
        (end > indices.len()).then_some(end)
    }) {
        return Err(Error::IndexOutOfBounds {
            op: OP,
            array: "sliced_indptr",
            index: end - 1,
            len: indices.len(),
        });
    }

    let new_indptr = cumsum::exclusive_cumsum_with_total(in_degree)?;
    let total = new_indptr[m].to_usize();

    debug!("{}: {} nodes, {} edges", OP, m, total);

    if let Some(output_size) = hints.output_size {
        if output_size != total {
            return Err(Error::LengthMismatch {
                op: OP,
                array: "output_size",
                expected: total,
                got: output_size,
            });
        }
    }

    let mut new_indices: Vec<I> = buffer::try_filled(total, OP, "indices")?;

    trace!("{}: segmented copy in chunks of {}", OP, par::chunk_len(total));

    par::segmented_fill(&new_indptr[..], &mut new_indices[..], |seg, first, piece| {
        let src = sliced_indptr[seg].to_usize() + first;
        piece.copy_from_slice(&indices[src..src + piece.len()]);
    });

    Ok((new_indptr, new_indices))
}
