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

//! Degrees and offsets of a node subset, optionally split by edge type.

use log::debug;
use rayon::prelude::*;

use crate::{
    buffer,
    dtype::IdType,
    error::{Error, Result},
};

/// How the edges of one sliced row are partitioned.
#[derive(Clone, Copy, Debug)]
pub enum EdgeTypes<'a, E>
{
    /// One bucket per row holding all of its edges.
    Homogeneous,
    /// `num_fanouts` buckets per row. `etypes` tags every compacted edge and
    /// is sorted ascending inside each row; every tag is below `num_fanouts`.
    Hetero
    {
        etypes: &'a [E],
        num_fanouts: usize,
    },
}

impl<E> EdgeTypes<'_, E>
{
    fn buckets(&self) -> usize
    {
        match self {
            Self::Homogeneous => 1,
            Self::Hetero { num_fanouts, .. } => *num_fanouts,
        }
    }
}

/// Per bucket ranges of a sliced graph, `buckets = rows * num_fanouts`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlicedIndptr<T>
{
    /// Start of every bucket in the compacted indices, plus the total.
    pub sub_indptr: Vec<T>,
    /// Length of every bucket, plus a trailing 0 so that an exclusive cumsum
    /// yields an indptr directly.
    pub indegree: Vec<T>,
    /// Start of every bucket in the original indices.
    pub sliced_indptr: Vec<T>,
}

/// `(indegree, offset)` of `nodes` in `indptr`: `offset[i] = indptr[nodes[i]]`
/// and `indegree[i] = indptr[nodes[i] + 1] - indptr[nodes[i]]`. `indegree` has
/// one more slot, set to 0. Without `nodes` every node of the graph is taken.
///
/// # Examples
///
/// ```
/// use glzip_subgraph::csc::slice_csc_indptr;
///
/// let indptr = [0i64, 2, 2, 5];
/// let (indegree, offset) = slice_csc_indptr(&indptr, Some(&[2i64, 0][..])).unwrap();
/// assert_eq!(indegree, vec![3, 2, 0]);
/// assert_eq!(offset, vec![2, 0]);
/// ```
pub fn slice_csc_indptr<T, N>(indptr: &[T], nodes: Option<&[N]>) -> Result<(Vec<T>, Vec<T>)>
where
    T: IdType,
    N: IdType,
{
    const OP: &str = "slice_csc_indptr";

    let num_nodes = indptr.len().saturating_sub(1);
    let m = nodes.map_or(num_nodes, |ns| ns.len());

    debug!("{}: {} of {} nodes", OP, m, num_nodes);

    let mut indegree: Vec<T> = buffer::try_filled(m + 1, OP, "indegree")?;
    let mut offset: Vec<T> = buffer::try_filled(m, OP, "offset")?;

    indegree[..m]
        .par_iter_mut()
        .zip(offset.par_iter_mut())
        .enumerate()
        .try_for_each(|(i, (degree, start))| {
            let node = nodes.map_or(i, |ns| ns[i].to_usize());
            if node >= num_nodes {
                return Err(Error::IndexOutOfBounds {
                    op: OP,
                    array: "nodes",
                    index: node,
                    len: num_nodes,
                });
            }
            let (lo, hi) = (indptr[node].to_usize(), indptr[node + 1].to_usize());
            *start = indptr[node];
            *degree = T::from_usize(hi.saturating_sub(lo));
            Ok(())
        })?;

    Ok((indegree, offset))
}

/// Split every row of an already compacted slice into `num_fanouts` per type
/// ranges. Returns `(sub_indptr, indegree, sliced_indptr)` of lengths
/// `M * F + 1`, `M * F + 1` and `M * F`; see [`partition_sliced`].
pub fn slice_csc_indptr_hetero<T, E>(
    sub_indptr: &[T],
    etypes: &[E],
    sliced_indptr: &[T],
    num_fanouts: usize,
) -> Result<(Vec<T>, Vec<T>, Vec<T>)>
where
    T: IdType,
    E: IdType,
{
    let SlicedIndptr {
        sub_indptr,
        indegree,
        sliced_indptr,
    } = partition_sliced(
        sub_indptr,
        sliced_indptr,
        EdgeTypes::Hetero {
            etypes,
            num_fanouts,
        },
    )?;
    Ok((sub_indptr, indegree, sliced_indptr))
}

/// Bucket `r * F + t` holds the edges of row `r` tagged `t`. Its compacted
/// start is `sub_indptr[r] + lo`, its original start `sliced_indptr[r] + lo`,
/// where `lo..hi` is the range of tag `t` inside the row. Tags missing from a
/// row give empty buckets and the total edge count is unchanged.
pub fn partition_sliced<T, E>(
    sub_indptr: &[T],
    sliced_indptr: &[T],
    edge_types: EdgeTypes<'_, E>,
) -> Result<SlicedIndptr<T>>
where
    T: IdType,
    E: IdType,
{
    const OP: &str = "slice_csc_indptr_hetero";

    let rows = sliced_indptr.len();
    let fanouts = edge_types.buckets();

    if sub_indptr.len() != rows + 1 {
        return Err(Error::LengthMismatch {
            op: OP,
            array: "sub_indptr",
            expected: rows + 1,
            got: sub_indptr.len(),
        });
    }
    if fanouts == 0 {
        return Err(Error::InvalidArgument {
            op: OP,
            arg: "num_fanouts",
            reason: "must be at least 1".to_string(),
        });
    }
    let num_edges = sub_indptr[rows].to_usize();
    if let EdgeTypes::Hetero { etypes, .. } = edge_types {
        if etypes.len() != num_edges {
            return Err(Error::LengthMismatch {
                op: OP,
                array: "etypes",
                expected: num_edges,
                got: etypes.len(),
            });
        }
    }

    let buckets = rows
        .checked_mul(fanouts)
        .ok_or(Error::Alloc { op: OP, array: "sub_indptr", len: usize::MAX })?;

    debug!("{}: {} rows, {} fanouts, {} edges", OP, rows, fanouts, num_edges);

    let mut new_sub_indptr: Vec<T> = buffer::try_filled(buckets + 1, OP, "sub_indptr")?;
    let mut indegree: Vec<T> = buffer::try_filled(buckets + 1, OP, "indegree")?;
    let mut new_sliced_indptr: Vec<T> = buffer::try_filled(buckets, OP, "sliced_indptr")?;

    new_sub_indptr[..buckets]
        .par_iter_mut()
        .zip(indegree[..buckets].par_iter_mut())
        .zip(new_sliced_indptr.par_iter_mut())
        .enumerate()
        .try_for_each(|(i, ((sub, degree), sliced))| {
            let (row, etype) = (i / fanouts, i % fanouts);
            let begin = sub_indptr[row].to_usize();
            let end = sub_indptr[row + 1].to_usize();
            if begin > end || end > num_edges {
                return Err(Error::InvalidArgument {
                    op: OP,
                    arg: "sub_indptr",
                    reason: format!("row {} spans {}..{} of {} edges", row, begin, end, num_edges),
                });
            }
            let (lo, hi) = match edge_types {
                EdgeTypes::Homogeneous => (0, end - begin),
                EdgeTypes::Hetero { etypes, .. } => {
                    let tags = &etypes[begin..end];
                    (
                        tags.partition_point(|e| e.to_usize() < etype),
                        tags.partition_point(|e| e.to_usize() <= etype),
                    )
                }
            };
            *sub = T::from_usize(begin + lo);
            *degree = T::from_usize(hi - lo);
            *sliced = T::from_usize(sliced_indptr[row].to_usize() + lo);
            Ok(())
        })?;

    new_sub_indptr[buckets] = sub_indptr[rows];

    Ok(SlicedIndptr {
        sub_indptr: new_sub_indptr,
        indegree,
        sliced_indptr: new_sliced_indptr,
    })
}
