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

//! Compressed Sparse Column graphs as the sampling kernels see them: an
//! `indptr`, the flat `indices` of every column and, optionally, one edge type
//! tag per edge.

mod index_select;
mod slice;

pub use index_select::{index_select_csc, index_select_csc_sliced};
pub use slice::{
    partition_sliced, slice_csc_indptr, slice_csc_indptr_hetero, EdgeTypes, SlicedIndptr,
};

use crate::{
    dtype::IdType,
    error::{Error, Result},
    hints::Hints,
};

/// Borrowed CSC graph. Construction checks the cheap structural invariants;
/// the graph itself is never mutated.
#[derive(Clone, Copy, Debug)]
pub struct Csc<'a, T, I, E = u8>
{
    indptr: &'a [T],
    indices: &'a [I],
    type_per_edge: Option<&'a [E]>,
}

impl<'a, T, I, E> Csc<'a, T, I, E>
where
    T: IdType,
    I: IdType,
    E: IdType,
{
    pub fn new(indptr: &'a [T], indices: &'a [I]) -> Result<Self>
    {
        const OP: &str = "csc";

        match (indptr.first(), indptr.last()) {
            (Some(first), Some(last)) if first.to_usize() == 0 => {
                if last.to_usize() != indices.len() {
                    return Err(Error::LengthMismatch {
                        op: OP,
                        array: "indices",
                        expected: last.to_usize(),
                        got: indices.len(),
                    });
                }
            }
            _ => {
                return Err(Error::InvalidArgument {
                    op: OP,
                    arg: "indptr",
                    reason: "must be non-empty and start at 0".to_string(),
                })
            }
        }

        Ok(Self {
            indptr,
            indices,
            type_per_edge: None,
        })
    }

    pub fn with_edge_types(self, type_per_edge: &'a [E]) -> Result<Self>
    {
        if type_per_edge.len() != self.indices.len() {
            return Err(Error::LengthMismatch {
                op: "csc",
                array: "type_per_edge",
                expected: self.indices.len(),
                got: type_per_edge.len(),
            });
        }
        Ok(Self {
            type_per_edge: Some(type_per_edge),
            ..self
        })
    }

    /// The number of nodes in the graph.
    pub fn order(&self) -> usize
    {
        self.indptr.len() - 1
    }

    /// The number of edges in the graph.
    pub fn size(&self) -> usize
    {
        self.indices.len()
    }

    pub fn indptr(&self) -> &'a [T]
    {
        self.indptr
    }

    pub fn indices(&self) -> &'a [I]
    {
        self.indices
    }

    pub fn type_per_edge(&self) -> Option<&'a [E]>
    {
        self.type_per_edge
    }

    /// The in-neighbors of `node`, empty when `node` is out of range.
    pub fn neighbors(&self, node: usize) -> &'a [I]
    {
        match (self.indptr.get(node), self.indptr.get(node + 1)) {
            (Some(lo), Some(hi)) => &self.indices[lo.to_usize()..hi.to_usize()],
            _ => &[],
        }
    }

    /// Compact subgraph of the columns `nodes`, see [`index_select_csc`].
    pub fn index_select<N: IdType>(&self, nodes: &[N], hints: Hints) -> Result<(Vec<T::Accum>, Vec<I>)>
    {
        index_select_csc(self.indptr, self.indices, nodes, hints)
    }

    /// Like [`Csc::index_select`] but every column is further split into
    /// `num_fanouts` edge type buckets. Returns the per bucket
    /// `(indptr, indices, type_per_edge)`.
    pub fn index_select_hetero<N: IdType>(
        &self,
        nodes: &[N],
        num_fanouts: usize,
        hints: Hints,
    ) -> Result<(Vec<T::Accum>, Vec<I>, Vec<E>)>
    {
        let etypes = self.type_per_edge.ok_or(Error::InvalidArgument {
            op: "index_select_hetero",
            arg: "type_per_edge",
            reason: "the graph has no edge types".to_string(),
        })?;

        let (in_degree, sliced_indptr) = slice_csc_indptr(self.indptr, Some(nodes))?;
        let (sub_indptr, sub_etypes) =
            index_select_csc_sliced(&in_degree[..], &sliced_indptr[..], etypes, nodes, hints)?;

        let SlicedIndptr {
            indegree,
            sliced_indptr,
            ..
        } = partition_sliced(
            &sub_indptr[..],
            &widen(&sliced_indptr[..]),
            EdgeTypes::Hetero {
                etypes: &sub_etypes[..],
                num_fanouts,
            },
        )?;

        let buckets = vec![0u8; indegree.len().saturating_sub(1)];
        let (indptr, indices) = index_select_csc_sliced(
            &indegree[..],
            &sliced_indptr[..],
            self.indices,
            &buckets[..],
            Hints {
                nodes_max: None,
                ..hints
            },
        )?;

        let indptr = indptr
            .into_iter()
            .map(|x| <T::Accum as IdType>::from_usize(x.to_usize()))
            .collect();

        Ok((indptr, indices, sub_etypes))
    }
}

fn widen<T: IdType>(xs: &[T]) -> Vec<T::Accum>
{
    xs.iter().map(|&x| x.widen()).collect()
}
