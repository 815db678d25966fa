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

//! The tensor level entry points. Each call resolves the element widths of
//! its arguments once, then runs the generic kernel on the context's own
//! thread pool.

use std::borrow::Cow;

use log::debug;
use rayon::{prelude::*, ThreadPool};

use crate::{
    csc, cumsum,
    dtype::{dispatch_all, dispatch_ids, dispatch_ints, dispatch_numeric, DType, Element, IdType},
    error::{Error, Result},
    expand, gather,
    hints::Hints,
    is_in, sort,
    tensor::{Residency, Tensor},
    unique,
};

pub struct OpsBuilder
{
    num_threads: usize,
}

impl OpsBuilder
{
    pub fn new() -> Self
    {
        Self {
            num_threads: num_cpus::get(),
        }
    }

    pub fn num_threads(self, num_threads: usize) -> Self
    {
        Self { num_threads }
    }

    pub fn build(self) -> Result<Ops>
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .thread_name(|i| format!("glzip-subgraph-{}", i))
            .build()?;

        debug!("ops: thread pool with {} threads", pool.current_num_threads());

        Ok(Ops { pool })
    }
}

impl Default for OpsBuilder
{
    fn default() -> Self
    {
        Self::new()
    }
}

/// Owns the worker pool every kernel of this context runs on.
///
/// # Examples
///
/// ```
/// use glzip_subgraph::{OpsBuilder, Tensor};
///
/// let ops = OpsBuilder::new().num_threads(2).build().unwrap();
/// let sums = ops.exclusive_cumsum(&Tensor::from_vec(vec![2i32, 0, 3])).unwrap();
/// assert_eq!(sums.into_vec::<i64>().unwrap(), vec![0, 2, 2]);
/// ```
pub struct Ops
{
    pool: ThreadPool,
}

impl Ops
{
    pub fn num_threads(&self) -> usize
    {
        self.pool.current_num_threads()
    }

    /// Run `f` on this context's pool, e.g. to call the generic kernels
    /// directly on plain slices.
    pub fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        self.pool.install(f)
    }

    pub fn sort(&self, input: &Tensor, num_bits: Option<u32>) -> Result<Tensor>
    {
        const OP: &str = "sort";

        dispatch_ints!(input.dtype(), OP, "input", T => {
            let xs = vector::<T>(input, OP, "input")?;
            let sorted = self.install(|| sort::sort(xs, num_bits));
            Ok(output(sorted, input.residency()))
        })
    }

    /// `(sorted, positions)` with `positions` as an I64 tensor.
    pub fn sort_with_positions(&self, input: &Tensor, num_bits: Option<u32>) -> Result<(Tensor, Tensor)>
    {
        const OP: &str = "sort";

        dispatch_ints!(input.dtype(), OP, "input", T => {
            let xs = vector::<T>(input, OP, "input")?;
            let (sorted, positions) = self.install(|| {
                let (sorted, positions) = sort::sort_with_positions(xs, num_bits);
                (sorted, to_i64(positions))
            });
            Ok((output(sorted, input.residency()), output(positions, input.residency())))
        })
    }

    /// Bool tensor, see [`is_in::is_in`]. Both tensors must share a dtype.
    pub fn is_in(&self, elements: &Tensor, test_elements: &Tensor) -> Result<Tensor>
    {
        const OP: &str = "is_in";

        dispatch_ints!(elements.dtype(), OP, "elements", T => {
            let xs = vector::<T>(elements, OP, "elements")?;
            let ys = vector::<T>(test_elements, OP, "test_elements")?;
            let found = self.install(|| is_in::is_in(xs, ys));
            Ok(output(found, elements.residency()))
        })
    }

    /// The result has the accumulator dtype of the input: U64 for U64,
    /// otherwise I64.
    pub fn exclusive_cumsum(&self, input: &Tensor) -> Result<Tensor>
    {
        const OP: &str = "exclusive_cumsum";

        dispatch_ints!(input.dtype(), OP, "input", T => {
            let xs = vector::<T>(input, OP, "input")?;
            let sums = self.install(|| cumsum::exclusive_cumsum(xs))?;
            Ok(output(sums, input.residency()))
        })
    }

    /// `(indegree, offset)` in the dtype of `indptr`.
    pub fn slice_csc_indptr(&self, indptr: &Tensor, nodes: Option<&Tensor>) -> Result<(Tensor, Tensor)>
    {
        const OP: &str = "slice_csc_indptr";

        dispatch_ids!(indptr.dtype(), OP, "indptr", T => {
            let offsets = vector::<T>(indptr, OP, "indptr")?;
            let (indegree, offset) = match nodes {
                None => self.install(|| csc::slice_csc_indptr::<T, T>(offsets, None))?,
                Some(nodes) => dispatch_ids!(nodes.dtype(), OP, "nodes", N => {
                    let ns = vector::<N>(nodes, OP, "nodes")?;
                    self.install(|| csc::slice_csc_indptr(offsets, Some(ns)))?
                }),
            };
            Ok((output(indegree, indptr.residency()), output(offset, indptr.residency())))
        })
    }

    /// `(sub_indptr, indegree, sliced_indptr)`, all in the dtype of
    /// `sub_indptr`. `sliced_indptr` may be of any id width, e.g. the dtype of
    /// the graph's indptr while `sub_indptr` is its accumulator; `etypes` may
    /// be any integer.
    pub fn slice_csc_indptr_hetero(
        &self,
        sub_indptr: &Tensor,
        etypes: &Tensor,
        sliced_indptr: &Tensor,
        num_fanouts: usize,
    ) -> Result<(Tensor, Tensor, Tensor)>
    {
        const OP: &str = "slice_csc_indptr_hetero";

        let residency = sub_indptr.residency();

        dispatch_ids!(sub_indptr.dtype(), OP, "sub_indptr", T => {
            let sub = vector::<T>(sub_indptr, OP, "sub_indptr")?;
            let sliced = offsets::<T>(sliced_indptr, OP, "sliced_indptr")?;
            dispatch_ints!(etypes.dtype(), OP, "etypes", E => {
                let tags = vector::<E>(etypes, OP, "etypes")?;
                let (a, b, c) = self.install(|| {
                    csc::slice_csc_indptr_hetero(sub, tags, &sliced[..], num_fanouts)
                })?;
                Ok((output(a, residency), output(b, residency), output(c, residency)))
            })
        })
    }

    /// `(new_indptr, new_indices)`; the indptr has the accumulator dtype of
    /// `indptr`, the indices keep the dtype of `indices`.
    pub fn index_select_csc(
        &self,
        indptr: &Tensor,
        indices: &Tensor,
        nodes: &Tensor,
        hints: Hints,
    ) -> Result<(Tensor, Tensor)>
    {
        let (in_degree, sliced_indptr) = self.slice_csc_indptr(indptr, Some(nodes))?;
        self.index_select_csc_sliced(&in_degree, &sliced_indptr, indices, nodes, hints)
    }

    /// [`Ops::index_select_csc`] after slicing. `sliced_indptr` is converted
    /// to the dtype of `in_degree` when the two differ.
    pub fn index_select_csc_sliced(
        &self,
        in_degree: &Tensor,
        sliced_indptr: &Tensor,
        indices: &Tensor,
        nodes: &Tensor,
        hints: Hints,
    ) -> Result<(Tensor, Tensor)>
    {
        const OP: &str = "index_select_csc";

        let residency = indices.residency();

        dispatch_ids!(in_degree.dtype(), OP, "in_degree", T => {
            let degrees = vector::<T>(in_degree, OP, "in_degree")?;
            let starts = offsets::<T>(sliced_indptr, OP, "sliced_indptr")?;
            dispatch_ints!(indices.dtype(), OP, "indices", I => {
                let edges = vector::<I>(indices, OP, "indices")?;
                dispatch_ids!(nodes.dtype(), OP, "nodes", N => {
                    let ns = vector::<N>(nodes, OP, "nodes")?;
                    let (new_indptr, new_indices) = self.install(|| {
                        csc::index_select_csc_sliced(degrees, &starts[..], edges, ns, hints)
                    })?;
                    Ok((output(new_indptr, residency), output(new_indices, residency)))
                })
            })
        })
    }

    /// Rows of `input` picked by `index`, converted to `dtype` when given.
    /// Converting rows is numeric only; Bool rows can only be gathered as
    /// they are.
    pub fn gather(&self, input: &Tensor, index: &Tensor, dtype: Option<DType>) -> Result<Tensor>
    {
        const OP: &str = "gather";

        let dtype = match dtype {
            Some(dtype) if dtype != input.dtype() => dtype,
            _ => return self.select_rows(OP, input, index, input.residency(), false),
        };

        let row_len = input.row_len();
        let mut shape = input.shape().to_vec();
        let idx = offsets::<i64>(index, OP, "index")?;
        shape[0] = idx.len();

        let storage = dispatch_numeric!(input.dtype(), OP, "input", T => {
            let rows = input.as_slice::<T>()?;
            dispatch_numeric!(dtype, OP, "dtype", U => {
                let converted =
                    self.install(|| gather::gather::<T, U, i64>(rows, row_len, &idx[..]))?;
                U::into_storage(converted)
            })
        });

        Ok(Tensor::from_parts(storage, shape, input.residency()))
    }

    pub fn index_select(&self, input: &Tensor, index: &Tensor) -> Result<Tensor>
    {
        self.select_rows("index_select", input, index, input.residency(), false)
    }

    /// Row selection straight out of pinned host memory. `input` must be
    /// [`Residency::Pinned`], `index` pinned or on the device; the result is on
    /// the device.
    pub fn uva_index_select(&self, input: &Tensor, index: &Tensor) -> Result<Tensor>
    {
        const OP: &str = "uva_index_select";

        if input.residency() != Residency::Pinned {
            return Err(Error::Residency {
                op: OP,
                array: "input",
                expected: "pinned host memory",
                got: input.residency(),
            });
        }
        if index.residency() == Residency::Host {
            return Err(Error::Residency {
                op: OP,
                array: "index",
                expected: "device or pinned host memory",
                got: index.residency(),
            });
        }

        self.select_rows(OP, input, index, Residency::Device, true)
    }

    fn select_rows(
        &self,
        op: &'static str,
        input: &Tensor,
        index: &Tensor,
        residency: Residency,
        uva: bool,
    ) -> Result<Tensor>
    {
        let row_len = input.row_len();
        let mut shape = input.shape().to_vec();

        dispatch_ids!(index.dtype(), op, "index", I => {
            let idx = vector::<I>(index, op, "index")?;
            shape[0] = idx.len();
            dispatch_all!(input.dtype(), op, "input", T => {
                let rows = input.as_slice::<T>()?;
                let selected = self.install(|| {
                    if uva {
                        gather::uva_index_select(rows, row_len, idx)
                    }
                    else {
                        gather::index_select(rows, row_len, idx)
                    }
                })?;
                Ok(Tensor::from_parts(T::into_storage(selected), shape, residency))
            })
        })
    }

    /// Per edge column ids of dtype `dtype`, see [`expand::expand_indptr`].
    /// `node_ids` is converted to `dtype` first when its dtype differs.
    pub fn expand_indptr(
        &self,
        indptr: &Tensor,
        dtype: DType,
        node_ids: Option<&Tensor>,
        output_size: Option<usize>,
    ) -> Result<Tensor>
    {
        const OP: &str = "expand_indptr";

        let node_ids = node_ids.map(|ids| ids.cast(dtype)).transpose()?;

        dispatch_ids!(indptr.dtype(), OP, "indptr", I => {
            let offsets = vector::<I>(indptr, OP, "indptr")?;
            dispatch_ints!(dtype, OP, "dtype", T => {
                let ids = match &node_ids {
                    Some(ids) => Some(vector::<T>(ids, OP, "node_ids")?),
                    None => None,
                };
                let expanded = self.install(|| expand::expand_indptr(offsets, ids, output_size))?;
                Ok(output(expanded, indptr.residency()))
            })
        })
    }

    /// `(unique_ids, compacted_src_ids, compacted_dst_ids)`, all in the dtype
    /// shared by the three inputs.
    pub fn unique_and_compact(
        &self,
        src_ids: &Tensor,
        dst_ids: &Tensor,
        unique_dst_ids: &Tensor,
        hints: Hints,
    ) -> Result<(Tensor, Tensor, Tensor)>
    {
        const OP: &str = "unique_and_compact";

        let residency = src_ids.residency();

        dispatch_ints!(src_ids.dtype(), OP, "src_ids", T => {
            let src = vector::<T>(src_ids, OP, "src_ids")?;
            let dst = vector::<T>(dst_ids, OP, "dst_ids")?;
            let unique_dst = vector::<T>(unique_dst_ids, OP, "unique_dst_ids")?;
            let compacted = self.install(|| {
                unique::unique_and_compact(src, dst, unique_dst, hints.num_bits)
            })?;
            Ok((
                output(compacted.unique_ids, residency),
                output(compacted.compacted_src_ids, residency),
                output(compacted.compacted_dst_ids, residency),
            ))
        })
    }
}

/// The 1-D contents of `tensor`, which must be of dtype `T`.
fn vector<'a, T: Element>(tensor: &'a Tensor, op: &'static str, array: &'static str) -> Result<&'a [T]>
{
    if tensor.shape().len() != 1 {
        return Err(Error::InvalidArgument {
            op,
            arg: array,
            reason: format!("expected a 1-D tensor, got shape {:?}", tensor.shape()),
        });
    }
    T::from_storage(tensor.storage()).ok_or(Error::DTypeMismatch {
        op,
        array,
        expected: T::DTYPE,
        got: tensor.dtype(),
    })
}

/// The 1-D offsets or ids in `tensor` as `T`. Any other id width is
/// converted, and a value that does not fit `T` is an error.
fn offsets<'a, T: IdType>(tensor: &'a Tensor, op: &'static str, array: &'static str) -> Result<Cow<'a, [T]>>
{
    if tensor.dtype() == T::DTYPE {
        return vector::<T>(tensor, op, array).map(Cow::Borrowed);
    }
    dispatch_ids!(tensor.dtype(), op, array, S => {
        let xs = vector::<S>(tensor, op, array)?;
        let converted = xs
            .par_iter()
            .map(|&x| {
                let y = T::from_usize(x.to_usize());
                if y.to_usize() == x.to_usize() {
                    Ok(y)
                }
                else {
                    Err(Error::InvalidArgument {
                        op,
                        arg: array,
                        reason: format!("{:?} does not fit {:?}", x, T::DTYPE),
                    })
                }
            })
            .collect::<Result<Vec<T>>>()?;
        Ok(Cow::Owned(converted))
    })
}

fn output<T: Element>(data: Vec<T>, residency: Residency) -> Tensor
{
    Tensor::from_vec(data).with_residency(residency)
}

fn to_i64(positions: Vec<usize>) -> Vec<i64>
{
    positions.into_par_iter().map(|p| p as i64).collect()
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn ops() -> Ops
    {
        OpsBuilder::new().num_threads(2).build().unwrap()
    }

    #[test]
    fn builder_sets_thread_count()
    {
        assert_eq!(ops().num_threads(), 2);
    }

    #[test]
    fn sort_tensor_with_positions()
    {
        let (sorted, positions) = ops()
            .sort_with_positions(&Tensor::from_vec(vec![3u32, 1, 2]), None)
            .unwrap();
        assert_eq!(sorted.into_vec::<u32>().unwrap(), vec![1, 2, 3]);
        assert_eq!(positions.into_vec::<i64>().unwrap(), vec![1, 2, 0]);
    }

    #[test]
    fn floats_cannot_be_sorted()
    {
        assert!(matches!(
            ops().sort(&Tensor::from_vec(vec![1.0f32]), None),
            Err(Error::UnsupportedDType { dtype: DType::F32, .. })
        ));
    }

    #[test]
    fn is_in_requires_matching_dtypes()
    {
        let res = ops().is_in(&Tensor::from_vec(vec![1i32]), &Tensor::from_vec(vec![1i64]));
        assert!(matches!(
            res,
            Err(Error::DTypeMismatch { array: "test_elements", expected: DType::I32, got: DType::I64, .. })
        ));
    }

    #[test]
    fn index_select_csc_on_tensors()
    {
        let ops = ops();
        let indptr = Tensor::from_vec(vec![0i64, 2, 2, 5]);
        let indices = Tensor::from_vec(vec![10i32, 11, 20, 21, 22]);
        let nodes = Tensor::from_vec(vec![2u32, 0]);

        let (new_indptr, new_indices) = ops
            .index_select_csc(&indptr, &indices, &nodes, Hints::new().output_size(5))
            .unwrap();
        assert_eq!(new_indptr.into_vec::<i64>().unwrap(), vec![0, 3, 5]);
        assert_eq!(new_indices.into_vec::<i32>().unwrap(), vec![20, 21, 22, 10, 11]);
    }

    #[test]
    fn gather_keeps_trailing_shape_and_converts()
    {
        let input = Tensor::from_shape_vec(vec![3, 2], vec![0i32, 1, 2, 3, 4, 5]).unwrap();
        let out = ops()
            .gather(&input, &Tensor::from_vec(vec![2i64, 2, 0]), Some(DType::F64))
            .unwrap();
        assert_eq!(out.shape(), &[3, 2]);
        assert_eq!(out.into_vec::<f64>().unwrap(), vec![4., 5., 4., 5., 0., 1.]);
    }

    #[test]
    fn gather_converts_with_any_index_width()
    {
        let ops = ops();
        let input = Tensor::from_vec(vec![1.5f32, -2.5, 300.0]).pin();

        let out = ops
            .gather(&input, &Tensor::from_vec(vec![2u32, 0]), Some(DType::U8))
            .unwrap();
        assert_eq!(out.residency(), Residency::Pinned);
        assert_eq!(out.into_vec::<u8>().unwrap(), vec![255, 1]);

        assert!(matches!(
            ops.gather(&input, &Tensor::from_vec(vec![3i32]), Some(DType::I64)),
            Err(Error::IndexOutOfBounds { index: 3, len: 3, .. })
        ));

        let flags = Tensor::from_vec(vec![true, false]);
        assert!(matches!(
            ops.gather(&flags, &Tensor::from_vec(vec![0i64]), Some(DType::U8)),
            Err(Error::UnsupportedDType { dtype: DType::Bool, .. })
        ));
        let same = ops.gather(&flags, &Tensor::from_vec(vec![1i64]), Some(DType::Bool)).unwrap();
        assert_eq!(same.into_vec::<bool>().unwrap(), vec![false]);
    }

    #[test]
    fn index_select_bool_rows()
    {
        let input = Tensor::from_vec(vec![true, false, true]);
        let out = ops().index_select(&input, &Tensor::from_vec(vec![1i32, 0])).unwrap();
        assert_eq!(out.into_vec::<bool>().unwrap(), vec![false, true]);
    }

    #[test]
    fn uva_checks_residency()
    {
        let ops = ops();
        let input = Tensor::from_shape_vec(vec![2, 3], vec![1f32, 2., 3., 4., 5., 6.]).unwrap();
        let index = Tensor::from_vec(vec![1i64]).to_device();

        assert!(matches!(
            ops.uva_index_select(&input, &index),
            Err(Error::Residency { array: "input", got: Residency::Host, .. })
        ));

        let input = input.pin();
        assert!(matches!(
            ops.uva_index_select(&input, &Tensor::from_vec(vec![1i64])),
            Err(Error::Residency { array: "index", .. })
        ));

        let out = ops.uva_index_select(&input, &index).unwrap();
        assert_eq!(out.residency(), Residency::Device);
        assert_eq!(out.shape(), &[1, 3]);
        assert_eq!(out.into_vec::<f32>().unwrap(), vec![4., 5., 6.]);
    }

    #[test]
    fn expand_casts_node_ids()
    {
        let out = ops()
            .expand_indptr(
                &Tensor::from_vec(vec![0i32, 2, 3]),
                DType::I64,
                Some(&Tensor::from_vec(vec![40u32, 50])),
                Some(3),
            )
            .unwrap();
        assert_eq!(out.into_vec::<i64>().unwrap(), vec![40, 40, 50]);
    }

    #[test]
    fn hetero_slice_on_tensors()
    {
        let (sub, indegree, sliced) = ops()
            .slice_csc_indptr_hetero(
                &Tensor::from_vec(vec![0i64, 3]),
                &Tensor::from_vec(vec![0i8, 1, 1]),
                &Tensor::from_vec(vec![7i64]),
                2,
            )
            .unwrap();
        assert_eq!(sub.into_vec::<i64>().unwrap(), vec![0, 1, 3]);
        assert_eq!(indegree.into_vec::<i64>().unwrap(), vec![1, 2, 0]);
        assert_eq!(sliced.into_vec::<i64>().unwrap(), vec![7, 8]);
    }

    #[test]
    fn hetero_chain_on_a_32_bit_graph()
    {
        let ops = ops();
        let indptr = Tensor::from_vec(vec![0i32, 2, 2, 5]);
        let indices = Tensor::from_vec(vec![10i32, 11, 20, 21, 22]);
        let type_per_edge = Tensor::from_vec(vec![1u8, 1, 0, 1, 1]);
        let nodes = Tensor::from_vec(vec![2i32, 0]);

        let (in_degree, sliced_indptr) = ops.slice_csc_indptr(&indptr, Some(&nodes)).unwrap();
        assert_eq!(sliced_indptr.dtype(), DType::I32);

        let (sub_indptr, sub_etypes) = ops
            .index_select_csc_sliced(&in_degree, &sliced_indptr, &type_per_edge, &nodes, Hints::new())
            .unwrap();
        assert_eq!(sub_indptr.dtype(), DType::I64);

        let (typed_sub, typed_degree, typed_sliced) = ops
            .slice_csc_indptr_hetero(&sub_indptr, &sub_etypes, &sliced_indptr, 2)
            .unwrap();
        assert_eq!(typed_sliced.dtype(), DType::I64);

        let buckets = Tensor::from_vec(vec![0i32; 4]);
        let (new_indptr, new_indices) = ops
            .index_select_csc_sliced(&typed_degree, &typed_sliced, &indices, &buckets, Hints::new())
            .unwrap();

        assert_eq!(typed_sub.into_vec::<i64>().unwrap(), vec![0, 1, 3, 3, 5]);
        assert_eq!(new_indptr.into_vec::<i64>().unwrap(), vec![0, 1, 3, 3, 5]);
        assert_eq!(new_indices.into_vec::<i32>().unwrap(), vec![20, 21, 22, 10, 11]);
    }

    #[test]
    fn narrowing_offsets_must_fit()
    {
        let res = ops().index_select_csc_sliced(
            &Tensor::from_vec(vec![1i32]),
            &Tensor::from_vec(vec![1i64 << 40]),
            &Tensor::from_vec(vec![0i32]),
            &Tensor::from_vec(vec![0i32]),
            Hints::new(),
        );
        assert!(matches!(res, Err(Error::InvalidArgument { arg: "sliced_indptr", .. })));
    }

    #[test]
    fn unique_and_compact_on_tensors()
    {
        let (unique, src, dst) = ops()
            .unique_and_compact(
                &Tensor::from_vec(vec![7i64, 9, 5]),
                &Tensor::from_vec(vec![5i64, 7]),
                &Tensor::from_vec(vec![5i64, 7]),
                Hints::new(),
            )
            .unwrap();
        assert_eq!(unique.into_vec::<i64>().unwrap(), vec![5, 7, 9]);
        assert_eq!(src.into_vec::<i64>().unwrap(), vec![1, 2, 0]);
        assert_eq!(dst.into_vec::<i64>().unwrap(), vec![0, 1]);
    }

    #[test]
    fn matrices_are_not_id_arrays()
    {
        let m = Tensor::from_shape_vec(vec![1, 2], vec![0i64, 1]).unwrap();
        assert!(matches!(
            ops().exclusive_cumsum(&m),
            Err(Error::InvalidArgument { arg: "input", .. })
        ));
    }
}
