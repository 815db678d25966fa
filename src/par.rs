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

use std::{marker::PhantomData, ops::Add};

use rayon::prelude::*;

use crate::dtype::IdType;

/// Smallest piece of work worth handing to another thread.
pub const MIN_CHUNK_LEN: usize = 1 << 12;

const CHUNKS_PER_THREAD: usize = 4;

/// Chunk length used to split `n` items over the current pool.
pub fn chunk_len(n: usize) -> usize
{
    let chunks = rayon::current_num_threads() * CHUNKS_PER_THREAD;
    std::cmp::max((n + chunks - 1) / chunks, MIN_CHUNK_LEN)
}

pub fn max<T, I>(xs: I) -> Option<T>
where
    T: Ord + Copy + Sync + Send,
    I: IntoParallelIterator<Item = T>,
{
    xs.into_par_iter()
        .fold(
            || None,
            |acc, x| match acc {
                Some(y) => Some(std::cmp::max(x, y)),
                None => Some(x),
            },
        )
        .reduce(
            || None,
            |x, y| match (x, y) {
                (Some(a), Some(b)) => Some(std::cmp::max(a, b)),
                (a, None) => a,
                (None, b) => b,
            },
        )
}

/// Number of bits needed to represent `value`.
pub fn bits_for(value: u64) -> u32
{
    u64::BITS - value.leading_zeros()
}

/// `num_bits` for a radix sort over the given id slices: the hint when it is
/// positive, otherwise derived from the largest element.
pub fn resolve_num_bits<T: IdType>(hint: Option<u32>, slices: &[&[T]]) -> u32
{
    match hint {
        Some(bits) if bits > 0 => std::cmp::min(bits, u64::BITS),
        _ => {
            let largest = slices
                .iter()
                .filter_map(|xs| max(xs.par_iter().map(|x| x.radix_key())))
                .max()
                .unwrap_or(0);
            bits_for(largest)
        }
    }
}

/// Blocked exclusive scan: `out[i] = f(input[0]) + .. + f(input[i - 1])`.
/// Returns the total over the whole input.
pub fn exclusive_scan<T, A, F>(input: &[T], out: &mut [A], f: F) -> A
where
    T: Copy + Sync,
    A: Copy + Default + Add<Output = A> + Send + Sync,
    F: Fn(T) -> A + Sync,
{
    debug_assert_eq!(input.len(), out.len());

    let chunk = chunk_len(input.len());

    let sums: Vec<A> = input
        .par_chunks(chunk)
        .map(|xs| xs.iter().fold(A::default(), |acc, &x| acc + f(x)))
        .collect();

    let mut offsets = Vec::with_capacity(sums.len());
    let mut total = A::default();
    for sum in sums {
        offsets.push(total);
        total = total + sum;
    }

    out.par_chunks_mut(chunk)
        .zip(input.par_chunks(chunk))
        .zip(offsets.into_par_iter())
        .for_each(|((ys, xs), offset)| {
            let mut acc = offset;
            for (y, &x) in ys.iter_mut().zip(xs) {
                *y = acc;
                acc = acc + f(x);
            }
        });

    total
}

/// Walk `out` in equal chunks and hand every piece of every segment to
/// `fill(segment, offset_in_segment, piece)`. `offsets` is an indptr whose
/// last value is `out.len()`. Segments are split across chunks, so a single
/// huge segment does not serialize the work.
pub fn segmented_fill<A, O, F>(offsets: &[A], out: &mut [O], fill: F)
where
    A: IdType,
    O: Send,
    F: Fn(usize, usize, &mut [O]) + Sync,
{
    debug_assert_eq!(offsets.last().map(|x| x.to_usize()), Some(out.len()));

    if out.is_empty() {
        return;
    }

    let chunk = chunk_len(out.len());

    out.par_chunks_mut(chunk)
        .enumerate()
        .for_each(|(c, piece)| {
            let start = c * chunk;
            let end = start + piece.len();
            let mut seg = offsets.partition_point(|&o| o.to_usize() <= start) - 1;
            let mut pos = start;
            while pos < end {
                let stop = std::cmp::min(offsets[seg + 1].to_usize(), end);
                if stop > pos {
                    fill(seg, pos - offsets[seg].to_usize(), &mut piece[pos - start..stop - start]);
                    pos = stop;
                }
                seg += 1;
            }
        });
}

/// Shared view of a slice for scatter kernels in which every index is
/// written by exactly one task.
pub struct DisjointSlice<'a, T>
{
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

unsafe impl<T: Send> Send for DisjointSlice<'_, T> {}
unsafe impl<T: Send> Sync for DisjointSlice<'_, T> {}

impl<'a, T> DisjointSlice<'a, T>
{
    pub fn new(slice: &'a mut [T]) -> Self
    {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    /// # Safety
    ///
    /// No other task may read or write index `i` while the view is alive.
    #[inline]
    pub unsafe fn write(&self, i: usize, value: T)
    {
        assert!(i < self.len);
        // SAFETY: in bounds, and exclusive per the caller's contract.
        unsafe { self.ptr.add(i).write(value) }
    }
}
