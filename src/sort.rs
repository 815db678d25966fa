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

//! Parallel least significant digit radix sort.
//!
//! Every pass counts digits per chunk, turns the counts into digit-major
//! offsets and scatters each chunk into its own disjoint slots, so the sort is
//! stable and ties keep their original order.

use log::trace;
use rayon::prelude::*;

use crate::{
    dtype::IdType,
    par::{self, DisjointSlice},
};

const RADIX_BITS: u32 = 8;

const RADIX: usize = 1 << RADIX_BITS;

/// Sort `input` ascending.
///
/// Every element must be below `1 << num_bits`. With `num_bits` absent or 0
/// the width is derived from the largest element first.
///
/// # Examples
///
/// ```
/// use glzip_subgraph::sort;
///
/// assert_eq!(sort::sort(&[5u32, 1, 4, 1], Some(3)), vec![1, 1, 4, 5]);
/// ```
pub fn sort<T: IdType>(input: &[T], num_bits: Option<u32>) -> Vec<T>
{
    let num_bits = par::resolve_num_bits(num_bits, &[input]);
    let payload = vec![(); input.len()];
    radix_sort(input.to_vec(), payload, num_bits).0
}

/// Sort `input` ascending and return, next to it, the position every sorted
/// element had in `input`, i.e. `sorted[i] == input[positions[i]]`.
pub fn sort_with_positions<T: IdType>(input: &[T], num_bits: Option<u32>) -> (Vec<T>, Vec<usize>)
{
    let num_bits = par::resolve_num_bits(num_bits, &[input]);
    let positions = (0..input.len()).into_par_iter().collect();
    radix_sort(input.to_vec(), positions, num_bits)
}

fn radix_sort<T, P>(mut keys: Vec<T>, mut payload: Vec<P>, num_bits: u32) -> (Vec<T>, Vec<P>)
where
    T: IdType,
    P: Copy + Send + Sync,
{
    debug_assert_eq!(keys.len(), payload.len());

    let n = keys.len();
    let passes = (num_bits + RADIX_BITS - 1) / RADIX_BITS;

    if n <= 1 || passes == 0 {
        return (keys, payload);
    }

    let chunk = par::chunk_len(n);
    let mut keys_out = vec![T::default(); n];
    let mut payload_out = payload.clone();

    trace!("radix sort: {} items, {} bits, {} passes, chunk {}", n, num_bits, passes, chunk);

    for pass in 0..passes {
        let shift = pass * RADIX_BITS;
        let digit = move |x: T| ((x.radix_key() >> shift) as usize) & (RADIX - 1);

        let histograms: Vec<[usize; RADIX]> = keys
            .par_chunks(chunk)
            .map(|xs| {
                let mut counts = [0usize; RADIX];
                for &x in xs {
                    counts[digit(x)] += 1;
                }
                counts
            })
            .collect();

        let mut offsets = histograms.clone();
        let mut total = 0usize;
        let mut single_bucket = false;
        for d in 0..RADIX {
            let start = total;
            for (c, counts) in histograms.iter().enumerate() {
                offsets[c][d] = total;
                total += counts[d];
            }
            single_bucket |= total - start == n;
        }

        // Every key has the same digit, the pass would be the identity.
        if single_bucket {
            continue;
        }

        {
            let keys_dst = DisjointSlice::new(&mut keys_out[..]);
            let payload_dst = DisjointSlice::new(&mut payload_out[..]);

            keys.par_chunks(chunk)
                .zip(payload.par_chunks(chunk))
                .zip(offsets.into_par_iter())
                .for_each(|((xs, ps), mut next)| {
                    for (&x, &p) in xs.iter().zip(ps) {
                        let d = digit(x);
                        // SAFETY: the digit-major offsets hand every chunk
                        // its own range of slots for each digit.
                        unsafe {
                            keys_dst.write(next[d], x);
                            payload_dst.write(next[d], p);
                        }
                        next[d] += 1;
                    }
                });
        }

        std::mem::swap(&mut keys, &mut keys_out);
        std::mem::swap(&mut payload, &mut payload_out);
    }

    (keys, payload)
}
