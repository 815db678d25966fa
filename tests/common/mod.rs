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

#![allow(dead_code)]

use rand::{
    distributions::{Distribution, Uniform},
    Rng,
};

/// Random CSC graph with `order` nodes and degrees below `max_degree`, plus a
/// sorted per column edge type below `num_etypes` for every edge.
pub fn random_csc<R: Rng>(
    rng: &mut R,
    order: usize,
    max_degree: usize,
    num_etypes: u8,
) -> (Vec<i64>, Vec<i64>, Vec<u8>)
{
    let degree = Uniform::new(0, max_degree);
    let node = Uniform::new(0, order as i64);
    let etype = Uniform::new(0, num_etypes);

    let mut indptr = Vec::with_capacity(order + 1);
    let mut indices = Vec::new();
    let mut etypes = Vec::new();

    indptr.push(0);
    for _ in 0..order {
        let d = degree.sample(rng);
        indices.extend((0..d).map(|_| node.sample(rng)));
        let mut tags: Vec<u8> = (0..d).map(|_| etype.sample(rng)).collect();
        tags.sort_unstable();
        etypes.extend(tags);
        indptr.push(indices.len() as i64);
    }

    (indptr, indices, etypes)
}

/// https://en.m.wikipedia.org/wiki/Reservoir_sampling#An_optimal_algorithm
pub fn reservoir_sample<T, I, R>(mut iter: I, rng: &mut R, k: usize) -> Vec<T>
where
    I: Iterator<Item = T>,
    R: Rng + ?Sized,
{
    let mut buf = Vec::with_capacity(k);

    for _ in 0..k {
        match iter.next() {
            Some(x) => buf.push(x),
            None => return buf,
        }
    }

    let slot = Uniform::new(0, k);
    let open_unit_interval = Uniform::new(f64::MIN_POSITIVE, 1.0);
    let k = k as f64;

    let mut w = (open_unit_interval.sample(rng).ln() / k).exp();

    loop {
        let skip = (open_unit_interval.sample(rng).ln() / (1.0 - w).ln()).floor() as usize;
        match iter.nth(skip) {
            Some(x) => {
                buf[slot.sample(rng)] = x;
                w *= (open_unit_interval.sample(rng).ln() / k).exp();
            }
            None => break,
        }
    }

    buf
}

/// `(indptr, indices)` picked by walking the graph node by node.
pub fn naive_index_select(indptr: &[i64], indices: &[i64], nodes: &[i64]) -> (Vec<i64>, Vec<i64>)
{
    let mut new_indptr = vec![0];
    let mut new_indices = Vec::new();
    for &n in nodes {
        let n = n as usize;
        new_indices.extend_from_slice(&indices[indptr[n] as usize..indptr[n + 1] as usize]);
        new_indptr.push(new_indices.len() as i64);
    }
    (new_indptr, new_indices)
}

pub fn init_logging()
{
    let _ = env_logger::builder().is_test(true).try_init();
}
