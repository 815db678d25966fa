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

//! Property-based tests for the subgraph kernels
//!
//! Every kernel is checked against a naive sequential rendition on arbitrary
//! inputs.

mod common;

use std::collections::HashSet;

use glzip_subgraph::{
    csc, cumsum, expand, is_in, sort,
    unique::{unique_and_compact, Compacted},
    Hints,
};
use proptest::prelude::*;

/// `(indptr, indices, etypes)` with per column sorted edge types below 4.
fn prop_csc(max_order: usize) -> impl Strategy<Value = (Vec<i64>, Vec<i64>, Vec<u8>)>
{
    prop::collection::vec(0i64..9, 1..max_order).prop_flat_map(|degrees| {
        let mut indptr = vec![0i64];
        for d in degrees {
            indptr.push(indptr[indptr.len() - 1] + d);
        }
        let num_edges = indptr[indptr.len() - 1] as usize;

        let columns = indptr.clone();
        let etypes = prop::collection::vec(0u8..4, num_edges).prop_map(move |mut tags| {
            for w in columns.windows(2) {
                tags[w[0] as usize..w[1] as usize].sort_unstable();
            }
            tags
        });

        (Just(indptr), prop::collection::vec(0i64..1_000_000, num_edges), etypes)
    })
}

/// A graph plus a frontier of its nodes, repeats allowed.
fn prop_csc_with_frontier() -> impl Strategy<Value = ((Vec<i64>, Vec<i64>, Vec<u8>), Vec<i64>)>
{
    prop_csc(80).prop_flat_map(|graph| {
        let order = graph.0.len() as i64 - 1;
        (Just(graph), prop::collection::vec(0..order, 0..60))
    })
}

// Property: sort yields a non-decreasing permutation and positions that point
// back into the input
proptest! {
    #[test]
    fn prop_sort_is_a_stable_permutation(xs in prop::collection::vec(0u32..(1 << 20), 0..3000)) {
        let (sorted, positions) = sort::sort_with_positions(&xs[..], None);

        prop_assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
        for (i, &p) in positions.iter().enumerate() {
            prop_assert_eq!(sorted[i], xs[p]);
        }

        let mut seen = positions.clone();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..xs.len()).collect::<Vec<_>>());

        // Equal keys keep their input order.
        for i in 1..sorted.len() {
            if sorted[i - 1] == sorted[i] {
                prop_assert!(positions[i - 1] < positions[i]);
            }
        }

        let mut expected = xs.clone();
        expected.sort();
        prop_assert_eq!(sort::sort(&xs[..], Some(20)), expected);
    }
}

// Property: is_in agrees with a linear scan
proptest! {
    #[test]
    fn prop_is_in_matches_linear_scan(
        elements in prop::collection::vec(0i64..64, 0..200),
        test_elements in prop::collection::vec(0i64..64, 0..50),
    ) {
        let found = is_in::is_in(&elements[..], &test_elements[..]);
        prop_assert_eq!(found.len(), elements.len());
        for (x, hit) in elements.iter().zip(found) {
            prop_assert_eq!(hit, test_elements.contains(x));
        }
    }
}

// Property: exclusive cumsum starts at zero and its first differences give the
// input back
proptest! {
    #[test]
    fn prop_exclusive_cumsum(xs in prop::collection::vec(0u32..100_000, 0..2000)) {
        let sums = cumsum::exclusive_cumsum(&xs[..]).unwrap();
        prop_assert_eq!(sums.len(), xs.len());
        if let Some(&first) = sums.first() {
            prop_assert_eq!(first, 0);
        }
        for i in 1..sums.len() {
            prop_assert_eq!(sums[i] - sums[i - 1], xs[i - 1] as i64);
        }

        let with_total = cumsum::exclusive_cumsum_with_total(&xs[..]).unwrap();
        prop_assert_eq!(with_total[xs.len()], xs.iter().map(|&x| x as i64).sum::<i64>());
    }
}

// Property: slicing followed by the segmented copy reproduces the neighbor
// lists of the frontier
proptest! {
    #[test]
    fn prop_index_select_matches_neighbors(((indptr, indices, _), nodes) in prop_csc_with_frontier()) {
        let graph = csc::Csc::<i64, i64, u8>::new(&indptr[..], &indices[..]).unwrap();
        let (new_indptr, new_indices) = graph.index_select(&nodes[..], Hints::new()).unwrap();

        let (expected_indptr, expected_indices) =
            common::naive_index_select(&indptr[..], &indices[..], &nodes[..]);
        prop_assert_eq!(new_indptr, expected_indptr);
        prop_assert_eq!(&new_indices[..], &expected_indices[..]);

        let (with_size, _) = graph
            .index_select(&nodes[..], Hints::new().output_size(expected_indices.len()))
            .unwrap();
        prop_assert_eq!(*with_size.last().unwrap() as usize, expected_indices.len());
    }
}

// Property: per type slicing keeps the edge count and every bucket only holds
// its own type
proptest! {
    #[test]
    fn prop_hetero_buckets(((indptr, indices, etypes), nodes) in prop_csc_with_frontier()) {
        let graph = csc::Csc::new(&indptr[..], &indices[..])
            .unwrap()
            .with_edge_types(&etypes[..])
            .unwrap();
        let (typed_indptr, typed_indices, typed_etypes) =
            graph.index_select_hetero(&nodes[..], 4, Hints::new()).unwrap();

        prop_assert_eq!(typed_indptr.len(), nodes.len() * 4 + 1);
        prop_assert_eq!(typed_indices.len(), typed_etypes.len());

        for (bucket, w) in typed_indptr.windows(2).enumerate() {
            let (row, etype) = (bucket / 4, bucket % 4);
            let n = nodes[row] as usize;
            let expected: Vec<i64> = (indptr[n]..indptr[n + 1])
                .filter(|&e| etypes[e as usize] as usize == etype)
                .map(|e| indices[e as usize])
                .collect();
            prop_assert_eq!(&typed_indices[w[0] as usize..w[1] as usize], &expected[..]);
            prop_assert!(typed_etypes[w[0] as usize..w[1] as usize]
                .iter()
                .all(|&t| t as usize == etype));
        }
    }
}

// Property: expanding an indptr and counting repeats recovers the degrees
proptest! {
    #[test]
    fn prop_expand_inverts_cumsum(degrees in prop::collection::vec(0u32..20, 0..300)) {
        let indptr = cumsum::exclusive_cumsum_with_total(&degrees[..]).unwrap();
        let cols: Vec<u64> = expand::expand_indptr(&indptr[..], None, None).unwrap();

        prop_assert_eq!(cols.len() as i64, *indptr.last().unwrap());
        prop_assert!(cols.windows(2).all(|w| w[0] <= w[1]));

        let mut counted = vec![0u32; degrees.len()];
        for c in cols {
            counted[c as usize] += 1;
        }
        prop_assert_eq!(counted, degrees);
    }
}

// Property: compaction keeps the destinations at the head, yields distinct
// ids and every relabeled id maps back to its original
proptest! {
    #[test]
    fn prop_unique_and_compact(
        src in prop::collection::vec(0u64..500, 0..400),
        dst in prop::collection::vec(0u64..500, 0..100),
    ) {
        let mut seen = HashSet::new();
        let unique_dst: Vec<u64> = dst.iter().copied().filter(|&d| seen.insert(d)).collect();

        let Compacted { unique_ids, compacted_src_ids, compacted_dst_ids } =
            unique_and_compact(&src[..], &dst[..], &unique_dst[..], None).unwrap();

        prop_assert_eq!(&unique_ids[..unique_dst.len()], &unique_dst[..]);

        let distinct: HashSet<u64> = unique_ids.iter().copied().collect();
        prop_assert_eq!(distinct.len(), unique_ids.len());
        let expected: HashSet<u64> = src.iter().chain(&dst).copied().collect();
        prop_assert_eq!(distinct, expected);

        for (&s, &c) in src.iter().zip(&compacted_src_ids) {
            prop_assert_eq!(unique_ids[c as usize], s);
        }
        for (&d, &c) in dst.iter().zip(&compacted_dst_ids) {
            prop_assert_eq!(unique_ids[c as usize], d);
        }
    }
}
