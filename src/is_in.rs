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

//! Set membership of one id array against another.

use log::debug;
use rayon::prelude::*;

use crate::{dtype::IdType, sort};

/// A radix sorted copy of an id array that remembers where every value came
/// from. Lookups are binary searches.
pub(crate) struct SortedLookup<T>
{
    sorted: Vec<T>,
    positions: Vec<usize>,
}

impl<T: IdType> SortedLookup<T>
{
    pub(crate) fn new(values: &[T], num_bits: Option<u32>) -> Self
    {
        let (sorted, positions) = sort::sort_with_positions(values, num_bits);
        Self { sorted, positions }
    }

    pub(crate) fn contains(&self, value: T) -> bool
    {
        self.sorted.binary_search(&value).is_ok()
    }

    /// Position of `value` in the original array. With duplicates, the first
    /// occurrence.
    pub(crate) fn position(&self, value: T) -> Option<usize>
    {
        let i = self.sorted.partition_point(|&x| x < value);
        match self.sorted.get(i) {
            Some(&x) if x == value => Some(self.positions[i]),
            _ => None,
        }
    }
}

/// `out[i]` is true iff `elements[i]` occurs anywhere in `test_elements`.
///
/// `test_elements` is radix sorted once and every element is then looked up
/// in parallel, for `O((E + T) log T)` work.
///
/// # Examples
///
/// ```
/// use glzip_subgraph::is_in::is_in;
///
/// assert_eq!(is_in(&[1i64, 5, 3], &[3, 4, 1]), vec![true, false, true]);
/// ```
pub fn is_in<T: IdType>(elements: &[T], test_elements: &[T]) -> Vec<bool>
{
    debug!("is_in: {} elements against {}", elements.len(), test_elements.len());

    if test_elements.is_empty() {
        return vec![false; elements.len()];
    }

    let lookup = SortedLookup::new(test_elements, None);

    elements.par_iter().map(|&x| lookup.contains(x)).collect()
}
