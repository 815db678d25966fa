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

//! Deduplicate the ids touched by a sampling hop and relabel its edges.

use log::debug;
use rayon::prelude::*;

use crate::{
    buffer,
    dtype::IdType,
    error::{Error, Result},
    is_in::SortedLookup,
    par, sort,
};

/// Result of [`unique_and_compact`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Compacted<T>
{
    /// `unique_dst_ids` in their original order, followed by the sorted
    /// source ids that are not destinations.
    pub unique_ids: Vec<T>,
    /// `unique_ids[compacted_src_ids[i]] == src_ids[i]`.
    pub compacted_src_ids: Vec<T>,
    /// `unique_ids[compacted_dst_ids[i]] == dst_ids[i]`.
    pub compacted_dst_ids: Vec<T>,
}

/// `unique(concat(unique_dst_ids, src_ids))` with `unique_dst_ids` kept at the
/// head in their order, plus the positions of every `src_ids` and `dst_ids`
/// entry in it.
///
/// `unique_dst_ids` must be exactly the distinct values of `dst_ids`; that is
/// not re-verified beyond reporting a `dst_ids` value it lacks. `num_bits`
/// bounds every id, see [`sort::sort`].
///
/// # Examples
///
/// ```
/// use glzip_subgraph::unique::unique_and_compact;
///
/// let c = unique_and_compact(&[7i64, 9, 5], &[5, 7], &[5, 7], None).unwrap();
/// assert_eq!(c.unique_ids, vec![5, 7, 9]);
/// assert_eq!(c.compacted_src_ids, vec![1, 2, 0]);
/// assert_eq!(c.compacted_dst_ids, vec![0, 1]);
/// ```
pub fn unique_and_compact<T: IdType>(
    src_ids: &[T],
    dst_ids: &[T],
    unique_dst_ids: &[T],
    num_bits: Option<u32>,
) -> Result<Compacted<T>>
{
    const OP: &str = "unique_and_compact";

    let num_bits = par::resolve_num_bits(num_bits, &[src_ids, unique_dst_ids]);

    debug!(
        "{}: {} src, {} dst, {} unique dst, {} bits",
        OP,
        src_ids.len(),
        dst_ids.len(),
        unique_dst_ids.len(),
        num_bits
    );

    let dst_lookup = SortedLookup::new(unique_dst_ids, Some(num_bits));

    let only_src: Vec<T> = src_ids
        .par_iter()
        .copied()
        .filter(|&x| !dst_lookup.contains(x))
        .collect();

    let sorted = sort::sort(&only_src[..], Some(num_bits));
    let new_ids: Vec<T> = (0..sorted.len())
        .into_par_iter()
        .filter(|&i| i == 0 || sorted[i] != sorted[i - 1])
        .map(|i| sorted[i])
        .collect();

    let head = unique_dst_ids.len();
    let mut unique_ids = buffer::try_with_capacity(head + new_ids.len(), OP, "unique_ids")?;
    unique_ids.extend_from_slice(unique_dst_ids);
    unique_ids.extend_from_slice(&new_ids[..]);

    let compact = |x: T| {
        dst_lookup
            .position(x)
            .or_else(|| new_ids.binary_search(&x).ok().map(|k| head + k))
            .map(T::from_usize)
    };

    let compacted_src_ids = src_ids
        .par_iter()
        .map(|&x| {
            compact(x).ok_or_else(|| Error::InvalidArgument {
                op: OP,
                arg: "src_ids",
                reason: format!("{:?} was lost while deduplicating", x),
            })
        })
        .collect::<Result<Vec<T>>>()?;

    let compacted_dst_ids = dst_ids
        .par_iter()
        .map(|&x| {
            dst_lookup
                .position(x)
                .map(T::from_usize)
                .ok_or_else(|| Error::InvalidArgument {
                    op: OP,
                    arg: "unique_dst_ids",
                    reason: format!("dst id {:?} is missing", x),
                })
        })
        .collect::<Result<Vec<T>>>()?;

    Ok(Compacted {
        unique_ids,
        compacted_src_ids,
        compacted_dst_ids,
    })
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn destinations_stay_at_the_head()
    {
        let c = unique_and_compact(&[3u32, 8, 3, 1, 8], &[8, 4, 8], &[8, 4], None).unwrap();
        assert_eq!(&c.unique_ids[..2], &[8, 4]);
        assert_eq!(c.unique_ids, vec![8, 4, 1, 3]);
        assert_eq!(c.compacted_src_ids, vec![3, 0, 3, 2, 0]);
        assert_eq!(c.compacted_dst_ids, vec![0, 1, 0]);
    }

    #[test]
    fn no_edges()
    {
        let c = unique_and_compact::<i64>(&[], &[], &[6, 2], Some(4)).unwrap();
        assert_eq!(c.unique_ids, vec![6, 2]);
        assert!(c.compacted_src_ids.is_empty());
        assert!(c.compacted_dst_ids.is_empty());

        let c = unique_and_compact::<i64>(&[], &[], &[], None).unwrap();
        assert!(c.unique_ids.is_empty());
    }

    #[test]
    fn all_zero_ids()
    {
        let c = unique_and_compact(&[0i32, 0], &[0, 0], &[0], None).unwrap();
        assert_eq!(c.unique_ids, vec![0]);
        assert_eq!(c.compacted_src_ids, vec![0, 0]);
        assert_eq!(c.compacted_dst_ids, vec![0, 0]);
    }

    #[test]
    fn missing_destination_is_reported()
    {
        let res = unique_and_compact(&[1i64], &[2, 3], &[2], None);
        assert!(matches!(res, Err(Error::InvalidArgument { arg: "unique_dst_ids", .. })));
    }
}
