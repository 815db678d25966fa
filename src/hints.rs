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

/// Optional facts the caller already knows about a call's inputs.
///
/// No hint changes a result. `num_bits` cuts radix passes; the other two
/// are validated against what the kernel computes anyway, since a host
/// kernel learns them from the same scan that sizes its output.
///
/// ```
/// use glzip_subgraph::Hints;
///
/// let hints = Hints::new().num_bits(20).output_size(1 << 16);
/// assert_eq!(hints.num_bits, Some(20));
/// assert_eq!(hints.nodes_max, None);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hints
{
    /// Every id is below `1 << num_bits`. Bounds the radix sort passes; 0
    /// means the same as absent.
    pub num_bits: Option<u32>,
    /// Total number of elements the call writes, e.g. copied edges. A value
    /// that differs from the computed total is a `LengthMismatch`.
    pub output_size: Option<usize>,
    /// Upper bound on the node ids of a frontier. Only asserted in debug
    /// builds.
    pub nodes_max: Option<u64>,
}

impl Hints
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn num_bits(self, num_bits: u32) -> Self
    {
        Self {
            num_bits: Some(num_bits),
            ..self
        }
    }

    pub fn output_size(self, output_size: usize) -> Self
    {
        Self {
            output_size: Some(output_size),
            ..self
        }
    }

    pub fn nodes_max(self, nodes_max: u64) -> Self
    {
        Self {
            nodes_max: Some(nodes_max),
            ..self
        }
    }
}
