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

//! Data-parallel kernels for building the subgraphs of a sampled mini-batch
//! out of a large CSC graph: sorting, membership, prefix sums, column slicing
//! and copying, row gathers, indptr expansion and id compaction.
//!
//! The generic kernels work on plain slices and run on the current rayon
//! pool. [`Ops`] wraps them for dynamically typed [`Tensor`]s and runs them on
//! a pool of its own.

mod buffer;

pub mod csc;
pub mod cumsum;
pub mod dtype;
pub mod error;
pub mod expand;
pub mod gather;
pub mod hints;
pub mod is_in;
pub mod ops;
pub mod par;
pub mod sort;
pub mod tensor;
pub mod unique;

pub use csc::Csc;
pub use dtype::{DType, Element, IdType};
pub use error::{Error, Result};
pub use hints::Hints;
pub use ops::{Ops, OpsBuilder};
pub use tensor::{Residency, Tensor};
pub use unique::Compacted;
