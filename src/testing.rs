//! Testing utilities for ironstream pipelines.
//!
//! - **Assertions**: compare pipeline outputs with expected results, with or
//!   without regard to order, and check that sequential and parallel
//!   evaluation agree.
//! - **Fixtures**: small datasets used across the crate's own tests.
//!
//! # Quick Start
//!
//! ```
//! use ironstream::*;
//! use ironstream::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let doubled = from_vec(vec![1, 2, 3]).map(|x| x * 2).collect_vec()?;
//! assert_collections_equal(&doubled, &[2, 4, 6]);
//!
//! assert_modes_agree(|| from_iter(1..=100).filter(|x| x % 7 == 0).sorted());
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
