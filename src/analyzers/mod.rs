//! Group-by reductions over a filtered subset.
//!
//! Every function here is pure and reads only its input slice, so the
//! summaries can be computed in any order or in parallel.

pub mod aggregate;
pub mod types;
pub mod utility;
