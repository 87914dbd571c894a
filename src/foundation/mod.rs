//! Shared primitives: error taxonomy, time/rate value types and pixel math.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;
