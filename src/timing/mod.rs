//! Temporal mapping: frame tables and time-to-frame resolution.

pub(crate) mod frame_table;
pub(crate) mod time_mapper;
