//! Host side: media source contract, render graph scheduling, transport clock, JSON graph files.

pub(crate) mod def;
pub(crate) mod render_graph;
pub(crate) mod source;
pub(crate) mod transport;
