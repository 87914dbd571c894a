//! Playback: host-sampled state and the asynchronous load lifecycle around it.

pub(crate) mod player;
pub(crate) mod state;
