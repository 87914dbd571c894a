//! Wavyte GIF sources: animated GIFs as seekable, time-addressable media.
//!
//! A decoded GIF becomes an immutable [`FrameTable`]; [`frame_at`] maps any playback time to the
//! frame that should be visible. Playback is always host-sampled: the host clock (a
//! [`Transport`] driving a [`RenderGraph`]) calls `update`/`seek`, and the source hands the
//! selected frame to its [`Presenter`] at each refresh boundary.
//!
//! - Decode with a [`GifDecoder`] (the default is [`ImageGifDecoder`])
//! - Drive a single animation with a [`GifPlayer`]
//! - Schedule several on a timeline with [`RenderGraph`] or a [`GraphDef`] JSON file
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;
mod graph;
mod playback;
mod present;
mod timing;

pub use crate::foundation::core::{Canvas, Fps, TimeWindow};
pub use crate::foundation::error::{GifError, GifResult};

pub use crate::assets::decode::{ImageGifDecoder, decode_gif_bytes};
pub use crate::assets::source::{DecodedGif, DecodedTiming, FramePixels, GifDecoder, GifSource};
pub use crate::graph::def::{GraphDef, SourceDef};
pub use crate::graph::render_graph::{DEFAULT_PRELOAD_S, NodeId, RenderGraph, TickReport};
pub use crate::graph::source::{GifSourceNode, MediaSource};
pub use crate::graph::transport::Transport;
pub use crate::playback::player::{GifPlayer, GifPlayerOpts, LoadStatus};
pub use crate::playback::state::PlaybackState;
pub use crate::present::png::{PngPresenter, ensure_parent_dir};
pub use crate::present::presenter::{InMemoryPresenter, NullPresenter, Presenter, SurfaceConfig};
pub use crate::timing::frame_table::{Frame, FrameTable};
pub use crate::timing::time_mapper::{FrameAt, frame_at, index_at};
