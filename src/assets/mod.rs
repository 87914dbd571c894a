//! Decode collaborator boundary.
//!
//! The core never parses GIF bytes itself; it consumes a [`source::DecodedGif`] produced by a
//! [`source::GifDecoder`]. [`decode::ImageGifDecoder`] is the default implementation.

pub(crate) mod decode;
pub(crate) mod source;
