//! Presentation collaborators.
//!
//! The core never draws. At each refresh boundary it hands the selected frame to a [`presenter::Presenter`].

/// PNG file output.
pub(crate) mod png;
/// Presenter trait and built-in presenters.
pub(crate) mod presenter;
