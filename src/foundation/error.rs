/// Convenience result type used across wavyte-gif.
pub type GifResult<T> = Result<T, GifError>;

/// Top-level error taxonomy used by GIF source APIs.
#[derive(thiserror::Error, Debug)]
pub enum GifError {
    /// The decoder produced zero frames. A GIF without frames is never playable.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Playback time is not a valid position (negative without looping, or non-finite).
    #[error("invalid seek: {0}")]
    InvalidSeek(String),

    /// Direct frame index outside `[0, len)`.
    #[error("index out of range: {index} is not in [0, {len})")]
    IndexOutOfRange {
        /// Requested frame index.
        index: usize,
        /// Number of frames in the table.
        len: usize,
    },

    /// A rate was requested from a table whose total duration is zero.
    #[error("division undefined: {0}")]
    DivisionUndefined(String),

    /// A second load was requested on a player that already started one.
    #[error("already loading: {0}")]
    AlreadyLoading(String),

    /// Errors from the decode collaborator (IO, GIF parsing, inconsistent timing).
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors from the presentation collaborator.
    #[error("presentation error: {0}")]
    Presentation(String),

    /// Invalid user-provided configuration or lifecycle misuse.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GifError {
    /// Build a [`GifError::EmptyInput`] value.
    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }

    /// Build a [`GifError::InvalidSeek`] value.
    pub fn invalid_seek(msg: impl Into<String>) -> Self {
        Self::InvalidSeek(msg.into())
    }

    /// Build a [`GifError::DivisionUndefined`] value.
    pub fn division_undefined(msg: impl Into<String>) -> Self {
        Self::DivisionUndefined(msg.into())
    }

    /// Build a [`GifError::AlreadyLoading`] value.
    pub fn already_loading(msg: impl Into<String>) -> Self {
        Self::AlreadyLoading(msg.into())
    }

    /// Build a [`GifError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`GifError::Presentation`] value.
    pub fn presentation(msg: impl Into<String>) -> Self {
        Self::Presentation(msg.into())
    }

    /// Build a [`GifError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
