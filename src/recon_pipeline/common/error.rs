use thiserror::Error;

/// Broad failure classes used by the engine to pick a recovery policy.
///
/// `Io` aborts the operation and leaves engine state unchanged, `Config`
/// skips the offending operation and keeps the previous valid state,
/// `Compute` drops the current frame and lets playback continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Config,
    Compute,
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to open scan file: {0}")]
    FileOpen(String),

    #[error("Short read: frame {frame} wanted {wanted} bytes, got {got}")]
    ShortRead {
        frame: usize,
        wanted: usize,
        got: usize,
    },

    #[error("Frame index {0} out of range (file has {1} frames)")]
    FrameOutOfRange(usize, usize),

    #[error("Failed to create output directory: {0}")]
    OutputDir(String),

    #[error("Invalid filter specification: {0}")]
    FilterSpec(String),

    #[error("Mismatched shapes: {0}x{1} vs {2}x{3}")]
    ShapeMismatch(usize, usize, usize, usize),

    #[error("Invalid parameter file: {0}")]
    ParamParse(String),

    #[error("Numeric failure: {0}")]
    Numeric(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessError::FileOpen(_)
            | ProcessError::ShortRead { .. }
            | ProcessError::OutputDir(_)
            | ProcessError::Io(_) => ErrorKind::Io,
            ProcessError::FrameOutOfRange(_, _)
            | ProcessError::FilterSpec(_)
            | ProcessError::ShapeMismatch(_, _, _, _)
            | ProcessError::ParamParse(_) => ErrorKind::Config,
            ProcessError::Numeric(_) => ErrorKind::Compute,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProcessError>;
