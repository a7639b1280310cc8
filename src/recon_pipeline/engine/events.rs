use std::sync::Arc;

use crate::recon_pipeline::engine::frame::{BScanData, FloatType};

/// Typed notifications emitted by the engine thread, in processing
/// order, onto a channel consumed by whatever frontend exists.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A file was opened and its frame count derived.
    FrameCountKnown(usize),
    /// The engine moved to this frame index.
    FrameIndexChanged(usize),
    /// A frame finished reconstruction. `pix2m` is the depth in metres
    /// of one radial pixel.
    FrameReady {
        data: Arc<BScanData<FloatType>>,
        pix2m: f64,
    },
    /// The sequential playback loop exited.
    FinishedPlaying,
    /// Human-readable progress or error text.
    Status(String),
}
