//! PA/US frame reconstruction pipeline
//!
//! This module turns raw photoacoustic + ultrasound RF recordings into
//! viewable images, with separate modules for binary ingestion, filter
//! synthesis, per-channel reconstruction, synthetic-aperture focusing,
//! radial remapping, and the playback engine that drives them.

pub mod common;
pub mod engine;
pub mod io;
pub mod radial;
pub mod recon;
pub mod saft;
pub mod signal;
pub mod timing;

pub use common::{ErrorKind, ProcessError, Result};

pub use io::{BinSample, BinfileLoader, Endianness, IOParams, PausPair};

pub use recon::{ChannelReconstructor, ReconParams, ReconParams2};

pub use saft::{SaftDelayParams, TimeDelay};

pub use engine::{BScanData, EngineEvent, EngineHandle, FrameEngine};
