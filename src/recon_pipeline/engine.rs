//! Frame engine and playback controller
//!
//! A dedicated engine thread owns the loader, the per-frame buffers, and
//! the playback loop. Frontends talk to it through [`EngineHandle`]
//! (commands in) and a [`crossbeam_channel`] receiver of
//! [`EngineEvent`]s (results out); no engine state is touched from other
//! threads except the mutex-guarded live parameter pair and the atomic
//! playback flags.

mod events;
mod frame;
mod worker;
mod writer;


pub use events::EngineEvent;
pub use frame::{BScanData, FloatType};
pub use worker::{EngineHandle, FrameEngine};
