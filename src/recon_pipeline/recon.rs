//! Per-channel reconstruction: FIR filtering, envelope detection,
//! dynamic-range log compression, rotation/flip alignment.

mod channel;
mod params;

#[cfg(test)]
mod tests;

pub use channel::{
    ChannelImages, ChannelReconstructor, FIR_NUMTAPS, flip_lines_inplace, rotate_lines_inplace,
};
pub use params::{ReconParams, ReconParams2};
