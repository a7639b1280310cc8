use image::{GrayImage, RgbImage};
use ndarray::Array2;

use crate::recon_pipeline::io::PausPair;

/// Working precision of the reconstruction kernels.
pub type FloatType = f32;

/// Everything produced for one frame index.
///
/// Created fresh per frame by the engine and handed to the consumer
/// behind an `Arc`; the next frame replaces it rather than mutating it.
#[derive(Debug, Clone)]
pub struct BScanData<F> {
    pub frame_idx: usize,
    /// Raw merged RF as read from the file
    pub rf: Array2<u16>,
    /// Split, background-subtracted, filtered RF per channel
    pub rf_pair: PausPair<F>,
    /// Envelope per channel
    pub env: PausPair<F>,
    /// Log-compressed display image per channel
    pub log: PausPair<u8>,
    pub pa_radial: GrayImage,
    pub us_radial: GrayImage,
    pub overlay: RgbImage,
    /// Depth in metres represented by one radial pixel
    pub fct: f64,
}
