//! Numeric kernels for RF reconstruction
//!
//! FIR synthesis follows the windowed frequency-sampling method from
//! `scipy.signal.firwin2`; the envelope detector uses the analytic
//! signal. Kernels are generic over the working float so the same logic
//! runs in single or double precision.

mod envelope;
mod firwin;
mod interp;
mod window;

#[cfg(test)]
mod tests;

pub use envelope::{EnvelopeDetector, conv_same, log_compress};
pub use firwin::firwin2;
pub use interp::interp;
pub use window::hamming;

use num_traits::{Float, FromPrimitive};

pub(crate) fn cast<T: Float + FromPrimitive>(x: f64) -> T {
    T::from_f64(x).unwrap_or_else(T::zero)
}
