use std::sync::Arc;

use num_complex::Complex;
use num_traits::{Float, FromPrimitive, ToPrimitive};
use rustfft::{Fft, FftNum, FftPlanner};

use crate::recon_pipeline::signal::cast;

/// Analytic-signal envelope detector for fixed-length lines.
///
/// Plans forward and inverse transforms once; `envelope` can then be
/// called per line from any thread.
pub struct EnvelopeDetector<T: FftNum> {
    n: usize,
    fft: Arc<dyn Fft<T>>,
    ifft: Arc<dyn Fft<T>>,
}

impl<T: FftNum + Float + FromPrimitive> EnvelopeDetector<T> {
    pub fn new(n: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            n,
            fft: planner.plan_fft_forward(n),
            ifft: planner.plan_fft_inverse(n),
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Magnitude of the Hilbert-transformed (analytic) signal.
    ///
    /// `line` and `out` must both be `len()` samples.
    pub fn envelope(&self, line: &[T], out: &mut [T]) {
        debug_assert_eq!(line.len(), self.n);
        debug_assert_eq!(out.len(), self.n);

        let mut buf: Vec<Complex<T>> = line
            .iter()
            .map(|&v| Complex::new(v, T::zero()))
            .collect();
        self.fft.process(&mut buf);

        // Analytic-signal weighting: keep DC (and Nyquist for even n),
        // double the positive frequencies, zero the negative ones.
        let n = self.n;
        let two = cast::<T>(2.0);
        let half = n / 2;
        for (k, v) in buf.iter_mut().enumerate() {
            if k == 0 || (n % 2 == 0 && k == half) {
                // unchanged
            } else if k < half || (n % 2 == 1 && k == half) {
                *v = *v * two;
            } else {
                *v = Complex::new(T::zero(), T::zero());
            }
        }

        self.ifft.process(&mut buf);

        let scale = cast::<T>(1.0 / n as f64);
        for (o, v) in out.iter_mut().zip(buf.iter()) {
            *o = v.norm() * scale;
        }
    }
}

/// Same-length FIR convolution: the central part of the full convolution
/// of `line` with `kernel`.
pub fn conv_same<T: Float>(line: &[T], kernel: &[T], out: &mut [T]) {
    let n = line.len();
    let klen = kernel.len();
    let shift = (klen - 1) / 2;

    for (i, o) in out.iter_mut().enumerate() {
        let mut acc = T::zero();
        for (k, &c) in kernel.iter().enumerate() {
            let j = i + shift;
            if j >= k && j - k < n {
                acc = acc + c * line[j - k];
            }
        }
        *o = acc;
    }
}

/// Map an envelope amplitude into an 8-bit log-compressed intensity.
///
/// Values at or below `noise_floor` clip to 0; values `dynamic_range_db`
/// decibels above the floor clip to 255.
pub fn log_compress<T: Float + FromPrimitive + ToPrimitive>(
    v: T,
    noise_floor: T,
    dynamic_range_db: T,
) -> u8 {
    if noise_floor <= T::zero() {
        return if v > T::zero() { 255 } else { 0 };
    }
    if v <= noise_floor {
        return 0;
    }
    let db = cast::<T>(20.0) * (v / noise_floor).log10();
    if db >= dynamic_range_db {
        return 255;
    }
    let scaled = db / dynamic_range_db * cast::<T>(255.0);
    scaled.round().to_u8().unwrap_or(255)
}
