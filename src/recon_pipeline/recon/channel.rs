use ndarray::Array2;
use num_traits::{Float, FromPrimitive, ToPrimitive};
use rustfft::FftNum;

use crate::recon_pipeline::common::{ProcessError, Result};
use crate::recon_pipeline::recon::params::ReconParams;
use crate::recon_pipeline::saft::{TimeDelay, apply_saft};
use crate::recon_pipeline::signal::{EnvelopeDetector, cast, conv_same, firwin2, log_compress};

/// FIR length used for all channel filters.
pub const FIR_NUMTAPS: usize = 95;

/// Envelope and log-compressed image for one reconstructed channel.
#[derive(Debug, Clone)]
pub struct ChannelImages<F> {
    pub envelope: Array2<F>,
    pub log: Array2<u8>,
}

/// One channel's reconstruction: FIR filter designed once from the
/// parameter control points, then filter -> (optional SAFT) -> envelope
/// -> log compression -> rotation/flip alignment per scan.
#[derive(Debug)]
pub struct ChannelReconstructor<F> {
    kernel: Vec<F>,
    noise_floor: F,
    dynamic_range_db: F,
    rotate_offset: i32,
    saft: Option<TimeDelay>,
}

impl<F: Float + FromPrimitive + ToPrimitive + FftNum> ChannelReconstructor<F> {
    /// Designs the FIR kernel from `params`; fails on malformed filter
    /// control points. `saft` supplies the delay table when
    /// `params.enable_saft`.
    pub fn new(params: &ReconParams, saft: Option<TimeDelay>) -> Result<Self> {
        let kernel = firwin2(FIR_NUMTAPS, &params.filter_freq, &params.filter_gain, 0, 2.0)?;
        Ok(Self {
            kernel: kernel.into_iter().map(cast::<F>).collect(),
            noise_floor: cast(params.noise_floor),
            dynamic_range_db: cast(params.desired_dynamic_range),
            rotate_offset: params.rotate_offset,
            saft: if params.enable_saft { saft } else { None },
        })
    }

    /// Reconstruct one channel's RF matrix `(lines, samples)` in place,
    /// returning the envelope and the display-aligned log image.
    pub fn reconstruct(&self, rf: &mut Array2<F>, flip: bool) -> Result<ChannelImages<F>> {
        let (n_lines, n_samples) = rf.dim();
        if n_samples == 0 || n_lines == 0 {
            return Err(ProcessError::ShapeMismatch(n_lines, n_samples, 1, 1));
        }

        // Bandpass along fast time
        let mut scratch = vec![F::zero(); n_samples];
        let mut line = vec![F::zero(); n_samples];
        for mut row in rf.rows_mut() {
            for (dst, &v) in line.iter_mut().zip(row.iter()) {
                *dst = v;
            }
            conv_same(&line, &self.kernel, &mut scratch);
            for (dst, &v) in row.iter_mut().zip(scratch.iter()) {
                *dst = v;
            }
        }

        if let Some(td) = &self.saft {
            let (_rf_saft, rf_saft_cf) = apply_saft(td, rf);
            rf.assign(&rf_saft_cf);
        }

        // Analytic envelope per line
        let detector = EnvelopeDetector::<F>::new(n_samples);
        let mut envelope = Array2::<F>::zeros((n_lines, n_samples));
        for (row, mut env_row) in rf.rows().into_iter().zip(envelope.rows_mut()) {
            for (dst, &v) in line.iter_mut().zip(row.iter()) {
                *dst = v;
            }
            let out = env_row.as_slice_mut().ok_or_else(|| {
                ProcessError::Numeric("envelope buffer is not contiguous".into())
            })?;
            detector.envelope(&line, out);
        }

        let mut log =
            envelope.mapv(|v| log_compress(v, self.noise_floor, self.dynamic_range_db));

        rotate_lines_inplace(&mut log, self.rotate_offset);
        if flip {
            flip_lines_inplace(&mut log);
        }

        Ok(ChannelImages { envelope, log })
    }
}

/// Circularly shift lines (rows) by `offset`: line `l` moves to
/// `(l + offset) mod n`.
pub fn rotate_lines_inplace<T: Copy>(m: &mut Array2<T>, offset: i32) {
    let n = m.nrows() as i32;
    if n == 0 {
        return;
    }
    let shift = ((offset % n) + n) % n;
    if shift == 0 {
        return;
    }
    let src = m.clone();
    for (l, row) in src.rows().into_iter().enumerate() {
        let dst = (l + shift as usize) % n as usize;
        m.row_mut(dst).assign(&row);
    }
}

/// Mirror line order in place (equivalent to flipping the slow axis).
pub fn flip_lines_inplace<T: Copy>(m: &mut Array2<T>) {
    let n = m.nrows();
    for l in 0..n / 2 {
        for s in 0..m.ncols() {
            let tmp = m[[l, s]];
            m[[l, s]] = m[[n - 1 - l, s]];
            m[[n - 1 - l, s]] = tmp;
        }
    }
}
