use std::f64::consts::PI;

use num_complex::Complex;
use realfft::RealFftPlanner;

use crate::recon_pipeline::common::{ProcessError, Result};
use crate::recon_pipeline::signal::{hamming, interp};

/// FIR filter design using the window method.
///
/// From the frequency sampling points `freq` (0.0 to Nyquist, Nyquist
/// being `fs / 2`) and corresponding gains `gain`, constructs a
/// linear-phase FIR filter with approximately the given frequency
/// response and applies a Hamming window to the result.
///
/// `freq` must be non-descending and start at 0; a value may be repeated
/// once to implement a discontinuity. `nfreqs` is the interpolation mesh
/// size; pass 0 for the default of one more than the next power of two
/// not less than `numtaps`.
pub fn firwin2(
    numtaps: usize,
    freq: &[f64],
    gain: &[f64],
    nfreqs: usize,
    fs: f64,
) -> Result<Vec<f64>> {
    if numtaps < 3 || numtaps % 2 == 0 {
        return Err(ProcessError::FilterSpec(
            "numtaps must be odd and greater or equal to 3".into(),
        ));
    }
    if freq.len() != gain.len() || freq.len() < 2 {
        return Err(ProcessError::FilterSpec(
            "freq and gain must have the same size and at least two elements".into(),
        ));
    }
    let nyq = 0.5 * fs;
    if freq[0] != 0.0 {
        return Err(ProcessError::FilterSpec("freq must start at 0".into()));
    }
    if freq.windows(2).any(|w| w[1] < w[0]) {
        return Err(ProcessError::FilterSpec("freq must be non-descending".into()));
    }
    if *freq.last().unwrap_or(&0.0) > nyq {
        return Err(ProcessError::FilterSpec(
            "freq must not exceed the Nyquist frequency".into(),
        ));
    }

    let nfreqs = if nfreqs == 0 {
        1 + numtaps.next_power_of_two()
    } else {
        nfreqs
    };
    if nfreqs <= numtaps {
        return Err(ProcessError::FilterSpec(
            "nfreqs must be greater than numtaps".into(),
        ));
    }

    // Linearly interpolate the desired response on a uniform mesh.
    let x: Vec<f64> = (0..nfreqs)
        .map(|i| nyq * i as f64 / (nfreqs - 1) as f64)
        .collect();
    let fx = interp(&x, freq, gain)?;

    // Adjust phase so the first `numtaps` samples of the inverse FFT are
    // the desired (causal, centered) filter coefficients.
    let half = (numtaps - 1) as f64 / 2.0;
    let mut spectrum: Vec<Complex<f64>> = fx
        .iter()
        .zip(x.iter())
        .map(|(&g, &xi)| Complex::from_polar(g, -half * PI * xi / nyq))
        .collect();

    // DC and Nyquist bins of a real spectrum carry no imaginary part;
    // the phase ramp lands on +-1 there up to rounding.
    spectrum[0].im = 0.0;
    spectrum[nfreqs - 1].im = 0.0;

    let real_size = (nfreqs - 1) * 2;
    let mut planner = RealFftPlanner::<f64>::new();
    let c2r = planner.plan_fft_inverse(real_size);
    let mut out = c2r.make_output_vec();
    c2r.process(&mut spectrum, &mut out)
        .map_err(|e| ProcessError::Numeric(format!("inverse FFT failed: {e}")))?;

    // Keep the first `numtaps` samples, normalize (the inverse transform
    // is unnormalized, as with FFTW) and apply the Hamming window.
    let window = hamming(numtaps);
    Ok(window
        .iter()
        .zip(out.iter())
        .map(|(&w, &v)| w * v / real_size as f64)
        .collect())
}
