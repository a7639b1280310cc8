use ndarray::{Array1, Array2};
use num_traits::{Float, FromPrimitive};

use crate::recon_pipeline::common::{ProcessError, Result};
use crate::recon_pipeline::io::types::{IOParams, PausPair};

/// Background estimate: mean across lines for each sample position.
pub fn mean_aline<S: Copy + Into<f64>>(raw: &Array2<S>) -> Array1<f64> {
    let (n_lines, n_samples) = raw.dim();
    let mut background = Array1::<f64>::zeros(n_samples);
    for line in raw.rows() {
        for (acc, &v) in background.iter_mut().zip(line.iter()) {
            *acc += v.into();
        }
    }
    if n_lines > 0 {
        background.mapv_inplace(|v| v / n_lines as f64);
    }
    background
}

/// De-interleave one merged RF scan into PA and US matrices, subtracting
/// the shared background estimate.
///
/// Line layout is `[PA segment][spacer][US segment]`; the US segment is
/// decimated by `us_decimation` so both channels end up with
/// `rf_size_pa` samples per line. Reads falling outside a segment are
/// zero-filled.
pub fn split_rf_paus<S, F>(
    raw: &Array2<S>,
    background: &Array1<f64>,
    params: &IOParams,
) -> Result<PausPair<F>>
where
    S: Copy + Into<f64>,
    F: Float + FromPrimitive,
{
    let (n_lines, n_samples) = raw.dim();
    let samples_per_line = params.samples_per_line();
    if n_lines != params.alines_per_bscan || n_samples != samples_per_line {
        return Err(ProcessError::ShapeMismatch(
            n_lines,
            n_samples,
            params.alines_per_bscan,
            samples_per_line,
        ));
    }
    if background.len() != samples_per_line {
        return Err(ProcessError::ShapeMismatch(
            1,
            background.len(),
            1,
            samples_per_line,
        ));
    }

    let n_out = params.rf_size_pa;
    let us_start = params.rf_size_pa + params.rf_size_spacer;
    let mut pair = PausPair::<F>::zeros(n_lines, n_out);

    for l in 0..n_lines {
        for i in 0..n_out {
            let pa_idx = params.offset_pa + i;
            if pa_idx < params.rf_size_pa {
                let v = raw[[l, pa_idx]].into() - background[pa_idx];
                pair.pa[[l, i]] = F::from_f64(v).unwrap_or_else(F::zero);
            }

            let us_idx = us_start + params.offset_us + i * params.us_decimation;
            if us_idx < samples_per_line {
                let v = raw[[l, us_idx]].into() - background[us_idx];
                pair.us[[l, i]] = F::from_f64(v).unwrap_or_else(F::zero);
            }
        }
    }

    Ok(pair)
}
