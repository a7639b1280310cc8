use crate::recon_pipeline::common::{ProcessError, Result};

/// 1D linear interpolation for monotonically non-descending sample points.
///
/// Values of `x` beyond either end clamp to the first/last `fp` value. A
/// repeated value in `xp` implements a discontinuity: at the repeated
/// point the left-hand value is taken.
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Result<Vec<f64>> {
    if xp.len() != fp.len() || xp.len() < 2 {
        return Err(ProcessError::FilterSpec(
            "xp and fp must have the same size and at least two elements".into(),
        ));
    }

    let mut fx = vec![0.0; x.len()];
    for (out, &xi) in fx.iter_mut().zip(x.iter()) {
        let lower = xp.partition_point(|&v| v < xi);
        if lower == 0 {
            *out = fp[0];
        } else if lower >= xp.len() {
            *out = fp[fp.len() - 1];
        } else {
            let denom = xp[lower] - xp[lower - 1];
            if denom == 0.0 {
                *out = fp[lower - 1];
            } else {
                let t = (xi - xp[lower - 1]) / denom;
                *out = fp[lower - 1] + t * (fp[lower] - fp[lower - 1]);
            }
        }
    }
    Ok(fx)
}
