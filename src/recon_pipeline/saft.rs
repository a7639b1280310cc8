//! Synthetic aperture focusing (SAFT)
//!
//! Delay tables are derived once from transducer/rotation/illumination
//! geometry; `apply_saft` then performs delay-and-sum aperture synthesis
//! with coherence-factor weighting.

use ndarray::Array2;
use num_traits::{Float, FromPrimitive};

#[cfg(test)]
mod tests;

/// Upper bound on lateral lines combined on each side of a line.
pub const MAX_SAFT_LINES: usize = 15;

pub fn deg2rad(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

/// Per-depth-bin contributing-line counts and fractional delays
/// (in depth samples) for the configured geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeDelay {
    /// `(z_end - z_start, MAX_SAFT_LINES)` fractional delays
    pub time_delay: Array2<f64>,
    /// Contributing lines per depth bin
    pub saft_lines: Vec<u8>,
    pub z_start: usize,
    pub z_end: usize,
}

/// SAFT parameters relating to transducer geometry, rotation geometry,
/// and illumination geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaftDelayParams {
    /// [mm] distance from axis of rotation to transducer surface
    pub rt: f64,
    /// [m/s] sound speed
    pub vs: f64,
    /// [s] timestep
    pub dt: f64,
    /// [rad] angle step size in each rotation
    pub da: f64,
    /// [mm] transducer focal length
    pub f: f64,
    /// [mm] transducer diameter
    pub d: f64,
    /// [rad] transducer focus angle
    pub angle: f64,
    /// [rad] illumination angle
    pub angle_light: f64,
}

impl SaftDelayParams {
    pub fn make() -> Self {
        let f = 15.0;
        let d = 8.5;
        Self {
            rt: 6.2,
            vs: 1.5e3,
            dt: 1.0 / 180e6,
            da: 2.0 * std::f64::consts::PI / 1000.0,
            f,
            d,
            angle: (d / (2.0 * f)).asin(),
            angle_light: deg2rad(5.0),
        }
    }

    /// [mm] spatial step size
    pub fn dr(&self) -> f64 {
        self.vs * self.dt * 1e3
    }

    /// Compute the delay table over depth bins `[z_start, z_end)`.
    ///
    /// Defaults: start at 0.25x and end at 1.5x the focal distance, in
    /// depth-sample units. A bin/line pair contributes only if it falls
    /// inside the illumination beam and the transducer's angular
    /// acceptance; the near- and far-side-of-focus branches are the two
    /// symmetric law-of-cosines cases.
    pub fn compute_time_delay(
        &self,
        z_start: Option<usize>,
        z_end: Option<usize>,
    ) -> TimeDelay {
        let pi = std::f64::consts::PI;
        let dr = self.dr();

        let z_start = z_start.unwrap_or_else(|| (self.f * 0.25 / dr).round() as usize);
        let z_end = z_end.unwrap_or_else(|| (self.f * 1.5 / dr).round() as usize);
        let z_len = z_end.saturating_sub(z_start);

        let mut saft_lines = vec![0u8; z_len];
        let mut time_delay = Array2::<f64>::zeros((z_len, MAX_SAFT_LINES));

        for j in 1..MAX_SAFT_LINES {
            for i in z_start..z_end {
                let ang1 = j as f64 * self.da;

                // relative position to the transducer center
                let dr1 = i as f64 * dr;
                let r = self.rt + dr1;
                let dr2 = (r * r + self.rt * self.rt - 2.0 * r * self.rt * ang1.cos()).sqrt();
                let ang2 = pi
                    - ((self.rt * self.rt + dr2 * dr2 - r * r) / (2.0 * self.rt * dr2)).acos();

                // Point must be within the light beam field
                if ang2 >= self.angle_light {
                    continue;
                }

                // Point must be within the transducer field

                // distance to focus
                let dr3 =
                    (self.f * self.f + dr2 * dr2 - 2.0 * self.f * dr2 * ang2.cos()).sqrt();

                // angle wrt focal line
                let ang3 =
                    ((self.f * self.f + dr3 * dr3 - dr2 * dr2) / (2.0 * self.f * dr3)).acos();

                if dr3 <= self.f && ang3 <= self.angle {
                    time_delay[[i - z_start, j]] = ((self.f - dr1).abs() - dr3) / dr;
                    saft_lines[i - z_start] += 1;
                } else if (pi - ang3) <= self.angle {
                    time_delay[[i - z_start, j]] = (dr3 - (self.f - dr1).abs()) / dr;
                    saft_lines[i - z_start] += 1;
                }
            }
        }

        TimeDelay {
            time_delay,
            saft_lines,
            z_start,
            z_end,
        }
    }
}

/// Delay-and-sum aperture synthesis with coherence-factor weighting.
///
/// `rf` is `(lines, depth samples)`. Each delayed sample is accumulated
/// into both mirrored neighbour lines with wrap-around indexing
/// `(j +- dj + n) % n`. Returns the plain sum and the coherence-weighted
/// sum `sum * CF / count`, where `CF = sum^2 / (sum_of_squares * count)`
/// (clamped to 1 when the denominator is zero).
pub fn apply_saft<F>(td: &TimeDelay, rf: &Array2<F>) -> (Array2<F>, Array2<F>)
where
    F: Float + FromPrimitive,
{
    let (n_scans, n_pts) = rf.dim();
    let mut rf_saft = rf.clone();
    let mut n_saft = Array2::<u32>::from_elem((n_scans, n_pts), 1);
    let mut cf_denom = rf.mapv(|v| v * v);

    let z_end = td.z_end.min(n_pts);
    for j in 0..n_scans {
        for iz in td.z_start..z_end {
            let zi = iz - td.z_start;
            for dj in 0..td.saft_lines[zi] as usize {
                let iz_delayed = (iz as f64 + td.time_delay[[zi, dj]]).round() as i64;
                if iz_delayed < 0 || iz_delayed >= n_pts as i64 {
                    continue;
                }
                let val = rf[[j, iz_delayed as usize]];

                for j_saft in [
                    (j + n_scans - (dj % n_scans)) % n_scans,
                    (j + dj) % n_scans,
                ] {
                    rf_saft[[j_saft, iz]] = rf_saft[[j_saft, iz]] + val;
                    cf_denom[[j_saft, iz]] = cf_denom[[j_saft, iz]] + val * val;
                    n_saft[[j_saft, iz]] += 1;
                }
            }
        }
    }

    let mut rf_saft_cf = Array2::<F>::zeros((n_scans, n_pts));
    for j in 0..n_scans {
        for iz in 0..n_pts {
            let s = rf_saft[[j, iz]];
            let n = F::from_u32(n_saft[[j, iz]]).unwrap_or_else(F::one);
            let denom = cf_denom[[j, iz]] * n;
            let cf = if denom != F::zero() {
                s * s / denom
            } else {
                F::one()
            };
            rf_saft_cf[[j, iz]] = s * cf / n;
        }
    }

    (rf_saft, rf_saft_cf)
}
