use approx::assert_relative_eq;
use ndarray::{Array2, s};

use crate::recon_pipeline::saft::{MAX_SAFT_LINES, SaftDelayParams, TimeDelay, apply_saft};

#[test]
fn default_depth_window_tracks_focal_distance() {
    let p = SaftDelayParams::make();
    let td = p.compute_time_delay(None, None);
    // 0.25x and 1.5x the focal distance in depth samples.
    assert_eq!(td.z_start, (p.f * 0.25 / p.dr()).round() as usize);
    assert_eq!(td.z_end, (p.f * 1.5 / p.dr()).round() as usize);
    assert_eq!(td.saft_lines.len(), td.z_end - td.z_start);
    assert_eq!(td.time_delay.dim(), (td.z_end - td.z_start, MAX_SAFT_LINES));
}

#[test]
fn delay_table_has_contributions_and_finite_delays() {
    let td = SaftDelayParams::make().compute_time_delay(None, None);
    assert!(td.saft_lines.iter().any(|&n| n > 0));
    assert!(td.time_delay.iter().all(|d| d.is_finite()));
    // No bin can accept more than the candidate line count.
    assert!(td.saft_lines.iter().all(|&n| (n as usize) < MAX_SAFT_LINES));
}

fn small_delay_table() -> TimeDelay {
    let z_start = 2;
    let z_end = 8;
    let mut time_delay = Array2::<f64>::zeros((z_end - z_start, MAX_SAFT_LINES));
    for zi in 0..z_end - z_start {
        time_delay[[zi, 0]] = 0.4;
        time_delay[[zi, 1]] = 1.2;
    }
    TimeDelay {
        time_delay,
        saft_lines: vec![2; z_end - z_start],
        z_start,
        z_end,
    }
}

fn flipped_lines(m: &Array2<f64>) -> Array2<f64> {
    m.slice(s![..;-1, ..]).to_owned()
}

#[test]
fn apply_saft_commutes_with_line_reversal() {
    let td = small_delay_table();
    let rf = Array2::from_shape_fn((16, 12), |(j, i)| {
        ((j * 31 + i * 17) % 23) as f64 - 11.0
    });

    let (_, forward) = apply_saft(&td, &rf);
    let (_, reversed) = apply_saft(&td, &flipped_lines(&rf));

    let forward_then_flip = flipped_lines(&forward);
    for (a, b) in forward_then_flip.iter().zip(reversed.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-12);
    }
}

#[test]
fn apply_saft_is_identity_outside_the_depth_window() {
    let td = small_delay_table();
    let rf = Array2::from_shape_fn((8, 12), |(j, i)| (j + i) as f64 + 1.0);
    let (sum, cf) = apply_saft(&td, &rf);

    // Columns before z_start and after z_end are untouched: count 1,
    // coherence factor 1, sum equals the input.
    for j in 0..8 {
        for iz in [0usize, 1, 8, 9, 10, 11] {
            assert_relative_eq!(sum[[j, iz]], rf[[j, iz]], epsilon = 1e-12);
            assert_relative_eq!(cf[[j, iz]], rf[[j, iz]], epsilon = 1e-12);
        }
    }
}

#[test]
fn apply_saft_of_zero_input_is_zero() {
    let td = small_delay_table();
    let rf = Array2::<f64>::zeros((8, 12));
    let (sum, cf) = apply_saft(&td, &rf);
    assert!(sum.iter().all(|&v| v == 0.0));
    assert!(cf.iter().all(|&v| v == 0.0));
}

#[test]
fn empty_delay_table_leaves_rf_unchanged() {
    let td = TimeDelay {
        time_delay: Array2::zeros((4, MAX_SAFT_LINES)),
        saft_lines: vec![0; 4],
        z_start: 2,
        z_end: 6,
    };
    let rf = Array2::from_shape_fn((6, 10), |(j, i)| (j * 10 + i) as f64);
    let (sum, cf) = apply_saft(&td, &rf);
    for (a, b) in sum.iter().zip(rf.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-12);
    }
    for (a, b) in cf.iter().zip(rf.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-12);
    }
}
