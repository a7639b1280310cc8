use approx::assert_relative_eq;

use crate::recon_pipeline::common::ProcessError;
use crate::recon_pipeline::signal::{
    EnvelopeDetector, conv_same, firwin2, hamming, interp, log_compress,
};

#[test]
fn hamming_window_shape() {
    let w = hamming(9);
    assert_eq!(w.len(), 9);
    assert_relative_eq!(w[0], 0.08, epsilon = 1e-12);
    assert_relative_eq!(w[8], 0.08, epsilon = 1e-12);
    assert_relative_eq!(w[4], 1.0, epsilon = 1e-12);
    for i in 0..4 {
        assert_relative_eq!(w[i], w[8 - i], epsilon = 1e-12);
    }
}

#[test]
fn interp_clamps_edges() {
    let fx = interp(&[-1.0, 0.0, 0.5, 1.0, 2.0], &[0.0, 1.0], &[10.0, 20.0]).unwrap();
    assert_eq!(fx, vec![10.0, 10.0, 15.0, 20.0, 20.0]);
}

#[test]
fn interp_repeated_point_is_a_discontinuity() {
    // Gain jumps from 0 to 1 at x = 0.5; at the repeated point the
    // left-hand value is taken.
    let xp = [0.0, 0.5, 0.5, 1.0];
    let fp = [0.0, 0.0, 1.0, 1.0];
    let fx = interp(&[0.25, 0.5, 0.75], &xp, &fp).unwrap();
    assert_eq!(fx, vec![0.0, 0.0, 1.0]);
}

#[test]
fn interp_rejects_short_tables() {
    assert!(interp(&[0.0], &[0.0], &[1.0]).is_err());
    assert!(interp(&[0.0], &[0.0, 1.0], &[1.0]).is_err());
}

#[test]
fn firwin2_returns_numtaps_symmetric_coefficients() {
    for numtaps in [3usize, 65, 95, 129] {
        let coeffs = firwin2(numtaps, &[0.0, 0.1, 0.3, 1.0], &[0.0, 1.0, 1.0, 0.0], 0, 2.0)
            .unwrap();
        assert_eq!(coeffs.len(), numtaps);
        for i in 0..numtaps / 2 {
            assert_relative_eq!(coeffs[i], coeffs[numtaps - 1 - i], epsilon = 1e-9);
        }
    }
}

#[test]
fn firwin2_allpass_is_a_windowed_delta() {
    let numtaps = 65;
    let coeffs = firwin2(numtaps, &[0.0, 1.0], &[1.0, 1.0], 0, 2.0).unwrap();
    let center = (numtaps - 1) / 2;
    assert_relative_eq!(coeffs[center], 1.0, epsilon = 1e-9);
    for (i, &c) in coeffs.iter().enumerate() {
        if i != center {
            assert!(c.abs() < 1e-9, "tap {i} = {c}");
        }
    }
}

#[test]
fn firwin2_rejects_bad_numtaps() {
    let freq = [0.0, 1.0];
    let gain = [1.0, 1.0];
    assert!(matches!(
        firwin2(64, &freq, &gain, 0, 2.0),
        Err(ProcessError::FilterSpec(_))
    ));
    assert!(matches!(
        firwin2(1, &freq, &gain, 0, 2.0),
        Err(ProcessError::FilterSpec(_))
    ));
}

#[test]
fn firwin2_rejects_bad_frequency_spec() {
    assert!(firwin2(65, &[0.1, 1.0], &[1.0, 1.0], 0, 2.0).is_err());
    assert!(firwin2(65, &[0.0, 0.5, 0.2], &[1.0, 1.0, 0.0], 0, 2.0).is_err());
    assert!(firwin2(65, &[0.0, 1.5], &[1.0, 1.0], 0, 2.0).is_err());
    assert!(firwin2(65, &[0.0, 1.0], &[1.0], 0, 2.0).is_err());
}

#[test]
fn firwin2_rejects_small_mesh() {
    assert!(matches!(
        firwin2(65, &[0.0, 1.0], &[1.0, 1.0], 65, 2.0),
        Err(ProcessError::FilterSpec(_))
    ));
    assert!(firwin2(65, &[0.0, 1.0], &[1.0, 1.0], 129, 2.0).is_ok());
}

#[test]
fn envelope_of_pure_tone_is_flat() {
    let n = 128;
    let amp = 3.5f64;
    let line: Vec<f64> = (0..n)
        .map(|i| amp * (2.0 * std::f64::consts::PI * 16.0 * i as f64 / n as f64).cos())
        .collect();

    let det = EnvelopeDetector::<f64>::new(n);
    let mut env = vec![0.0; n];
    det.envelope(&line, &mut env);
    for &e in &env {
        assert_relative_eq!(e, amp, epsilon = 1e-9);
    }
}

#[test]
fn envelope_is_precision_agnostic() {
    let n = 64;
    let line64: Vec<f64> = (0..n).map(|i| ((i * 7 % 13) as f64) - 6.0).collect();
    let line32: Vec<f32> = line64.iter().map(|&v| v as f32).collect();

    let mut env64 = vec![0.0f64; n];
    let mut env32 = vec![0.0f32; n];
    EnvelopeDetector::<f64>::new(n).envelope(&line64, &mut env64);
    EnvelopeDetector::<f32>::new(n).envelope(&line32, &mut env32);

    for (a, b) in env64.iter().zip(env32.iter()) {
        assert_relative_eq!(*a, *b as f64, epsilon = 1e-3);
    }
}

#[test]
fn conv_same_identity_kernel() {
    let line = [1.0, 2.0, 3.0, 4.0, 5.0];
    let mut out = [0.0; 5];
    conv_same(&line, &[0.0, 1.0, 0.0], &mut out);
    assert_eq!(out, line);
}

#[test]
fn conv_same_boxcar() {
    let line = [1.0, 1.0, 1.0, 1.0];
    let mut out = [0.0; 4];
    conv_same(&line, &[1.0, 1.0, 1.0], &mut out);
    // Edges see two taps, the interior three.
    assert_eq!(out, [2.0, 3.0, 3.0, 2.0]);
}

#[test]
fn log_compress_clips_and_scales() {
    assert_eq!(log_compress(0.0f64, 100.0, 40.0), 0);
    assert_eq!(log_compress(100.0f64, 100.0, 40.0), 0);
    // 40 dB above a floor of 100 is 10000.
    assert_eq!(log_compress(10_000.0f64, 100.0, 40.0), 255);
    // 20 dB above the floor lands mid-range.
    assert_eq!(log_compress(1000.0f64, 100.0, 40.0), 128);
}
