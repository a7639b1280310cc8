use ndarray::Array2;
use tempfile::TempDir;

use crate::recon_pipeline::common::ProcessError;
use crate::recon_pipeline::recon::{
    ChannelReconstructor, ReconParams, ReconParams2, flip_lines_inplace, rotate_lines_inplace,
};
use crate::recon_pipeline::saft::SaftDelayParams;

fn test_params() -> ReconParams {
    ReconParams {
        filter_freq: vec![0.0, 0.1, 0.3, 1.0],
        filter_gain: vec![0.0, 1.0, 1.0, 0.0],
        noise_floor: 0.05,
        desired_dynamic_range: 40.0,
        rotate_offset: 0,
        enable_saft: false,
    }
}

fn burst_rf(n_lines: usize, n_samples: usize) -> Array2<f64> {
    Array2::from_shape_fn((n_lines, n_samples), |(l, s)| {
        let t = s as f64;
        let carrier = (0.2 * std::f64::consts::PI * t).sin();
        let window = (-((t - 40.0) / 12.0).powi(2)).exp();
        (1.0 + 0.1 * l as f64) * carrier * window
    })
}

#[test]
fn params_json_round_trip_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("params.json");
    let params = ReconParams2::system2024v1();
    params.save_to_file(&path).unwrap();
    assert_eq!(ReconParams2::load_from_file(&path).unwrap(), params);
}

#[test]
fn params_json_round_trip_perturbed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("params.json");
    let mut params = ReconParams2::system2024v1();
    params.pa.filter_freq = vec![0.0, 0.011, 0.17, 0.9, 1.0];
    params.pa.filter_gain = vec![0.0, 0.25, 1.0, 0.5, 0.0];
    params.pa.noise_floor = 123.456;
    params.us.rotate_offset = -7;
    params.us.desired_dynamic_range = 51.5;
    params.us.enable_saft = true;
    params.save_to_file(&path).unwrap();
    assert_eq!(ReconParams2::load_from_file(&path).unwrap(), params);
}

#[test]
fn params_json_uses_channel_and_camel_case_keys() {
    let json = serde_json::to_string(&ReconParams2::system2024v1()).unwrap();
    assert!(json.contains("\"PA\""));
    assert!(json.contains("\"US\""));
    assert!(json.contains("\"filterFreq\""));
    assert!(json.contains("\"noiseFloor\""));
    assert!(json.contains("\"desiredDynamicRange\""));
    assert!(json.contains("\"rotateOffset\""));
}

#[test]
fn params_without_saft_flag_still_parse() {
    // Sidecar files written before the SAFT flag existed omit it.
    let json = r#"{
        "filterFreq": [0.0, 1.0],
        "filterGain": [1.0, 1.0],
        "noiseFloor": 10.0,
        "desiredDynamicRange": 30.0,
        "rotateOffset": 0
    }"#;
    let params: ReconParams = serde_json::from_str(json).unwrap();
    assert!(!params.enable_saft);
}

#[test]
fn flip_alternates_by_frame_parity() {
    assert!(!ReconParams2::flip(0));
    assert!(ReconParams2::flip(1));
    assert!(!ReconParams2::flip(2));
    assert!(ReconParams2::flip(3));
}

#[test]
fn reconstructor_rejects_bad_filter_spec() {
    let mut params = test_params();
    params.filter_freq = vec![0.5, 1.0];
    let err = ChannelReconstructor::<f64>::new(&params, None).unwrap_err();
    assert!(matches!(err, ProcessError::FilterSpec(_)));
}

#[test]
fn reconstruct_produces_aligned_log_image() {
    let params = test_params();
    let recon = ChannelReconstructor::<f64>::new(&params, None).unwrap();

    let mut rf = burst_rf(8, 128);
    let images = recon.reconstruct(&mut rf, false).unwrap();
    assert_eq!(images.envelope.dim(), (8, 128));
    assert_eq!(images.log.dim(), (8, 128));
    // The burst sits well above the noise floor.
    assert!(images.log.iter().any(|&v| v > 0));
}

#[test]
fn reconstruct_is_deterministic() {
    let params = test_params();
    let recon = ChannelReconstructor::<f64>::new(&params, None).unwrap();

    let mut rf1 = burst_rf(8, 128);
    let mut rf2 = rf1.clone();
    let a = recon.reconstruct(&mut rf1, true).unwrap();
    let b = recon.reconstruct(&mut rf2, true).unwrap();
    assert_eq!(a.log, b.log);
}

#[test]
fn reconstruct_with_saft_enabled_runs() {
    let mut params = test_params();
    params.enable_saft = true;
    let td = SaftDelayParams::make().compute_time_delay(Some(10), Some(60));
    let recon = ChannelReconstructor::<f32>::new(&params, Some(td)).unwrap();

    let mut rf = burst_rf(8, 128).mapv(|v| v as f32);
    let images = recon.reconstruct(&mut rf, false).unwrap();
    assert_eq!(images.log.dim(), (8, 128));
}

#[test]
fn rotate_lines_shifts_circularly() {
    let mut m = Array2::from_shape_fn((4, 2), |(l, _)| l as u8);
    rotate_lines_inplace(&mut m, 1);
    assert_eq!(m.column(0).to_vec(), vec![3, 0, 1, 2]);

    let mut m = Array2::from_shape_fn((4, 2), |(l, _)| l as u8);
    rotate_lines_inplace(&mut m, -1);
    assert_eq!(m.column(0).to_vec(), vec![1, 2, 3, 0]);

    let mut m = Array2::from_shape_fn((4, 2), |(l, _)| l as u8);
    rotate_lines_inplace(&mut m, 4);
    assert_eq!(m.column(0).to_vec(), vec![0, 1, 2, 3]);
}

#[test]
fn flip_lines_is_an_involution() {
    let orig = Array2::from_shape_fn((5, 3), |(l, s)| (l * 3 + s) as u8);
    let mut m = orig.clone();
    flip_lines_inplace(&mut m);
    assert_eq!(m.row(0).to_vec(), orig.row(4).to_vec());
    flip_lines_inplace(&mut m);
    assert_eq!(m, orig);
}
