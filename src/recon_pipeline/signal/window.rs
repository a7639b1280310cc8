use std::f64::consts::PI;

/// Hamming window: `0.54 - 0.46 * cos(2 pi i / (numtaps - 1))`.
pub fn hamming(numtaps: usize) -> Vec<f64> {
    if numtaps == 1 {
        return vec![1.0];
    }
    (0..numtaps)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (numtaps - 1) as f64).cos())
        .collect()
}
