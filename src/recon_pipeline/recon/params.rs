use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::recon_pipeline::common::{ProcessError, Result};

/// Reconstruction parameters for one channel.
///
/// `filter_freq`/`filter_gain` are the FIR control points (frequencies
/// non-descending in [0, 1] with 1 = Nyquist, first value 0, same length
/// as the gains, at least two points). Validation happens at filter
/// design time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconParams {
    pub filter_freq: Vec<f64>,
    pub filter_gain: Vec<f64>,
    pub noise_floor: f64,
    pub desired_dynamic_range: f64,
    pub rotate_offset: i32,
    /// Synthetic-aperture focusing stage, applied to the filtered RF
    /// before envelope detection when enabled.
    #[serde(default)]
    pub enable_saft: bool,
}

/// The PA/US parameter pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconParams2 {
    #[serde(rename = "PA")]
    pub pa: ReconParams,
    #[serde(rename = "US")]
    pub us: ReconParams,
}

impl ReconParams2 {
    /// Default calibration for the 2024 system revision.
    pub fn system2024v1() -> Self {
        let pa = ReconParams {
            filter_freq: vec![0.0, 0.03, 0.035, 0.2, 0.22, 1.0],
            filter_gain: vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0],
            noise_floor: 300.0,
            desired_dynamic_range: 35.0,
            rotate_offset: 25,
            enable_saft: false,
        };
        let us = ReconParams {
            filter_freq: vec![0.0, 0.1, 0.3, 1.0],
            filter_gain: vec![0.0, 1.0, 1.0, 0.0],
            noise_floor: 200.0,
            desired_dynamic_range: 48.0,
            rotate_offset: 25,
            enable_saft: false,
        };
        Self { pa, us }
    }

    /// Alternating per-frame mirror policy: the probe sweeps back and
    /// forth, so odd frames are recorded in reverse line order.
    pub fn flip(frame_idx: usize) -> bool {
        frame_idx % 2 == 1
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(|e| ProcessError::ParamParse(e.to_string()))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ProcessError::ParamParse(e.to_string()))
    }
}
