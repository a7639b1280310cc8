//! Acquisition geometry and channel de-multiplexing rule

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::recon_pipeline::common::{ProcessError, Result};

/// Byte order of the samples in the binary file.
///
/// The acquisition host writes little-endian; the field exists so a
/// sequence recorded on a big-endian DAQ can be declared as such instead
/// of silently mis-decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Describes where frames sit in the file and how one merged RF line is
/// de-multiplexed into the PA and US channels.
///
/// One raw line is laid out as `[PA segment][spacer][US segment]`, where
/// the US segment holds `rf_size_pa * us_decimation` samples and is
/// decimated down so both channels come out with `rf_size_pa` samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IOParams {
    /// Header bytes before the first frame
    pub byte_offset: usize,
    /// A-lines per B-scan (one full rotation)
    pub alines_per_bscan: usize,
    /// PA depth samples per raw line
    pub rf_size_pa: usize,
    /// Dead samples between the PA and US segments
    pub rf_size_spacer: usize,
    /// Decimation factor applied to the US segment
    pub us_decimation: usize,
    /// Leading raw samples skipped inside the PA segment
    pub offset_pa: usize,
    /// Leading raw samples skipped inside the US segment
    pub offset_us: usize,
    #[serde(default)]
    pub endian: Endianness,
}

impl IOParams {
    /// Default calibration for the 2024 system revision.
    pub fn system2024v1() -> Self {
        Self {
            byte_offset: 1,
            alines_per_bscan: 1000,
            rf_size_pa: 2730,
            rf_size_spacer: 87,
            us_decimation: 2,
            offset_pa: 0,
            offset_us: 0,
            endian: Endianness::Little,
        }
    }

    /// Raw samples per merged line.
    pub fn samples_per_line(&self) -> usize {
        self.rf_size_pa + self.rf_size_spacer + self.rf_size_pa * self.us_decimation
    }

    /// Bytes of one full frame of samples of width `sample_width` bytes.
    pub fn scan_size_bytes(&self, sample_width: usize) -> usize {
        self.samples_per_line() * self.alines_per_bscan * sample_width
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

/// One matrix per channel, always the same shape: `(alines, rf_size_pa)`.
#[derive(Debug, Clone)]
pub struct PausPair<T> {
    pub pa: Array2<T>,
    pub us: Array2<T>,
}

impl<T: Clone + num_traits::Zero> PausPair<T> {
    pub fn zeros(alines: usize, samples: usize) -> Self {
        Self {
            pa: Array2::zeros((alines, samples)),
            us: Array2::zeros((alines, samples)),
        }
    }
}
