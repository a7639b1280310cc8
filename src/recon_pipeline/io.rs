//! Binary RF ingestion
//!
//! A PA/US sequence is a flat binary file: `byte_offset` header bytes
//! followed by consecutive frames of `alines_per_bscan` lines, each line
//! `samples_per_line` fixed-width unsigned samples. Geometry lives outside
//! the file, in [`IOParams`].

mod loader;
mod split;
pub mod types;


pub use loader::{BinSample, BinfileLoader, load_bin, swap_endian_inplace, to_bin};
pub use split::{mean_aline, split_rf_paus};
pub use types::{Endianness, IOParams, PausPair};
