use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Mutex;

use ndarray::Array2;
use tracing::debug;

use crate::recon_pipeline::common::{ProcessError, Result};
use crate::recon_pipeline::io::types::{Endianness, IOParams};

/// Fixed-width unsigned sample type stored in a scan file.
pub trait BinSample: Copy + Default + Send + Sync + 'static {
    const WIDTH: usize;

    fn from_bytes(bytes: &[u8], endian: Endianness) -> Self;
    fn write_bytes(self, endian: Endianness, out: &mut [u8]);
    fn swap_bytes(self) -> Self;
}

macro_rules! impl_bin_sample {
    ($t:ty) => {
        impl BinSample for $t {
            const WIDTH: usize = size_of::<$t>();

            fn from_bytes(bytes: &[u8], endian: Endianness) -> Self {
                let mut buf = [0u8; size_of::<$t>()];
                buf.copy_from_slice(bytes);
                match endian {
                    Endianness::Little => <$t>::from_le_bytes(buf),
                    Endianness::Big => <$t>::from_be_bytes(buf),
                }
            }

            fn write_bytes(self, endian: Endianness, out: &mut [u8]) {
                let buf = match endian {
                    Endianness::Little => self.to_le_bytes(),
                    Endianness::Big => self.to_be_bytes(),
                };
                out.copy_from_slice(&buf);
            }

            fn swap_bytes(self) -> Self {
                <$t>::swap_bytes(self)
            }
        }
    };
}

impl_bin_sample!(u8);
impl_bin_sample!(u16);
impl_bin_sample!(u32);

/// Swap the endianness of every sample in place.
pub fn swap_endian_inplace<T: BinSample>(data: &mut [T]) {
    for v in data.iter_mut() {
        *v = v.swap_bytes();
    }
}

struct LoaderState {
    file: Option<File>,
    num_scans: usize,
    curr_scan_idx: usize,
}

/// Sequential/random access reader over a raw binary RF file.
///
/// The loader may be driven both by the playback loop and by single-frame
/// seek requests, so index and file state sit behind one mutex:
/// `set_curr_idx` / `get` / `has_more_scans` serialize on it.
pub struct BinfileLoader<T: BinSample> {
    state: Mutex<LoaderState>,
    byte_offset: usize,
    alines_per_bscan: usize,
    samples_per_line: usize,
    endian: Endianness,
    _sample: PhantomData<T>,
}

impl<T: BinSample> BinfileLoader<T> {
    pub fn new(ioparams: &IOParams) -> Self {
        Self {
            state: Mutex::new(LoaderState {
                file: None,
                num_scans: 0,
                curr_scan_idx: 0,
            }),
            byte_offset: ioparams.byte_offset,
            alines_per_bscan: ioparams.alines_per_bscan,
            samples_per_line: ioparams.samples_per_line(),
            endian: ioparams.endian,
            _sample: PhantomData,
        }
    }

    /// Bytes of one full frame.
    pub fn scan_size_bytes(&self) -> usize {
        self.samples_per_line * self.alines_per_bscan * T::WIDTH
    }

    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| ProcessError::FileOpen(format!("{}: {}", path.display(), e)))?;
        let fsize = file
            .metadata()
            .map_err(|e| ProcessError::FileOpen(format!("{}: {}", path.display(), e)))?
            .len() as usize;

        let num_scans = fsize.saturating_sub(self.byte_offset) / self.scan_size_bytes();
        debug!(
            path = %path.display(),
            fsize,
            num_scans,
            "opened scan file"
        );

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.file = Some(file);
        state.num_scans = num_scans;
        state.curr_scan_idx = 0;
        Ok(())
    }

    pub fn close(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.file = None;
        state.num_scans = 0;
        state.curr_scan_idx = 0;
    }

    pub fn is_open(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .file
            .is_some()
    }

    /// Number of frames in the file, 0 when not open.
    pub fn size(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.file.is_none() { 0 } else { state.num_scans }
    }

    pub fn set_curr_idx(&self, idx: usize) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if idx >= state.num_scans {
            return Err(ProcessError::FrameOutOfRange(idx, state.num_scans));
        }
        state.curr_scan_idx = idx;
        Ok(())
    }

    pub fn has_more_scans(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.file.is_some() && state.curr_scan_idx < state.num_scans
    }

    /// Read the frame at the current index into `rf`, resizing it if its
    /// shape does not match the configured geometry.
    pub fn get(&self, rf: &mut Array2<T>) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let idx = state.curr_scan_idx;
        let num_scans = state.num_scans;
        if idx >= num_scans {
            return Err(ProcessError::FrameOutOfRange(idx, num_scans));
        }

        let shape = (self.alines_per_bscan, self.samples_per_line);
        if rf.dim() != shape {
            *rf = Array2::default(shape);
        }

        let size_bytes = self.scan_size_bytes();
        let start = self.byte_offset + size_bytes * idx;

        let file = state
            .file
            .as_mut()
            .ok_or_else(|| ProcessError::FileOpen("no scan file open".into()))?;
        file.seek(SeekFrom::Start(start as u64))?;

        let mut bytes = vec![0u8; size_bytes];
        let mut got = 0usize;
        while got < size_bytes {
            let n = file.read(&mut bytes[got..])?;
            if n == 0 {
                return Err(ProcessError::ShortRead {
                    frame: idx,
                    wanted: size_bytes,
                    got,
                });
            }
            got += n;
        }

        let out = rf.as_slice_mut().ok_or_else(|| {
            ProcessError::Numeric("scan buffer is not contiguous".into())
        })?;
        for (sample, chunk) in out.iter_mut().zip(bytes.chunks_exact(T::WIDTH)) {
            *sample = T::from_bytes(chunk, self.endian);
        }
        Ok(())
    }

    /// Seek to `idx` and read that frame.
    pub fn get_at(&self, rf: &mut Array2<T>, idx: usize) -> Result<()> {
        self.set_curr_idx(idx)?;
        self.get(rf)
    }

    /// Read the current frame and advance the index.
    pub fn get_next(&self, rf: &mut Array2<T>) -> Result<()> {
        self.get(rf)?;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.curr_scan_idx += 1;
        Ok(())
    }

    pub fn alines_per_bscan(&self) -> usize {
        self.alines_per_bscan
    }

    pub fn samples_per_line(&self) -> usize {
        self.samples_per_line
    }
}

/// Bulk-load a whole binary file as a matrix of `cols` samples per row.
///
/// This is the offline path; the per-frame streaming path lives in
/// [`BinfileLoader`].
pub fn load_bin<T: BinSample>(
    path: &Path,
    endian: Endianness,
    cols: usize,
) -> Result<Array2<T>> {
    let bytes = std::fs::read(path)
        .map_err(|e| ProcessError::FileOpen(format!("{}: {}", path.display(), e)))?;

    let n_values = bytes.len() / T::WIDTH;
    let rows = n_values / cols;
    if rows * cols * T::WIDTH != bytes.len() {
        return Err(ProcessError::ShapeMismatch(rows, cols, n_values, 1));
    }

    let mut matrix = Array2::<T>::default((rows, cols));
    let out = matrix
        .as_slice_mut()
        .ok_or_else(|| ProcessError::Numeric("matrix buffer is not contiguous".into()))?;
    for (sample, chunk) in out.iter_mut().zip(bytes.chunks_exact(T::WIDTH)) {
        *sample = T::from_bytes(chunk, endian);
    }
    Ok(matrix)
}

/// Write a slice of samples to a binary file.
pub fn to_bin<T: BinSample>(path: &Path, data: &[T], endian: Endianness) -> Result<()> {
    let mut bytes = vec![0u8; data.len() * T::WIDTH];
    for (v, chunk) in data.iter().zip(bytes.chunks_exact_mut(T::WIDTH)) {
        v.write_bytes(endian, chunk);
    }
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}
