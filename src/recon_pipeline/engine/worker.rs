use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};
use ndarray::Array2;
use tracing::{error, info};

use crate::recon_pipeline::common::{ErrorKind, Result};
use crate::recon_pipeline::engine::events::EngineEvent;
use crate::recon_pipeline::engine::frame::{BScanData, FloatType};
use crate::recon_pipeline::engine::writer::spawn_image_writes;
use crate::recon_pipeline::io::{BinfileLoader, IOParams, PausPair, mean_aline, split_rf_paus};
use crate::recon_pipeline::radial::{make_overlay, make_radial};
use crate::recon_pipeline::recon::{ChannelReconstructor, ReconParams2};
use crate::recon_pipeline::saft::{SaftDelayParams, TimeDelay};
use crate::recon_pipeline::timing::{FrameTimings, Timer};

/// [m/s] sound speed used for the physical depth scale
const SOUND_SPEED: f64 = 1500.0;
/// [1/s] RF sample frequency
const SAMPLE_FREQ: f64 = 180e6;

enum EngineCmd {
    SetBinfile(PathBuf),
    Play,
    PlayOne(usize),
    ReplayOne,
    SaveParams,
    Shutdown,
}

struct SharedState {
    /// Live `{ReconParams2, IOParams}` pair; read once per frame under
    /// lock and copied out so the lock is not held during compute.
    params: Mutex<(ReconParams2, IOParams)>,
    is_playing: AtomicBool,
    is_ready: AtomicBool,
    binfile_path: Mutex<Option<PathBuf>>,
    image_save_dir: Mutex<Option<PathBuf>>,
}

fn lock<'a, T>(m: &'a Mutex<T>) -> MutexGuard<'a, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Caller-side handle to the engine thread.
///
/// All operations except `pause` and the parameter accessors are
/// messages; they return immediately and the engine reports through its
/// event channel. `pause` flips the atomic playback flag directly so a
/// running loop observes it at the next frame boundary.
pub struct EngineHandle {
    cmd_tx: Sender<EngineCmd>,
    shared: Arc<SharedState>,
    thread: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn set_binfile<P: AsRef<Path>>(&self, path: P) {
        let _ = self
            .cmd_tx
            .send(EngineCmd::SetBinfile(path.as_ref().to_path_buf()));
    }

    /// Start sequential playback from the current frame index.
    pub fn play(&self) {
        self.shared.is_playing.store(true, Ordering::SeqCst);
        let _ = self.cmd_tx.send(EngineCmd::Play);
    }

    pub fn play_one(&self, idx: usize) {
        let _ = self.cmd_tx.send(EngineCmd::PlayOne(idx));
    }

    /// Reprocess the current frame with the current parameters.
    pub fn replay_one(&self) {
        let _ = self.cmd_tx.send(EngineCmd::ReplayOne);
    }

    /// Cooperative: the in-flight frame always finishes, no new frame
    /// starts after the flag is observed.
    pub fn pause(&self) {
        self.shared.is_playing.store(false, Ordering::SeqCst);
    }

    /// Replace the live parameter pair. Does not trigger reprocessing;
    /// call `replay_one` to repaint with the new values.
    pub fn update_params(&self, params: ReconParams2, ioparams: IOParams) {
        *lock(&self.shared.params) = (params, ioparams);
    }

    pub fn reset_params(&self) {
        *lock(&self.shared.params) = (ReconParams2::system2024v1(), IOParams::system2024v1());
    }

    pub fn save_params_to_file(&self) {
        let _ = self.cmd_tx.send(EngineCmd::SaveParams);
    }

    pub fn params(&self) -> (ReconParams2, IOParams) {
        lock(&self.shared.params).clone()
    }

    pub fn is_playing(&self) -> bool {
        self.shared.is_playing.load(Ordering::SeqCst)
    }

    pub fn is_ready(&self) -> bool {
        self.shared.is_ready.load(Ordering::SeqCst)
    }

    pub fn binfile_path(&self) -> Option<PathBuf> {
        lock(&self.shared.binfile_path).clone()
    }

    pub fn image_save_dir(&self) -> Option<PathBuf> {
        lock(&self.shared.image_save_dir).clone()
    }

    /// Stop the engine thread and wait for it to exit.
    pub fn shutdown(mut self) {
        let _ = self.cmd_tx.send(EngineCmd::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCmd::Shutdown);
    }
}

/// The engine thread: owns the loader, the frame buffers, and the
/// playback loop.
pub struct FrameEngine {
    loader: BinfileLoader<u16>,
    frame_idx: usize,
    rf: Array2<u16>,
    /// Delay table cache; geometry is constant, so it is computed once
    /// when SAFT is first enabled.
    saft_delay: Option<TimeDelay>,
    shared: Arc<SharedState>,
    events: Sender<EngineEvent>,
}

impl FrameEngine {
    /// Spawn the engine thread with the default calibration. Returns the
    /// caller handle and the event stream.
    pub fn spawn() -> (EngineHandle, Receiver<EngineEvent>) {
        Self::spawn_with(ReconParams2::system2024v1(), IOParams::system2024v1())
    }

    pub fn spawn_with(
        params: ReconParams2,
        ioparams: IOParams,
    ) -> (EngineHandle, Receiver<EngineEvent>) {
        let (cmd_tx, cmd_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        let status_tx = event_tx.clone();

        let shared = Arc::new(SharedState {
            params: Mutex::new((params, ioparams.clone())),
            is_playing: AtomicBool::new(false),
            is_ready: AtomicBool::new(false),
            binfile_path: Mutex::new(None),
            image_save_dir: Mutex::new(None),
        });

        let engine = FrameEngine {
            loader: BinfileLoader::new(&ioparams),
            frame_idx: 0,
            rf: Array2::default((0, 0)),
            saft_delay: None,
            shared: Arc::clone(&shared),
            events: event_tx,
        };

        let thread = match std::thread::Builder::new()
            .name("frame-engine".into())
            .spawn(move || engine.run(cmd_rx))
        {
            Ok(thread) => Some(thread),
            Err(e) => {
                error!("failed to spawn engine thread: {e}");
                let _ = status_tx.send(EngineEvent::Status(format!(
                    "Engine thread failed to start: {e}"
                )));
                None
            }
        };

        (
            EngineHandle {
                cmd_tx,
                shared,
                thread,
            },
            event_rx,
        )
    }

    fn run(mut self, cmd_rx: Receiver<EngineCmd>) {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                EngineCmd::SetBinfile(path) => self.set_binfile(&path),
                EngineCmd::Play => self.play(),
                EngineCmd::PlayOne(idx) => {
                    self.frame_idx = idx;
                    self.process_current_frame();
                }
                EngineCmd::ReplayOne => self.process_current_frame(),
                EngineCmd::SaveParams => self.save_params_to_file(),
                EngineCmd::Shutdown => break,
            }
        }
    }

    fn status(&self, msg: impl Into<String>) {
        let _ = self.events.send(EngineEvent::Status(msg.into()));
    }

    fn set_binfile(&mut self, path: &Path) {
        let save_dir = match (path.parent(), path.file_stem()) {
            (Some(parent), Some(stem)) => parent.join(stem),
            _ => {
                self.status(format!("Invalid scan file path {}", path.display()));
                return;
            }
        };
        // Open into a fresh loader and commit it only once everything
        // succeeded, so a failed open leaves the current file and
        // geometry untouched.
        let ioparams = lock(&self.shared.params).1.clone();
        let loader = BinfileLoader::new(&ioparams);
        if let Err(e) = loader.open(path) {
            error!("set_binfile: {e}");
            self.status(format!("Failed to open {}: {}", path.display(), e));
            return;
        }

        if let Err(e) = std::fs::create_dir_all(&save_dir) {
            self.status(format!(
                "Failed to create image save dir {}: {}",
                save_dir.display(),
                e
            ));
            return;
        }
        self.status(format!("Saving images to {}", save_dir.display()));

        self.loader = loader;
        *lock(&self.shared.binfile_path) = Some(path.to_path_buf());
        *lock(&self.shared.image_save_dir) = Some(save_dir);
        let _ = self
            .events
            .send(EngineEvent::FrameCountKnown(self.loader.size()));

        self.save_params_to_file();

        // Process the first frame
        self.frame_idx = 0;
        self.process_current_frame();

        self.shared.is_ready.store(true, Ordering::SeqCst);
    }

    fn play(&mut self) {
        while self.shared.is_playing.load(Ordering::SeqCst) && self.frame_idx < self.loader.size()
        {
            if let Err(e) = self.process_frame(self.frame_idx) {
                self.status(format!("Frame {} failed: {}", self.frame_idx, e));
                if e.kind() == ErrorKind::Io {
                    break;
                }
            }
            self.frame_idx += 1;
        }

        if self.shared.is_playing.load(Ordering::SeqCst) {
            self.status("Playback finished");
        } else {
            self.status("Playback paused");
        }
        self.shared.is_playing.store(false, Ordering::SeqCst);
        let _ = self.events.send(EngineEvent::FinishedPlaying);
    }

    fn save_params_to_file(&self) {
        let Some(dir) = lock(&self.shared.image_save_dir).clone() else {
            self.status("No image save dir; load a scan file first");
            return;
        };
        let (params, ioparams) = lock(&self.shared.params).clone();
        if let Err(e) = params.save_to_file(dir.join("params.json")) {
            self.status(format!("Failed to save params: {e}"));
        }
        if let Err(e) = ioparams.save_to_file(dir.join("ioparams.json")) {
            self.status(format!("Failed to save ioparams: {e}"));
        }
    }

    fn process_current_frame(&mut self) {
        if let Err(e) = self.process_frame(self.frame_idx) {
            error!("process_frame: {e}");
            self.status(format!("Frame {} failed: {}", self.frame_idx, e));
        }
    }

    fn process_frame(&mut self, idx: usize) -> Result<()> {
        let mut timings = FrameTimings::new();

        let timer = Timer::start("load");
        self.loader.get_at(&mut self.rf, idx)?;
        let (name, duration) = timer.stop();
        timings.add_step(name, duration);

        // Copy the live configuration out under the lock; the lock is
        // released before any heavy compute.
        let (params, ioparams) = lock(&self.shared.params).clone();

        let timer = Timer::start("split");
        let background = mean_aline(&self.rf);
        let pair: PausPair<FloatType> = split_rf_paus(&self.rf, &background, &ioparams)?;
        let (name, duration) = timer.stop();
        timings.add_step(name, duration);

        if (params.pa.enable_saft || params.us.enable_saft) && self.saft_delay.is_none() {
            self.saft_delay = Some(SaftDelayParams::make().compute_time_delay(None, None));
        }

        let recon_pa =
            ChannelReconstructor::<FloatType>::new(&params.pa, self.saft_delay.clone())?;
        let recon_us =
            ChannelReconstructor::<FloatType>::new(&params.us, self.saft_delay.clone())?;

        let flip = ReconParams2::flip(idx);
        let PausPair {
            pa: mut pa_rf,
            us: mut us_rf,
        } = pair;

        // The two channels share nothing mutable; run them in parallel
        // and join before the frame is considered complete.
        let timer = Timer::start("recon");
        let (pa_result, us_result) = rayon::join(
            || -> Result<_> {
                let images = recon_pa.reconstruct(&mut pa_rf, flip)?;
                let radial = make_radial(&images.log, None)?;
                Ok((images, radial))
            },
            || -> Result<_> {
                let images = recon_us.reconstruct(&mut us_rf, flip)?;
                let radial = make_radial(&images.log, None)?;
                Ok((images, radial))
            },
        );
        let (pa_images, pa_radial) = pa_result?;
        let (us_images, us_radial) = us_result?;
        let (name, duration) = timer.stop();
        timings.add_step(name, duration);

        // Physical depth of one radial pixel: metres per rect sample
        // (two-way travel) scaled by the rect-to-radial resampling.
        let us_rect_points = us_rf.ncols() as f64;
        let us_radial_points = us_radial.height() as f64 / 2.0;
        let fct = SOUND_SPEED / SAMPLE_FREQ / 2.0 * us_rect_points / us_radial_points;

        let timer = Timer::start("overlay");
        let overlay = make_overlay(&us_radial, &pa_radial)?;
        let (name, duration) = timer.stop();
        timings.add_step(name, duration);

        let data = Arc::new(BScanData {
            frame_idx: idx,
            rf: self.rf.clone(),
            rf_pair: PausPair {
                pa: pa_rf,
                us: us_rf,
            },
            env: PausPair {
                pa: pa_images.envelope,
                us: us_images.envelope,
            },
            log: PausPair {
                pa: pa_images.log,
                us: us_images.log,
            },
            pa_radial,
            us_radial,
            overlay,
            fct,
        });

        let _ = self.events.send(EngineEvent::FrameReady {
            data: Arc::clone(&data),
            pix2m: fct,
        });
        let _ = self.events.send(EngineEvent::FrameIndexChanged(idx));

        if let Some(dir) = lock(&self.shared.image_save_dir).clone() {
            spawn_image_writes(
                &dir,
                idx,
                data.us_radial.clone(),
                data.pa_radial.clone(),
                data.overlay.clone(),
            );
        }

        info!(frame = idx, total = self.loader.size(), %timings, "frame done");
        self.status(format!(
            "Frame {}/{} took {} ms. {}",
            idx,
            self.loader.size(),
            timings.total_duration().as_millis(),
            timings
        ));
        Ok(())
    }
}
