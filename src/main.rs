use pauscan_rs::logger;
use pauscan_rs::recon_pipeline::{EngineEvent, FrameEngine};

use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    logger::init();

    let Some(path) = std::env::args().nth(1) else {
        error!("Usage: pauscan_rs <scan.bin>");
        std::process::exit(2);
    };

    info!("Starting pauscan...");

    let (handle, events) = FrameEngine::spawn();
    handle.set_binfile(&path);
    handle.play();

    for event in events {
        match event {
            EngineEvent::FrameCountKnown(n) => info!("{n} frames in {path}"),
            EngineEvent::FrameIndexChanged(_) => {}
            EngineEvent::FrameReady { data, pix2m } => {
                info!(
                    "Frame {} reconstructed ({} um/pixel)",
                    data.frame_idx,
                    pix2m * 1e6
                );
            }
            EngineEvent::Status(msg) => info!("{msg}"),
            EngineEvent::FinishedPlaying => break,
        }
    }

    handle.shutdown();
    info!("Done");
    Ok(())
}
