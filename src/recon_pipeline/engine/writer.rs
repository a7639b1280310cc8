use std::path::Path;

use image::{GrayImage, RgbImage};
use tracing::warn;

/// Persist the three rendered images for a frame as fire-and-forget
/// tasks on the rayon pool.
///
/// Each task owns its image, so buffer reuse for the next frame cannot
/// race a write in flight. Completion is not tracked; failures are
/// logged and dropped.
pub fn spawn_image_writes(
    dir: &Path,
    frame_idx: usize,
    us: GrayImage,
    pa: GrayImage,
    overlay: RgbImage,
) {
    let us_path = dir.join(format!("US_{frame_idx:03}.png"));
    let pa_path = dir.join(format!("PA_{frame_idx:03}.png"));
    let overlay_path = dir.join(format!("PAUS_{frame_idx:03}.png"));

    rayon::spawn(move || {
        if let Err(e) = us.save(&us_path) {
            warn!("Failed to write {}: {}", us_path.display(), e);
        }
    });
    rayon::spawn(move || {
        if let Err(e) = pa.save(&pa_path) {
            warn!("Failed to write {}: {}", pa_path.display(), e);
        }
    });
    rayon::spawn(move || {
        if let Err(e) = overlay.save(&overlay_path) {
            warn!("Failed to write {}: {}", overlay_path.display(), e);
        }
    });
}
