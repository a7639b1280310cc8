//! Polar remapping and overlay compositing
//!
//! A reconstructed scan is rectangular (lines x depth samples); the
//! physical geometry is a rotating transducer, so for display the scan is
//! warped into a circular sector raster and the two channels are
//! composited into one overlay.

use image::{GrayImage, Rgb, RgbImage, imageops};
use ndarray::Array2;

use crate::recon_pipeline::common::{ProcessError, Result};


/// Convert a log-compressed scan `(lines, samples)` into a square radial
/// image.
///
/// The scan is resized to a `2r x 2r` square (`r` = min dimension), an
/// inverse polar warp centred at `(r, r)` with radius `r` produces the
/// circular sector (pixels outside the disc are black), the result is
/// rotated 90 degrees so angle zero points up, then resized to
/// `final_size` (default `r`).
pub fn make_radial(log: &Array2<u8>, final_size: Option<u32>) -> Result<GrayImage> {
    let (n_lines, n_samples) = log.dim();
    if n_lines == 0 || n_samples == 0 {
        return Err(ProcessError::ShapeMismatch(n_lines, n_samples, 1, 1));
    }

    let data: Vec<u8> = log.iter().copied().collect();
    let rect = GrayImage::from_raw(n_samples as u32, n_lines as u32, data)
        .ok_or_else(|| ProcessError::Numeric("scan buffer size mismatch".into()))?;

    let r = n_lines.min(n_samples) as u32;
    let side = 2 * r;
    let square = imageops::resize(&rect, side, side, imageops::FilterType::Triangle);

    // Inverse polar warp: y is the angle axis, x the radius axis.
    let rf = r as f32;
    let two_pi = 2.0 * std::f32::consts::PI;
    let polar = GrayImage::from_fn(side, side, |x, y| {
        let dx = x as f32 - rf;
        let dy = y as f32 - rf;
        let rho = (dx * dx + dy * dy).sqrt();
        if rho > rf {
            return image::Luma([0u8]);
        }
        let mut phi = dy.atan2(dx);
        if phi < 0.0 {
            phi += two_pi;
        }
        let src_y = phi / two_pi * side as f32;
        let src_x = rho / rf * side as f32;
        image::Luma([sample_bilinear(&square, src_x, src_y)])
    });

    let rotated = imageops::rotate270(&polar);

    let out_size = final_size.unwrap_or(r);
    Ok(imageops::resize(
        &rotated,
        out_size,
        out_size,
        imageops::FilterType::Triangle,
    ))
}

fn sample_bilinear(img: &GrayImage, x: f32, y: f32) -> u8 {
    let max_x = (img.width() - 1) as f32;
    let max_y = (img.height() - 1) as f32;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(img.width() - 1);
    let y1 = (y0 + 1).min(img.height() - 1);
    let tx = x - x0 as f32;
    let ty = y - y0 as f32;

    let p00 = img.get_pixel(x0, y0).0[0] as f32;
    let p10 = img.get_pixel(x1, y0).0[0] as f32;
    let p01 = img.get_pixel(x0, y1).0[0] as f32;
    let p11 = img.get_pixel(x1, y1).0[0] as f32;

    let top = p00 + (p10 - p00) * tx;
    let bottom = p01 + (p11 - p01) * tx;
    (top + (bottom - top) * ty).round().clamp(0.0, 255.0) as u8
}

/// Warm colormap for the PA foreground: black through red and orange to
/// yellow-white.
fn pa_color(v: u8) -> [f32; 3] {
    let v = v as f32;
    [
        (3.0 * v).min(255.0),
        (3.0 * v - 255.0).clamp(0.0, 255.0),
        (3.0 * v - 510.0).clamp(0.0, 255.0),
    ]
}

/// Alpha-composite the PA radial image (colorized foreground) over the
/// US radial image (grayscale background).
pub fn make_overlay(us: &GrayImage, pa: &GrayImage) -> Result<RgbImage> {
    if us.dimensions() != pa.dimensions() {
        return Err(ProcessError::ShapeMismatch(
            us.height() as usize,
            us.width() as usize,
            pa.height() as usize,
            pa.width() as usize,
        ));
    }

    let mut out = RgbImage::new(us.width(), us.height());
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let bg = us.get_pixel(x, y).0[0] as f32;
        let p = pa.get_pixel(x, y).0[0];
        let alpha = p as f32 / 255.0;
        let fg = pa_color(p);
        let mut rgb = [0u8; 3];
        for (c, out_c) in rgb.iter_mut().enumerate() {
            *out_c = ((1.0 - alpha) * bg + alpha * fg[c])
                .round()
                .clamp(0.0, 255.0) as u8;
        }
        *pixel = Rgb(rgb);
    }
    Ok(out)
}
