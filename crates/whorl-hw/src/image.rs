//! Fingerprint frame type and raster operations: orientation fixes,
//! contrast stretch, sanity heuristics.

use serde::{Deserialize, Serialize};

/// Pixels spanning less than this range mean a blank or saturated frame.
const MIN_DYNAMIC_RANGE: u8 = 8;

/// Raster fixes a driver's raw frames need before they are usable.
///
/// Cheap sensors mirror or invert their output; the driver marks what it
/// knows about its frames and [`FingerImage::standardize`] applies and
/// clears the flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFlags {
    /// Frame is vertically mirrored relative to canonical orientation.
    pub v_flipped: bool,
    /// Frame is horizontally mirrored.
    pub h_flipped: bool,
    /// Ridges are bright on dark instead of dark on bright.
    pub colors_inverted: bool,
}

/// A captured grayscale fingerprint frame.
#[derive(Debug, Clone)]
pub struct FingerImage {
    /// Grayscale pixel data (width * height bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Raster fixes still pending; cleared by [`standardize`](Self::standardize).
    pub flags: ImageFlags,
}

impl FingerImage {
    /// Heuristic screen for degenerate frames.
    ///
    /// Structural checks (nonzero geometry, buffer at least as large as
    /// the geometry claims) plus a minimum dynamic range, so blank and
    /// saturated captures are rejected before feature extraction wastes
    /// time on them.
    pub fn is_sane(&self) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        let pixels = self.width as usize * self.height as usize;
        if self.data.len() < pixels {
            return false;
        }

        let mut min = u8::MAX;
        let mut max = u8::MIN;
        for &p in &self.data[..pixels] {
            min = min.min(p);
            max = max.max(p);
        }
        max - min >= MIN_DYNAMIC_RANGE
    }

    /// Rewrite the frame into canonical orientation and polarity, then
    /// stretch its contrast over the full 8-bit range.
    ///
    /// Applies whatever fixes the driver flagged and clears the flags.
    /// Driver overrun past width * height is trimmed first. No-op on
    /// frames whose buffer is shorter than the declared geometry.
    pub fn standardize(&mut self) {
        let w = self.width as usize;
        let h = self.height as usize;
        if w == 0 || h == 0 || self.data.len() < w * h {
            return;
        }
        self.data.truncate(w * h);

        tracing::trace!(flags = ?self.flags, "standardizing frame");

        if self.flags.v_flipped {
            flip_vertical(&mut self.data, w, h);
        }
        if self.flags.h_flipped {
            flip_horizontal(&mut self.data, w);
        }
        if self.flags.colors_inverted {
            for p in &mut self.data {
                *p = 255 - *p;
            }
        }
        self.flags = ImageFlags::default();

        stretch_contrast(&mut self.data);
    }
}

fn flip_vertical(data: &mut [u8], width: usize, height: usize) {
    for row in 0..height / 2 {
        let (head, tail) = data.split_at_mut((height - row - 1) * width);
        head[row * width..(row + 1) * width].swap_with_slice(&mut tail[..width]);
    }
}

fn flip_horizontal(data: &mut [u8], width: usize) {
    for row in data.chunks_exact_mut(width) {
        row.reverse();
    }
}

/// Linear histogram stretch to the full 0..=255 range. Uniform frames
/// are left alone; the sanity check rejects those anyway.
fn stretch_contrast(data: &mut [u8]) {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for &p in data.iter() {
        min = min.min(p);
        max = max.max(p);
    }
    if min >= max {
        return;
    }

    let range = (max - min) as f32;
    for p in data.iter_mut() {
        *p = (((*p - min) as f32 / range) * 255.0).round() as u8;
    }
}
