//! HSV thresholding.
//!
//! Hue follows the 8-bit OpenCV convention: degrees / 2, so `H` lies in
//! `[0, 179]`; saturation and value span `[0, 255]`. Hue ranges do not wrap:
//! a range always selects `low <= h <= high`, and a red target straddling
//! hue 0 needs two passes by the caller. High hue bounds above 179 are
//! accepted and never exceeded.

use reflector_core::{GrayImage, RgbImageView};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Binary image: 255 marks pixels that passed the color filter, 0 the rest.
pub type Mask = GrayImage;

pub const FOREGROUND: u8 = 255;

/// Inclusive per-channel HSV bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    /// Lower bounds `[h, s, v]`.
    pub low: [u8; 3],
    /// Upper bounds `[h, s, v]`.
    pub high: [u8; 3],
}

impl ColorRange {
    /// Every HSV triple.
    pub const FULL: ColorRange = ColorRange {
        low: [0, 0, 0],
        high: [255, 255, 255],
    };

    pub fn new(low: [u8; 3], high: [u8; 3]) -> Result<Self, ConfigError> {
        let range = Self { low, high };
        range.validate()?;
        Ok(range)
    }

    /// Check `low <= high` on every channel.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for channel in 0..3 {
            if self.low[channel] > self.high[channel] {
                return Err(ConfigError::InvalidColorRange {
                    channel,
                    low: self.low[channel],
                    high: self.high[channel],
                });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.low[c] <= hsv[c] && hsv[c] <= self.high[c])
    }
}

/// Convert one RGB pixel to 8-bit HSV.
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let v = r.max(g).max(b);
    let diff = v - r.min(g).min(b);

    let s = if v == 0 { 0 } else { (255 * diff + v / 2) / v };

    let h_deg = if diff == 0 {
        0.0
    } else {
        let d = diff as f32;
        let h = if v == r {
            60.0 * (g - b) as f32 / d
        } else if v == g {
            120.0 + 60.0 * (b - r) as f32 / d
        } else {
            240.0 + 60.0 * (r - g) as f32 / d
        };
        if h < 0.0 {
            h + 360.0
        } else {
            h
        }
    };
    let h = (h_deg / 2.0).round() as i32 % 180;

    [h as u8, s as u8, v as u8]
}

/// Threshold `frame` into a mask of the same size.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(frame, range), fields(width = frame.width, height = frame.height))
)]
pub fn apply_color_range(frame: &RgbImageView<'_>, range: &ColorRange) -> Mask {
    let mut mask = GrayImage::new(frame.width, frame.height);
    for (px, out) in frame.data.chunks_exact(3).zip(mask.data.iter_mut()) {
        if range.contains(rgb_to_hsv([px[0], px[1], px[2]])) {
            *out = FOREGROUND;
        }
    }
    mask
}

/// Intersect an existing mask with `range` evaluated on `frame`.
///
/// Background pixels stay background. Refining with [`ColorRange::FULL`]
/// returns the mask unchanged, and refining `apply_color_range(f, r)` with
/// the same `f` and `r` is a no-op. Returns `None` if the sizes differ.
pub fn refine_mask(mask: &Mask, frame: &RgbImageView<'_>, range: &ColorRange) -> Option<Mask> {
    if mask.width != frame.width || mask.height != frame.height {
        return None;
    }
    let mut out = GrayImage::new(mask.width, mask.height);
    for ((px, &m), o) in frame
        .data
        .chunks_exact(3)
        .zip(mask.data.iter())
        .zip(out.data.iter_mut())
    {
        if m != 0 && range.contains(rgb_to_hsv([px[0], px[1], px[2]])) {
            *o = FOREGROUND;
        }
    }
    Some(out)
}
