//! Shape scoring of traced contours.

use reflector_core::PixelRect;
use serde::{Deserialize, Serialize};

use crate::contour::Contour;

/// Numeric interval with independently open or closed ends.
///
/// Both ends default to exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalarRange {
    pub low: f64,
    pub high: f64,
    #[serde(default)]
    pub low_inclusive: bool,
    #[serde(default)]
    pub high_inclusive: bool,
}

impl ScalarRange {
    /// `(low, high)`
    pub const fn open(low: f64, high: f64) -> Self {
        Self {
            low,
            high,
            low_inclusive: false,
            high_inclusive: false,
        }
    }

    /// `[low, high]`
    pub const fn closed(low: f64, high: f64) -> Self {
        Self {
            low,
            high,
            low_inclusive: true,
            high_inclusive: true,
        }
    }

    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        let above = if self.low_inclusive {
            v >= self.low
        } else {
            v > self.low
        };
        let below = if self.high_inclusive {
            v <= self.high
        } else {
            v < self.high
        };
        above && below
    }

    /// Finite bounds with `low <= high`.
    pub fn is_well_formed(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low <= self.high
    }
}

/// Aspect-ratio and fill-density windows a target must fall into.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeThresholds {
    /// Window for `width / height`.
    pub ratio: ScalarRange,
    /// Window for `area / (width * height)`.
    pub density: ScalarRange,
}

impl ShapeThresholds {
    /// Thin tape strip seen at an angle: wide box, sparse fill.
    pub const fn reflective_strip() -> Self {
        Self {
            ratio: ScalarRange::open(2.0, 2.5),
            density: ScalarRange::open(0.05, 0.15),
        }
    }

    /// Roughly square, mostly filled target.
    pub const fn solid_panel() -> Self {
        Self {
            ratio: ScalarRange::open(0.5, 1.0),
            density: ScalarRange::open(0.5, 0.9),
        }
    }

    #[inline]
    pub fn accepts(&self, aspect_ratio: f64, density: f64) -> bool {
        self.ratio.contains(aspect_ratio) && self.density.contains(density)
    }
}

/// Why a contour never became a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The contour has no points.
    Empty,
    /// Zero-width or zero-height bounding box.
    Degenerate { rect: PixelRect },
}

/// A contour with its shape descriptors and verdict.
///
/// Only [`score_contour`] builds candidates, so `rect.width` and
/// `rect.height` are always positive.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    contour: Contour,
    rect: PixelRect,
    area: f64,
    aspect_ratio: f64,
    density: f64,
    is_valid: bool,
}

impl Candidate {
    #[inline]
    pub fn contour(&self) -> &Contour {
        &self.contour
    }

    #[inline]
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.area
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    #[inline]
    pub fn density(&self) -> f64 {
        self.density
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Scored {
    Candidate(Candidate),
    Rejected(Rejection),
}

impl Scored {
    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            Scored::Candidate(c) => Some(c),
            Scored::Rejected(_) => None,
        }
    }
}

/// `(aspect_ratio, density)` for a box and enclosed area, or `None` when the
/// box is degenerate.
pub fn shape_descriptors(rect: PixelRect, area: f64) -> Option<(f64, f64)> {
    if rect.is_degenerate() {
        return None;
    }
    let w = rect.width as f64;
    let h = rect.height as f64;
    Some((w / h, area / (w * h)))
}

/// Measure a contour and classify it against `thresholds`.
pub fn score_contour(contour: Contour, thresholds: &ShapeThresholds) -> Scored {
    let Some(rect) = contour.bounding_rect() else {
        return Scored::Rejected(Rejection::Empty);
    };
    let area = contour.area();
    let Some((aspect_ratio, density)) = shape_descriptors(rect, area) else {
        log::trace!("degenerate contour rejected: {:?}", rect);
        return Scored::Rejected(Rejection::Degenerate { rect });
    };
    let is_valid = thresholds.accepts(aspect_ratio, density);
    log::debug!(
        "contour at ({}, {}) {}x{}: ratio {:.3} density {:.3} -> {}",
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        aspect_ratio,
        density,
        if is_valid { "valid" } else { "invalid" }
    );
    Scored::Candidate(Candidate {
        contour,
        rect,
        area,
        aspect_ratio,
        density,
        is_valid,
    })
}

#[cfg(test)]
pub(crate) fn candidate_for_test(rect: PixelRect, area: f64, is_valid: bool) -> Candidate {
    let (aspect_ratio, density) = shape_descriptors(rect, area).unwrap_or((0.0, 0.0));
    Candidate {
        contour: Contour::new(Vec::new()),
        rect,
        area,
        aspect_ratio,
        density,
        is_valid,
    }
}
