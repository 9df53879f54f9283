//! Border following on binary masks.
//!
//! Implements the Suzuki-Abe (1985) border following scan with 8-connected
//! foreground. Every border is reported (outer borders and hole borders
//! alike, no hierarchy) and each border is compressed to the points where
//! the step direction changes, so a filled axis-aligned rectangle comes out
//! as its four corners.

use reflector_core::{GrayImageView, PixelPoint, PixelRect};

/// 8-neighbour offsets `(dx, dy)` in counter-clockwise order (on screen,
/// `y` down) starting at east.
const NEIGHBORS: [(i32, i32); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Closed border of a connected foreground region, in image pixel
/// coordinates. The last point connects back to the first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    points: Vec<PixelPoint>,
}

impl Contour {
    pub fn new(points: Vec<PixelPoint>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[PixelPoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Minimal axis-aligned box covering the contour pixels.
    pub fn bounding_rect(&self) -> Option<PixelRect> {
        PixelRect::enclosing(&self.points)
    }

    /// Enclosed polygon area (shoelace formula), always non-negative.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice = 0i64;
        for k in 0..n {
            let a = self.points[k];
            let b = self.points[(k + 1) % n];
            twice += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
        }
        (twice as f64).abs() * 0.5
    }
}

/// Trace every border in `mask` (non-zero = foreground).
pub fn find_contours(mask: &GrayImageView<'_>) -> Vec<Contour> {
    let full = PixelRect::new(0, 0, mask.width as i32, mask.height as i32);
    find_contours_in(mask, full)
}

/// Trace borders inside `roi` only. Pixels outside the region are treated as
/// background; returned points are in full-image coordinates.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(mask), fields(width = mask.width, height = mask.height))
)]
pub fn find_contours_in(mask: &GrayImageView<'_>, roi: PixelRect) -> Vec<Contour> {
    let Some(roi) = roi.clamp_to(mask.width, mask.height) else {
        return Vec::new();
    };
    let mut labels = Labels::from_mask(mask, roi);
    // Padded label coordinates -> image coordinates.
    let offset = (roi.x - 1, roi.y - 1);

    let mut contours = Vec::new();
    let mut nbd = 1;
    for y in 1..labels.height - 1 {
        for x in 1..labels.width - 1 {
            let f = labels.get(x, y);
            let from = if f == 1 && labels.get(x - 1, y) == 0 {
                (x - 1, y)
            } else if f >= 1 && labels.get(x + 1, y) == 0 {
                (x + 1, y)
            } else {
                continue;
            };
            nbd += 1;
            let border = follow_border(&mut labels, (x, y), from, nbd);
            let points = compress_chain(&border)
                .into_iter()
                .map(|(px, py)| PixelPoint::new(px + offset.0, py + offset.1))
                .collect();
            contours.push(Contour::new(points));
        }
    }
    log::trace!("traced {} borders in {:?}", contours.len(), roi);
    contours
}

/// Label image with a one-pixel zero frame: 0 background, 1 unvisited
/// foreground, `±nbd` once a border has been followed.
struct Labels {
    width: i32,
    height: i32,
    data: Vec<i32>,
}

impl Labels {
    fn from_mask(mask: &GrayImageView<'_>, roi: PixelRect) -> Self {
        let width = roi.width + 2;
        let height = roi.height + 2;
        let mut data = vec![0i32; (width * height) as usize];
        for ry in 0..roi.height {
            for rx in 0..roi.width {
                if mask.get(roi.x + rx, roi.y + ry) != 0 {
                    data[((ry + 1) * width + rx + 1) as usize] = 1;
                }
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    fn get(&self, x: i32, y: i32) -> i32 {
        self.data[(y * self.width + x) as usize]
    }

    #[inline]
    fn set(&mut self, x: i32, y: i32, v: i32) {
        self.data[(y * self.width + x) as usize] = v;
    }
}

fn direction(center: (i32, i32), to: (i32, i32)) -> usize {
    let d = (to.0 - center.0, to.1 - center.1);
    NEIGHBORS.iter().position(|&n| n == d).unwrap_or(0)
}

#[inline]
fn step(p: (i32, i32), dir: usize) -> (i32, i32) {
    (p.0 + NEIGHBORS[dir].0, p.1 + NEIGHBORS[dir].1)
}

fn follow_border(
    labels: &mut Labels,
    start: (i32, i32),
    from: (i32, i32),
    nbd: i32,
) -> Vec<(i32, i32)> {
    // Clockwise search around the start pixel for the first non-zero
    // neighbour, beginning at the background pixel we entered from.
    let d0 = direction(start, from);
    let first = (0..8)
        .map(|k| step(start, (d0 + 8 - k) % 8))
        .find(|&p| labels.get(p.0, p.1) != 0);
    let Some(p1) = first else {
        labels.set(start.0, start.1, -nbd);
        return vec![start];
    };

    let mut points = vec![start];
    let mut prev = p1;
    let mut cur = start;
    loop {
        // Counter-clockwise search around `cur`, starting just after `prev`.
        let dp = direction(cur, prev);
        let mut east_is_background = false;
        let mut next = prev;
        for k in 1..=8 {
            let d = (dp + k) % 8;
            let q = step(cur, d);
            if labels.get(q.0, q.1) != 0 {
                next = q;
                break;
            }
            if d == 0 {
                east_is_background = true;
            }
        }

        if east_is_background {
            labels.set(cur.0, cur.1, -nbd);
        } else if labels.get(cur.0, cur.1) == 1 {
            labels.set(cur.0, cur.1, nbd);
        }

        if next == start && cur == p1 {
            break;
        }
        prev = cur;
        cur = next;
        points.push(cur);
    }
    points
}

/// Keep only the points where the step direction changes.
fn compress_chain(points: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let delta = |a: (i32, i32), b: (i32, i32)| (b.0 - a.0, b.1 - a.1);
    let kept: Vec<(i32, i32)> = (0..n)
        .filter(|&k| {
            let prev = points[(k + n - 1) % n];
            let next = points[(k + 1) % n];
            delta(prev, points[k]) != delta(points[k], next)
        })
        .map(|k| points[k])
        .collect();
    if kept.is_empty() {
        points[..1].to_vec()
    } else {
        kept
    }
}
