use crate::color::Mask;
use crate::estimate::DetectionResult;
use crate::score::{Candidate, Scored};

/// Everything one pipeline run produced, for diagnostics and debug sinks.
#[derive(Clone, Debug)]
pub struct FrameReport {
    /// Binary color mask of the frame.
    pub mask: Mask,
    /// One entry per traced contour, in tracing order.
    pub scored: Vec<Scored>,
    /// Index into `scored` of the selected target.
    pub selected: Option<usize>,
    pub detection: DetectionResult,
}

impl FrameReport {
    /// The candidate the detection was computed from.
    pub fn target(&self) -> Option<&Candidate> {
        self.selected
            .and_then(|i| self.scored.get(i))
            .and_then(Scored::candidate)
    }

    /// Candidates that passed both shape windows.
    pub fn valid_count(&self) -> usize {
        self.scored
            .iter()
            .filter_map(Scored::candidate)
            .filter(|c| c.is_valid())
            .count()
    }
}
