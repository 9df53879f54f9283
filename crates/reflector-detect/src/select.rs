use serde::{Deserialize, Serialize};

use crate::score::{Candidate, Scored};

/// How to pick one target among several valid candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// First valid candidate in contour order.
    #[default]
    FirstMatch,
    /// Valid candidate with the largest enclosed area; ties go to the
    /// earliest.
    LargestArea,
}

fn pick<'a, I>(candidates: I, policy: SelectionPolicy) -> Option<(usize, &'a Candidate)>
where
    I: Iterator<Item = (usize, &'a Candidate)>,
{
    let mut valid = candidates.filter(|(_, c)| c.is_valid());
    match policy {
        SelectionPolicy::FirstMatch => valid.next(),
        SelectionPolicy::LargestArea => valid.fold(None, |best, cur| match best {
            Some((_, b)) if cur.1.area() <= b.area() => best,
            _ => Some(cur),
        }),
    }
}

/// Pick one valid candidate, or `None` for "no target".
pub fn select_target(candidates: &[Candidate], policy: SelectionPolicy) -> Option<&Candidate> {
    pick(candidates.iter().enumerate(), policy).map(|(_, c)| c)
}

/// Like [`select_target`], over scored contours; returns the index into
/// `scored`.
pub fn select_scored(scored: &[Scored], policy: SelectionPolicy) -> Option<usize> {
    let candidates = scored
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.candidate().map(|c| (i, c)));
    pick(candidates, policy).map(|(i, _)| i)
}
