//! Splitting a run into contiguous blocks of cases and putting the results back together.
//!
//! Cases are numbered `(station * test_times + time) * lead_times + lead_time`. A coordinator
//! splits the case space with [`split`], hands each range to a worker that calls
//! [`AnEn::generate_range`](crate::AnEn::generate_range) against its own read only copy of the
//! archives, and joins the returned blocks with [`gather`]. The result is the same as a single
//! [`AnEn::generate`](crate::AnEn::generate) regardless of the number of workers.
use crate::{
    analogs::Analogs,
    error::{AnEnError, Result},
    similarity::Candidate,
};
use std::ops::Range;

/// Split `total` cases into at most `workers` contiguous, ordered, non-empty ranges.
///
/// ```rust
/// use analog_ensemble::split;
///
/// assert_eq!(split(10, 3).unwrap(), vec![0..4, 4..7, 7..10]);
/// assert_eq!(split(2, 4).unwrap(), vec![0..1, 1..2]);
/// assert!(split(0, 4).unwrap().is_empty());
/// assert!(split(10, 0).is_err());
/// ```
pub fn split(total: usize, workers: usize) -> Result<Vec<Range<usize>>> {
    if workers == 0 {
        return Err(AnEnError::invalid("the number of workers must be positive"));
    }

    let parts = workers.min(total);
    if parts == 0 {
        return Ok(vec![]);
    }

    let base = total / parts;
    let extra = total % parts;

    let mut start = 0;
    let ranges = (0..parts)
        .map(|i| {
            let len = base + if i < extra { 1 } else { 0 };
            let range = start..start + len;
            start += len;
            range
        })
        .collect();

    Ok(ranges)
}

/// The members found for a contiguous range of cases.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalogBlock {
    range: Range<usize>,
    case_extents: [usize; 3],
    num_members: usize,
    members: Vec<Vec<Candidate>>,
}

impl AnalogBlock {
    pub(crate) fn new(
        range: Range<usize>,
        case_extents: [usize; 3],
        num_members: usize,
        members: Vec<Vec<Candidate>>,
    ) -> Self {
        debug_assert_eq!(range.len(), members.len());
        AnalogBlock {
            range,
            case_extents,
            num_members,
            members,
        }
    }

    /// The cases covered.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Extents `[test stations, test times, lead times]` of the whole run.
    #[inline]
    pub fn case_extents(&self) -> [usize; 3] {
        self.case_extents
    }

    /// The ranked members of each case in the range, best first.
    #[inline]
    pub fn members(&self) -> &[Vec<Candidate>] {
        &self.members
    }
}

/// Join blocks into one ensemble, in case order. The blocks may arrive in any order, but they
/// must come from the same run and cover every case exactly once.
pub fn gather(mut blocks: Vec<AnalogBlock>) -> Result<Analogs> {
    let first = blocks
        .first()
        .ok_or_else(|| AnEnError::invalid("nothing to gather"))?;
    let case_extents = first.case_extents;
    let num_members = first.num_members;

    if blocks
        .iter()
        .any(|b| b.case_extents != case_extents || b.num_members != num_members)
    {
        return Err(AnEnError::invalid("blocks come from runs with different shapes"));
    }

    blocks.sort_by_key(|b| (b.range.start, b.range.end));

    let total: usize = case_extents.iter().product();
    let mut next = 0;
    for block in &blocks {
        if block.range.start != next {
            return Err(AnEnError::invalid(format!(
                "blocks leave a gap or overlap at case {}",
                next.min(block.range.start)
            )));
        }
        next = block.range.end;
    }
    if next != total {
        return Err(AnEnError::invalid(format!(
            "blocks cover {} of {} cases",
            next, total
        )));
    }

    let mut analogs = Analogs::new(case_extents, num_members)?;
    for block in &blocks {
        for (case, members) in block.range.clone().zip(&block.members) {
            analogs.set_case(case, members);
        }
    }

    Ok(analogs)
}
