//! The dissimilarity metric and the ranked candidate lists it produces.
//!
//! A candidate is a (search station, search time) pair compared against a test case. Its score is
//! the weighted sum over parameters of the mean squared normalized difference across the lead
//! time window. Lower is more similar.
use crate::{
    error::{AnEnError, Result},
    times::Time,
    utility::fold_circular,
};
use optional::{none, some, Optioned};
use std::cmp::Ordering;

/// A scored candidate for one test case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Dissimilarity, after any distance penalty.
    pub score: f64,
    /// Number of parameters left out of the score because they were missing.
    pub na_count: usize,
    /// Forecast station index searched.
    pub search_station: usize,
    /// Forecast time index searched.
    pub search_time: usize,
    /// Value of the searched forecast time.
    pub search_time_value: Time,
    /// Observation station index the member is taken from.
    pub obs_station: usize,
    /// Observation time index the member is taken from.
    pub obs_time: usize,
    /// The verifying observation, never missing.
    pub value: f64,
}

impl Candidate {
    /// The ranking order. Lower scores first, then fewer missing parameters, then earlier search
    /// times, then lower station indexes, then lower time indexes.
    ///
    /// ```rust
    /// use analog_ensemble::{Candidate, Time};
    /// use std::cmp::Ordering;
    ///
    /// let a = Candidate {
    ///     score: 1.0,
    ///     na_count: 0,
    ///     search_station: 1,
    ///     search_time: 3,
    ///     search_time_value: Time(30),
    ///     obs_station: 1,
    ///     obs_time: 4,
    ///     value: 12.0,
    /// };
    /// let b = Candidate { search_time: 0, search_time_value: Time(0), ..a };
    /// let c = Candidate { na_count: 1, search_time_value: Time(0), ..a };
    ///
    /// assert_eq!(a.rank_cmp(&b), Ordering::Greater);
    /// assert_eq!(a.rank_cmp(&c), Ordering::Less);
    /// ```
    #[inline]
    pub fn rank_cmp(&self, other: &Candidate) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(self.na_count.cmp(&other.na_count))
            .then(self.search_time_value.cmp(&other.search_time_value))
            .then(self.search_station.cmp(&other.search_station))
            .then(self.search_time.cmp(&other.search_time))
    }
}

/// Keep the `keep` best candidates, sorted by [`Candidate::rank_cmp`].
pub fn rank(mut candidates: Vec<Candidate>, keep: usize) -> Vec<Candidate> {
    if keep == 0 {
        return vec![];
    }

    if candidates.len() > keep {
        candidates.select_nth_unstable_by(keep - 1, Candidate::rank_cmp);
        candidates.truncate(keep);
    }

    // rank_cmp is a total order over distinct candidates, so unstable is deterministic.
    candidates.sort_unstable_by(Candidate::rank_cmp);
    candidates
}

/// The difference between a test and a search value, folded around the circle if needed.
#[inline]
pub fn difference(test: f64, search: f64, circular: bool) -> f64 {
    if circular {
        fold_circular(test, search)
    } else {
        test - search
    }
}

/// One parameter's contribution before weighting: the mean over the lead time window of the
/// squared normalized difference.
///
/// Window entries where either side is missing are skipped and counted. The result is none when
/// every entry is missing or when more than `max_flt_nan` are. A missing or non-positive
/// normalizer on an entry that is needed is reported by index through `UndefinedStatistic`, so the
/// caller fills in which parameter and station it was.
pub fn parameter_term(
    test: &[f64],
    search: &[f64],
    normalizers: &[f64],
    circular: bool,
    max_flt_nan: Option<usize>,
) -> std::result::Result<Optioned<f64>, usize> {
    debug_assert_eq!(test.len(), search.len());
    debug_assert_eq!(test.len(), normalizers.len());

    let mut sum = 0.0;
    let mut count = 0usize;
    let mut missing = 0usize;

    for (i, (&a, &b, &sd)) in itertools::izip!(test, search, normalizers).enumerate() {
        if a.is_nan() || b.is_nan() {
            missing += 1;
            continue;
        }

        if !(sd > 0.0) {
            return Err(i);
        }

        let d = difference(a, b, circular) / sd;
        sum += d * d;
        count += 1;
    }

    if count == 0 || max_flt_nan.map_or(false, |max| missing > max) {
        Ok(none())
    } else {
        Ok(some(sum / count as f64))
    }
}

/// The score of a single lead time comparison: `sum(w * (d / sd)^2)` over the parameters with a
/// positive weight and valid values on both sides. Returns the score and the number of missing
/// parameters, or none if nothing could be compared.
///
/// ```rust
/// use analog_ensemble::dissimilarity;
///
/// let test = [10.0, 350.0];
/// let search = [12.0, 10.0];
/// let sds = [2.0, 10.0];
/// let weights = [1.0, 2.0];
/// let circulars = [false, true];
///
/// let (score, na) = dissimilarity(&test, &search, &sds, &weights, &circulars).unwrap().unwrap();
/// assert_eq!(na, 0);
/// assert!((score - (1.0 + 2.0 * 4.0)).abs() < 1.0e-12);
/// ```
pub fn dissimilarity(
    test: &[f64],
    search: &[f64],
    sds: &[f64],
    weights: &[f64],
    circulars: &[bool],
) -> Result<Option<(f64, usize)>> {
    let num_pars = test.len();
    for &(what, found) in &[
        ("search values", search.len()),
        ("standard deviations", sds.len()),
        ("weights", weights.len()),
        ("circular flags", circulars.len()),
    ] {
        if found != num_pars {
            return Err(AnEnError::DimensionMismatch {
                what,
                expected: num_pars,
                found,
            });
        }
    }

    let mut total = 0.0;
    let mut na_count = 0;
    let mut valid = 0;
    for p in 0..num_pars {
        if weights[p] == 0.0 {
            continue;
        }

        let term = parameter_term(
            &test[p..=p],
            &search[p..=p],
            &sds[p..=p],
            circulars[p],
            None,
        )
        .map_err(|_| AnEnError::UndefinedStatistic {
            parameter: p,
            station: 0,
            flt: 0,
        })?;

        match term.into_option() {
            Some(term) => {
                total += weights[p] * term;
                valid += 1;
            }
            None => na_count += 1,
        }
    }

    if valid == 0 {
        Ok(None)
    } else {
        Ok(Some((total, na_count)))
    }
}

/// The finalized, ranked candidate rows of a run, one row per (test station, test time, lead
/// time) case. Rows may be shorter than requested when candidates ran out.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrices {
    rows: Vec<Vec<Candidate>>,
    extents: [usize; 3],
    row_len: usize,
}

impl SimilarityMatrices {
    pub(crate) fn new(rows: Vec<Vec<Candidate>>, extents: [usize; 3], row_len: usize) -> Self {
        debug_assert_eq!(rows.len(), extents.iter().product::<usize>());
        SimilarityMatrices {
            rows,
            extents,
            row_len,
        }
    }

    /// Extents `[test stations, test times, lead times]`.
    #[inline]
    pub fn extents(&self) -> [usize; 3] {
        self.extents
    }

    /// The maximum number of candidates kept per case.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    /// The ranked candidates of one case, best first.
    pub fn row(&self, station: usize, time: usize, flt: usize) -> Result<&[Candidate]> {
        let [ns, nt, nf] = self.extents;
        if station >= ns || time >= nt || flt >= nf {
            return Err(AnEnError::OutOfRange {
                index: [station, time, flt, 0],
                extents: [ns, nt, nf, self.row_len],
            });
        }
        Ok(&self.rows[(station * nt + time) * nf + flt])
    }

    /// Iterate over all rows in case order.
    pub fn rows(&self) -> impl Iterator<Item = &[Candidate]> {
        self.rows.iter().map(|r| r.as_slice())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utility::test_tools::approx_equal;
    use std::f64::NAN;

    fn candidate(score: f64, na_count: usize, station: usize, time: usize) -> Candidate {
        Candidate {
            score,
            na_count,
            search_station: station,
            search_time: time,
            search_time_value: Time(time as i64 * 10),
            obs_station: station,
            obs_time: time,
            value: 0.0,
        }
    }

    #[test]
    fn test_rank_order() {
        let cands = vec![
            candidate(2.0, 0, 0, 0),
            candidate(1.0, 1, 0, 1),
            candidate(1.0, 0, 1, 2),
            candidate(1.0, 0, 0, 2),
            candidate(0.5, 0, 0, 3),
            candidate(1.0, 0, 0, 4),
        ];

        let ranked = rank(cands.clone(), 10);
        let order: Vec<(usize, usize)> = ranked
            .iter()
            .map(|c| (c.search_station, c.search_time))
            .collect();
        assert_eq!(order, vec![(0, 3), (0, 2), (1, 2), (0, 4), (0, 1), (0, 0)]);

        let top = rank(cands.clone(), 2);
        assert_eq!(top, ranked[..2].to_vec());
        assert!(rank(cands, 0).is_empty());
    }

    #[test]
    fn test_parameter_term() {
        let term = parameter_term(&[1.0, 2.0], &[2.0, 4.0], &[1.0, 2.0], false, None)
            .unwrap()
            .unwrap();
        assert!(approx_equal(term, 1.0, 1.0e-12));

        // Missing entries are skipped.
        let term = parameter_term(&[1.0, NAN], &[3.0, 4.0], &[1.0, 2.0], false, None)
            .unwrap()
            .unwrap();
        assert!(approx_equal(term, 4.0, 1.0e-12));

        // Too many missing, or all missing.
        assert!(
            parameter_term(&[1.0, NAN], &[3.0, 4.0], &[1.0, 2.0], false, Some(0))
                .unwrap()
                .is_none()
        );
        assert!(parameter_term(&[NAN], &[3.0], &[1.0], false, None)
            .unwrap()
            .is_none());

        // A zero normalizer is only an error when it is needed.
        assert_eq!(
            parameter_term(&[1.0, 1.0], &[1.0, 2.0], &[1.0, 0.0], false, None),
            Err(1)
        );
        assert!(parameter_term(&[1.0, NAN], &[1.0, 2.0], &[1.0, 0.0], false, None).is_ok());
    }

    #[test]
    fn test_circular_term() {
        let term = parameter_term(&[359.0], &[1.0], &[1.0], true, None)
            .unwrap()
            .unwrap();
        assert!(approx_equal(term, 4.0, 1.0e-9));
    }

    #[test]
    fn test_dissimilarity() {
        let (score, na) = dissimilarity(
            &[1.0, NAN, 5.0],
            &[2.0, 3.0, 5.0],
            &[1.0, 1.0, 1.0],
            &[1.0, 1.0, 3.0],
            &[false, false, false],
        )
        .unwrap()
        .unwrap();
        assert!(approx_equal(score, 1.0, 1.0e-12));
        assert_eq!(na, 1);

        // Zero weights are skipped entirely.
        assert_eq!(
            dissimilarity(&[1.0], &[NAN], &[0.0], &[0.0], &[false]).unwrap(),
            None
        );
        assert!(dissimilarity(&[1.0], &[2.0], &[1.0], &[1.0, 1.0], &[false]).is_err());
        assert!(dissimilarity(&[1.0], &[2.0], &[0.0], &[1.0], &[false]).is_err());
    }

    #[test]
    fn test_matrices_access() {
        let rows = vec![vec![candidate(1.0, 0, 0, 0)], vec![], vec![], vec![]];
        let sims = SimilarityMatrices::new(rows, [1, 2, 2], 3);
        assert_eq!(sims.row(0, 0, 0).unwrap().len(), 1);
        assert!(sims.row(0, 1, 1).unwrap().is_empty());
        assert!(sims.row(1, 0, 0).is_err());
        assert_eq!(sims.rows().count(), 4);
    }
}
