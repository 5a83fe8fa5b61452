//! The ensemble produced by a run.
use crate::{
    array4d::Array4D,
    error::{AnEnError, Result},
    similarity::Candidate,
};
use optional::Optioned;

/// Where an ensemble member came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberSource {
    /// Forecast station index whose history matched.
    pub search_station: usize,
    /// Forecast time index that matched.
    pub search_time: usize,
    /// Observation station index the value was taken from.
    pub obs_station: usize,
    /// Observation time index the value was taken from.
    pub obs_time: usize,
}

impl From<&Candidate> for MemberSource {
    fn from(cand: &Candidate) -> Self {
        MemberSource {
            search_station: cand.search_station,
            search_time: cand.search_time,
            obs_station: cand.obs_station,
            obs_time: cand.obs_time,
        }
    }
}

/// Ensemble members over (test station, test time, lead time, member).
///
/// Members are in rank order, best first. A case that ran short of admissible candidates keeps
/// the members it found and leaves the rest missing, and reports itself incomplete.
#[derive(Debug, Clone, PartialEq)]
pub struct Analogs {
    values: Array4D,
    sources: Vec<Option<MemberSource>>,
    filled: Vec<usize>,
}

impl Analogs {
    /// An ensemble with no members filled in yet.
    pub fn new(case_extents: [usize; 3], num_members: usize) -> Result<Self> {
        let [ns, nt, nf] = case_extents;
        let values = Array4D::new([ns, nt, nf, num_members])?;
        let num_cases = ns * nt * nf;

        Ok(Analogs {
            values,
            sources: vec![None; num_cases * num_members],
            filled: vec![0; num_cases],
        })
    }

    // Members beyond the ensemble size are ignored.
    pub(crate) fn set_case(&mut self, case: usize, members: &[Candidate]) {
        let num_members = self.num_members();
        let start = case * num_members;
        let count = members.len().min(num_members);

        let values = &mut self.values.as_mut_slice()[start..start + num_members];
        let sources = &mut self.sources[start..start + num_members];
        for (i, (val, src)) in values.iter_mut().zip(sources.iter_mut()).enumerate() {
            match members.get(i).filter(|_| i < count) {
                Some(cand) => {
                    *val = cand.value;
                    *src = Some(MemberSource::from(cand));
                }
                None => {
                    *val = std::f64::NAN;
                    *src = None;
                }
            }
        }

        self.filled[case] = count;
    }

    /// The member values, NaN where a member is missing.
    #[inline]
    pub fn values(&self) -> &Array4D {
        &self.values
    }

    /// Extents `[test stations, test times, lead times]`.
    #[inline]
    pub fn case_extents(&self) -> [usize; 3] {
        let [ns, nt, nf, _] = self.values.extents();
        [ns, nt, nf]
    }

    /// Requested ensemble size.
    #[inline]
    pub fn num_members(&self) -> usize {
        self.values.extents()[3]
    }

    /// Total number of cases.
    #[inline]
    pub fn num_cases(&self) -> usize {
        self.filled.len()
    }

    /// One member's value.
    #[inline]
    pub fn value(
        &self,
        station: usize,
        time: usize,
        flt: usize,
        member: usize,
    ) -> Result<Optioned<f64>> {
        self.values.get(station, time, flt, member)
    }

    /// One member's origin, or none when the member is missing.
    pub fn source(
        &self,
        station: usize,
        time: usize,
        flt: usize,
        member: usize,
    ) -> Result<Option<MemberSource>> {
        let idx = self.values.offset(station, time, flt, member)?;
        Ok(self.sources[idx])
    }

    /// The members of one case, missing ones as NaN.
    pub fn members(&self, station: usize, time: usize, flt: usize) -> Result<&[f64]> {
        let start = self.values.offset(station, time, flt, 0)?;
        Ok(&self.values.as_slice()[start..start + self.num_members()])
    }

    /// Number of members found for a case.
    pub fn filled(&self, station: usize, time: usize, flt: usize) -> Result<usize> {
        let case = self.case_index(station, time, flt)?;
        Ok(self.filled[case])
    }

    /// True if a case has its full ensemble.
    pub fn is_complete(&self, station: usize, time: usize, flt: usize) -> Result<bool> {
        Ok(self.filled(station, time, flt)? == self.num_members())
    }

    /// Number of cases short of a full ensemble.
    pub fn count_incomplete(&self) -> usize {
        let num_members = self.num_members();
        self.filled.iter().filter(|&&n| n < num_members).count()
    }

    fn case_index(&self, station: usize, time: usize, flt: usize) -> Result<usize> {
        let [ns, nt, nf] = self.case_extents();
        if station >= ns || time >= nt || flt >= nf {
            return Err(AnEnError::OutOfRange {
                index: [station, time, flt, 0],
                extents: self.values.extents(),
            });
        }
        Ok((station * nt + time) * nf + flt)
    }
}
