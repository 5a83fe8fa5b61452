use crate::{
    engine::AnalogSearch,
    error::{AnEnError, Result},
    stations::Stations,
};

/// Search each test station's own history only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Independent;

impl AnalogSearch for Independent {
    fn search_stations(
        &self,
        stations: &Stations,
        test_station: usize,
    ) -> Result<Vec<(usize, f64)>> {
        if test_station >= stations.len() {
            return Err(AnEnError::OutOfRange {
                index: [test_station, 0, 0, 0],
                extents: [stations.len(), 0, 0, 0],
            });
        }

        Ok(vec![(test_station, 0.0)])
    }

    #[inline]
    fn member_station(&self, test_station: usize, _search_station: usize) -> usize {
        test_station
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stations::Station;

    #[test]
    fn test_own_station_only() {
        let stns = Stations::from_stations(vec![Station::new("a"), Station::new("b")]).unwrap();
        assert_eq!(Independent.search_stations(&stns, 1).unwrap(), vec![(1, 0.0)]);
        assert!(Independent.search_stations(&stns, 2).is_err());
        assert_eq!(Independent.member_station(1, 0), 1);
        assert_eq!(Independent.adjust_score(2.5, 10.0), 2.5);
    }
}
