//! Small numeric helpers shared by the statistics and the similarity metric.
use crate::keys::Variance;
use optional::{none, some, Optioned};

/// The full range of a circular quantity, in degrees.
pub const CIRCULAR_RANGE: f64 = 360.0;

// Yamartino's best estimator constant, 2 / sqrt(3) - 1.
const YAMARTINO: f64 = 0.1547;

/// The absolute difference between two angles in degrees, taking the short way around the
/// circle. The result is always in `[0, 180]` and symmetric in its arguments.
///
/// ```rust
/// use analog_ensemble::fold_circular;
///
/// assert_eq!(fold_circular(359.0, 1.0), 2.0);
/// assert_eq!(fold_circular(1.0, 359.0), 2.0);
/// assert_eq!(fold_circular(90.0, 270.0), 180.0);
/// ```
#[inline]
pub fn fold_circular(a: f64, b: f64) -> f64 {
    let d = (a - b).abs().rem_euclid(CIRCULAR_RANGE);
    d.min(CIRCULAR_RANGE - d)
}

/// Mean of the non-missing values, or none if nothing is valid.
pub(crate) fn mean<I>(values: I) -> Optioned<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        none()
    } else {
        some(sum / count as f64)
    }
}

/// Standard deviation of a linear quantity. Missing values are skipped. Fewer than two valid
/// samples leave the statistic undefined.
pub(crate) fn sd_linear(values: &[f64], variance: Variance) -> Optioned<f64> {
    let avg = match mean(values.iter().cloned()).into_option() {
        Some(avg) => avg,
        None => return none(),
    };

    let (sum_sq, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| {
            (sum + (v - avg) * (v - avg), count + 1)
        });

    if count < 2 {
        return none();
    }

    let denominator = match variance {
        Variance::Sample => count as f64 - 1.0,
        Variance::Population => count as f64,
    };

    some((sum_sq / denominator).sqrt())
}

/// Standard deviation of angles in degrees using the Yamartino estimator. Missing values are
/// skipped. Fewer than two valid samples leave the statistic undefined.
pub(crate) fn sd_circular(degrees: &[f64]) -> Optioned<f64> {
    let valid = degrees.iter().filter(|v| !v.is_nan()).count();
    if valid < 2 {
        return none();
    }

    let radians = || {
        degrees
            .iter()
            .filter(|v| !v.is_nan())
            .map(|d| d.to_radians())
    };

    let s = mean(radians().map(f64::sin)).unpack();
    let c = mean(radians().map(f64::cos)).unpack();

    // Rounding can push this a hair below zero for identical angles.
    let e = (1.0 - (s * s + c * c)).max(0.0).sqrt();
    let q = e.asin() * (1.0 + YAMARTINO * e.powi(3));

    some(q.to_degrees())
}

#[cfg(test)]
pub mod test_tools {
    pub fn approx_equal(val1: f64, val2: f64, eps: f64) -> bool {
        assert!(eps > 0.0);

        (val1 - val2).abs() < eps
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utility::test_tools::*;
    use std::f64::NAN;

    #[test]
    fn test_fold_circular() {
        assert!(approx_equal(fold_circular(359.0, 1.0), 2.0, 1.0e-12));
        assert!(approx_equal(fold_circular(1.0, 359.0), 2.0, 1.0e-12));
        assert!(approx_equal(fold_circular(10.0, 350.0), 20.0, 1.0e-12));
        assert!(approx_equal(fold_circular(0.0, 180.0), 180.0, 1.0e-12));
        assert!(approx_equal(fold_circular(720.0, 5.0), 5.0, 1.0e-12));
        assert!(approx_equal(fold_circular(45.0, 45.0), 0.0, 1.0e-12));
    }

    #[test]
    fn test_mean_skips_missing() {
        assert!(approx_equal(
            mean(vec![1.0, NAN, 3.0]).unpack(),
            2.0,
            1.0e-12
        ));
        assert!(mean(vec![NAN, NAN]).is_none());
        assert!(mean(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn test_sd_linear() {
        let vals = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx_equal(
            sd_linear(&vals, Variance::Population).unpack(),
            2.0,
            1.0e-12
        ));
        assert!(approx_equal(
            sd_linear(&vals, Variance::Sample).unpack(),
            (32.0f64 / 7.0).sqrt(),
            1.0e-12
        ));

        assert!(sd_linear(&[1.0], Variance::Sample).is_none());
        assert!(sd_linear(&[1.0, NAN, NAN], Variance::Sample).is_none());
        assert!(sd_linear(&[NAN, 1.0, NAN, 3.0], Variance::Sample).is_some());
    }

    #[test]
    fn test_sd_circular() {
        // Identical directions have no spread, even across north.
        assert!(approx_equal(
            sd_circular(&[10.0, 10.0, 10.0]).unpack(),
            0.0,
            1.0e-5
        ));

        // Directions straddling north spread like directions straddling south.
        let north = sd_circular(&[350.0, 10.0, 355.0, 5.0]).unpack();
        let south = sd_circular(&[170.0, 190.0, 175.0, 185.0]).unpack();
        assert!(approx_equal(north, south, 1.0e-9));
        assert!(north > 0.0 && north < 20.0);

        assert!(sd_circular(&[10.0, NAN]).is_none());
    }
}
