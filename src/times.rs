//! Time stamps and lead times, stored as integer offsets from an origin in a configurable unit.
//!
//! The same [`Times`] registry is used for forecast initialization times, observation times, and
//! forecast lead times (FLTs). Adding a lead time to a forecast time gives the valid time, which
//! can be looked up in the observation times when all three share a unit.
use crate::error::{AnEnError, Result};
use chrono::{Duration, NaiveDateTime};
use std::{
    collections::HashMap,
    ops::{Add, Sub},
};
use strum_macros::{Display, EnumIter, EnumString};

/// A time stamp or lead time, as a count of units since an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time(pub i64);

impl Time {
    /// Add a lead time, or `None` if the sum does not fit.
    ///
    /// ```rust
    /// use analog_ensemble::Time;
    ///
    /// assert_eq!(Time(24).checked_add(Time(6)), Some(Time(30)));
    /// assert_eq!(Time(i64::MAX).checked_add(Time(1)), None);
    /// ```
    #[inline]
    pub fn checked_add(self, rhs: Time) -> Option<Time> {
        self.0.checked_add(rhs.0).map(Time)
    }
}

// Saturates at the bounds of i64.
impl Add for Time {
    type Output = Time;

    #[inline]
    fn add(self, rhs: Time) -> Time {
        Time(self.0.saturating_add(rhs.0))
    }
}

// Saturates at the bounds of i64.
impl Sub for Time {
    type Output = Time;

    #[inline]
    fn sub(self, rhs: Time) -> Time {
        Time(self.0.saturating_sub(rhs.0))
    }
}

impl From<i64> for Time {
    fn from(val: i64) -> Self {
        Time(val)
    }
}

/// The unit of a [`Time`] offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TimeUnit {
    #[allow(missing_docs)]
    Seconds,
    #[allow(missing_docs)]
    Minutes,
    #[allow(missing_docs)]
    Hours,
    #[allow(missing_docs)]
    Days,
}

impl Default for TimeUnit {
    fn default() -> Self {
        TimeUnit::Seconds
    }
}

impl TimeUnit {
    /// Number of seconds in one unit.
    #[inline]
    pub fn seconds(self) -> i64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 3_600,
            TimeUnit::Days => 86_400,
        }
    }
}

/// An insertion ordered, duplicate rejecting list of times with lookup by value.
#[derive(Debug, Clone)]
pub struct Times {
    entries: Vec<Time>,
    by_value: HashMap<Time, usize>,
    unit: TimeUnit,
    origin: NaiveDateTime,
}

impl Default for Times {
    fn default() -> Self {
        Times {
            entries: vec![],
            by_value: HashMap::new(),
            unit: TimeUnit::default(),
            // The default naive date time is the UNIX epoch.
            origin: NaiveDateTime::default(),
        }
    }
}

impl Times {
    /// Create an empty registry counting seconds since the UNIX epoch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from values, failing on the first duplicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use analog_ensemble::{Time, Times, TimeUnit};
    ///
    /// let flts = Times::from_values(vec![0, 6, 12]).unwrap().with_unit(TimeUnit::Hours);
    /// assert_eq!(flts.index_of(Time(12)), Some(2));
    /// assert_eq!(flts.index_of(Time(3)), None);
    ///
    /// assert!(Times::from_values(vec![0, 0]).is_err());
    /// ```
    pub fn from_values<I, T>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        Time: From<T>,
    {
        let mut registry = Self::new();
        for val in values {
            registry.push(Time::from(val))?;
        }
        Ok(registry)
    }

    /// Builder method to set the unit of the stored offsets.
    #[inline]
    pub fn with_unit(mut self, unit: TimeUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Builder method to set the origin of the stored offsets.
    #[inline]
    pub fn with_origin(mut self, origin: NaiveDateTime) -> Self {
        self.origin = origin;
        self
    }

    /// The unit of the stored offsets.
    #[inline]
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// The origin of the stored offsets.
    #[inline]
    pub fn origin(&self) -> NaiveDateTime {
        self.origin
    }

    /// Append a time and return its index.
    pub fn push(&mut self, time: Time) -> Result<usize> {
        if self.by_value.contains_key(&time) {
            return Err(AnEnError::DuplicateEntry(format!("time {}", time.0)));
        }

        let idx = self.entries.len();
        self.by_value.insert(time, idx);
        self.entries.push(time);
        Ok(idx)
    }

    /// Append a calendar time, converted to an offset from the origin. The time must be a whole
    /// number of units from the origin.
    ///
    /// ```rust
    /// use analog_ensemble::{Time, Times, TimeUnit};
    /// use chrono::NaiveDate;
    ///
    /// let mut times = Times::new().with_unit(TimeUnit::Hours);
    /// let dt = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap().and_hms_opt(6, 0, 0).unwrap();
    /// times.push_datetime(dt).unwrap();
    /// assert_eq!(times.get(0), Some(Time(30)));
    /// assert_eq!(times.to_datetime(0).unwrap(), dt);
    ///
    /// let odd = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap().and_hms_opt(6, 30, 0).unwrap();
    /// assert!(times.push_datetime(odd).is_err());
    /// ```
    pub fn push_datetime(&mut self, datetime: NaiveDateTime) -> Result<usize> {
        let seconds = (datetime - self.origin).num_seconds();
        let per_unit = self.unit.seconds();
        if seconds % per_unit != 0 {
            return Err(AnEnError::invalid(format!(
                "{} is not a whole number of {} from {}",
                datetime, self.unit, self.origin
            )));
        }

        self.push(Time(seconds / per_unit))
    }

    /// Convert the time at an index to calendar time.
    pub fn to_datetime(&self, idx: usize) -> Result<NaiveDateTime> {
        let time = self.get(idx).ok_or(AnEnError::OutOfRange {
            index: [idx, 0, 0, 0],
            extents: [self.len(), 0, 0, 0],
        })?;

        time.0
            .checked_mul(self.unit.seconds())
            .and_then(Duration::try_seconds)
            .and_then(|offset| self.origin.checked_add_signed(offset))
            .ok_or_else(|| {
                AnEnError::invalid(format!(
                    "time {} {} from {} is not a representable date",
                    time.0, self.unit, self.origin
                ))
            })
    }

    /// The index of a time value, if registered.
    #[inline]
    pub fn index_of(&self, time: Time) -> Option<usize> {
        self.by_value.get(&time).copied()
    }

    /// The indices of several time values, failing on the first one that is not registered.
    pub fn indices_of(&self, times: &[Time]) -> Result<Vec<usize>> {
        times
            .iter()
            .map(|&t| {
                self.index_of(t)
                    .ok_or_else(|| AnEnError::NotRegistered(format!("time {}", t.0)))
            })
            .collect()
    }

    /// Get a time by index.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<Time> {
        self.entries.get(idx).copied()
    }

    /// Number of times.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no times.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Time> + '_ {
        self.entries.iter().copied()
    }

    /// True if offsets in both registries can be added and compared directly.
    pub fn same_frame(&self, other: &Times) -> bool {
        self.unit == other.unit && self.origin == other.origin
    }
}
