//! A dense four dimensional array of `f64` with missing values.
//!
//! Storage is a single contiguous buffer in row major order over the four axes, so the last axis
//! varies fastest. Missing values are stored as NaN and surface as `Optioned<f64>` at the
//! accessors.
//!
//! Resizing always copies: a new buffer is allocated, the overlapping region is copied across,
//! and every new cell is missing.
use crate::error::{AnEnError, Result};
use optional::Optioned;

/// A dense four dimensional array.
#[derive(Debug, Clone)]
pub struct Array4D {
    data: Vec<f64>,
    extents: [usize; 4],
}

// Bitwise, so two missing values compare equal.
impl PartialEq for Array4D {
    fn eq(&self, other: &Self) -> bool {
        self.extents == other.extents
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Array4D {
    /// Create an array with every value missing. Every extent must be positive.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use analog_ensemble::Array4D;
    ///
    /// let arr = Array4D::new([2, 3, 4, 5]).unwrap();
    /// assert_eq!(arr.len(), 120);
    /// assert!(arr.get(1, 2, 3, 4).unwrap().is_none());
    /// assert!(arr.get(2, 0, 0, 0).is_err());
    ///
    /// assert!(Array4D::new([2, 0, 4, 5]).is_err());
    /// ```
    pub fn new(extents: [usize; 4]) -> Result<Self> {
        Self::check_extents(&extents)?;
        let len = extents.iter().product();

        Ok(Array4D {
            data: vec![std::f64::NAN; len],
            extents,
        })
    }

    /// Create an array from an existing row major buffer.
    pub fn from_vec(extents: [usize; 4], data: Vec<f64>) -> Result<Self> {
        Self::check_extents(&extents)?;
        let len: usize = extents.iter().product();
        if data.len() != len {
            return Err(AnEnError::DimensionMismatch {
                what: "array buffer length",
                expected: len,
                found: data.len(),
            });
        }

        Ok(Array4D { data, extents })
    }

    fn check_extents(extents: &[usize; 4]) -> Result<()> {
        if extents.iter().any(|&e| e == 0) {
            return Err(AnEnError::invalid(format!(
                "array extents must be positive, got {:?}",
                extents
            )));
        }
        Ok(())
    }

    /// The extents of the four axes.
    #[inline]
    pub fn extents(&self) -> [usize; 4] {
        self.extents
    }

    /// The extent of one axis, or none if there is no such axis.
    #[inline]
    pub fn extent(&self, axis: usize) -> Option<usize> {
        self.extents.get(axis).copied()
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false, extents are positive.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Position of an index tuple in the backing buffer, or `OutOfRange`.
    #[inline]
    pub fn offset(&self, i: usize, j: usize, k: usize, l: usize) -> Result<usize> {
        let [e0, e1, e2, e3] = self.extents;
        if i >= e0 || j >= e1 || k >= e2 || l >= e3 {
            return Err(AnEnError::OutOfRange {
                index: [i, j, k, l],
                extents: self.extents,
            });
        }
        Ok(((i * e1 + j) * e2 + k) * e3 + l)
    }

    // Callers have validated the index against the extents.
    #[inline]
    pub(crate) fn offset_unchecked(&self, i: usize, j: usize, k: usize, l: usize) -> usize {
        debug_assert!(self.offset(i, j, k, l).is_ok());
        let [_, e1, e2, e3] = self.extents;
        ((i * e1 + j) * e2 + k) * e3 + l
    }

    /// Get a value.
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize, l: usize) -> Result<Optioned<f64>> {
        let idx = self.offset(i, j, k, l)?;
        Ok(Optioned::from(self.data[idx]))
    }

    /// Raw value for the hot loops, NaN when missing. Indexes the buffer so it still panics rather
    /// than read out of bounds.
    #[inline]
    pub(crate) fn at(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        self.data[self.offset_unchecked(i, j, k, l)]
    }

    /// Set a value, or clear it by passing a missing value.
    ///
    /// ```rust
    /// use analog_ensemble::Array4D;
    /// use optional::{none, some};
    ///
    /// let mut arr = Array4D::new([1, 1, 2, 1]).unwrap();
    /// arr.set(0, 0, 1, 0, 3.5).unwrap();
    /// assert_eq!(arr.get(0, 0, 1, 0).unwrap(), some(3.5));
    /// arr.set(0, 0, 1, 0, none()).unwrap();
    /// assert!(arr.get(0, 0, 1, 0).unwrap().is_none());
    /// ```
    #[inline]
    pub fn set<T>(&mut self, i: usize, j: usize, k: usize, l: usize, value: T) -> Result<()>
    where
        Optioned<f64>: From<T>,
    {
        let idx = self.offset(i, j, k, l)?;
        let value: Optioned<f64> = Optioned::from(value);
        self.data[idx] = value.into_option().unwrap_or(std::f64::NAN);
        Ok(())
    }

    /// The contiguous backing buffer, missing values are NaN.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// The contiguous backing buffer for bulk writes, missing values are NaN.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consume the array and take its buffer.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Set every cell to the same value.
    pub fn fill<T>(&mut self, value: T)
    where
        Optioned<f64>: From<T>,
    {
        let value: Optioned<f64> = Optioned::from(value);
        let raw = value.into_option().unwrap_or(std::f64::NAN);
        self.data.iter_mut().for_each(|v| *v = raw);
    }

    /// Resize by copying into a new buffer. Values in the overlap of the old and new extents
    /// keep their index, new cells are missing.
    ///
    /// ```rust
    /// use analog_ensemble::Array4D;
    /// use optional::some;
    ///
    /// let mut arr = Array4D::new([2, 2, 2, 2]).unwrap();
    /// arr.set(1, 1, 1, 1, 7.0).unwrap();
    /// arr.set(0, 1, 0, 1, 3.0).unwrap();
    ///
    /// arr.resize([1, 3, 2, 2]).unwrap();
    /// assert_eq!(arr.get(0, 1, 0, 1).unwrap(), some(3.0));
    /// assert!(arr.get(0, 2, 0, 0).unwrap().is_none());
    /// assert!(arr.get(1, 1, 1, 1).is_err());
    /// ```
    pub fn resize(&mut self, extents: [usize; 4]) -> Result<()> {
        let mut fresh = Array4D::new(extents)?;

        let overlap = [
            self.extents[0].min(extents[0]),
            self.extents[1].min(extents[1]),
            self.extents[2].min(extents[2]),
            self.extents[3].min(extents[3]),
        ];

        for i in 0..overlap[0] {
            for j in 0..overlap[1] {
                for k in 0..overlap[2] {
                    let src = self.offset_unchecked(i, j, k, 0);
                    let dst = fresh.offset_unchecked(i, j, k, 0);
                    fresh.data[dst..dst + overlap[3]]
                        .copy_from_slice(&self.data[src..src + overlap[3]]);
                }
            }
        }

        *self = fresh;
        Ok(())
    }

    /// Number of missing values.
    pub fn count_missing(&self) -> usize {
        self.data.iter().filter(|v| v.is_nan()).count()
    }
}
