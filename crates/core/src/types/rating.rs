//! Review star rating.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a rating is outside `1..=5`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between {min} and {max}, got {value}", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingError {
    /// The rejected value.
    pub value: i64,
}

/// A whole-star review rating between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest allowed rating.
    pub const MIN: u8 = 1;
    /// Highest allowed rating.
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values outside `1..=5`.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError`] if `value` is out of range.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError { value })
    }

    /// The rating as a number of stars.
    #[must_use]
    pub const fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arithmetic mean of a set of ratings, `0.0` when there are none.
///
/// Product aggregates are recomputed from every stored review with this
/// function, so the stored average never drifts from the review list.
#[must_use]
pub fn mean_rating<I>(ratings: I) -> (u32, f64)
where
    I: IntoIterator<Item = Rating>,
{
    let (count, sum) = ratings
        .into_iter()
        .fold((0_u32, 0_u32), |(count, sum), r| (count + 1, sum + u32::from(r.0)));

    if count == 0 {
        (0, 0.0)
    } else {
        (count, f64::from(sum) / f64::from(count))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-1).is_err());
        assert_eq!(Rating::new(1).unwrap().stars(), 1);
        assert_eq!(Rating::new(5).unwrap().stars(), 5);
    }

    #[test]
    fn test_rating_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("4").is_ok());
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn test_mean_rating_of_five_three_four_is_four() {
        let ratings = [5, 3, 4].map(|r| Rating::new(r).unwrap());
        let (count, mean) = mean_rating(ratings);
        assert_eq!(count, 3);
        assert!((mean - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mean_rating_empty() {
        let (count, mean) = mean_rating(Vec::new());
        assert_eq!(count, 0);
        assert!(mean.abs() < f64::EPSILON);
    }
}
