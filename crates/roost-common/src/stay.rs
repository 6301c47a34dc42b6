//! Stay date ranges and the booking overlap test
//!
//! A stay is the half-open interval `[check_in, check_out)`: the guest
//! arrives on `check_in` and leaves on `check_out`, so a stay ending on a
//! given day never collides with one starting that same day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{INVALID_DATE_ORDER, RoostError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayRange {
    /// Build a range, rejecting empty and inverted stays.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, RoostError> {
        if check_in >= check_out {
            return Err(RoostError::bad_request(INVALID_DATE_ORDER));
        }

        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Number of nights; always at least one for a range built with `new`.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// `[s1,e1)` and `[s2,e2)` intersect iff `s1 < e2 && s2 < e1`.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// Three-clause form of [`StayRange::overlaps`] used as the storage
    /// filter: the existing stay straddles our start, straddles our end,
    /// or lies entirely inside us. Equivalent to `overlaps` for non-empty
    /// ranges.
    pub fn conflicts_with(&self, existing: &StayRange) -> bool {
        let straddles_start =
            existing.check_in <= self.check_in && existing.check_out > self.check_in;
        let straddles_end =
            existing.check_in < self.check_out && existing.check_out >= self.check_out;
        let contained = existing.check_in >= self.check_in && existing.check_out <= self.check_out;

        straddles_start || straddles_end || contained
    }

    pub fn starts_before(&self, day: NaiveDate) -> bool {
        self.check_in < day
    }
}

impl std::fmt::Display for StayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.check_in, self.check_out)
    }
}
