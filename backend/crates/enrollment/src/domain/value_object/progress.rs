//! Course progress in percent

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EnrollmentError, EnrollmentResult};

/// Percentage in `0.0..=100.0`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Progress(f64);

impl Progress {
    pub const ZERO: Progress = Progress(0.0);
    pub const COMPLETE: Progress = Progress(100.0);

    pub fn new(value: f64) -> EnrollmentResult<Self> {
        if !(0.0..=100.0).contains(&value) {
            // NaN fails the range check too
            return Err(EnrollmentError::Validation(format!(
                "Progress must be between 0 and 100 (got {value})"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_complete(&self) -> bool {
        self.0 >= 100.0
    }
}

impl TryFrom<f64> for Progress {
    type Error = EnrollmentError;

    fn try_from(value: f64) -> EnrollmentResult<Self> {
        Progress::new(value)
    }
}

impl From<Progress> for f64 {
    fn from(progress: Progress) -> Self {
        progress.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}
