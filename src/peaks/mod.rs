//! # Peak Detection and Integration
//!
//! Three stages run per trace:
//!
//! 1. [`find_apexes`] locates local maxima whose topographic prominence
//!    reaches a configurable threshold.
//! 2. [`search_bounds`] walks outward from each apex until the smoothed
//!    signal flattens out or starts rising again (a co-eluting neighbour).
//! 3. [`integrate_peak`] takes the trapezoidal area between the bounds on a
//!    seconds axis and rounds it to integer counts.

mod apex;
mod bounds;
mod integrate;

use serde::{Deserialize, Serialize};

pub use apex::{find_apexes, local_maxima, peak_prominences};
pub use bounds::{search_bounds, BoundSearch, BoundSearchConfig, SearchSide, StopReason};
pub use integrate::{integrate_peak, trapezoid};

/// A detected peak: apex plus integration bounds, all indices into the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peak {
    /// Index of the local maximum
    pub apex_index: usize,
    /// First sample of the integration range
    pub left_index: usize,
    /// Last sample of the integration range
    pub right_index: usize,
}

impl Peak {
    /// Number of samples spanned by the bounds, apex included
    pub fn width(&self) -> usize {
        self.right_index - self.left_index + 1
    }

    /// True if `index` lies within the bounds
    pub fn contains(&self, index: usize) -> bool {
        (self.left_index..=self.right_index).contains(&index)
    }
}
