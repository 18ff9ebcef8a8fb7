use serde::{Deserialize, Serialize};

use super::Peak;

/// Configuration for the integration-bound search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundSearchConfig {
    /// Number of samples averaged ahead of the scan position
    pub window: usize,

    /// Stopping tolerance in percent. Halved and converted to a fraction
    /// (`tolerance_percent / 200`) before use.
    pub tolerance_percent: f64,
}

impl Default for BoundSearchConfig {
    fn default() -> Self {
        Self {
            window: 10,
            tolerance_percent: 0.5,
        }
    }
}

impl BoundSearchConfig {
    /// Fractional tolerance applied to the current sample
    pub fn relative_tolerance(&self) -> f64 {
        self.tolerance_percent / 200.0
    }
}

/// Direction of a one-sided search from the apex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSide {
    /// Toward decreasing index
    Left,
    /// Toward increasing index
    Right,
}

/// Why a one-sided search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Sample and trailing average agree within tolerance
    Flattened,
    /// Trailing average stopped decreasing: a neighbouring peak begins
    TrendReversal,
    /// Ran out of samples before either criterion triggered
    EdgeReached,
}

/// Bounds for one apex plus how each side terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundSearch {
    /// Apex with its integration bounds
    pub peak: Peak,
    /// Termination of the leftward search
    pub left_stop: StopReason,
    /// Termination of the rightward search
    pub right_stop: StopReason,
}

impl BoundSearch {
    /// Sides on which the search hit the end of the signal
    pub fn edge_sides(&self) -> Vec<SearchSide> {
        let mut sides = Vec::new();
        if self.left_stop == StopReason::EdgeReached {
            sides.push(SearchSide::Left);
        }
        if self.right_stop == StopReason::EdgeReached {
            sides.push(SearchSide::Right);
        }
        sides
    }
}

/// Find left and right integration bounds around `apex`.
///
/// Both sides run the same scan: starting at the apex and moving outward,
/// stop when the sample is within tolerance of the average of the next
/// `window` samples, when that average stops decreasing, or when the signal
/// ends. The bound is the last sample visited before the stop.
///
/// # Panics
///
/// Panics if `apex` is not a valid index into `signal`.
pub fn search_bounds(signal: &[f64], apex: usize, config: &BoundSearchConfig) -> BoundSearch {
    let leftward: Vec<f64> = signal[..=apex].iter().rev().copied().collect();
    let (left_offset, left_stop) = half_search(&leftward, config);
    let (right_offset, right_stop) = half_search(&signal[apex..], config);

    BoundSearch {
        peak: Peak {
            apex_index: apex,
            left_index: apex - left_offset,
            right_index: apex + right_offset,
        },
        left_stop,
        right_stop,
    }
}

/// Scan `samples` (apex first) and return the stop offset and reason.
///
/// The trend reference starts at +infinity, so the first step never counts as
/// a reversal. On a signal whose first window mean is zero or negative the scan
/// therefore keeps walking outward instead of stopping at the apex.
fn half_search(samples: &[f64], config: &BoundSearchConfig) -> (usize, StopReason) {
    let limit = samples.len();
    if limit == 0 {
        return (0, StopReason::EdgeReached);
    }
    let tolerance = config.relative_tolerance();
    let width = config.window.max(1);

    let mut index = 1;
    let mut sig = samples[0];
    let mut edge = window_mean(samples, 0, width);
    let mut old_edge = f64::INFINITY;

    let reason = loop {
        if index >= limit {
            break StopReason::EdgeReached;
        }
        if (sig - edge).abs() <= sig * tolerance {
            break StopReason::Flattened;
        }
        if edge >= old_edge {
            break StopReason::TrendReversal;
        }
        old_edge = edge;
        sig = samples[index];
        edge = window_mean(samples, index, width);
        index += 1;
    };

    (index - 1, reason)
}

/// Mean of up to `width` samples starting at `start`, fewer near the end
fn window_mean(samples: &[f64], start: usize, width: usize) -> f64 {
    let end = (start + width).min(samples.len());
    let window = &samples[start..end];
    window.iter().sum::<f64>() / window.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaussian(len: usize, center: f64, sigma: f64, height: f64) -> Vec<f64> {
        (0..len)
            .map(|i| height * (-0.5 * ((i as f64 - center) / sigma).powi(2)).exp())
            .collect()
    }

    #[test]
    fn test_relative_tolerance_scaling() {
        assert_eq!(BoundSearchConfig::default().relative_tolerance(), 0.0025);
    }

    #[test]
    fn test_window_mean_truncates_at_end() {
        let samples = [4.0, 2.0, 6.0];
        assert_eq!(window_mean(&samples, 0, 10), 4.0);
        assert_eq!(window_mean(&samples, 1, 10), 4.0);
        assert_eq!(window_mean(&samples, 2, 10), 6.0);
        assert_eq!(window_mean(&samples, 0, 2), 3.0);
    }

    #[test]
    fn test_negative_signal_keeps_walking() {
        let samples = [-1.0, -2.0, -3.0, -4.0, -5.0];
        let config = BoundSearchConfig {
            window: 2,
            ..Default::default()
        };
        assert_eq!(half_search(&samples, &config), (4, StopReason::EdgeReached));

        let zeros = [0.0, -1.0, -2.0];
        let (offset, _) = half_search(&zeros, &config);
        assert!(offset > 0);
    }

    #[test]
    fn test_spike_at_start() {
        let mut signal = vec![0.0; 30];
        signal[0] = 10.0;
        let search = search_bounds(&signal, 0, &BoundSearchConfig::default());

        assert_eq!(search.peak.left_index, 0);
        assert_eq!(search.left_stop, StopReason::EdgeReached);
        assert_eq!(search.peak.right_index, 1);
        assert_eq!(search.right_stop, StopReason::Flattened);
        assert_eq!(search.edge_sides(), vec![SearchSide::Left]);
    }

    #[test]
    fn test_spike_at_end() {
        let mut signal = vec![0.0; 30];
        signal[29] = 10.0;
        let search = search_bounds(&signal, 29, &BoundSearchConfig::default());

        assert_eq!(search.peak.right_index, 29);
        assert_eq!(search.right_stop, StopReason::EdgeReached);
        assert_eq!(search.peak.left_index, 28);
        assert_eq!(search.edge_sides(), vec![SearchSide::Right]);
    }

    #[test]
    fn test_single_sample_signal() {
        let search = search_bounds(&[3.0], 0, &BoundSearchConfig::default());
        assert_eq!(
            search.peak,
            Peak {
                apex_index: 0,
                left_index: 0,
                right_index: 0
            }
        );
        assert_eq!(search.edge_sides(), vec![SearchSide::Left, SearchSide::Right]);
    }

    #[test]
    fn test_symmetric_peak_has_symmetric_bounds() {
        let mut signal = gaussian(201, 100.0, 5.0, 20.0);
        // Flat floor so the scan settles instead of chasing the tail
        for value in signal.iter_mut() {
            *value = value.max(0.05);
        }
        let search = search_bounds(&signal, 100, &BoundSearchConfig::default());
        let peak = search.peak;

        assert_eq!(100 - peak.left_index, peak.right_index - 100);
        assert!(peak.left_index > 0 && peak.right_index < 200);
        assert!(peak.width() > 20);
        assert_eq!(search.left_stop, search.right_stop);
        assert!(search.edge_sides().is_empty());
    }

    #[test]
    fn test_coeluting_peaks_split_at_valley() {
        let mut signal = gaussian(250, 100.0, 5.0, 20.0);
        for (s, p) in signal.iter_mut().zip(gaussian(250, 125.0, 5.0, 15.0)) {
            *s += p;
        }
        let config = BoundSearchConfig::default();

        let first = search_bounds(&signal, 100, &config);
        assert_eq!(first.right_stop, StopReason::TrendReversal);
        assert!(first.peak.right_index > 100 && first.peak.right_index < 125);

        let second = search_bounds(&signal, 125, &config);
        assert_eq!(second.left_stop, StopReason::TrendReversal);
        assert!(second.peak.left_index > 100 && second.peak.left_index < 125);
    }

    #[test]
    fn test_bounds_respect_invariant() {
        let signal: Vec<f64> = (0..120)
            .map(|i| ((i as f64) * 0.3).sin().abs() * 10.0)
            .collect();
        for apex in 0..signal.len() {
            let peak = search_bounds(&signal, apex, &BoundSearchConfig::default()).peak;
            assert!(peak.left_index <= peak.apex_index);
            assert!(peak.apex_index <= peak.right_index);
            assert!(peak.right_index < signal.len());
        }
    }
}
