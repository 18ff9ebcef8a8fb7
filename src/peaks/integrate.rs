use super::Peak;

/// Seconds per minute; areas are reported in signal x seconds
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Trapezoidal integral of `y` over `x`
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
        .sum()
}

/// Integrated counts for `peak` over samples `left_index..right_index`.
///
/// `time` is in minutes and converted to seconds. The area is rounded to the
/// nearest integer (ties to even). A result of 0 is reported as 1 so that a
/// detected peak always carries a non-zero count into calibration.
pub fn integrate_peak(time: &[f64], signal: &[f64], peak: &Peak) -> i64 {
    let end = peak.right_index.min(signal.len()).min(time.len());
    let range = peak.left_index.min(end)..end;
    let seconds: Vec<f64> = time[range.clone()]
        .iter()
        .map(|t| t * SECONDS_PER_MINUTE)
        .collect();
    let area = trapezoid(&seconds, &signal[range]).round_ties_even();

    if area == 0.0 {
        1
    } else {
        area as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(left_index: usize, apex_index: usize, right_index: usize) -> Peak {
        Peak {
            apex_index,
            left_index,
            right_index,
        }
    }

    #[test]
    fn test_trapezoid() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 10.0, 10.0, 0.0];
        assert!((trapezoid(&x, &y) - 20.0).abs() < 1e-12);
        assert_eq!(trapezoid(&[1.0], &[5.0]), 0.0);
    }

    #[test]
    fn test_right_bound_is_exclusive() {
        // One sample per second
        let time: Vec<f64> = (0..5).map(|i| i as f64 / 60.0).collect();
        let signal = [0.0, 10.0, 10.0, 0.0, 100.0];
        assert_eq!(integrate_peak(&time, &signal, &peak(0, 1, 4)), 20);
        assert_eq!(integrate_peak(&time, &signal, &peak(0, 1, 3)), 15);
    }

    #[test]
    fn test_zero_area_reported_as_one() {
        let time: Vec<f64> = (0..5).map(|i| i as f64 / 60.0).collect();
        let signal = [0.0, 0.2, 0.0, 0.0, 0.0];
        // Area 0.2 rounds to 0
        assert_eq!(integrate_peak(&time, &signal, &peak(0, 1, 3)), 1);
        // Degenerate bounds integrate nothing
        assert_eq!(integrate_peak(&time, &signal, &peak(1, 1, 1)), 1);
        assert_eq!(integrate_peak(&time, &signal, &peak(1, 1, 2)), 1);
    }

    #[test]
    fn test_rounding() {
        let time: Vec<f64> = (0..4).map(|i| i as f64 / 60.0).collect();
        assert_eq!(integrate_peak(&time, &[1.0, 2.2, 0.0, 0.0], &peak(0, 1, 3)), 3);
        assert_eq!(integrate_peak(&time, &[1.0, 1.8, 0.0, 0.0], &peak(0, 1, 3)), 2);
    }

    #[test]
    fn test_minutes_scaled_to_seconds() {
        // 5 samples per second, constant signal of 2 V for 1 s
        let time: Vec<f64> = (0..7).map(|i| i as f64 / 300.0).collect();
        let signal = [2.0; 7];
        assert_eq!(integrate_peak(&time, &signal, &peak(0, 2, 6)), 2);
    }
}
