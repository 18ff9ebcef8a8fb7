/// Indices of all local maxima, flat tops reported at their (lower) midpoint.
///
/// The first and last samples are never maxima. A plateau counts only if the
/// samples on both sides of it are strictly lower.
pub fn local_maxima(signal: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if signal.len() < 3 {
        return maxima;
    }
    let last = signal.len() - 1;

    let mut i = 1;
    while i < last {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < last && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}

/// Topographic prominence of each peak in `peaks`.
///
/// From the apex, extend left and right until a strictly higher sample or the
/// array edge; the prominence is the apex height above the higher of the two
/// minima found on the way.
pub fn peak_prominences(signal: &[f64], peaks: &[usize]) -> Vec<f64> {
    peaks
        .iter()
        .map(|&peak| {
            let height = signal[peak];

            let mut left_min = height;
            for &value in signal[..=peak].iter().rev() {
                if value > height {
                    break;
                }
                left_min = left_min.min(value);
            }

            let mut right_min = height;
            for &value in &signal[peak..] {
                if value > height {
                    break;
                }
                right_min = right_min.min(value);
            }

            height - left_min.max(right_min)
        })
        .collect()
}

/// Apex indices, ascending, of maxima with prominence at least `min_prominence`
pub fn find_apexes(signal: &[f64], min_prominence: f64) -> Vec<usize> {
    let maxima = local_maxima(signal);
    let prominences = peak_prominences(signal, &maxima);
    maxima
        .into_iter()
        .zip(prominences)
        .filter(|(_, prominence)| *prominence >= min_prominence)
        .map(|(index, _)| index)
        .collect()
}
