//! # Baseline Corrector
//!
//! Removes slowly varying detector drift with a white tophat filter: the
//! signal minus its morphological opening (erosion followed by dilation) with
//! a flat structuring element spanning a fixed fraction of the trace.
//!
//! Features narrower than the structuring element survive; anything broader,
//! such as a drifting baseline, is subtracted. Boundaries are handled by
//! half-sample reflection (`d c b a | a b c d | d c b a`).

use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

/// Configuration for baseline correction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// Structuring element length as a fraction of the trace length
    pub structuring_fraction: f64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            structuring_fraction: 0.1,
        }
    }
}

impl BaselineConfig {
    /// Structuring element length for a trace of `len` samples, at least 1
    pub fn structuring_length(&self, len: usize) -> usize {
        let length = (len as f64 * self.structuring_fraction).round_ties_even();
        if length.is_finite() && length >= 1.0 {
            (length as usize).min(len.max(1))
        } else {
            1
        }
    }
}

/// Subtract the baseline from `signal`, returning a new array of the same length.
pub fn correct_baseline(signal: &[f64], config: &BaselineConfig) -> Vec<f64> {
    let length = config.structuring_length(signal.len());
    debug!(
        "Tophat baseline correction over {} samples with a {}-sample element",
        signal.len(),
        length
    );
    tophat(signal, length)
}

/// White tophat: `signal - opening(signal)` with a flat element of `length` samples.
pub fn tophat(signal: &[f64], length: usize) -> Vec<f64> {
    let opened = opening(signal, length);
    signal.iter().zip(&opened).map(|(x, o)| x - o).collect()
}

/// Morphological opening: erosion then dilation with the same flat element.
pub fn opening(signal: &[f64], length: usize) -> Vec<f64> {
    let length = length.max(1);
    let half = length / 2;
    // For even lengths the dilation window is mirrored so that the opening
    // never exceeds the input.
    let eroded = sliding_extreme(signal, half, length - 1 - half, Extreme::Min);
    sliding_extreme(&eroded, length - 1 - half, half, Extreme::Max)
}

#[derive(Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

impl Extreme {
    /// True if `a` dominates `b` so `b` can never be the window extreme again
    fn dominates(self, a: f64, b: f64) -> bool {
        match self {
            Extreme::Min => a <= b,
            Extreme::Max => a >= b,
        }
    }
}

/// Extreme of `values[i - before ..= i + after]` for every `i`, reflecting at the edges.
fn sliding_extreme(values: &[f64], before: usize, after: usize, extreme: Extreme) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let padded: Vec<f64> = (0..before + n + after)
        .map(|p| values[reflect(p as isize - before as isize, n)])
        .collect();
    let window = before + after + 1;

    let mut out = Vec::with_capacity(n);
    let mut candidates: VecDeque<usize> = VecDeque::with_capacity(window);
    for (p, &value) in padded.iter().enumerate() {
        while candidates
            .back()
            .is_some_and(|&q| extreme.dominates(value, padded[q]))
        {
            candidates.pop_back();
        }
        candidates.push_back(p);

        if p + 1 >= window {
            let start = p + 1 - window;
            while candidates.front().is_some_and(|&q| q < start) {
                candidates.pop_front();
            }
            if let Some(&q) = candidates.front() {
                out.push(padded[q]);
            }
        }
    }
    out
}

/// Half-sample symmetric index into `0..n`
fn reflect(index: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let folded = index.rem_euclid(period);
    if folded >= n {
        (period - 1 - folded) as usize
    } else {
        folded as usize
    }
}
