//! Read-only diagnostics over finished state or output sequences

/// Normalized autocorrelation of a sequence at every lag >= 0.
///
/// Centered cross-correlation divided by the variance and by the shrinking
/// overlap count at each lag, so lag 0 is normalized to 1. A constant
/// sequence is perfectly correlated with itself at every lag.
pub fn autocorrelation(series: &[f64]) -> Vec<f64> {
    let n = series.len();
    if n == 0 {
        return Vec::new();
    }

    let mean = series.iter().sum::<f64>() / n as f64;
    let variance = series.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
    if variance == 0.0 {
        return vec![1.0; n];
    }

    let centered: Vec<f64> = series.iter().map(|v| v - mean).collect();
    (0..n)
        .map(|lag| {
            let correlation: f64 =
                (0..n - lag).map(|t| centered[t] * centered[t + lag]).sum();
            correlation / (variance * (n - lag) as f64)
        })
        .collect()
}

/// Periodicity search by sliding-window differences.
///
/// Takes the first `window` samples as the reference and slides a window of
/// the same length across the rest of the sequence, summing absolute
/// differences at each offset. Returns the offset of minimum difference (the
/// candidate period, ties resolved to the earliest offset) together with the
/// full difference profile.
///
/// Returns `None` when the sequence is too short to slide the window at
/// least once.
pub fn sliding_window_difference(series: &[f64], window: usize) -> Option<(usize, Vec<f64>)> {
    if window == 0 || series.len() <= 2 * window {
        return None;
    }

    let reference = &series[..window];
    let mut differences = Vec::with_capacity(series.len() - 2 * window);
    for offset in window..series.len() - window {
        let difference: f64 = reference
            .iter()
            .zip(&series[offset..offset + window])
            .map(|(a, b)| (a - b).abs())
            .sum();
        differences.push(difference);
    }

    let mut argmin = 0;
    for (i, difference) in differences.iter().enumerate() {
        if *difference < differences[argmin] {
            argmin = i;
        }
    }

    Some((argmin + window, differences))
}

#[cfg(test)]
mod tests {
    use round::round;

    use super::*;

    #[test]
    fn autocorrelation_of_sine_peaks_at_the_period() {
        let period = 25;
        let series: Vec<f64> = (0..400)
            .map(|t| (std::f64::consts::TAU * t as f64 / period as f64).sin())
            .collect();

        let r = autocorrelation(&series);
        assert_eq!(r.len(), 400);
        assert_eq!(round(r[0], 9), 1.0);
        assert!((r[period] - 1.0).abs() < 0.05, "r[{}]: {}", period, r[period]);
        // a local maximum relative to the half period
        assert!(r[period] > r[period / 2]);
    }

    #[test]
    fn autocorrelation_of_constant_sequence() {
        let r = autocorrelation(&[3.0; 10]);
        assert_eq!(r, vec![1.0; 10]);
    }

    #[test]
    fn autocorrelation_of_empty_sequence() {
        assert!(autocorrelation(&[]).is_empty());
    }

    #[test]
    fn tiled_pattern_is_detected_at_its_period() {
        let pattern = [0.0, 1.0, 2.0, 3.0, 4.0, 3.0, 2.0, 1.0];
        let series: Vec<f64> = pattern.iter().cycle().take(80).cloned().collect();

        let (offset, differences) = sliding_window_difference(&series, pattern.len()).unwrap();
        assert_eq!(offset, pattern.len());
        assert_eq!(differences[0], 0.0);
        assert_eq!(differences.len(), 80 - 2 * pattern.len());
    }

    #[test]
    fn too_short_sequence_has_no_period() {
        assert!(sliding_window_difference(&[1.0, 2.0, 3.0], 2).is_none());
        assert!(sliding_window_difference(&[1.0, 2.0, 3.0], 0).is_none());
    }
}
