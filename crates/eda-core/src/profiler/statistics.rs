//! Statistical helpers for column profiling.

/// Basic moments of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct NumericMoments {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std_dev: Option<f64>,
}

/// Compute min, max, mean and sample standard deviation.
///
/// Returns `None` for an empty slice.
pub(crate) fn numeric_moments(values: &[f64]) -> Option<NumericMoments> {
    if values.is_empty() {
        return None;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    Some(NumericMoments {
        min,
        max,
        mean,
        std_dev: calculate_std(values, mean),
    })
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn calculate_std(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}

/// Pearson correlation over the rows where both sides are present.
///
/// `None` with fewer than two complete pairs or when either side has zero
/// variance over those pairs.
pub(crate) fn pearson_pairwise(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    let n = pairs.len();
    if n < 2 {
        return None;
    }

    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }

    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Bit pattern used to compare floats for distinctness; `-0.0` and `0.0`
/// are the same value.
#[inline]
pub(crate) fn distinct_key(value: f64) -> u64 {
    if value == 0.0 { 0.0f64 } else { value }.to_bits()
}
