//! Running statistics shared by the cost metrics and flatness checks.

/// Variance below this is treated as a flat (textureless) signal.
pub(crate) const VARIANCE_EPS: f64 = 1e-12;

/// Population variance of a sequence of intensities.
///
/// Returns `0.0` for an empty sequence.
pub(crate) fn variance<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut count = 0usize;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for v in values {
        count += 1;
        sum += v;
        sum_sq += v * v;
    }
    if count == 0 {
        return 0.0;
    }
    let n = count as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

/// Zero-mean normalized cross-correlation turned into a dissimilarity.
///
/// Returns `1 - zncc` so lower is better, in `[0, 2]`. When both sides are
/// flat the pair is treated as a perfect match; when only one side is flat
/// the pair is uncorrelated and scores `1`.
pub(crate) fn zncc_dissimilarity<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut count = 0usize;
    let mut sum_a = 0.0f64;
    let mut sum_b = 0.0f64;
    let mut sum_aa = 0.0f64;
    let mut sum_bb = 0.0f64;
    let mut sum_ab = 0.0f64;
    for (a, b) in pairs {
        count += 1;
        sum_a += a;
        sum_b += b;
        sum_aa += a * a;
        sum_bb += b * b;
        sum_ab += a * b;
    }
    if count == 0 {
        return 1.0;
    }

    let n = count as f64;
    let var_a = sum_aa - sum_a * sum_a / n;
    let var_b = sum_bb - sum_b * sum_b / n;
    let flat_a = var_a <= VARIANCE_EPS * n;
    let flat_b = var_b <= VARIANCE_EPS * n;
    match (flat_a, flat_b) {
        (true, true) => 0.0,
        (true, false) | (false, true) => 1.0,
        (false, false) => {
            let cov = sum_ab - sum_a * sum_b / n;
            let zncc = cov / (var_a * var_b).sqrt();
            if zncc.is_finite() {
                (1.0 - zncc).clamp(0.0, 2.0)
            } else {
                1.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{variance, zncc_dissimilarity};

    #[test]
    fn variance_of_known_sequence() {
        let v = variance([0.0, 1.0, 2.0, 3.0]);
        assert!((v - 1.25).abs() < 1e-12);
        assert_eq!(variance(std::iter::empty()), 0.0);
    }

    #[test]
    fn zncc_is_invariant_to_gain_and_offset() {
        let a = [3.0, 7.0, 1.0, 9.0, 4.0];
        let pairs = a.iter().map(|&v| (v, 2.5 * v + 40.0));
        assert!(zncc_dissimilarity(pairs) < 1e-12);
    }

    #[test]
    fn zncc_flat_sides() {
        assert_eq!(zncc_dissimilarity([(5.0, 5.0), (5.0, 5.0)]), 0.0);
        assert_eq!(zncc_dissimilarity([(5.0, 1.0), (5.0, 2.0)]), 1.0);
    }

    #[test]
    fn zncc_anticorrelated_scores_two() {
        let pairs = [(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)];
        assert!((zncc_dissimilarity(pairs) - 2.0).abs() < 1e-12);
    }
}
