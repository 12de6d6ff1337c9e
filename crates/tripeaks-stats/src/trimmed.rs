//! Trimmed statistics for small, outlier-prone samples.
//!
//! A cohort of simulated runs frequently contains a handful of degenerate
//! playthroughs (instant wins, parse failures scored as zero) that would dominate
//! a plain mean. [`TrimmedStats`] discards a fixed percentage of the sorted values
//! from each tail before computing mean, population variance and the coefficient
//! of variation.
//!
//! # Rules
//!
//! - `n == 0`: no statistics (`None`); callers must treat this as insufficient data
//! - `n < 5`: no trimming, raw mean and population variance
//! - `n >= 5`: drop `floor(n * p / 100)` values from each end, clamped so that at
//!   least one value always remains
//! - `cv = sqrt(variance) / mean` when `mean > 0`, otherwise `0`

use serde::{Deserialize, Serialize};

use crate::descriptive::mean_and_population_variance;

/// Samples smaller than this are never trimmed.
pub const MIN_TRIM_SAMPLE_COUNT: usize = 5;

/// Mean, variance and coefficient of variation of a trimmed sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimmedStats {
    /// Number of values before trimming.
    pub sample_count: usize,
    /// Number of values dropped from each tail.
    pub trimmed_per_side: usize,
    /// Mean of the retained values.
    pub mean: f64,
    /// Population variance of the retained values.
    pub variance: f64,
    /// Coefficient of variation (`std_dev / mean`), `0` when the mean is not positive.
    pub cv: f64,
}

impl TrimmedStats {
    /// Computes trimmed statistics of `values` with `trim_percentage` percent cut from each tail.
    ///
    /// The result does not depend on the order of `values`.
    ///
    /// # Returns
    ///
    /// * `Some(TrimmedStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use tripeaks_stats::trimmed::TrimmedStats;
    /// // Fewer than five values are used as-is.
    /// let stats = TrimmedStats::new([40.0, 60.0], 25.0).unwrap();
    /// assert_eq!(stats.trimmed_per_side, 0);
    /// assert_eq!(stats.mean, 50.0);
    /// assert_eq!(stats.variance, 100.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I, trim_percentage: f64) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);

        let sample_count = values.len();
        let trimmed_per_side = trim_count(sample_count, trim_percentage);
        let retained = &values[trimmed_per_side..sample_count - trimmed_per_side];
        let (mean, variance) = mean_and_population_variance(retained)?;
        let cv = if mean > 0.0 {
            variance.sqrt() / mean
        } else {
            0.0
        };

        Some(Self {
            sample_count,
            trimmed_per_side,
            mean,
            variance,
            cv,
        })
    }

    /// Number of values the statistics were computed from.
    #[must_use]
    pub fn retained_count(&self) -> usize {
        self.sample_count - 2 * self.trimmed_per_side
    }
}

/// Number of values dropped from each tail of a sample of `n` values.
///
/// Never removes so many values that the sample becomes empty.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn trim_count(n: usize, trim_percentage: f64) -> usize {
    if n < MIN_TRIM_SAMPLE_COUNT || trim_percentage <= 0.0 {
        return 0;
    }
    let requested = (n as f64 * trim_percentage / 100.0).floor() as usize;
    requested.min((n - 1) / 2)
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _, seq::SliceRandom as _};
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn test_empty_is_none() {
        assert!(TrimmedStats::new([], 10.0).is_none());
    }

    #[test]
    fn test_identical_scores_have_zero_dispersion() {
        for n in [1, 3, 5, 10, 37] {
            let stats = TrimmedStats::new(std::iter::repeat_n(55.0, n), 10.0).unwrap();
            assert_eq!(stats.mean, 55.0);
            assert_eq!(stats.variance, 0.0);
            assert_eq!(stats.cv, 0.0);
        }
    }

    #[test]
    fn test_small_sample_is_not_trimmed() {
        let stats = TrimmedStats::new([0.0, 10.0, 20.0, 100.0], 40.0).unwrap();
        assert_eq!(stats.trimmed_per_side, 0);
        assert_eq!(stats.retained_count(), 4);
        assert_eq!(stats.mean, 32.5);
    }

    #[test]
    fn test_trimming_drops_both_tails() {
        // 20 values, 10% => 2 per side.
        let mut values = vec![50.0; 16];
        values.extend([-100.0, -90.0, 190.0, 200.0]);
        let stats = TrimmedStats::new(values, 10.0).unwrap();
        assert_eq!(stats.trimmed_per_side, 2);
        assert_eq!(stats.retained_count(), 16);
        assert_eq!(stats.mean, 50.0);
        assert_eq!(stats.variance, 0.0);
    }

    #[test]
    fn test_cv_is_zero_for_non_positive_mean() {
        let stats = TrimmedStats::new([-10.0, 10.0, -5.0], 0.0).unwrap();
        assert_eq!(stats.mean, -5.0 / 3.0);
        assert!(stats.variance > 0.0);
        assert_eq!(stats.cv, 0.0);
    }

    #[test]
    fn test_cv_uses_population_std_dev() {
        let stats = TrimmedStats::new([40.0, 60.0], 0.0).unwrap();
        assert!((stats.cv - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_trim_count_bounds() {
        for n in 1..200 {
            for p in [0.0, 5.0, 10.0, 25.0, 49.9, 50.0, 75.0, 99.9] {
                let trim = trim_count(n, p);
                #[expect(
                    clippy::cast_precision_loss,
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss
                )]
                let limit = (n as f64 * p / 100.0).floor() as usize;
                assert!(trim <= limit, "n={n} p={p} trim={trim}");
                assert!(2 * trim < n, "n={n} p={p} trim={trim} empties the sample");
            }
        }
    }

    #[test]
    fn test_order_independence() {
        let mut rng = Pcg64Mcg::seed_from_u64(0x7219_ea5c);
        let mut values = (0..41)
            .map(|_| f64::from(rng.random_range(-20..120)))
            .collect::<Vec<_>>();
        let expected = TrimmedStats::new(values.clone(), 10.0).unwrap();
        for _ in 0..10 {
            values.shuffle(&mut rng);
            assert_eq!(TrimmedStats::new(values.clone(), 10.0).unwrap(), expected);
        }
    }
}
