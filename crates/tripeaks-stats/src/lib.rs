//! Statistical utilities for the Tripeaks audit tools.
//!
//! This crate provides the small set of statistics the audit pipeline needs:
//!
//! - **Descriptive statistics**: min, max, mean, median, population variance of a dataset
//! - **Trimmed statistics**: outlier-resistant mean, variance and coefficient of variation
//!   computed after discarding a percentage of values from each tail
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`trimmed`]: Trimmed statistics used to judge a cohort of run scores
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use tripeaks_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Computing trimmed statistics
//!
//! ```
//! use tripeaks_stats::trimmed::TrimmedStats;
//!
//! // One outlier on each side; 10% trimming drops exactly those two values.
//! let scores = [0.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 100.0];
//! let stats = TrimmedStats::new(scores, 10.0).unwrap();
//! assert_eq!(stats.trimmed_per_side, 1);
//! assert_eq!(stats.mean, 50.0);
//! assert_eq!(stats.variance, 0.0);
//! ```

pub mod descriptive;
pub mod trimmed;
