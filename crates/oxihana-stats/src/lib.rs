//! Statistics over game score samples for the Oxihana trainer.
//!
//! - [`summary`]: count, min, max, mean and population standard deviation of
//!   a sample, plus deltas against a baseline sample.
//!
//! # Examples
//!
//! ```
//! use oxihana_stats::summary::SummaryStats;
//!
//! let stats = SummaryStats::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
//! assert!((stats.mean - 5.0).abs() < 1e-6);
//! assert!((stats.std_dev - 2.0).abs() < 1e-6);
//! ```

pub mod summary;
