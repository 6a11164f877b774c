use serde::Serialize;

/// Summary statistics of a score sample.
///
/// The standard deviation is the population standard deviation (divides by
/// `n`), which is what generation reports compare across generations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Number of values in the sample.
    pub count: usize,
    /// The smallest value.
    pub min: f32,
    /// The largest value.
    pub max: f32,
    /// The arithmetic mean.
    pub mean: f32,
    /// The population standard deviation.
    pub std_dev: f32,
}

impl SummaryStats {
    /// Computes summary statistics in a single pass (Welford's algorithm).
    ///
    /// Returns `None` if the sample is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oxihana_stats::summary::SummaryStats;
    /// let stats = SummaryStats::new([3.0, 1.0, 2.0]).unwrap();
    /// assert_eq!(stats.count, 3);
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 3.0);
    /// assert_eq!(stats.mean, 2.0);
    ///
    /// assert!(SummaryStats::new(std::iter::empty()).is_none());
    /// ```
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut count = 0_usize;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        // accumulate in f64; scores are summed over whole generations
        let mut mean = 0.0_f64;
        let mut m2 = 0.0_f64;

        for value in values {
            count += 1;
            min = min.min(value);
            max = max.max(value);
            let value = f64::from(value);
            let delta = value - mean;
            mean += delta / count as f64;
            m2 += delta * (value - mean);
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            count,
            min,
            max,
            mean: mean as f32,
            std_dev: (m2 / count as f64).sqrt() as f32,
        })
    }

    /// Computes summary statistics of integer scores.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_scores<'a, I>(scores: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a i32>,
    {
        Self::new(scores.into_iter().map(|&s| s as f32))
    }

    /// Returns `(mean - baseline.mean, std_dev - baseline.std_dev)`.
    #[must_use]
    pub fn delta(&self, baseline: &Self) -> StatsDelta {
        StatsDelta {
            mean: self.mean - baseline.mean,
            std_dev: self.std_dev - baseline.std_dev,
        }
    }
}

/// Change of mean and standard deviation relative to a baseline sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsDelta {
    pub mean: f32,
    pub std_dev: f32,
}
