use serde::Serialize;

pub const DEFAULT_MIN_SALARY_RATIO: f64 = 1.2;
pub const DEFAULT_MAX_SALARY_RATIO: f64 = 1.5;
pub const DEFAULT_MAX_REPORTING_DEPTH: usize = 4;

/// A salary band supplied by a caller that cannot be applied as given.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("{bound} salary ratio must be a positive decimal number, found {value}")]
    InvalidRatio { bound: &'static str, value: f64 },
    #[error("minimum salary ratio {min} must not exceed maximum salary ratio {max}")]
    InvertedBand { min: f64, max: f64 },
}

/// Thresholds shared by the salary and reporting-depth analyzers.
///
/// A manager should earn between `min_salary_ratio` and `max_salary_ratio` times
/// the average of their direct reports. Reporting lines longer than
/// `max_reporting_depth` manager hops are flagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisPolicy {
    min_salary_ratio: f64,
    max_salary_ratio: f64,
    max_reporting_depth: usize,
}

impl AnalysisPolicy {
    /// Builds a policy, falling back to the default band when the ratios are not
    /// finite, not positive, or inverted.
    pub fn new(min_salary_ratio: f64, max_salary_ratio: f64, max_reporting_depth: usize) -> Self {
        let valid_band = min_salary_ratio.is_finite()
            && max_salary_ratio.is_finite()
            && min_salary_ratio > 0.0
            && min_salary_ratio <= max_salary_ratio;

        let (min_salary_ratio, max_salary_ratio) = if valid_band {
            (min_salary_ratio, max_salary_ratio)
        } else {
            (DEFAULT_MIN_SALARY_RATIO, DEFAULT_MAX_SALARY_RATIO)
        };

        Self {
            min_salary_ratio,
            max_salary_ratio,
            max_reporting_depth,
        }
    }

    /// Builds a policy, rejecting a band that [`AnalysisPolicy::new`] would replace.
    pub fn checked(
        min_salary_ratio: f64,
        max_salary_ratio: f64,
        max_reporting_depth: usize,
    ) -> Result<Self, PolicyError> {
        let min_salary_ratio = positive_ratio("minimum", min_salary_ratio)?;
        let max_salary_ratio = positive_ratio("maximum", max_salary_ratio)?;
        if min_salary_ratio > max_salary_ratio {
            return Err(PolicyError::InvertedBand {
                min: min_salary_ratio,
                max: max_salary_ratio,
            });
        }

        Ok(Self {
            min_salary_ratio,
            max_salary_ratio,
            max_reporting_depth,
        })
    }

    pub fn min_salary_ratio(&self) -> f64 {
        self.min_salary_ratio
    }

    pub fn max_salary_ratio(&self) -> f64 {
        self.max_salary_ratio
    }

    pub fn max_reporting_depth(&self) -> usize {
        self.max_reporting_depth
    }

    pub fn with_max_reporting_depth(self, max_reporting_depth: usize) -> Self {
        Self {
            max_reporting_depth,
            ..self
        }
    }

    pub fn with_salary_band(self, min_salary_ratio: f64, max_salary_ratio: f64) -> Self {
        Self::new(min_salary_ratio, max_salary_ratio, self.max_reporting_depth)
    }
}

fn positive_ratio(bound: &'static str, value: f64) -> Result<f64, PolicyError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PolicyError::InvalidRatio { bound, value })
    }
}

impl Default for AnalysisPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MIN_SALARY_RATIO,
            DEFAULT_MAX_SALARY_RATIO,
            DEFAULT_MAX_REPORTING_DEPTH,
        )
    }
}
