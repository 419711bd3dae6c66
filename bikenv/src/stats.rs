//! Population statistics of normalized elevations.

use crate::{elevation::ElevationSeries, BikenvError};
use num_traits::{Float, FromPrimitive};
use serde::Serialize;

/// `k`-th central moment of `values` about their mean.
///
/// Returns `None` for an empty slice.
fn central_moment<T>(values: &[T], k: i32) -> Option<T>
where
    T: Float + FromPrimitive,
{
    let n = T::from_usize(values.len()).filter(|n| !n.is_zero())?;
    let mean = values.iter().fold(T::zero(), |acc, &v| acc + v) / n;
    let sum = values
        .iter()
        .fold(T::zero(), |acc, &v| acc + (v - mean).powi(k));
    Some(sum / n)
}

/// Population variance.
pub fn variance<T: Float + FromPrimitive>(values: &[T]) -> Result<T, BikenvError> {
    central_moment(values, 2).ok_or(BikenvError::EmptySeries)
}

/// Population skewness, `m3 / m2^1.5`.
pub fn skewness<T: Float + FromPrimitive>(values: &[T]) -> Result<T, BikenvError> {
    let m2 = variance(values)?;
    let m3 = central_moment(values, 3).ok_or(BikenvError::EmptySeries)?;
    Ok(m3 / (m2 * m2.sqrt()))
}

/// Excess (Fisher) kurtosis, `m4 / m2² - 3`.
pub fn kurtosis<T: Float + FromPrimitive>(values: &[T]) -> Result<T, BikenvError> {
    let m2 = variance(values)?;
    let m4 = central_moment(values, 4).ok_or(BikenvError::EmptySeries)?;
    let three = T::one() + T::one() + T::one();
    Ok(m4 / (m2 * m2) - three)
}

/// Spread of elevations around the regional mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AltitudeIndex {
    pub variance: f64,
    pub std_dev: f64,
}

impl AltitudeIndex {
    pub fn new(series: &ElevationSeries) -> Result<Self, BikenvError> {
        let variance = variance(&series.normalized_m)?;
        Ok(Self {
            variance,
            std_dev: variance.sqrt(),
        })
    }
}

/// Descriptive statistics of an [`ElevationSeries`].
///
/// A constant series has zero variance, so its skewness and kurtosis
/// are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElevationStats {
    /// Mean elevation before normalization (meters).
    pub mean_m: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

impl ElevationStats {
    pub fn new(series: &ElevationSeries) -> Result<Self, BikenvError> {
        let values = &series.normalized_m;
        let AltitudeIndex { variance, std_dev } = AltitudeIndex::new(series)?;
        Ok(Self {
            mean_m: series.mean_m,
            variance,
            std_dev,
            skewness: skewness(values)?,
            kurtosis: kurtosis(values)?,
        })
    }

    pub fn altitude_index(&self) -> AltitudeIndex {
        AltitudeIndex {
            variance: self.variance,
            std_dev: self.std_dev,
        }
    }
}
