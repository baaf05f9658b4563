//! Interquartile-Range Price Filter

use crate::statistics::quantile;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Outlier filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierConfig {
    /// Lower quartile used for the IQR
    pub lower_quantile: f64,
    /// Upper quartile used for the IQR
    pub upper_quantile: f64,
    /// Fences sit this many IQRs outside the quartiles
    pub iqr_multiplier: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            lower_quantile: 0.25,
            upper_quantile: 0.75,
            iqr_multiplier: 1.5,
        }
    }
}

/// Drops rows whose price lies outside the IQR fences
pub struct PriceOutlierFilter {
    config: OutlierConfig,
}

impl PriceOutlierFilter {
    /// Create a new filter
    pub fn new(config: OutlierConfig) -> Self {
        Self { config }
    }

    /// Inclusive `(lower, upper)` fences for a set of prices
    pub fn bounds(&self, prices: &[f64]) -> Option<(f64, f64)> {
        let q1 = quantile(prices, self.config.lower_quantile)?;
        let q3 = quantile(prices, self.config.upper_quantile)?;
        let iqr = q3 - q1;
        Some((
            q1 - self.config.iqr_multiplier * iqr,
            q3 + self.config.iqr_multiplier * iqr,
        ))
    }

    /// Keep the items whose price lies within the fences
    pub fn filter<T, F>(&self, items: Vec<T>, price: F) -> Vec<T>
    where
        F: Fn(&T) -> f64,
    {
        let prices: Vec<f64> = items.iter().map(&price).collect();
        let Some((lower, upper)) = self.bounds(&prices) else {
            return items;
        };

        let before = items.len();
        let kept: Vec<T> = items
            .into_iter()
            .filter(|item| {
                let p = price(item);
                p >= lower && p <= upper
            })
            .collect();

        info!(
            "Price outlier filter [{:.0}, {:.0}]: kept {} of {} rows",
            lower,
            upper,
            kept.len(),
            before
        );
        kept
    }
}

impl Default for PriceOutlierFilter {
    fn default() -> Self {
        Self::new(OutlierConfig::default())
    }
}
