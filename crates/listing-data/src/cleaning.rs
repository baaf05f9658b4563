//! Listing Cleaning Pass

use crate::error::ListingError;
use chrono::Datelike;
use crate::inflation::MissingInflationPolicy;
use crate::record::{ListingRecord, RawListing};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Cleaning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Accepted asking-price range in Rp, inclusive
    pub price_range: (u64, u64),
    /// Year car ages are measured against; defaults to the current UTC year
    pub current_year: i32,
    /// What the inflation join does with years missing from the table
    pub missing_inflation: MissingInflationPolicy,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            price_range: (1_000_000, 10_000_000_000),
            current_year: chrono::Utc::now().year(),
            missing_inflation: MissingInflationPolicy::Reject,
        }
    }
}

impl CleaningConfig {
    /// Default ranges measured against the given year
    pub fn for_year(current_year: i32) -> Self {
        Self {
            current_year,
            ..Default::default()
        }
    }
}

/// Row counts removed by each cleaning step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub dropped_incomplete: usize,
    pub dropped_price_range: usize,
    pub dropped_negative_age: usize,
    pub dropped_duplicates: usize,
}

impl CleaningReport {
    /// Rows remaining after every step
    pub fn kept(&self) -> usize {
        self.input_rows
            - self.dropped_incomplete
            - self.dropped_price_range
            - self.dropped_negative_age
            - self.dropped_duplicates
    }
}

/// Output of a cleaning pass
#[derive(Debug, Clone)]
pub struct CleanedListings {
    pub records: Vec<ListingRecord>,
    pub report: CleaningReport,
}

/// Turns raw scraped rows into complete, in-range, de-duplicated records
pub struct Cleaner {
    config: CleaningConfig,
}

impl Cleaner {
    /// Create a new cleaner with given config
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    /// Config in use
    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Check a price against the configured range
    pub fn validate_price(&self, price: u64) -> Result<(), ListingError> {
        let (min, max) = self.config.price_range;
        if price < min || price > max {
            Err(ListingError::OutOfRange {
                field: "Harga",
                value: price as f64,
                min: min as f64,
                max: max as f64,
            })
        } else {
            Ok(())
        }
    }

    /// Check that the manufacture year does not lie in the future
    pub fn validate_year(&self, year: i32) -> Result<(), ListingError> {
        if year > self.config.current_year {
            Err(ListingError::NegativeCarAge {
                year,
                current_year: self.config.current_year,
            })
        } else {
            Ok(())
        }
    }

    /// Run every cleaning step in order: completeness, price range,
    /// negative car age, exact duplicates
    pub fn clean(&self, rows: &[RawListing]) -> Result<CleanedListings, ListingError> {
        let mut report = CleaningReport {
            input_rows: rows.len(),
            ..Default::default()
        };

        let mut complete = Vec::with_capacity(rows.len());
        for row in rows {
            match row.parse() {
                Ok(record) => complete.push(record),
                Err(e) => {
                    debug!("Dropping incomplete row: {}", e);
                    report.dropped_incomplete += 1;
                }
            }
        }
        if complete.is_empty() {
            return Err(ListingError::EmptyDataset("dropping incomplete rows"));
        }

        let mut records = Vec::with_capacity(complete.len());
        for record in complete {
            if self.validate_price(record.price).is_err() {
                report.dropped_price_range += 1;
            } else if self.validate_year(record.year).is_err() {
                report.dropped_negative_age += 1;
            } else {
                records.push(record);
            }
        }
        if records.is_empty() {
            return Err(ListingError::EmptyDataset("price and car-age filters"));
        }

        let mut seen = HashSet::with_capacity(records.len());
        records.retain(|record| seen.insert(record.clone()));
        report.dropped_duplicates = report.input_rows
            - report.dropped_incomplete
            - report.dropped_price_range
            - report.dropped_negative_age
            - records.len();

        info!(
            "Cleaned listings: {} in, {} kept (incomplete={}, price={}, negative_age={}, duplicates={})",
            report.input_rows,
            records.len(),
            report.dropped_incomplete,
            report.dropped_price_range,
            report.dropped_negative_age,
            report.dropped_duplicates
        );

        Ok(CleanedListings { records, report })
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(CleaningConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(brand: &str, price: &str, year: &str) -> RawListing {
        RawListing {
            title: Some(format!("{} Listing", brand)),
            brand: Some(brand.to_string()),
            model_detail: Some("Model X".to_string()),
            price: Some(price.to_string()),
            year: Some(year.to_string()),
            mileage: Some("20000".to_string()),
            location: Some("Bandung".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_year_is_current() {
        let config = CleaningConfig::default();
        assert_eq!(config.current_year, chrono::Utc::now().year());

        let cleaner = Cleaner::default();
        let this_year = config.current_year.to_string();
        assert!(cleaner.validate_year(config.current_year).is_ok());
        assert!(cleaner.validate_year(config.current_year + 1).is_err());
        assert_eq!(
            cleaner
                .clean(&[row("Toyota", "150000000", &this_year)])
                .unwrap()
                .records[0]
                .car_age(config.current_year),
            Some(0)
        );
    }

    #[test]
    fn test_price_range_bounds_inclusive() {
        let cleaner = Cleaner::new(CleaningConfig::for_year(2025));
        assert!(cleaner.validate_price(1_000_000).is_ok());
        assert!(cleaner.validate_price(10_000_000_000).is_ok());
        assert!(cleaner.validate_price(999_999).is_err());
        assert!(cleaner.validate_price(10_000_000_001).is_err());
    }

    #[test]
    fn test_clean_drops_each_category() {
        let cleaner = Cleaner::new(CleaningConfig::for_year(2025));
        let mut incomplete = row("Honda", "100000000", "2020");
        incomplete.location = None;

        let rows = vec![
            row("Toyota", "150000000", "2018"),
            row("Toyota", "150000000", "2018"),
            row("Daihatsu", "500", "2018"),
            row("Suzuki", "90000000", "2027"),
            incomplete,
            row("Honda", "200000000", "2025"),
        ];

        let cleaned = cleaner.clean(&rows).unwrap();
        assert_eq!(cleaned.records.len(), 2);
        assert_eq!(cleaned.report.dropped_incomplete, 1);
        assert_eq!(cleaned.report.dropped_price_range, 1);
        assert_eq!(cleaned.report.dropped_negative_age, 1);
        assert_eq!(cleaned.report.dropped_duplicates, 1);
        assert_eq!(cleaned.report.kept(), 2);
        assert!(cleaned.records.iter().all(|r| r.car_age(2025).is_some()));
    }

    #[test]
    fn test_empty_after_filters_is_error() {
        let cleaner = Cleaner::new(CleaningConfig::for_year(2025));
        let rows = vec![row("Toyota", "10", "2018")];
        assert!(matches!(
            cleaner.clean(&rows),
            Err(ListingError::EmptyDataset(_))
        ));
    }
}
