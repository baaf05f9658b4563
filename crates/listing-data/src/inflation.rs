//! Yearly Inflation Table

use crate::error::ListingError;
use crate::record::ListingRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Handling of listings whose manufacture year has no inflation rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingInflationPolicy {
    /// Fail the whole join
    Reject,
    /// Drop the row and count it
    Drop,
}

#[derive(Debug, Deserialize)]
struct InflationRow {
    #[serde(rename = "Tahun")]
    year: i32,
    #[serde(rename = "Inflasi")]
    inflation_percent: f64,
}

/// A listing joined with the inflation rate of its manufacture year
#[derive(Debug, Clone, PartialEq)]
pub struct InflatedListing {
    pub record: ListingRecord,
    /// Annual inflation in percent (5.2 means 5.2%)
    pub inflation_percent: f64,
}

impl InflatedListing {
    /// Inflation as a fraction of 1
    pub fn inflation_fraction(&self) -> f64 {
        self.inflation_percent / 100.0
    }
}

/// Annual inflation percentage keyed by year
#[derive(Debug, Clone, Default)]
pub struct InflationTable {
    rates: BTreeMap<i32, f64>,
}

impl InflationTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rate; rates at or below -100% and non-finite values are rejected
    pub fn insert(&mut self, year: i32, inflation_percent: f64) -> Result<(), ListingError> {
        if !inflation_percent.is_finite() || inflation_percent <= -100.0 {
            return Err(ListingError::OutOfRange {
                field: "Inflasi",
                value: inflation_percent,
                min: -100.0,
                max: f64::INFINITY,
            });
        }
        if self.rates.insert(year, inflation_percent).is_some() {
            return Err(ListingError::InvalidFormat(format!(
                "duplicate inflation entry for year {}",
                year
            )));
        }
        Ok(())
    }

    /// Load from CSV with `Tahun,Inflasi` columns
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ListingError> {
        let mut table = Self::new();
        let mut csv_reader = csv::Reader::from_reader(reader);
        for row in csv_reader.deserialize::<InflationRow>() {
            let row = row?;
            table.insert(row.year, row.inflation_percent)?;
        }
        info!("Loaded inflation rates for {} years", table.len());
        Ok(table)
    }

    /// Load from a CSV file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ListingError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Rate for a year in percent
    pub fn rate_percent(&self, year: i32) -> Option<f64> {
        self.rates.get(&year).copied()
    }

    /// Number of years covered
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Attach the manufacture-year inflation rate to every record
    pub fn join(
        &self,
        records: Vec<ListingRecord>,
        policy: MissingInflationPolicy,
    ) -> Result<Vec<InflatedListing>, ListingError> {
        let total = records.len();
        let mut joined = Vec::with_capacity(total);

        for record in records {
            match self.rate_percent(record.year) {
                Some(inflation_percent) => joined.push(InflatedListing {
                    record,
                    inflation_percent,
                }),
                None => match policy {
                    MissingInflationPolicy::Reject => {
                        return Err(ListingError::MissingInflation { year: record.year })
                    }
                    MissingInflationPolicy::Drop => {}
                },
            }
        }

        let dropped = total - joined.len();
        if dropped > 0 {
            warn!("Dropped {} listings without an inflation rate", dropped);
        }
        if joined.is_empty() {
            return Err(ListingError::EmptyDataset("inflation join"));
        }
        Ok(joined)
    }
}
