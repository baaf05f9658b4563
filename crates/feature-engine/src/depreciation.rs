//! Inflation-Adjusted Depreciation Features
//!
//! For each listing the current asking price is deflated to manufacture-year
//! money, a "new" price is back-solved from an assumed constant real
//! depreciation rate, and yearly losses are expressed in both
//! manufacture-year and present-day money.

use crate::error::FeatureError;
use listing_data::{InflatedListing, ListingRecord};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::{debug, info};

/// Depreciation model constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepreciationConfig {
    /// Assumed average real value lost per year, as a fraction
    pub annual_real_depreciation_rate: f64,
    /// Lower bound on the cumulative depreciation factor; keeps very old
    /// cars from dividing by ~0
    pub depreciation_factor_floor: f64,
    /// Policy cap: the back-solved original price may not exceed this many
    /// times the deflated current price
    pub max_original_to_deflated_ratio: f64,
    /// Original prices at or below this give a 0% yearly rate
    pub percent_epsilon: f64,
}

impl Default for DepreciationConfig {
    fn default() -> Self {
        Self {
            annual_real_depreciation_rate: 0.10,
            depreciation_factor_floor: 1e-9,
            max_original_to_deflated_ratio: 7.0,
            percent_epsilon: 1e-9,
        }
    }
}

/// Inputs for one listing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepreciationInput {
    /// Current asking price, > 0
    pub price: f64,
    /// Current year minus manufacture year
    pub car_age: u32,
    /// Manufacture-year inflation as a fraction of 1 (0.04 for 4%), > -1
    pub inflation: f64,
}

/// Derived depreciation features of one listing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepreciationFeatures {
    /// Current price expressed in manufacture-year money
    pub deflated_current_price: f64,
    /// Back-solved new price at manufacture, manufacture-year money
    pub estimated_original_at_manufacture: f64,
    /// Back-solved new price re-inflated to present-day money
    pub estimated_original_today_money: f64,
    /// Average yearly loss, manufacture-year money
    pub real_depreciation_absolute_per_year: f64,
    /// Yearly loss as a percentage of the original price, in [0, 100]
    pub real_depreciation_percent_per_year: f64,
    /// Average yearly loss, present-day money
    pub depreciation_absolute_per_year_today_money: f64,
}

/// Computes [`DepreciationFeatures`]
#[derive(Debug, Clone)]
pub struct DepreciationDeriver {
    config: DepreciationConfig,
}

impl DepreciationDeriver {
    /// Create a deriver; rejects constants that would break the arithmetic
    pub fn new(config: DepreciationConfig) -> Result<Self, FeatureError> {
        let rate = config.annual_real_depreciation_rate;
        if !(0.0..1.0).contains(&rate) {
            return Err(FeatureError::InvalidInput {
                field: "annual_real_depreciation_rate",
                reason: format!("{} is outside [0, 1)", rate),
            });
        }
        if !(config.depreciation_factor_floor > 0.0) {
            return Err(FeatureError::InvalidInput {
                field: "depreciation_factor_floor",
                reason: "must be positive".to_string(),
            });
        }
        if !(config.max_original_to_deflated_ratio >= 1.0) {
            return Err(FeatureError::InvalidInput {
                field: "max_original_to_deflated_ratio",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(Self { config })
    }

    /// Config in use
    pub fn config(&self) -> &DepreciationConfig {
        &self.config
    }

    fn validate(input: &DepreciationInput) -> Result<(), FeatureError> {
        if !input.price.is_finite() || input.price <= 0.0 {
            return Err(FeatureError::InvalidInput {
                field: "price",
                reason: format!("{} is not a positive amount", input.price),
            });
        }
        if !input.inflation.is_finite() || input.inflation <= -1.0 {
            return Err(FeatureError::InvalidInput {
                field: "inflation",
                reason: format!("{} is at or below -100%", input.inflation),
            });
        }
        Ok(())
    }

    /// Derive the six features for one listing
    pub fn derive(&self, input: &DepreciationInput) -> Result<DepreciationFeatures, FeatureError> {
        Self::validate(input)?;

        let price = input.price;
        let inflation_factor = 1.0 + input.inflation;
        let deflated = price / inflation_factor;

        if input.car_age == 0 {
            // Brand new: nothing has been lost yet
            return Ok(DepreciationFeatures {
                deflated_current_price: deflated,
                estimated_original_at_manufacture: deflated,
                estimated_original_today_money: price,
                real_depreciation_absolute_per_year: 0.0,
                real_depreciation_percent_per_year: 0.0,
                depreciation_absolute_per_year_today_money: 0.0,
            });
        }

        let age = f64::from(input.car_age);
        let factor = (1.0 - self.config.annual_real_depreciation_rate)
            .powi(input.car_age.min(i32::MAX as u32) as i32)
            .max(self.config.depreciation_factor_floor);

        let estimated_original = (deflated / factor)
            .min(deflated * self.config.max_original_to_deflated_ratio)
            .max(deflated);
        let estimated_today = estimated_original * inflation_factor;

        let real_absolute = ((estimated_original - deflated) / age).max(0.0);
        let real_percent = if estimated_original > self.config.percent_epsilon {
            (100.0 * real_absolute / estimated_original).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let today_absolute = ((estimated_today - price) / age).max(0.0);

        Ok(DepreciationFeatures {
            deflated_current_price: deflated,
            estimated_original_at_manufacture: estimated_original,
            estimated_original_today_money: estimated_today,
            real_depreciation_absolute_per_year: real_absolute,
            real_depreciation_percent_per_year: real_percent,
            depreciation_absolute_per_year_today_money: today_absolute,
        })
    }

    /// Derive features for one joined listing
    pub fn derive_listing(
        &self,
        listing: &InflatedListing,
        current_year: i32,
    ) -> Result<DerivedListing, FeatureError> {
        let record = &listing.record;
        let car_age = record
            .car_age(current_year)
            .ok_or(FeatureError::NegativeCarAge {
                year: record.year,
                current_year,
            })?;

        let inflation = listing.inflation_fraction();
        let features = self.derive(&DepreciationInput {
            price: record.price as f64,
            car_age,
            inflation,
        })?;

        Ok(DerivedListing {
            record: record.clone(),
            car_age,
            inflation,
            features,
        })
    }

    /// Derive features for a whole table; any invalid row fails the batch
    pub fn derive_table(
        &self,
        listings: &[InflatedListing],
        current_year: i32,
    ) -> Result<Vec<DerivedListing>, FeatureError> {
        let derived = listings
            .iter()
            .map(|listing| self.derive_listing(listing, current_year))
            .collect::<Result<Vec<_>, _>>()?;

        let new_cars = derived.iter().filter(|d| d.car_age == 0).count();
        info!(
            "Derived depreciation features for {} listings ({} brand new)",
            derived.len(),
            new_cars
        );
        Ok(derived)
    }
}

impl Default for DepreciationDeriver {
    fn default() -> Self {
        Self {
            config: DepreciationConfig::default(),
        }
    }
}

/// A listing with its car age, inflation fraction and derived features
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedListing {
    pub record: ListingRecord,
    pub car_age: u32,
    /// Manufacture-year inflation as a fraction of 1
    pub inflation: f64,
    pub features: DepreciationFeatures,
}

#[derive(Serialize)]
struct DerivedListingRow<'a> {
    #[serde(rename = "Judul")]
    title: &'a str,
    #[serde(rename = "Merek")]
    brand: &'a str,
    #[serde(rename = "Model_Detail")]
    model_detail: &'a str,
    #[serde(rename = "Harga")]
    price: u64,
    #[serde(rename = "Tahun")]
    year: i32,
    #[serde(rename = "Kilometer")]
    mileage: u64,
    #[serde(rename = "Lokasi")]
    location: &'a str,
    #[serde(rename = "Pemilik")]
    owner: Option<&'a str>,
    #[serde(rename = "UsiaMobil")]
    car_age: u32,
    #[serde(rename = "Inflasi")]
    inflation: f64,
    #[serde(rename = "HargaSekarang_DeflasiKeThnBuat")]
    deflated_current_price: f64,
    #[serde(rename = "EstimasiHargaAwal_PadaThnBuat")]
    estimated_original_at_manufacture: f64,
    #[serde(rename = "EstimasiHargaAwal_NilaiSaatIni")]
    estimated_original_today_money: f64,
    #[serde(rename = "DepresiasiRiilAbsolut_PerThn_PadaThnBuat")]
    real_depreciation_absolute_per_year: f64,
    #[serde(rename = "DepresiasiRiilNormal_PersenPerThn")]
    real_depreciation_percent_per_year: f64,
    #[serde(rename = "DepresiasiAbsolut_PerThn_NilaiSaatIni")]
    depreciation_absolute_per_year_today_money: f64,
}

impl<'a> From<&'a DerivedListing> for DerivedListingRow<'a> {
    fn from(d: &'a DerivedListing) -> Self {
        Self {
            title: &d.record.title,
            brand: &d.record.brand,
            model_detail: &d.record.model_detail,
            price: d.record.price,
            year: d.record.year,
            mileage: d.record.mileage,
            location: &d.record.location,
            owner: d.record.owner.as_deref(),
            car_age: d.car_age,
            inflation: d.inflation,
            deflated_current_price: d.features.deflated_current_price,
            estimated_original_at_manufacture: d.features.estimated_original_at_manufacture,
            estimated_original_today_money: d.features.estimated_original_today_money,
            real_depreciation_absolute_per_year: d.features.real_depreciation_absolute_per_year,
            real_depreciation_percent_per_year: d.features.real_depreciation_percent_per_year,
            depreciation_absolute_per_year_today_money: d
                .features
                .depreciation_absolute_per_year_today_money,
        }
    }
}

/// Write derived listings as CSV, listing columns first
pub fn write_derived_csv<W: Write>(writer: W, rows: &[DerivedListing]) -> Result<(), FeatureError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(DerivedListingRow::from(row))?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    debug!("Wrote {} derived rows", rows.len());
    Ok(())
}
