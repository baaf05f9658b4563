//! Listing Records

use crate::error::ListingError;
use crate::parse::{parse_mileage, parse_price, parse_year};
use serde::{Deserialize, Serialize};

/// One marketplace row as scraped; every cell may be absent or textual
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(rename = "Judul", default)]
    pub title: Option<String>,
    #[serde(rename = "Merek", default)]
    pub brand: Option<String>,
    #[serde(rename = "Model_Detail", default)]
    pub model_detail: Option<String>,
    #[serde(rename = "Harga", default)]
    pub price: Option<String>,
    #[serde(rename = "Tahun", default)]
    pub year: Option<String>,
    #[serde(rename = "Kilometer", default)]
    pub mileage: Option<String>,
    #[serde(rename = "Lokasi", default)]
    pub location: Option<String>,
    /// Previous-owner bracket ("First", "Second", ...), when the source has it
    #[serde(rename = "Pemilik", default)]
    pub owner: Option<String>,
    #[serde(rename = "SumberURL", default)]
    pub source_url: Option<String>,
}

fn required_text(value: Option<&String>, field: &'static str) -> Result<String, ListingError> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ListingError::MissingField(field))
}

impl RawListing {
    /// Convert into a typed record; any missing or unparseable required
    /// field is reported by name
    pub fn parse(&self) -> Result<ListingRecord, ListingError> {
        let title = required_text(self.title.as_ref(), "Judul")?;
        let brand = required_text(self.brand.as_ref(), "Merek")?;
        let model_detail = required_text(self.model_detail.as_ref(), "Model_Detail")?;
        let location = required_text(self.location.as_ref(), "Lokasi")?;

        let price = self
            .price
            .as_deref()
            .and_then(parse_price)
            .ok_or(ListingError::MissingField("Harga"))?;
        let year = self
            .year
            .as_deref()
            .and_then(parse_year)
            .ok_or(ListingError::MissingField("Tahun"))?;
        let mileage = self
            .mileage
            .as_deref()
            .and_then(parse_mileage)
            .ok_or(ListingError::MissingField("Kilometer"))?;

        let owner = self
            .owner
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string);

        Ok(ListingRecord {
            title,
            brand,
            model_detail,
            price,
            year,
            mileage,
            location,
            owner,
        })
    }
}

/// A complete, typed listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingRecord {
    #[serde(rename = "Judul")]
    pub title: String,
    #[serde(rename = "Merek")]
    pub brand: String,
    #[serde(rename = "Model_Detail")]
    pub model_detail: String,
    /// Asking price in whole currency units (Rp)
    #[serde(rename = "Harga")]
    pub price: u64,
    /// Manufacture year
    #[serde(rename = "Tahun")]
    pub year: i32,
    #[serde(rename = "Kilometer")]
    pub mileage: u64,
    #[serde(rename = "Lokasi")]
    pub location: String,
    #[serde(rename = "Pemilik", default)]
    pub owner: Option<String>,
}

impl ListingRecord {
    /// Car age relative to `current_year`; `None` for future model years
    pub fn car_age(&self, current_year: i32) -> Option<u32> {
        current_year
            .checked_sub(self.year)
            .and_then(|age| u32::try_from(age).ok())
    }
}
