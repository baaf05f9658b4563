//! Inference Feature Reconstructor
//!
//! Rebuilds one model input row from a user query, aligned with the frozen
//! training-time schema. Categories the schema does not know leave their
//! block at zero, exactly like the reference level at training time.

use crate::error::FeatureError;
use crate::frame::{FeatureRow, RowInputs};
use crate::naming::CategoricalDimension;
use crate::schema::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Placeholder values the form submits when nothing was picked
pub const UNSELECTED_SENTINELS: [&str; 4] = [
    "Pilih Merek",
    "Pilih Lokasi",
    "Pilih Jumlah Pemilik",
    "Pilih Model",
];

/// A single prediction query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleQuery {
    pub year: i32,
    /// Missing mileage is treated as 0
    #[serde(default)]
    pub mileage: Option<u64>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model_detail: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

/// Reconstructor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructorConfig {
    /// Reference year for car age
    pub current_year: i32,
    /// Extra placeholder strings treated as "not selected"
    #[serde(default)]
    pub extra_sentinels: Vec<String>,
}

impl ReconstructorConfig {
    pub fn for_year(current_year: i32) -> Self {
        Self {
            current_year,
            extra_sentinels: Vec::new(),
        }
    }
}

/// Builds schema-aligned rows from queries
#[derive(Debug, Clone)]
pub struct FeatureReconstructor {
    schema: Arc<FeatureSchema>,
    config: ReconstructorConfig,
}

impl FeatureReconstructor {
    pub fn new(schema: Arc<FeatureSchema>, config: ReconstructorConfig) -> Self {
        Self { schema, config }
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn config(&self) -> &ReconstructorConfig {
        &self.config
    }

    /// Trimmed value, or `None` for blanks and placeholders
    fn selected<'a>(&self, value: Option<&'a str>) -> Option<&'a str> {
        let value = value?.trim();
        let placeholder = value.is_empty()
            || UNSELECTED_SENTINELS.iter().any(|s| *s == value)
            || self.config.extra_sentinels.iter().any(|s| s == value);
        (!placeholder).then_some(value)
    }

    /// Age of a car built in `year`; future or out-of-range years are rejected
    pub fn car_age(&self, year: i32) -> Result<u32, FeatureError> {
        let current_year = self.config.current_year;
        current_year
            .checked_sub(year)
            .and_then(|age| u32::try_from(age).ok())
            .ok_or(FeatureError::NegativeCarAge { year, current_year })
    }

    /// Build the row for one query.
    ///
    /// Brand, model detail and location are required; owner is optional.
    pub fn reconstruct(&self, query: &VehicleQuery) -> Result<FeatureRow, FeatureError> {
        let brand = self
            .selected(query.brand.as_deref())
            .ok_or(FeatureError::MissingSelection("brand"))?;
        let model_detail = self
            .selected(query.model_detail.as_deref())
            .ok_or(FeatureError::MissingSelection("model_detail"))?;
        let location = self
            .selected(query.location.as_deref())
            .ok_or(FeatureError::MissingSelection("location"))?;
        let owner = self.selected(query.owner.as_deref());

        let car_age = self.car_age(query.year)?;

        let mut categories = vec![
            (CategoricalDimension::Brand, brand),
            (CategoricalDimension::ModelDetail, model_detail),
            (CategoricalDimension::Location, location),
        ];
        if let Some(owner) = owner {
            categories.push((CategoricalDimension::Owner, owner));
        }

        let mut row = FeatureRow::zeros(Arc::clone(&self.schema));
        row.fill(&RowInputs {
            year: query.year,
            car_age,
            mileage: query.mileage.unwrap_or(0),
            categories,
        });

        debug!("Reconstructed row with active columns {:?}", row.active_columns());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn schema() -> Arc<FeatureSchema> {
        let columns = [
            "Tahun",
            "Kilometer",
            "UsiaMobil",
            "Merek_Honda",
            "Merek_Toyota",
            "Model_Detail_avanza_g_13_at",
            "Model_Detail_jazz_rs",
            "Lokasi_Jakarta",
            "Lokasi_Surabaya",
            "owner_First",
            "owner_Second",
        ];
        Arc::new(FeatureSchema::new(columns.iter().map(|c| c.to_string()).collect()).unwrap())
    }

    fn reconstructor() -> FeatureReconstructor {
        FeatureReconstructor::new(schema(), ReconstructorConfig::for_year(2025))
    }

    fn avanza_query() -> VehicleQuery {
        VehicleQuery {
            year: 2018,
            mileage: Some(50_000),
            brand: Some("Toyota".to_string()),
            model_detail: Some("Avanza G 1.3 AT".to_string()),
            location: Some("Jakarta".to_string()),
            owner: Some("First".to_string()),
        }
    }

    #[test]
    fn test_avanza_example() {
        let row = reconstructor().reconstruct(&avanza_query()).unwrap();

        assert_eq!(row.get("Tahun"), Some(2018.0));
        assert_eq!(row.get("UsiaMobil"), Some(7.0));
        assert_eq!(row.get("Kilometer"), Some(50_000.0));
        assert_eq!(
            row.active_columns(),
            vec![
                "Tahun",
                "Kilometer",
                "UsiaMobil",
                "Merek_Toyota",
                "Model_Detail_avanza_g_13_at",
                "Lokasi_Jakarta",
                "owner_First",
            ]
        );
        let ones = row.values().iter().filter(|v| **v == 1.0).count();
        assert_eq!(ones, 4);
    }

    #[test]
    fn test_unknown_categories_leave_block_zero() {
        let query = VehicleQuery {
            brand: Some("Wuling".to_string()),
            model_detail: Some("Almaz RS".to_string()),
            location: Some("Medan".to_string()),
            owner: Some("Fourth & Above".to_string()),
            ..avanza_query()
        };
        let row = reconstructor().reconstruct(&query).unwrap();
        assert_eq!(row.active_columns(), vec!["Tahun", "Kilometer", "UsiaMobil"]);
    }

    #[test]
    fn test_placeholders_rejected() {
        let r = reconstructor();

        let query = VehicleQuery {
            brand: Some("Pilih Merek".to_string()),
            ..avanza_query()
        };
        assert!(matches!(
            r.reconstruct(&query),
            Err(FeatureError::MissingSelection("brand"))
        ));

        let query = VehicleQuery {
            location: Some("  ".to_string()),
            ..avanza_query()
        };
        assert!(matches!(
            r.reconstruct(&query),
            Err(FeatureError::MissingSelection("location"))
        ));

        let query = VehicleQuery {
            model_detail: None,
            ..avanza_query()
        };
        assert!(matches!(
            r.reconstruct(&query),
            Err(FeatureError::MissingSelection("model_detail"))
        ));
    }

    #[test]
    fn test_owner_placeholder_is_optional() {
        let query = VehicleQuery {
            owner: Some("Pilih Jumlah Pemilik".to_string()),
            ..avanza_query()
        };
        let row = reconstructor().reconstruct(&query).unwrap();
        assert_eq!(row.get("owner_First"), Some(0.0));
        assert_eq!(row.get("owner_Second"), Some(0.0));
    }

    #[test]
    fn test_future_year_rejected() {
        let query = VehicleQuery {
            year: 2026,
            ..avanza_query()
        };
        assert!(matches!(
            reconstructor().reconstruct(&query),
            Err(FeatureError::NegativeCarAge { year: 2026, current_year: 2025 })
        ));
    }

    #[test]
    fn test_extreme_years_rejected() {
        for year in [i32::MIN, i32::MAX] {
            let query = VehicleQuery {
                year,
                ..avanza_query()
            };
            assert!(matches!(
                reconstructor().reconstruct(&query),
                Err(FeatureError::NegativeCarAge { .. })
            ));
        }
    }

    #[test]
    fn test_missing_mileage_defaults_to_zero() {
        let query = VehicleQuery {
            mileage: None,
            ..avanza_query()
        };
        let row = reconstructor().reconstruct(&query).unwrap();
        assert_eq!(row.get("Kilometer"), Some(0.0));
    }

    proptest! {
        #[test]
        fn prop_row_matches_schema(
            year in 1980i32..=2025,
            mileage in 0u64..1_000_000,
            brand in "[A-Za-z ]{1,12}",
            model in "[A-Za-z0-9 .]{1,20}",
            location in "[A-Za-z ]{1,12}",
            owner in proptest::option::of("[A-Za-z &]{1,14}"),
        ) {
            let query = VehicleQuery {
                year,
                mileage: Some(mileage),
                brand: Some(brand),
                model_detail: Some(model),
                location: Some(location),
                owner,
            };
            let schema = schema();
            match reconstructor().reconstruct(&query) {
                Ok(row) => {
                    prop_assert_eq!(row.values().len(), schema.len());
                    prop_assert_eq!(row.schema().columns(), schema.columns());
                }
                Err(e) => prop_assert!(matches!(e, FeatureError::MissingSelection(_))),
            }
        }
    }
}
