//! Feature Engineering Engine
//!
//! Derives inflation-adjusted depreciation features for training tables and
//! rebuilds model input rows for single user queries against the frozen
//! training-time feature schema.

mod depreciation;
mod encoder;
mod error;
mod frame;
mod naming;
mod outliers;
mod reconstructor;
mod schema;
mod statistics;

pub use depreciation::{
    write_derived_csv, DepreciationConfig, DepreciationDeriver, DepreciationFeatures,
    DepreciationInput, DerivedListing,
};
pub use encoder::OneHotEncoder;
pub use error::FeatureError;
pub use frame::{FeatureMatrix, FeatureRow, RowInputs};
pub use naming::{
    sanitize_model_detail, CategoricalDimension, AGE_COLUMN, MILEAGE_COLUMN, NUMERIC_COLUMNS,
    YEAR_COLUMN,
};
pub use outliers::{OutlierConfig, PriceOutlierFilter};
pub use reconstructor::{
    FeatureReconstructor, ReconstructorConfig, VehicleQuery, UNSELECTED_SENTINELS,
};
pub use schema::FeatureSchema;
pub use statistics::{quantile, Summary};
