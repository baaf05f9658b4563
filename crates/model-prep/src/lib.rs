//! Batch Model Preparation
//!
//! Turns scraped listings into the derived depreciation table, exports the
//! scaled training/test sets, assembles the serving bundle around an
//! externally trained regressor and evaluates it.

mod split;
mod stages;

pub use split::{train_test_split, SplitConfig, SplitIndices};
pub use stages::{
    assemble_bundle, derive_listings, evaluate_bundle, load_training_records,
    prepare_training_set, DeriveSummary, PreprocessingArtifacts, PrepareSummary, TARGET_COLUMN,
};
