//! Batch Pipeline Stages

use crate::split::{train_test_split, SplitConfig};
use anyhow::{bail, Context, Result};
use feature_engine::{
    write_derived_csv, DepreciationDeriver, FeatureMatrix, FeatureSchema, OneHotEncoder,
    PriceOutlierFilter, ReconstructorConfig, Summary,
};
use inference_engine::{
    log_price, FeatureScaler, ModelBundle, PricePredictor, RegressionReport, RobustScaler,
    TreeEnsemble,
};
use listing_data::{
    read_raw_listings, read_records, Cleaner, CleaningConfig, CleaningReport, InflationTable,
    ListingRecord,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Target column in the exported training tables (log1p of the price)
pub const TARGET_COLUMN: &str = "Harga";

/// Outcome of the derive stage
#[derive(Debug, Clone, Serialize)]
pub struct DeriveSummary {
    pub cleaning: CleaningReport,
    pub joined: usize,
    pub derived: usize,
}

/// Clean raw listings, join inflation rates and write the derived table
pub fn derive_listings(
    listings: &Path,
    inflation: &Path,
    out: &Path,
    config: &CleaningConfig,
) -> Result<DeriveSummary> {
    let raw = read_raw_listings(listings)
        .with_context(|| format!("reading listings from {}", listings.display()))?;
    let cleaned = Cleaner::new(config.clone()).clean(&raw)?;

    let table = InflationTable::from_path(inflation)
        .with_context(|| format!("reading inflation table from {}", inflation.display()))?;
    let joined = table.join(cleaned.records, config.missing_inflation)?;
    let joined_count = joined.len();

    let derived = DepreciationDeriver::default().derive_table(&joined, config.current_year)?;
    let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    write_derived_csv(file, &derived)?;
    info!("Wrote {} derived listings to {}", derived.len(), out.display());

    Ok(DeriveSummary {
        cleaning: cleaned.report,
        joined: joined_count,
        derived: derived.len(),
    })
}

/// Scaler and schema fitted during preparation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingArtifacts {
    pub scaler: RobustScaler,
    pub feature_columns: FeatureSchema,
    /// Reference year used for car age
    pub current_year: i32,
}

impl PreprocessingArtifacts {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// Outcome of the prepare stage
#[derive(Debug, Clone, Serialize)]
pub struct PrepareSummary {
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub features: usize,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub preprocessing_path: PathBuf,
}

/// Derived listings with price outliers removed, in file order
pub fn load_training_records(derived: &Path) -> Result<Vec<ListingRecord>> {
    let records = read_records(derived)
        .with_context(|| format!("reading derived listings from {}", derived.display()))?;
    if records.is_empty() {
        bail!("{} contains no listings", derived.display());
    }
    Ok(PriceOutlierFilter::default().filter(records, |r| r.price as f64))
}

fn write_feature_csv(path: &Path, matrix: &FeatureMatrix, targets: &[f64]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    let mut header: Vec<&str> = matrix
        .schema()
        .columns()
        .iter()
        .map(String::as_str)
        .collect();
    header.push(TARGET_COLUMN);
    writer.write_record(&header)?;

    for (row, target) in matrix.values().rows().into_iter().zip(targets) {
        let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        record.push(target.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Encode, split and scale the derived table; writes `train.csv`,
/// `test.csv` and `preprocessing.json` into `out_dir`
pub fn prepare_training_set(
    derived: &Path,
    out_dir: &Path,
    current_year: i32,
    split: &SplitConfig,
) -> Result<PrepareSummary> {
    let records = load_training_records(derived)?;
    let prices: Vec<f64> = records.iter().map(|r| r.price as f64).collect();
    let summary = Summary::compute(&prices);
    info!(
        "Price after outlier filter: median {:.0}, IQR [{:.0}, {:.0}], range [{:.0}, {:.0}]",
        summary.median, summary.q25, summary.q75, summary.min, summary.max
    );

    let encoder = OneHotEncoder::fit(&records, current_year)?;
    let matrix = encoder.encode(&records)?;
    let targets: Vec<f64> = records.iter().map(|r| log_price(r.price as f64)).collect();

    let indices = train_test_split(records.len(), split);
    let train = matrix.select_rows(&indices.train);
    let test = matrix.select_rows(&indices.test);
    if train.nrows() == 0 {
        bail!("training split is empty ({} rows total)", records.len());
    }

    let scaler = RobustScaler::fit(&train)?;
    let train_scaled = scaler.transform(&train)?;
    let test_scaled = scaler.transform(&test)?;
    let pick = |idx: &[usize]| idx.iter().map(|&i| targets[i]).collect::<Vec<_>>();

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let train_path = out_dir.join("train.csv");
    let test_path = out_dir.join("test.csv");
    let preprocessing_path = out_dir.join("preprocessing.json");

    write_feature_csv(&train_path, &train_scaled, &pick(&indices.train))?;
    write_feature_csv(&test_path, &test_scaled, &pick(&indices.test))?;

    PreprocessingArtifacts {
        scaler,
        feature_columns: encoder.schema().as_ref().clone(),
        current_year,
    }
    .save(&preprocessing_path)?;

    info!(
        "Prepared {} rows ({} train / {} test) with {} features",
        records.len(),
        indices.train.len(),
        indices.test.len(),
        encoder.schema().len()
    );

    Ok(PrepareSummary {
        rows: records.len(),
        train_rows: indices.train.len(),
        test_rows: indices.test.len(),
        features: encoder.schema().len(),
        train_path,
        test_path,
        preprocessing_path,
    })
}

/// Combine preprocessing artifacts with an externally trained regressor
pub fn assemble_bundle(preprocessing: &Path, regressor: &Path, out: &Path) -> Result<ModelBundle> {
    let artifacts = PreprocessingArtifacts::load(preprocessing)?;
    let file = File::open(regressor).with_context(|| format!("opening {}", regressor.display()))?;
    let regressor: TreeEnsemble = serde_json::from_reader(file)
        .with_context(|| format!("parsing regressor {}", regressor.display()))?;

    let bundle = ModelBundle::new(regressor, artifacts.scaler, artifacts.feature_columns)?;
    bundle.save(out)?;
    Ok(bundle)
}

/// MAE / MAPE of a bundle on the seeded test split of a derived table
pub fn evaluate_bundle(
    bundle: &Path,
    derived: &Path,
    current_year: i32,
    split: &SplitConfig,
) -> Result<RegressionReport> {
    let bundle = ModelBundle::load(bundle)?;
    let records = load_training_records(derived)?;

    let indices = train_test_split(records.len(), split);
    let test: Vec<ListingRecord> = indices.test.iter().map(|&i| records[i].clone()).collect();
    if test.is_empty() {
        bail!("test split is empty ({} rows total)", records.len());
    }

    let encoder = OneHotEncoder::from_schema(bundle.schema().clone(), current_year);
    let matrix = encoder.encode(&test)?;
    let predictor = PricePredictor::from_bundle(&bundle, ReconstructorConfig::for_year(current_year));
    let predicted = predictor.predict_matrix(&matrix)?;
    let actual: Vec<f64> = test.iter().map(|r| r.price as f64).collect();

    let report = RegressionReport::compute(&actual, &predicted)?;
    info!(
        "Evaluated {} test rows: MAE {:.0}, MAPE {:.2}%",
        report.samples, report.mae, report.mape_percent
    );
    Ok(report)
}
