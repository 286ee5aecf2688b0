//! House price CLI
//!
//! Dataset analysis, pipeline transforms, training and validation runs.

use clap::{Parser, Subcommand};
use colored::*;
use ndarray::Array1;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::analysis::FeatureManager;
use crate::config::PipelineConfig;
use crate::explainability::MAX_BACKGROUND_ROWS;
use crate::feature_transformer::TreeSimilarFeatureTransformer;
use crate::pipeline::{PipelineTemplate, SplitDataType, TreeSimilarPipeline};
use crate::teacher::Teacher;
use crate::trainer::Trainer;
use crate::training::{rmse, rmsle, ForestEstimator, ParamGrid};
use crate::utils::{column_to_array, has_column, write_csv, DataLoader};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn metric(name: &str, value: f64) {
    println!("  {:<16} {}", muted(name), format!("{:.4}", value).white().bold());
}

fn ranking(rows: &[(String, f64)], limit: usize) {
    for (name, value) in rows.iter().take(limit) {
        println!("  {:<24} {:>12.4}", name, value);
    }
    if rows.len() > limit {
        println!("  {}", dim(&format!("… {} more", rows.len() - limit)));
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "house-price")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "House price feature engineering and forest training")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize nulls, rare categories, entropy, correlation and VIF
    Analyze {
        /// Input data file (CSV, JSON, or Parquet)
        #[arg(short, long)]
        data: PathBuf,

        /// Rows shown per table
        #[arg(long, default_value = "15")]
        top: usize,
    },

    /// Run the tree pipeline and write the result
    Transform {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Split the input belongs to (train, validation, test)
        #[arg(long, default_value = "train")]
        split: SplitDataType,

        /// Training file the encoder and quantiles are fitted on when the
        /// split is not train
        #[arg(long)]
        fit: Option<PathBuf>,

        /// Target column excluded from normalization
        #[arg(short, long, default_value = "SalePrice")]
        target: String,
    },

    /// Train the forest regressor and predict the test set
    Train {
        /// Labelled training data
        #[arg(short, long)]
        data: PathBuf,

        /// Separate test file; without it the data is split
        #[arg(long)]
        test: Option<PathBuf>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write test predictions to this CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Cross-validate on log prices, optionally grid search and rank features
    Validate {
        /// Labelled training data
        #[arg(short, long)]
        data: PathBuf,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Run the grid search from the config
        #[arg(long)]
        grid: bool,

        /// Show the top N features by mean |SHAP| (negative shows all)
        #[arg(long, allow_hyphen_values = true)]
        shap: Option<i32>,
    },
}

// ─── Data loading ──────────────────────────────────────────────────────────────

pub fn load_data(path: &Path) -> anyhow::Result<DataFrame> {
    Ok(DataLoader::new().load_auto(path)?)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(path) => Ok(PipelineConfig::load(path)?),
        None => Ok(PipelineConfig::default()),
    }
}

fn default_grid() -> ParamGrid {
    ParamGrid::new()
        .with_n_estimators(vec![100, 300])
        .with_max_depth(vec![None, Some(12)])
        .with_min_samples_leaf(vec![1, 2])
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_analyze(data_path: &Path, top: usize) -> anyhow::Result<()> {
    section("Analyze");

    step_run("Loading data");
    let start = Instant::now();
    let df = load_data(data_path)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    section("Features with nulls");
    println!("  {}", FeatureManager::describe_features_with_none(&df));

    section("Smallest categories");
    let smallest = FeatureManager::smallest_category(&df)?;
    for row in smallest.iter().take(top) {
        println!("  {:<24} {:<16} {:>8.2}%", row.column, row.value, row.frequency_pct);
    }

    let config = PipelineConfig::default();
    section("High entropy");
    let entropy = FeatureManager::high_entropy(&df, config.entropy_threshold)?;
    if entropy.is_empty() {
        println!("  {}", dim("none"));
    } else {
        println!("  {}", entropy.join(", "));
    }

    section("High correlation sums");
    ranking(&FeatureManager::high_correlation_features(&df, config.correlation_threshold)?, top);

    section("VIF");
    ranking(&FeatureManager::vif(&df)?, top);

    println!();
    Ok(())
}

pub fn cmd_transform(
    data_path: &Path,
    output_path: &Path,
    split: SplitDataType,
    fit_path: Option<&Path>,
    target: &str,
) -> anyhow::Result<()> {
    section("Transform");

    step_run("Loading data");
    let df = load_data(data_path)?;
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Train).with_target(target);
    if !split.is_train() {
        let Some(fit_path) = fit_path else {
            anyhow::bail!("--fit <train file> is required for the {} split", split);
        };
        step_run("Fitting on training data");
        let train = load_data(fit_path)?;
        pipeline.build(&train)?;
        step_done(&format!("{} rows", train.height()));
        pipeline.set_split(split);
    }

    step_run(&format!("Running pipeline on {}", split.to_string().cyan()));
    let start = Instant::now();
    let mut processed = pipeline.build(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    step_run(&format!("Saving → {}", output_path.display()));
    write_csv(&mut processed, output_path)?;
    step_done(&format!("{} rows × {} cols", processed.height(), processed.width()));

    println!();
    Ok(())
}

pub fn cmd_train(
    data_path: &Path,
    test_path: Option<&Path>,
    config_path: Option<&Path>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Train");
    let config = load_config(config_path)?;

    step_run("Loading data");
    let df = load_data(data_path)?;
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    let trainer = match test_path {
        Some(path) => {
            let test = load_data(path)?;
            let test_y = if has_column(&test, &config.target) {
                Some(column_to_array(&test, &config.target)?)
            } else {
                None
            };
            Trainer::from_parts(&df, test, test_y, &config.target)?
        }
        None => Trainer::from_frame(&df, &config.target, &config.split)?,
    };

    step_run(&format!("Training forest on {} rows", trainer.x_train().height()));
    let start = Instant::now();
    let mut estimator = ForestEstimator::regressor(config.forest.clone());
    let predictions = trainer.train(
        |df, split| TreeSimilarFeatureTransformer::new(df, split).with_logging(true),
        &mut estimator,
    )?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    match trainer.y_test() {
        Some(y_test) => {
            metric("RMSE", rmse(y_test, &predictions)?);
            metric("RMSLE", rmsle(y_test, &predictions)?);
        }
        None => println!("  {}", muted("test target unknown, no score")),
    }

    if let Some(path) = output {
        let mut frame = predictions_frame(trainer.x_test(), &predictions)?;
        write_csv(&mut frame, path)?;
        println!("  {} {}", ok("✓"), format!("predictions → {}", path.display()));
    }

    println!();
    Ok(())
}

/// `Id` (when present) next to the predicted price
fn predictions_frame(x_test: &DataFrame, predictions: &Array1<f64>) -> anyhow::Result<DataFrame> {
    let price = Column::new("SalePrice".into(), predictions.to_vec());
    let columns = match x_test.column("Id") {
        Ok(id) => vec![id.clone(), price],
        Err(_) => vec![price],
    };
    Ok(DataFrame::new(columns)?)
}

pub fn cmd_validate(
    data_path: &Path,
    config_path: Option<&Path>,
    grid: bool,
    shap: Option<i32>,
) -> anyhow::Result<()> {
    section("Validate");
    let config = load_config(config_path)?;

    step_run("Loading data");
    let df = load_data(data_path)?;
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    step_run("Running pipeline");
    let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Train).with_target(&config.target);
    let processed = pipeline.build(&df)?;
    let y = column_to_array(&processed, &config.target)?;
    let x = processed.drop(&config.target)?;
    step_done(&format!("{} features", x.width()));

    let estimator = ForestEstimator::regressor(config.forest.clone());
    let mut teacher = Teacher::new(estimator, x, y, &config.uniformed_feature_refs())?
        .with_cv_folds(config.cv_folds)
        .with_shap_samples(config.shap_samples);

    step_run(&format!("{}-fold cross-validation", config.cv_folds));
    let start = Instant::now();
    let score = teacher.fit()?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    if let Some(report) = teacher.cv_report() {
        metric("CV RMSE", report.mean_rmse);
        metric("CV RMSLE", report.mean_rmsle);
    }
    metric("Train score", score);

    if grid {
        let param_grid = config.param_grid.clone().unwrap_or_else(default_grid);
        section("Grid search");
        step_run(&format!("{} candidates by {}", param_grid.n_candidates(), config.scoring));
        let result = teacher.search_params_by_grid(&param_grid, config.scoring, config.n_jobs)?;
        step_done("");
        println!("  {:<16} {:?}", muted("Best params"), result.best_params);
        metric("Best score", result.best_score);
    }

    if let Some(max_display) = shap {
        section("SHAP importance");
        let sample = teacher.x_train().head(Some(MAX_BACKGROUND_ROWS));
        let ranked = teacher.show_shap(&sample, max_display)?;
        ranking(&ranked, ranked.len());
    }

    println!();
    Ok(())
}
