// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Offline optimization pipeline
//!
//! Trains, optimizes, and evaluates a complaint classifier for one
//! classification type, then persists the optimized artifact the serving
//! layer loads at startup.

mod dataset;
mod evaluate;
mod optimizer;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use complaint_predictor::{
    ComplaintClassifier, LlmSettings, OpenRouterClient, artifact_path, classification_config,
};
use shared_types::ClassificationType;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{dataset::prepare_datasets, evaluate::evaluate_model, optimizer::BootstrapFewShot};

/// Train and optimize a complaint classifier
#[derive(Debug, Parser)]
#[command(name = "pipeline", about = "Train and optimize the complaint classifier")]
struct Args {
    /// Classification type to train
    #[arg(short = 't', long, default_value = "ae-pc")]
    classification_type: ClassificationType,

    /// Directory holding the per-type dataset splits
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory the optimized artifact is written to
    #[arg(long, default_value = "artifacts")]
    artifacts_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    run_pipeline(args).await
}

async fn run_pipeline(args: Args) -> Result<()> {
    let ty = args.classification_type;
    let config = classification_config(ty);

    info!(
        classification_type = %ty,
        task = %config.description,
        "starting optimization pipeline"
    );

    let settings = LlmSettings::from_env()?;
    let client = Arc::new(OpenRouterClient::new(&settings)?);

    let (trainset, testset) = prepare_datasets(&args.data_dir, ty).await?;
    info!(
        train_examples = trainset.len(),
        test_examples = testset.len(),
        "datasets loaded"
    );

    let baseline = ComplaintClassifier::new(ty, client);
    let baseline_accuracy = evaluate_model(&baseline, &testset, "test set (baseline)").await?;

    info!("optimizing with bootstrap few-shot selection");
    let optimized = BootstrapFewShot::default()
        .compile(baseline, &trainset)
        .await?;

    let optimized_accuracy = evaluate_model(&optimized, &testset, "test set (optimized)").await?;

    info!(
        baseline = %format!("{:.1}%", baseline_accuracy * 100.0),
        optimized = %format!("{:.1}%", optimized_accuracy * 100.0),
        improvement = %format!("{:+.1}%", (optimized_accuracy - baseline_accuracy) * 100.0),
        "optimization finished"
    );

    let path = artifact_path(&args.artifacts_dir, ty);
    optimized
        .save(&path, Some(settings.display_model_name()))
        .await?;
    info!(path = %path.display(), "saved optimized artifact");

    Ok(())
}
